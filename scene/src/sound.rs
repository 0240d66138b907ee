//! Sound object delegation.
//!
//! Sound objects never become scene nodes. The compiler hands each decoded
//! record to a [`SoundCollaborator`] in description order.

use crate::assets::AssetStore;
use crate::description::SoundObject;

/// Receives the sound objects of a scene description.
pub trait SoundCollaborator {
    /// Called once per sound record.
    fn load(&mut self, record: &SoundObject, assets: &dyn AssetStore);
}

/// A collaborator that only logs what it was given.
#[derive(Debug, Default)]
pub struct NullSound {
    loaded: usize,
}

impl NullSound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records received so far.
    pub fn loaded(&self) -> usize {
        self.loaded
    }
}

impl SoundCollaborator for NullSound {
    fn load(&mut self, record: &SoundObject, _assets: &dyn AssetStore) {
        self.loaded += 1;
        log::debug!(
            "Sound object {} ({} streams, {}) not played",
            record.id,
            record.sound.len(),
            record.playbackmode
        );
    }
}
