use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use lumenwall_core::texture::TextureHeader;

use super::{AssetError, AssetStore, normalize};

/// In-memory asset store for tests and embedded assets.
///
/// Cloning yields another handle to the same storage, so assets can be
/// added after the store has been handed to a compiler.
///
/// # Example
///
/// ```
/// use lumenwall_core::texture::TextureHeader;
/// use lumenwall_scene::assets::{AssetStore, MemoryAssetStore};
///
/// let assets = MemoryAssetStore::new();
/// assets.insert_text("shaders/flat.vert", "void main() {}");
/// assets.insert_texture("noise", TextureHeader::sized(256, 256));
///
/// assert_eq!(assets.read_text("/shaders/flat.vert").unwrap(), "void main() {}");
/// assert_eq!(assets.texture_header("noise").unwrap().width, 256);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
    files: Arc<RwLock<HashMap<String, String>>>,
    textures: Arc<RwLock<HashMap<String, TextureHeader>>>,
}

impl MemoryAssetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a text asset, replacing any previous content.
    ///
    /// Paths that fail to normalize are ignored with a warning.
    pub fn insert_text(&self, path: &str, text: impl Into<String>) {
        match normalize(path) {
            Ok(path) => {
                self.files.write().insert(path, text.into());
            }
            Err(e) => log::warn!("MemoryAssetStore: not storing {path}: {e}"),
        }
    }

    /// Register texture metadata under an asset name.
    pub fn insert_texture(&self, name: impl Into<String>, header: TextureHeader) {
        self.textures.write().insert(name.into(), header);
    }

    /// Remove a text asset, returning its content if it existed.
    pub fn remove_text(&self, path: &str) -> Option<String> {
        let path = normalize(path).ok()?;
        self.files.write().remove(&path)
    }
}

impl AssetStore for MemoryAssetStore {
    fn read_text(&self, path: &str) -> Result<String, AssetError> {
        let path = normalize(path)?;
        self.files
            .read()
            .get(&path)
            .cloned()
            .ok_or(AssetError::NotFound(path))
    }

    fn texture_header(&self, name: &str) -> Result<TextureHeader, AssetError> {
        self.textures
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(name.to_string()))
    }
}
