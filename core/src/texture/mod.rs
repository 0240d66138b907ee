//! Scene texture metadata.
//!
//! Pixel decoding happens outside the engine; the scene only records what
//! the compiler and executor need to know about an image: its padded and
//! content sizes, which color channels it carries, how many frame slots it
//! spans and, for sprite sheets, the frame layout.

use serde::Deserialize;

/// One frame of a sprite sheet, in normalized texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SpriteFrame {
    /// Left edge.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Frame width.
    pub width: f32,
    /// Frame height.
    pub height: f32,
    /// Seconds this frame is shown.
    #[serde(default = "default_frame_duration")]
    pub duration: f32,
}

fn default_frame_duration() -> f32 {
    1.0 / 15.0
}

/// Frame layout of a sprite sheet texture.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SpriteSheet {
    /// Frames in playback order.
    pub frames: Vec<SpriteFrame>,
}

impl SpriteSheet {
    /// Sum of all frame durations.
    pub fn total_duration(&self) -> f32 {
        self.frames.iter().map(|f| f.duration).sum()
    }

    /// Index of the frame shown at `time` seconds, looping.
    pub fn frame_at(&self, time: f32) -> usize {
        let total = self.total_duration();
        if self.frames.is_empty() || total <= 0.0 {
            return 0;
        }
        let mut t = time.rem_euclid(total);
        for (i, frame) in self.frames.iter().enumerate() {
            if t < frame.duration {
                return i;
            }
            t -= frame.duration;
        }
        self.frames.len() - 1
    }
}

/// Metadata for one texture as reported by the asset layer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextureHeader {
    /// Allocated width (possibly padded to a power of two).
    pub width: u32,
    /// Allocated height.
    pub height: u32,
    /// Width of the image content.
    pub map_width: u32,
    /// Height of the image content.
    pub map_height: u32,
    /// Availability of the color components beyond the first.
    pub components: [bool; 3],
    /// Number of frame slots (>1 for animated sources).
    pub slot_count: u32,
    /// Sprite sheet layout, if the texture is one.
    pub sprite: Option<SpriteSheet>,
}

impl Default for TextureHeader {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            map_width: 1,
            map_height: 1,
            components: [true; 3],
            slot_count: 1,
            sprite: None,
        }
    }
}

impl TextureHeader {
    /// Header for a plain texture whose content fills the allocation.
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            map_width: width,
            map_height: height,
            ..Self::default()
        }
    }

    /// `(width, height, map_width, map_height)` as uploaded to
    /// `g_Texture<i>Resolution`.
    pub fn resolution(&self) -> [f32; 4] {
        [
            self.width as f32,
            self.height as f32,
            self.map_width as f32,
            self.map_height as f32,
        ]
    }

    /// True if this texture is a sprite sheet.
    pub fn is_sprite(&self) -> bool {
        self.sprite.is_some()
    }
}

/// A texture referenced by the scene's materials.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneTexture {
    /// Asset name the materials refer to.
    pub name: String,
    /// Metadata reported by the asset layer.
    pub header: TextureHeader,
}
