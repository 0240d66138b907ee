//! Texture types and descriptors.

use bitflags::bitflags;

/// Pixel format. Scene textures and render targets are all RGBA8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum TextureFormat {
    #[default]
    Rgba8Unorm,
}

impl TextureFormat {
    /// Bytes per pixel.
    pub fn block_size(&self) -> u32 {
        match self {
            Self::Rgba8Unorm => 4,
        }
    }
}

bitflags! {
    /// Usage flags for textures.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Texture can be copied from.
        const COPY_SRC = 1 << 0;
        /// Texture can be copied to.
        const COPY_DST = 1 << 1;
        /// Texture can be sampled in a shader.
        const TEXTURE_BINDING = 1 << 2;
        /// Texture can be used as a render attachment.
        const RENDER_ATTACHMENT = 1 << 3;
    }
}

impl Default for TextureUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Descriptor for creating a texture.
///
/// `slot_count` greater than one allocates that many same-sized images under
/// one handle; only the active slot is sampled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    /// Debug label for the texture.
    pub label: Option<String>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Texture format.
    pub format: TextureFormat,
    /// Usage flags.
    pub usage: TextureUsage,
    /// Number of addressable slots.
    pub slot_count: u32,
}

impl TextureDescriptor {
    /// Create a new 2D texture descriptor.
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            label: None,
            width,
            height,
            format,
            usage,
            slot_count: 1,
        }
    }

    /// A color target that can be rendered to, sampled and copied.
    pub fn render_target(width: u32, height: u32) -> Self {
        Self::new_2d(
            width,
            height,
            TextureFormat::Rgba8Unorm,
            TextureUsage::RENDER_ATTACHMENT
                | TextureUsage::TEXTURE_BINDING
                | TextureUsage::COPY_SRC
                | TextureUsage::COPY_DST,
        )
    }

    /// Set the debug label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the slot count.
    #[must_use]
    pub fn with_slots(mut self, count: u32) -> Self {
        self.slot_count = count.max(1);
        self
    }

    /// Bytes for one slot.
    pub fn slot_size(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.format.block_size() as u64
    }
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        Self {
            label: None,
            width: 1,
            height: 1,
            format: TextureFormat::default(),
            usage: TextureUsage::empty(),
            slot_count: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_target_usage() {
        let desc = TextureDescriptor::render_target(4, 4);
        assert!(desc.usage.contains(TextureUsage::RENDER_ATTACHMENT));
        assert!(desc.usage.contains(TextureUsage::TEXTURE_BINDING));
        assert_eq!(desc.slot_size(), 64);
    }

    #[test]
    fn test_slots_never_zero() {
        let desc = TextureDescriptor::default().with_slots(0);
        assert_eq!(desc.slot_count, 1);
    }
}
