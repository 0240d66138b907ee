//! Viewport, shader and framebuffer descriptors.

use lumenwall_core::mesh::VertexAttribute;

use crate::backend::GpuTexture;

/// Pixel region a draw covers, origin at the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: u32,
    /// Bottom edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// A viewport covering a whole `width` x `height` target.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// Descriptor for compiling a shader program.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShaderDescriptor {
    /// Debug label.
    pub label: Option<String>,
    /// Vertex stage source.
    pub vertex: String,
    /// Fragment stage source.
    pub fragment: String,
    /// Vertex attributes in binding order.
    pub attributes: Vec<VertexAttribute>,
    /// Sampler uniform names in texture-slot order.
    pub samplers: Vec<String>,
}

impl ShaderDescriptor {
    /// Creates a descriptor from both stage sources.
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
            ..Self::default()
        }
    }

    /// Set the debug label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Descriptor for a framebuffer with one color attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferDescriptor {
    /// Debug label.
    pub label: Option<String>,
    /// Color attachment.
    pub color: GpuTexture,
}

impl FramebufferDescriptor {
    /// Creates an unlabeled descriptor.
    pub fn new(color: GpuTexture) -> Self {
        Self { label: None, color }
    }

    /// Set the debug label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Completeness of a framebuffer as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferStatus {
    /// Ready for rendering.
    Complete,
    /// The attachment format combination is not supported.
    Unsupported,
    /// An attachment is missing or has zero size.
    IncompleteAttachment,
}

impl FramebufferStatus {
    /// Returns true if the framebuffer can be rendered to.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}
