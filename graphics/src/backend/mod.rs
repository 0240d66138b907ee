//! GPU backend abstraction layer.
//!
//! Everything that touches the graphics API goes through [`GpuBackend`].
//! The engine never holds API objects directly: backends hand out opaque
//! [`GpuTexture`], [`GpuShader`] and [`GpuFramebuffer`] ids, and the
//! [`ResourcePool`](crate::pool::ResourcePool) wraps those in
//! generation-checked handles.
//!
//! # Available Backends
//!
//! - [`DummyBackend`]: records every call for headless testing
//!
//! Windowed backends live with the embedding application and plug in by
//! implementing the trait.
//!
//! # Threading
//!
//! Backends are driven from a single GPU-owning thread and need not be
//! `Sync`.

pub mod dummy;
mod error;

use lumenwall_core::material::{BlendMode, ShaderValues};
use lumenwall_core::mesh::VertexAttribute;

use crate::types::{
    FramebufferDescriptor, FramebufferStatus, ShaderDescriptor, TextureDescriptor, Viewport,
};

pub use dummy::{DummyBackend, DummyCommand, DummyRecorder};
pub use error::BackendError;

/// Backend id of one texture image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpuTexture(pub u64);

/// Backend id of a linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpuShader(pub u64);

/// Backend id of a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpuFramebuffer(pub u64);

/// Everything a backend needs to issue one draw.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    /// Pass name for debugging.
    pub label: &'a str,
    /// Program to draw with.
    pub shader: GpuShader,
    /// Texture per sampler slot; `None` leaves the slot unbound.
    pub textures: &'a [Option<GpuTexture>],
    /// Target framebuffer; `None` draws to the screen.
    pub target: Option<GpuFramebuffer>,
    /// Covered pixel region.
    pub viewport: Viewport,
    /// Fixed-function blend state.
    pub blend: BlendMode,
    /// Interleaved vertex layout.
    pub attributes: &'a [VertexAttribute],
    /// Interleaved vertex bytes.
    pub vertices: &'a [u8],
    /// `u32` index bytes.
    pub indices: &'a [u8],
    /// Number of indices to draw.
    pub index_count: usize,
    /// Vertex data changes every frame.
    pub dynamic: bool,
    /// Uniform values for this draw.
    pub uniforms: &'a ShaderValues,
}

/// Trait implemented by GPU backends.
pub trait GpuBackend {
    /// Human-readable backend name.
    fn name(&self) -> &'static str;

    /// Allocates one texture image.
    fn create_texture(&mut self, descriptor: &TextureDescriptor)
    -> Result<GpuTexture, BackendError>;

    /// Releases a texture image.
    fn destroy_texture(&mut self, texture: GpuTexture);

    /// Compiles and links a shader program.
    fn create_shader(&mut self, descriptor: &ShaderDescriptor) -> Result<GpuShader, BackendError>;

    /// Releases a shader program.
    fn destroy_shader(&mut self, shader: GpuShader);

    /// Creates a framebuffer around a color texture.
    fn create_framebuffer(
        &mut self,
        descriptor: &FramebufferDescriptor,
    ) -> Result<GpuFramebuffer, BackendError>;

    /// Re-points a framebuffer at another color texture.
    fn update_framebuffer(&mut self, framebuffer: GpuFramebuffer, color: GpuTexture);

    /// Completeness of a framebuffer.
    fn framebuffer_status(&self, framebuffer: GpuFramebuffer) -> FramebufferStatus;

    /// Releases a framebuffer.
    fn destroy_framebuffer(&mut self, framebuffer: GpuFramebuffer);

    /// Copies the contents of `source` into `destination`.
    fn copy_texture(&mut self, destination: GpuTexture, source: GpuTexture);

    /// Fills a texture with a color.
    fn clear_texture(&mut self, texture: GpuTexture, color: [f32; 4]);

    /// Issues one draw.
    fn draw(&mut self, call: &DrawCall<'_>);

    /// Blits a texture to the screen.
    fn present(&mut self, texture: GpuTexture);
}
