//! Descriptors for resources crossing the backend boundary.
//!
//! This module contains format enums, usage flags, and descriptor structs
//! used by [`GraphicsDevice`](crate::device::GraphicsDevice) and the backends.

mod common;
mod texture;

pub use common::{FramebufferDescriptor, FramebufferStatus, ShaderDescriptor, Viewport};
pub use texture::{TextureDescriptor, TextureFormat, TextureUsage};
