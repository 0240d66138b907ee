//! # Lumenwall Graphics
//!
//! Frame graph execution for compiled wallpaper scenes.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`GpuBackend`] - Trait for graphics backend implementations
//! - [`GraphicsDevice`] - Backend plus generation-checked resource pool
//! - [`FrameGraph`] - Passes over named render targets, with ordering and aliasing
//! - [`FrameExecutor`] - Runs a scene's frame graph once per frame
//! - [`DummyBackend`] - Recording backend for headless tests
//!
//! ## Example
//!
//! ```
//! use lumenwall_core::scene::{DEFAULT_TARGET, RenderTargetDesc, Scene};
//! use lumenwall_graphics::{DummyBackend, FrameExecutor, GraphicsDevice, PoolLimits};
//!
//! let mut scene = Scene::new([1920, 1080]);
//! scene.add_render_target(DEFAULT_TARGET, RenderTargetDesc::screen(1.0));
//!
//! let mut device = GraphicsDevice::new(Box::new(DummyBackend::new()), PoolLimits::default());
//! let mut executor = FrameExecutor::new(&scene, (1920, 1080)).unwrap();
//! executor.prepare(&scene, &mut device).unwrap();
//!
//! let stats = executor.execute(&scene, &mut device);
//! assert!(stats.presented);
//! ```

pub mod backend;
pub mod device;
pub mod error;
pub mod executor;
pub mod graph;
pub mod pool;
pub mod types;

// Re-export main types for convenience
pub use backend::{BackendError, DrawCall, DummyBackend, GpuBackend};
pub use device::GraphicsDevice;
pub use error::{GraphError, GraphicsError};
pub use executor::{FrameExecutor, FrameStats};
pub use graph::{CompiledFrameGraph, FrameGraph, PassId, PassKind, TargetId};
pub use pool::{FramebufferHandle, PoolLimits, ResourcePool, ShaderHandle, TextureHandle};
pub use types::{
    FramebufferDescriptor, FramebufferStatus, ShaderDescriptor, TextureDescriptor, TextureFormat,
    TextureUsage, Viewport,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
pub fn init() {
    log::info!("Lumenwall Graphics v{} initialized", VERSION);
}
