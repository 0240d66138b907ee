//! # Lumenwall App
//!
//! Ties the scene compiler and the frame executor into a running wallpaper.
//!
//! ## Overview
//!
//! - [`FramePacer`] - Background thread calling a render callback at a fixed rate
//! - [`EngineConfig`] - TOML configuration for the pacer, surface, pool and compiler
//! - [`WallpaperRuntime`] - Compiled scene plus device and executor
//!
//! ## Example
//!
//! ```
//! use lumenwall_app::{EngineConfig, WallpaperRuntime};
//! use lumenwall_graphics::DummyBackend;
//! use lumenwall_scene::{MemoryAssetStore, NullSound};
//!
//! let config = EngineConfig::default();
//! let mut runtime = WallpaperRuntime::load(
//!     &config,
//!     r#"{"general": {"orthogonalprojection": {"width": 1920, "height": 1080}}, "objects": []}"#,
//!     &MemoryAssetStore::new(),
//!     &mut NullSound::new(),
//!     Box::new(DummyBackend::new()),
//! )
//! .unwrap();
//! assert!(runtime.render_frame(1.0 / 15.0).presented);
//! ```

pub mod config;
pub mod pacer;
pub mod runtime;

pub use config::{ConfigError, EngineConfig};
pub use pacer::{FramePacer, PacerError, PacerHandle};
pub use runtime::{RuntimeError, WallpaperRuntime};

/// App library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Installs the global logger.
///
/// Honours `RUST_LOG`, defaulting to `info`. Calling it again is harmless.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Initializes logging and every Lumenwall subsystem.
pub fn init() {
    init_logging();
    lumenwall_core::init();
    lumenwall_graphics::init();
    lumenwall_scene::init();
    log::info!("Lumenwall App v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_init_twice() {
        init();
        init();
    }
}
