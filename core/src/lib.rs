//! # Lumenwall Core
//!
//! Scene data model shared by the scene compiler and the frame executor:
//! math helpers, generation-checked handle pools, the compiled [`Scene`]
//! and the bounded particle simulation that feeds its dynamic meshes.
//!
//! [`Scene`]: scene::Scene

pub mod material;
pub mod math;
pub mod mesh;
pub mod particle;
pub mod pool;
pub mod scene;
pub mod texture;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Logs the core library version.
pub fn init() {
    log::info!("Lumenwall Core v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_scene_is_send() {
        static_assertions::assert_impl_all!(scene::Scene: Send, Sync);
    }
}
