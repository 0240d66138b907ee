//! # Lumenwall Scene
//!
//! Scene descriptions and the compiler that turns them into a
//! [`lumenwall_core::scene::Scene`].
//!
//! ## Overview
//!
//! - [`description`] - Serde records for the JSON description format
//! - [`assets`] - The [`AssetStore`] trait plus memory and directory stores
//! - [`shader`] - Shader template preprocessing
//! - [`SceneCompiler`] - Builds nodes, materials, effect chains and particles
//! - [`SoundCollaborator`] - Receives sound objects
//!
//! ## Example
//!
//! ```
//! use lumenwall_scene::{CompileOptions, MemoryAssetStore, NullSound, SceneCompiler};
//!
//! let compiler = SceneCompiler::new(CompileOptions::default());
//! let scene = compiler
//!     .compile(
//!         r#"{"general": {"orthogonalprojection": {"width": 800, "height": 600}}, "objects": []}"#,
//!         &MemoryAssetStore::new(),
//!         &mut NullSound::new(),
//!     )
//!     .unwrap();
//! assert_eq!(scene.ortho, [800, 600]);
//! ```

pub mod assets;
pub mod compiler;
pub mod description;
pub mod error;
pub mod shader;
pub mod sound;

pub use assets::{AssetError, AssetStore, DirAssetStore, MemoryAssetStore};
pub use compiler::{CompileOptions, ElisionPolicy, SceneCompiler};
pub use description::SceneDescription;
pub use error::CompileError;
pub use shader::{AnnotationPreprocessor, ShaderPreprocessor};
pub use sound::{NullSound, SoundCollaborator};

/// Scene library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Logs the scene library version.
pub fn init() {
    log::info!("Lumenwall Scene v{} initialized", VERSION);
}
