//! Engine configuration loaded from TOML.
//!
//! Every section and field is optional; missing values take their defaults.
//!
//! ```toml
//! [pacer]
//! fps = 30
//!
//! [surface]
//! width = 2560
//! height = 1440
//!
//! [pool]
//! textures = 512
//! shaders = 256
//! framebuffers = 128
//!
//! [scene]
//! particle_cap = 4000
//! skip_plain_fullscreen = true
//! skip_plain_compose = true
//! seed = 0
//! ```

use std::path::{Path, PathBuf};

use lumenwall_core::particle::DEFAULT_PARTICLE_CAP;
use lumenwall_graphics::PoolLimits;
use lumenwall_scene::{CompileOptions, ElisionPolicy};
use serde::Deserialize;

use crate::pacer::DEFAULT_FPS;

/// Errors raised while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid configuration TOML.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pacer: PacerConfig,
    pub surface: SurfaceConfig,
    pub pool: PoolConfig,
    pub scene: SceneConfig,
}

/// Frame pacer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PacerConfig {
    /// Target frames per second.
    pub fps: u32,
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self { fps: DEFAULT_FPS }
    }
}

/// Size of the presentation surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Resource pool capacities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub textures: usize,
    pub shaders: usize,
    pub framebuffers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let limits = PoolLimits::default();
        Self {
            textures: limits.textures,
            shaders: limits.shaders,
            framebuffers: limits.framebuffers,
        }
    }
}

/// Scene compiler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Upper bound on live particles per system.
    pub particle_cap: usize,
    /// Drop full-screen images without enabled effects.
    pub skip_plain_fullscreen: bool,
    /// Drop compose pseudo-layers without enabled effects.
    pub skip_plain_compose: bool,
    /// Seed for particle randomness.
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            particle_cap: DEFAULT_PARTICLE_CAP,
            skip_plain_fullscreen: true,
            skip_plain_compose: true,
            seed: 0,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads `path`, falling back to defaults if it cannot be read or parsed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}; using default configuration");
                Self::default()
            }
        }
    }

    /// Options for the scene compiler.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            particle_cap: self.scene.particle_cap,
            elision: ElisionPolicy {
                skip_plain_fullscreen: self.scene.skip_plain_fullscreen,
                skip_plain_compose: self.scene.skip_plain_compose,
            },
            seed: self.scene.seed,
        }
    }

    /// Capacities for the GPU resource pool.
    pub fn pool_limits(&self) -> PoolLimits {
        PoolLimits {
            textures: self.pool.textures,
            shaders: self.pool.shaders,
            framebuffers: self.pool.framebuffers,
        }
    }

    /// Surface size as `(width, height)`.
    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface.width, self.surface.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.pacer.fps, 15);
        assert_eq!(config.surface_size(), (1920, 1080));
        assert_eq!(config.pool_limits(), PoolLimits::default());
        assert_eq!(config.compile_options().particle_cap, 4000);
    }

    #[test]
    fn test_partial_sections() {
        let config = EngineConfig::from_toml(
            r#"
            [pacer]
            fps = 30

            [pool]
            textures = 8

            [scene]
            skip_plain_compose = false
            seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(config.pacer.fps, 30);
        assert_eq!(config.pool_limits().textures, 8);
        assert_eq!(config.pool_limits().shaders, PoolLimits::default().shaders);

        let options = config.compile_options();
        assert!(options.elision.skip_plain_fullscreen);
        assert!(!options.elision.skip_plain_compose);
        assert_eq!(options.seed, 42);
    }

    #[test]
    fn test_bad_type_is_parse_error() {
        let err = EngineConfig::from_toml("[pacer]\nfps = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let path = std::env::temp_dir().join("lumenwall-no-such-config.toml");
        assert!(matches!(
            EngineConfig::load(&path),
            Err(ConfigError::Io { .. })
        ));
        assert_eq!(EngineConfig::load_or_default(&path), EngineConfig::default());
    }
}
