//! Scene runtime: compile once, then execute frames.

use std::path::Path;

use lumenwall_core::scene::Scene;
use lumenwall_graphics::{
    FrameExecutor, FrameStats, GpuBackend, GraphError, GraphicsDevice, GraphicsError,
};
use lumenwall_scene::{AssetStore, CompileError, DirAssetStore, SceneCompiler, SoundCollaborator};

use crate::config::{ConfigError, EngineConfig};
use crate::pacer::PacerHandle;

/// Description file inside a wallpaper directory.
pub const SCENE_FILE: &str = "scene.json";

/// Errors raised while loading or resizing a wallpaper.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The engine configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The scene description failed to compile.
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// The frame graph could not be built.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// GPU resources could not be created.
    #[error(transparent)]
    Graphics(#[from] GraphicsError),
}

/// A compiled scene bound to a device and its frame executor.
///
/// Lives on the GPU-owning thread. Frames are driven by calling
/// [`render_frame`](Self::render_frame) directly or
/// [`render_pending`](Self::render_pending) with a pacer handle.
pub struct WallpaperRuntime {
    scene: Scene,
    device: GraphicsDevice,
    executor: FrameExecutor,
    frames: u64,
}

impl WallpaperRuntime {
    /// Compiles `description` and realizes every GPU resource it needs.
    ///
    /// Nothing is returned on failure; resources created before the
    /// failure are released.
    pub fn load(
        config: &EngineConfig,
        description: &str,
        assets: &dyn AssetStore,
        sound: &mut dyn SoundCollaborator,
        backend: Box<dyn GpuBackend>,
    ) -> Result<Self, RuntimeError> {
        let compiler = SceneCompiler::new(config.compile_options());
        let scene = compiler.compile(description, assets, sound)?;
        let mut device = GraphicsDevice::new(backend, config.pool_limits());
        let mut executor = FrameExecutor::new(&scene, config.surface_size())?;
        if let Err(e) = executor.prepare(&scene, &mut device) {
            executor.release(&mut device);
            return Err(e.into());
        }
        log::info!(
            "Wallpaper loaded on {}: {} meshes, {} particle systems",
            device.backend_name(),
            scene.meshes.len(),
            scene.particle_systems.len()
        );
        Ok(Self {
            scene,
            device,
            executor,
            frames: 0,
        })
    }

    /// Loads the wallpaper in `scene_dir` with the configuration at
    /// `config_path`.
    pub fn open(
        config_path: &Path,
        scene_dir: &Path,
        sound: &mut dyn SoundCollaborator,
        backend: Box<dyn GpuBackend>,
    ) -> Result<Self, RuntimeError> {
        let config = EngineConfig::load(config_path)?;
        let assets = DirAssetStore::new(scene_dir);
        let description = assets
            .read_text(SCENE_FILE)
            .map_err(|source| CompileError::MissingAsset {
                path: SCENE_FILE.into(),
                source,
            })?;
        Self::load(&config, &description, &assets, sound, backend)
    }

    /// Advances scene time and particles by `dt` seconds and executes one frame.
    pub fn render_frame(&mut self, dt: f32) -> FrameStats {
        self.scene.advance(dt);
        self.frames += 1;
        self.executor.execute(&self.scene, &mut self.device)
    }

    /// Renders one frame if the pacer has a pending tick.
    pub fn render_pending(&mut self, pacer: &PacerHandle, dt: f32) -> Option<FrameStats> {
        pacer.consume_frame().then(|| self.render_frame(dt))
    }

    /// Adapts screen-relative targets to a new surface size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RuntimeError> {
        self.executor.resize(&mut self.device, (width, height))?;
        Ok(())
    }

    /// The compiled scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The device holding every GPU resource.
    pub fn device(&self) -> &GraphicsDevice {
        &self.device
    }

    /// Current surface size as `(width, height)`.
    pub fn surface(&self) -> (u32, u32) {
        self.executor.surface()
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Drop for WallpaperRuntime {
    fn drop(&mut self) {
        self.executor.release(&mut self.device);
    }
}
