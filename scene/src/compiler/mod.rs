//! Scene description to [`Scene`] compilation.
//!
//! [`SceneCompiler::compile`] parses a description, sets up the default
//! render target and the three stock cameras, then walks the objects in
//! declaration order:
//!
//! - image objects become card nodes, optionally feeding an effect chain
//! - particle objects become dynamic meshes driven by a particle subsystem
//! - sound objects go to the [`SoundCollaborator`]
//!
//! Structural problems abort the compile; content problems are logged and
//! the offending element is skipped.

mod alignment;
mod image;
mod material;
mod particle;

pub use alignment::apply_alignment;

use lumenwall_core::material::ShaderValues;
use lumenwall_core::math::{Mat3, perspective_fov_for};
use lumenwall_core::particle::{DEFAULT_PARTICLE_CAP, SceneRng};
use lumenwall_core::scene::{
    Camera, DEFAULT_TARGET, Node, NodeId, NodeTransform, RenderTargetDesc, Scene,
};
use serde::Deserialize;

use crate::assets::AssetStore;
use crate::description::{General, ObjectRecord, SceneDescription};
use crate::error::CompileError;
use crate::shader::{AnnotationPreprocessor, ShaderPreprocessor};
use crate::sound::SoundCollaborator;

/// Camera effect passes draw their 2x2 cards through.
pub const EFFECT_CAMERA: &str = "effect";
/// Orthographic scene camera; the active camera of every compiled scene.
pub const GLOBAL_CAMERA: &str = "global";
/// Perspective camera used by particle systems with the perspective flag.
pub const PERSPECTIVE_CAMERA: &str = "global_perspective";

/// Distance of the perspective camera from the scene plane.
const PERSPECTIVE_DISTANCE: f32 = 1000.0;
/// Depth range of the orthographic scene camera.
const GLOBAL_DEPTH: f32 = 5000.0;
/// Reference resolution for `g_TexelSize`.
const TEXEL_REFERENCE: [f32; 2] = [1920.0, 1080.0];

/// Which effect-less objects are dropped without producing a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ElisionPolicy {
    /// Drop full-screen images without enabled effects.
    pub skip_plain_fullscreen: bool,
    /// Drop compose pseudo-layers without enabled effects.
    pub skip_plain_compose: bool,
}

impl Default for ElisionPolicy {
    fn default() -> Self {
        Self {
            skip_plain_fullscreen: true,
            skip_plain_compose: true,
        }
    }
}

/// Scene compiler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Upper bound on any particle subsystem's capacity.
    pub particle_cap: usize,
    /// Elision of effect-less layers.
    pub elision: ElisionPolicy,
    /// Seed of the scene's particle random generator.
    pub seed: u64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            particle_cap: DEFAULT_PARTICLE_CAP,
            elision: ElisionPolicy::default(),
            seed: 0,
        }
    }
}

/// Compiles scene descriptions.
///
/// # Example
///
/// ```
/// use lumenwall_scene::{MemoryAssetStore, NullSound, SceneCompiler};
///
/// let compiler = SceneCompiler::default();
/// let scene = compiler
///     .compile(r#"{"objects": []}"#, &MemoryAssetStore::new(), &mut NullSound::new())
///     .unwrap();
/// assert_eq!(scene.active_camera, "global");
/// assert!(scene.render_targets.contains_key("_rt_default"));
/// ```
pub struct SceneCompiler {
    options: CompileOptions,
    preprocessor: Box<dyn ShaderPreprocessor>,
}

impl Default for SceneCompiler {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}

impl SceneCompiler {
    /// Creates a compiler using the stock [`AnnotationPreprocessor`].
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            preprocessor: Box::new(AnnotationPreprocessor::new()),
        }
    }

    /// Replace the shader preprocessor.
    #[must_use]
    pub fn with_preprocessor(mut self, preprocessor: Box<dyn ShaderPreprocessor>) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// The active options.
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compiles `description` into a scene.
    ///
    /// Fails on malformed JSON, a missing `objects` array or a missing
    /// required asset. No partial scene is returned.
    pub fn compile(
        &self,
        description: &str,
        assets: &dyn AssetStore,
        sound: &mut dyn SoundCollaborator,
    ) -> Result<Scene, CompileError> {
        let description = SceneDescription::parse(description)?;
        let ortho = ortho_size(&description);

        let mut builder = Builder::new(
            &description.general,
            ortho,
            assets,
            self.preprocessor.as_ref(),
            &self.options,
        );
        for object in &description.objects {
            match object {
                ObjectRecord::Image(image) => builder.add_image(image)?,
                ObjectRecord::Particle(particle) => builder.add_particle(particle)?,
                ObjectRecord::Sound(record) => sound.load(record, assets),
            }
        }

        let scene = builder.scene;
        log::info!(
            "Compiled scene {}x{}: {} nodes, {} meshes, {} render targets, {} particle systems",
            scene.ortho[0],
            scene.ortho[1],
            scene.nodes.len(),
            scene.meshes.len(),
            scene.render_targets.len(),
            scene.particle_systems.len()
        );
        Ok(scene)
    }
}

/// Orthographic size: declared, or the largest visible image when `auto`.
fn ortho_size(description: &SceneDescription) -> [u32; 2] {
    let projection = &description.general.orthogonalprojection;
    if !projection.auto_size {
        return [projection.width as u32, projection.height as u32];
    }
    description
        .objects
        .iter()
        .filter_map(|object| match object {
            ObjectRecord::Image(image) if image.visible => Some(image.size.0),
            _ => None,
        })
        .fold([0u32, 0u32], |best, [w, h]| {
            let (w, h) = (w as u32, h as u32);
            if w as u64 * h as u64 > best[0] as u64 * best[1] as u64 {
                [w, h]
            } else {
                best
            }
        })
}

/// Compile state shared by the per-object builders.
struct Builder<'a> {
    scene: Scene,
    assets: &'a dyn AssetStore,
    preprocessor: &'a dyn ShaderPreprocessor,
    options: &'a CompileOptions,
    rng: SceneRng,
    effect_node: NodeId,
}

impl<'a> Builder<'a> {
    fn new(
        general: &General,
        ortho: [u32; 2],
        assets: &'a dyn AssetStore,
        preprocessor: &'a dyn ShaderPreprocessor,
        options: &'a CompileOptions,
    ) -> Self {
        let mut scene = Scene::new(ortho);
        scene.clear_color = general.clearcolor.0;
        scene.add_render_target(DEFAULT_TARGET, RenderTargetDesc::screen(1.0));
        scene.globals = global_constants(general);

        let [w, h] = [ortho[0] as f32, ortho[1] as f32];
        let root = scene.nodes.root();
        let center = [w / 2.0, h / 2.0, 0.0];

        let effect_node = scene.nodes.add_child(root, Node::new());
        scene.cameras.insert(
            EFFECT_CAMERA.into(),
            Camera::orthographic(2.0, 2.0, -1.0, 1.0).with_node(effect_node),
        );

        let global_node = scene.nodes.add_child(
            root,
            Node::new().with_transform(NodeTransform::IDENTITY.with_translation(center)),
        );
        let zoom = if general.zoom > 0.0 { general.zoom } else { 1.0 };
        scene.cameras.insert(
            GLOBAL_CAMERA.into(),
            Camera::orthographic(w / zoom, h / zoom, -GLOBAL_DEPTH, GLOBAL_DEPTH)
                .with_node(global_node),
        );
        scene.active_camera = GLOBAL_CAMERA.into();

        let perspective_node = scene.nodes.add_child(
            root,
            Node::new().with_transform(NodeTransform::IDENTITY.with_translation([
                center[0],
                center[1],
                PERSPECTIVE_DISTANCE,
            ])),
        );
        let aspect = if h > 0.0 { w / h } else { 1.0 };
        scene.cameras.insert(
            PERSPECTIVE_CAMERA.into(),
            Camera::perspective(
                perspective_fov_for(PERSPECTIVE_DISTANCE, h),
                aspect,
                general.nearz,
                general.farz,
            )
            .with_node(perspective_node),
        );

        Self {
            scene,
            assets,
            preprocessor,
            options,
            rng: SceneRng::seeded(options.seed),
            effect_node,
        }
    }
}

fn global_constants(general: &General) -> ShaderValues {
    let [tx, ty] = [1.0 / TEXEL_REFERENCE[0], 1.0 / TEXEL_REFERENCE[1]];
    let mut values = ShaderValues::new();
    values.insert("g_ViewUp".into(), [0.0f32, 1.0, 0.0].into());
    values.insert("g_ViewRight".into(), [1.0f32, 0.0, 0.0].into());
    values.insert("g_ViewForward".into(), [0.0f32, 0.0, -1.0].into());
    values.insert("g_EyePosition".into(), [0.0f32; 3].into());
    values.insert("g_TexelSize".into(), [tx, ty].into());
    values.insert("g_TexelSizeHalf".into(), [tx / 2.0, ty / 2.0].into());
    values.insert("g_LightAmbientColor".into(), general.ambientcolor.0.into());
    values.insert("g_NormalModelMatrix".into(), Mat3::identity().into());
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssetStore;
    use crate::sound::NullSound;
    use lumenwall_core::scene::Projection;

    fn compile(description: &str) -> Scene {
        SceneCompiler::default()
            .compile(description, &MemoryAssetStore::new(), &mut NullSound::new())
            .unwrap()
    }

    #[test]
    fn test_stock_cameras() {
        let scene = compile(
            r#"{"general": {"orthogonalprojection": {"width": 1920, "height": 1080}, "zoom": 2},
                "objects": []}"#,
        );
        assert_eq!(scene.ortho, [1920, 1080]);
        assert_eq!(scene.active_camera, GLOBAL_CAMERA);

        let global = &scene.cameras[GLOBAL_CAMERA];
        assert_eq!(
            global.projection,
            Projection::Orthographic {
                width: 960.0,
                height: 540.0,
                near: -5000.0,
                far: 5000.0
            }
        );
        let node = scene.nodes.get(global.node.unwrap()).unwrap();
        assert_eq!(node.transform.translation, [960.0, 540.0, 0.0]);

        let Projection::Perspective { fov, aspect, .. } =
            scene.cameras[PERSPECTIVE_CAMERA].projection
        else {
            panic!("perspective camera is not perspective");
        };
        assert!((fov - perspective_fov_for(1000.0, 1080.0)).abs() < 1e-5);
        assert!((aspect - 1920.0 / 1080.0).abs() < 1e-5);
    }

    #[test]
    fn test_default_target_is_screen_bound() {
        let scene = compile(r#"{"objects": []}"#);
        let target = scene.render_targets[DEFAULT_TARGET];
        assert!(target.bind_screen);
        assert!(!target.allow_reuse);
    }

    #[test]
    fn test_global_constants() {
        let scene = compile(r#"{"general": {"ambientcolor": "0.5 0.5 0.5"}, "objects": []}"#);
        assert_eq!(scene.globals["g_LightAmbientColor"].as_slice(), &[0.5, 0.5, 0.5]);
        assert_eq!(scene.globals["g_ViewForward"].as_slice(), &[0.0, 0.0, -1.0]);
        assert_eq!(scene.globals["g_NormalModelMatrix"].len(), 9);
    }

    #[test]
    fn test_auto_ortho_takes_largest_image() {
        let description = SceneDescription::parse(
            r#"{"general": {"orthogonalprojection": {"auto": true}},
                "objects": [
                    {"image": "a", "size": "100 100"},
                    {"image": "b", "size": "300 200"},
                    {"image": "c", "size": "2000 2000", "visible": false}
                ]}"#,
        )
        .unwrap();
        assert_eq!(ortho_size(&description), [300, 200]);
    }

    #[test]
    fn test_options_from_partial_json() {
        let options: CompileOptions =
            serde_json::from_str(r#"{"particle_cap": 10, "elision": {"skip_plain_compose": false}}"#)
                .unwrap();
        assert_eq!(options.particle_cap, 10);
        assert!(options.elision.skip_plain_fullscreen);
        assert!(!options.elision.skip_plain_compose);
        assert_eq!(options.seed, 0);
    }
}
