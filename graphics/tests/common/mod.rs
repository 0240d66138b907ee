//! Common utilities for frame graph integration tests.
//!
//! Scenes here are assembled by hand in the shape the scene compiler
//! produces: a default target, a `global` camera, and image layers whose
//! effect chains ping-pong between two targets.

#![allow(dead_code)]

use lumenwall_core::material::{BlendMode, Material};
use lumenwall_core::mesh::generators::generate_card;
use lumenwall_core::mesh::MeshId;
use lumenwall_core::scene::{
    Camera, DEFAULT_TARGET, EffectPass, ImageEffect, ImageEffectLayer, Node, NodeTransform,
    RenderTargetDesc, Scene,
};
use lumenwall_graphics::backend::DummyRecorder;
use lumenwall_graphics::{DummyBackend, GraphicsDevice, PoolLimits};

/// Surface size used by every test.
pub const SURFACE: (u32, u32) = (320, 240);

/// Installs a test logger once.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A device over a recording backend.
pub struct TestContext {
    pub device: GraphicsDevice,
    pub recorder: DummyRecorder,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_backend(DummyBackend::new(), PoolLimits::default())
    }

    pub fn with_backend(backend: DummyBackend, limits: PoolLimits) -> Self {
        init_logging();
        let recorder = backend.recorder();
        Self {
            device: GraphicsDevice::new(Box::new(backend), limits),
            recorder,
        }
    }
}

/// Scene with a default target and a `global` active camera.
pub fn empty_scene() -> Scene {
    let mut scene = Scene::new([SURFACE.0, SURFACE.1]);
    scene.add_render_target(DEFAULT_TARGET, RenderTargetDesc::screen(1.0));
    let root = scene.nodes.root();
    let camera_node = scene.nodes.add_child(
        root,
        Node::new().with_transform(NodeTransform::IDENTITY.with_translation([
            SURFACE.0 as f32 / 2.0,
            SURFACE.1 as f32 / 2.0,
            0.0,
        ])),
    );
    scene.cameras.insert(
        "global".into(),
        Camera::orthographic(SURFACE.0 as f32, SURFACE.1 as f32, -5000.0, 5000.0)
            .with_node(camera_node),
    );
    scene
        .cameras
        .insert("effect".into(), Camera::orthographic(2.0, 2.0, -1.0, 1.0));
    scene.active_camera = "global".into();
    scene
}

/// A card mesh with one material.
pub fn card(scene: &mut Scene, material: Material) -> MeshId {
    let mut mesh = generate_card(2.0, 2.0, [1.0, 1.0]);
    mesh.add_material(material);
    scene.add_mesh(mesh)
}

/// Ping-pong target names of layer `id`.
pub fn layer_targets(id: i32) -> [String; 2] {
    [format!("_rt_imageLayer{id}"), format!("_rt_imageLayer{id}1")]
}

/// Adds a plain image drawn straight into the default target.
pub fn add_plain_image(scene: &mut Scene, id: i32, texture: &str) {
    let mesh = card(
        scene,
        Material::new("genericimage2").with_textures(vec![texture.to_string()]),
    );
    let root = scene.nodes.root();
    scene
        .nodes
        .add_child(root, Node::new().with_id(id).with_mesh(mesh));
}

/// Adds an image layer of `size` with an effect chain of `effects` stages.
///
/// Stage `i` reads ping-pong slot `i % 2` and writes slot `(i + 1) % 2`;
/// the last stage writes the default target.
pub fn add_effect_layer(scene: &mut Scene, id: i32, size: (u32, u32), effects: usize) {
    let targets = layer_targets(id);
    for name in &targets {
        scene.add_render_target(
            name.as_str(),
            RenderTargetDesc::absolute(size.0, size.1).with_reuse(true),
        );
    }
    scene.layer_links.insert(id, targets[0].clone());

    let image = card(
        scene,
        Material::new("genericimage2").with_blend(BlendMode::Normal),
    );
    let camera_name = format!("layer{id}");
    let root = scene.nodes.root();
    let node = scene.nodes.add_child(
        root,
        Node::new()
            .with_id(id)
            .with_mesh(image)
            .with_camera(camera_name.as_str()),
    );

    let mut stages = Vec::with_capacity(effects);
    for i in 0..effects {
        let input = targets[i % 2].clone();
        let last = i + 1 == effects;
        let output = if last {
            DEFAULT_TARGET.to_string()
        } else {
            targets[(i + 1) % 2].clone()
        };
        let mesh = card(
            scene,
            Material::new(format!("effect{i}"))
                .with_textures(vec![input.clone()])
                .with_blend(if last {
                    BlendMode::Translucent
                } else {
                    BlendMode::Normal
                }),
        );
        let pass_node = if last {
            Node::new()
        } else {
            Node::new().with_camera("effect")
        };
        stages.push(ImageEffect {
            input,
            output: output.clone(),
            commands: Vec::new(),
            passes: vec![EffectPass {
                node: pass_node,
                mesh,
                output,
            }],
        });
    }

    let mut camera = Camera::orthographic(size.0 as f32, size.1 as f32, -1.0, 1.0);
    camera.effect_layer = Some(ImageEffectLayer {
        node,
        targets,
        effects: stages,
    });
    scene.cameras.insert(camera_name, camera);
}
