//! Common utilities for scene compiler integration tests.
//!
//! Provides an in-memory asset set with annotated shader templates, a
//! recording sound collaborator and small JSON builders for descriptions.

#![allow(dead_code)]

use lumenwall_core::scene::{ImageEffectLayer, Scene};
use lumenwall_core::texture::{SpriteFrame, SpriteSheet, TextureHeader};
use lumenwall_scene::description::SoundObject;
use lumenwall_scene::{
    AssetStore, CompileError, CompileOptions, MemoryAssetStore, SceneCompiler, SoundCollaborator,
};
use serde_json::{Value, json};

/// Scene size every description here declares.
pub const ORTHO: (u32, u32) = (1000, 600);

const GENERIC_IMAGE_FRAG: &str = r#"#version 150
#include "common.h"
// [COMBO] {"combo":"BLENDMODE","default":0}
uniform sampler2D g_Texture0; // {"material":"framebuffer"}
uniform float g_Brightness; // {"material":"brightness","default":1}
uniform vec3 g_Color; // {"material":"color","default":"1 1 1"}
void main() {}
"#;

const EFFECT_FRAG: &str = r#"#version 150
#include "common.h"
// [COMBO] {"combo":"MODE","default":0}
uniform sampler2D g_Texture0; // {"material":"framebuffer"}
uniform sampler2D g_Texture1; // {"material":"noise","default":"textures/noise"}
uniform float g_Strength; // {"material":"ui_strength","default":0.5}
void main() {}
"#;

const PARTICLE_FRAG: &str = r#"#version 150
uniform sampler2D g_Texture0; // {"material":"albedo","default":"particles/dot"}
void main() {}
"#;

const VERT: &str = "#version 150\n#include \"common.h\"\nvoid main() {}\n";

/// Installs a test logger once.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Assets with templates for `genericimage2`, `genericparticle`, `effect`
/// and `passthrough`, the passthrough helper material and a few textures.
pub fn assets() -> MemoryAssetStore {
    init_logging();
    let assets = MemoryAssetStore::new();
    assets.insert_text("shaders/common.h", "float common_helper();");
    for (name, fragment) in [
        ("genericimage2", GENERIC_IMAGE_FRAG),
        ("genericparticle", PARTICLE_FRAG),
        ("effect", EFFECT_FRAG),
        ("passthrough", GENERIC_IMAGE_FRAG),
    ] {
        assets.insert_text(&format!("shaders/{name}.vert"), VERT);
        assets.insert_text(&format!("shaders/{name}.frag"), fragment);
    }
    assets.insert_text(
        "materials/util/effectpassthrough.json",
        r#"{"shader": "passthrough", "blending": "normal"}"#,
    );

    assets.insert_texture(
        "images/padded",
        TextureHeader {
            map_width: 1000,
            map_height: 800,
            ..TextureHeader::sized(1024, 1024)
        },
    );
    assets.insert_texture("textures/noise", TextureHeader::sized(256, 256));
    assets.insert_texture("particles/dot", TextureHeader::sized(32, 32));
    let frame = |x| SpriteFrame {
        x,
        y: 0.0,
        width: 0.25,
        height: 1.0,
        duration: 0.1,
    };
    assets.insert_texture(
        "particles/sparks",
        TextureHeader {
            sprite: Some(SpriteSheet {
                frames: vec![frame(0.0), frame(0.25), frame(0.5), frame(0.75)],
            }),
            ..TextureHeader::sized(256, 64)
        },
    );
    assets
}

/// Collects every sound record it receives.
#[derive(Default)]
pub struct RecordingSound {
    pub records: Vec<SoundObject>,
}

impl SoundCollaborator for RecordingSound {
    fn load(&mut self, record: &SoundObject, _assets: &dyn AssetStore) {
        self.records.push(record.clone());
    }
}

/// Wraps objects into a description with the fixed scene size.
pub fn description(objects: Vec<Value>) -> String {
    json!({
        "general": {
            "orthogonalprojection": {"width": ORTHO.0, "height": ORTHO.1},
            "clearcolor": "0.1 0.2 0.3"
        },
        "objects": objects
    })
    .to_string()
}

/// A plain image object.
pub fn image(id: i32, size: [f32; 2]) -> Value {
    json!({
        "id": id,
        "image": format!("models/image{id}.json"),
        "origin": "500 300 0",
        "size": size,
        "material": {"shader": "genericimage2", "textures": ["textures/noise"]}
    })
}

/// An image object with `effects` single-material effects.
pub fn image_with_effects(id: i32, size: [f32; 2], effects: usize) -> Value {
    let mut object = image(id, size);
    object["effects"] = Value::Array((0..effects).map(|i| effect(&format!("e{i}"))).collect());
    object
}

/// A one-material effect on the `effect` shader.
pub fn effect(name: &str) -> Value {
    json!({
        "name": name,
        "materials": [{"shader": "effect"}]
    })
}

/// A particle object.
pub fn particle(id: i32, maxcount: u32) -> Value {
    json!({
        "id": id,
        "particle": {
            "maxcount": maxcount,
            "material": {"shader": "genericparticle", "blending": "additive"},
            "emitters": [{"name": "boxrandom", "rate": 100000, "distancemax": 10}],
            "initializers": [{"name": "lifetimerandom", "min": 5, "max": 6}]
        },
        "origin": "100 100 0"
    })
}

/// Compiles with default options and the recording sound.
pub fn compile(objects: Vec<Value>) -> Result<Scene, CompileError> {
    compile_with(objects, CompileOptions::default())
}

/// Compiles with the given options.
pub fn compile_with(objects: Vec<Value>, options: CompileOptions) -> Result<Scene, CompileError> {
    SceneCompiler::new(options).compile(
        &description(objects),
        &assets(),
        &mut RecordingSound::default(),
    )
}

/// The effect layer of image object `id`.
pub fn layer(scene: &Scene, id: i32) -> &ImageEffectLayer {
    let node = scene
        .nodes
        .find_by_object_id(id)
        .and_then(|node| scene.nodes.get(node))
        .expect("image node");
    let camera = node.camera.as_deref().expect("layer camera");
    scene.cameras[camera]
        .effect_layer
        .as_ref()
        .expect("effect layer")
}
