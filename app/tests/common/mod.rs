//! Common utilities for app integration tests.

#![allow(dead_code)]

use lumenwall_core::texture::TextureHeader;
use lumenwall_scene::MemoryAssetStore;
use serde_json::{Value, json};

const FRAG: &str = r#"#version 150
uniform sampler2D g_Texture0; // {"material":"framebuffer"}
void main() {}
"#;

const VERT: &str = "#version 150\nvoid main() {}\n";

/// Installs a test logger once.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Templates for `genericimage2` and `effect` plus one texture.
pub fn assets() -> MemoryAssetStore {
    init_logging();
    let assets = MemoryAssetStore::new();
    for name in ["genericimage2", "effect"] {
        assets.insert_text(&format!("shaders/{name}.vert"), VERT);
        assets.insert_text(&format!("shaders/{name}.frag"), FRAG);
    }
    assets.insert_texture("textures/noise", TextureHeader::sized(256, 256));
    assets
}

/// A 640x480 description with one image carrying `effects` effects.
pub fn description(effects: usize) -> String {
    let effects: Vec<Value> = (0..effects)
        .map(|i| json!({"name": format!("e{i}"), "materials": [{"shader": "effect"}]}))
        .collect();
    json!({
        "general": {"orthogonalprojection": {"width": 640, "height": 480}},
        "objects": [{
            "id": 1,
            "image": "models/image.json",
            "origin": "320 240 0",
            "size": "200 100",
            "material": {"shader": "genericimage2", "textures": ["textures/noise"]},
            "effects": effects
        }]
    })
    .to_string()
}
