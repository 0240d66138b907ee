//! Material resolution.

use std::collections::{BTreeMap, HashMap};

use lumenwall_core::material::{BlendMode, Material, ShaderSource, ShaderValues};
use lumenwall_core::scene::{DEFAULT_TARGET, ReservedName, link_target_name};
use lumenwall_core::texture::{SceneTexture, TextureHeader};

use super::Builder;
use crate::description::MaterialDesc;
use crate::error::CompileError;
use crate::shader::{SHADER_DIR, ShaderInfo, ShaderStage, TextureSlotInfo};

const PARTICLE_SHADER: &str = "genericparticle";
const IMAGE_SHADER: &str = "genericimage2";
const RESERVED_PREFIX: &str = "_rt_";

impl Builder<'_> {
    /// Resolves a material description into draw state.
    ///
    /// `base` holds constants the caller wants on every material of the
    /// object; `combos` are set before the shader's own combo defaults.
    pub(super) fn load_material(
        &mut self,
        desc: &MaterialDesc,
        base: &ShaderValues,
        combos: BTreeMap<String, i32>,
    ) -> Result<Material, CompileError> {
        let mut headers = HashMap::new();
        let slots: Vec<_> = desc
            .texture_names()
            .iter()
            .map(|name| self.slot_info(name, &mut headers))
            .collect();

        let mut info = ShaderInfo {
            combos,
            ..ShaderInfo::default()
        };
        let vertex = self.read_template(&desc.shader, ShaderStage::Vertex)?;
        let fragment = self.read_template(&desc.shader, ShaderStage::Fragment)?;
        let vertex = self
            .preprocessor
            .preprocess(&vertex, &slots, self.assets, &mut info)?;
        let fragment = self
            .preprocessor
            .preprocess(&fragment, &slots, self.assets, &mut info)?;
        info.combos
            .extend(desc.combos.iter().map(|(k, v)| (k.clone(), *v)));

        let mut names = desc.texture_names();
        for (slot, default) in &info.default_textures {
            if names.len() <= *slot {
                names.resize(*slot + 1, String::new());
            }
            if names[*slot].is_empty() {
                names[*slot] = default.clone();
            }
        }

        let mut material = Material::new(desc.shader.as_str());
        material.constants = info.defaults.clone();
        for (slot, raw) in names.iter().enumerate() {
            let name = resolve_reserved(raw, &desc.shader, &info.combos);
            if name.is_empty() {
                material.textures.push(name);
                continue;
            }
            let resolution = if name.starts_with(RESERVED_PREFIX) {
                self.target_resolution(&name)
            } else {
                let Some(resolution) = self.texture_resolution(
                    &name,
                    &mut headers,
                    &desc.shader,
                    &mut info,
                    &mut material,
                ) else {
                    material.textures.push(String::new());
                    continue;
                };
                Some(resolution)
            };
            if let Some(resolution) = resolution {
                material
                    .constants
                    .insert(format!("g_Texture{slot}Resolution"), resolution.into());
            }
            material.textures.push(name);
        }

        material.shader = ShaderSource {
            name: desc.shader.clone(),
            vertex: self
                .preprocessor
                .finalize(&vertex, &info.combos, ShaderStage::Vertex),
            fragment: self
                .preprocessor
                .finalize(&fragment, &info.combos, ShaderStage::Fragment),
        };
        material.blend = parse_blend(&desc.blending);
        material
            .constants
            .extend(base.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.resolve_constants(desc, &info, &mut material);
        material.combos = info.combos;
        Ok(material)
    }

    fn read_template(&self, shader: &str, stage: ShaderStage) -> Result<String, CompileError> {
        let path = format!("{SHADER_DIR}/{shader}.{}", stage.extension());
        self.assets
            .read_text(&path)
            .map_err(|e| CompileError::missing(path.as_str(), e))
    }

    fn slot_info(&self, name: &str, headers: &mut HashMap<String, TextureHeader>) -> TextureSlotInfo {
        if name.is_empty() {
            return TextureSlotInfo::default();
        }
        if name.starts_with(RESERVED_PREFIX) {
            return TextureSlotInfo::bound();
        }
        match self.header(name, headers) {
            Some(header) => TextureSlotInfo::with_components(header.components),
            None => TextureSlotInfo::default(),
        }
    }

    fn header(
        &self,
        name: &str,
        headers: &mut HashMap<String, TextureHeader>,
    ) -> Option<TextureHeader> {
        if let Some(header) = headers.get(name) {
            return Some(header.clone());
        }
        if let Some(texture) = self.scene.textures.get(name) {
            return Some(texture.header.clone());
        }
        match self.assets.texture_header(name) {
            Ok(header) => {
                headers.insert(name.to_string(), header.clone());
                Some(header)
            }
            Err(e) => {
                log::warn!("Texture {name}: no header ({e}); slot left unbound");
                None
            }
        }
    }

    /// `(w, h, w, h)` of a declared render target, resolved against the
    /// scene size. Link names are resolved later and carry no resolution.
    fn target_resolution(&self, name: &str) -> Option<[f32; 4]> {
        let desc = self.scene.render_targets.get(name)?;
        let (w, h) = desc
            .size
            .resolve((self.scene.ortho[0], self.scene.ortho[1]));
        Some([w as f32, h as f32, w as f32, h as f32])
    }

    /// Registers a scene texture and returns its resolution constant.
    /// Sprite sheets on particle shaders also switch on the sprite combos.
    fn texture_resolution(
        &mut self,
        name: &str,
        headers: &mut HashMap<String, TextureHeader>,
        shader: &str,
        info: &mut ShaderInfo,
        material: &mut Material,
    ) -> Option<[f32; 4]> {
        let header = self.header(name, headers)?;
        let mut resolution = header.resolution();
        self.scene
            .textures
            .entry(name.to_string())
            .or_insert_with(|| SceneTexture {
                name: name.to_string(),
                header: header.clone(),
            });

        let Some(sheet) = header.sprite.as_ref() else {
            return Some(resolution);
        };
        material.has_sprite = true;
        if shader != PARTICLE_SHADER {
            return Some(resolution);
        }
        let Some(first) = sheet.frames.first() else {
            return Some(resolution);
        };
        info.combos.insert("SPRITESHEET".into(), 1);
        info.combos.insert("THICKFORMAT".into(), 1);
        if header.width.is_power_of_two() && header.height.is_power_of_two() {
            info.combos.insert("SPRITESHEETBLENDNPOT".into(), 1);
            let frame_w = (first.width * header.width as f32).max(1.0);
            let frame_h = (first.height * header.height as f32).max(1.0);
            resolution[2] = resolution[0] - resolution[0] % frame_w;
            resolution[3] = resolution[1] - resolution[1] % frame_h;
        }
        let rate = if first.duration > 0.0 {
            1.0 / first.duration
        } else {
            0.0
        };
        material.constants.insert(
            "g_RenderVar1".into(),
            [first.width, first.height, sheet.frames.len() as f32, rate].into(),
        );
        Some(resolution)
    }

    /// Maps the material's named constants onto uniform names.
    fn resolve_constants(&self, desc: &MaterialDesc, info: &ShaderInfo, material: &mut Material) {
        for (name, value) in &desc.constantshadervalues {
            match resolve_alias(name, info) {
                Some(uniform) => {
                    material
                        .constants
                        .insert(uniform.to_string(), value.0.clone().into());
                }
                None => log::warn!(
                    "Shader {}: constant '{name}' matches no uniform; dropped",
                    desc.shader
                ),
            }
        }
    }
}

/// Exact alias first, then an alias whose uniform minus its `g_`/`u_`
/// prefix equals `name`.
pub(super) fn resolve_alias<'i>(name: &str, info: &'i ShaderInfo) -> Option<&'i str> {
    if let Some(uniform) = info.aliases.get(name) {
        return Some(uniform);
    }
    info.aliases
        .values()
        .find(|uniform| {
            uniform
                .strip_prefix("g_")
                .or_else(|| uniform.strip_prefix("u_"))
                .is_some_and(|stripped| stripped == name)
        })
        .map(String::as_str)
}

/// Rewrites reserved texture names to what the frame graph binds.
pub(super) fn resolve_reserved(name: &str, shader: &str, combos: &BTreeMap<String, i32>) -> String {
    match ReservedName::parse(name) {
        Some(ReservedName::FullFrameBuffer) => {
            let plain = combos.get("BLENDMODE").copied().unwrap_or(0) == 0;
            if shader == IMAGE_SHADER && plain {
                String::new()
            } else {
                DEFAULT_TARGET.to_string()
            }
        }
        Some(ReservedName::MipMappedFrameBuffer) => String::new(),
        Some(ReservedName::LayerComposite(id)) => link_target_name(id),
        None => name.to_string(),
    }
}

/// Parses a blending token, keeping [`BlendMode::Normal`] for unknown ones.
pub(super) fn parse_blend(token: &str) -> BlendMode {
    BlendMode::from_token(token).unwrap_or_else(|| {
        log::warn!("Unknown blending '{token}', using normal");
        BlendMode::Normal
    })
}
