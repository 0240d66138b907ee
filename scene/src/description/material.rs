//! Material and effect records.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::values::FloatList;

/// A material as written in a description, before shader resolution.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MaterialDesc {
    /// Base shader template name.
    pub shader: String,
    /// Blending token.
    pub blending: String,
    /// Texture name per slot; `null` leaves a slot for the shader default.
    pub textures: Vec<Option<String>>,
    /// Combo flag overrides.
    pub combos: BTreeMap<String, i32>,
    /// Named constant values, resolved through the shader's alias table.
    pub constantshadervalues: BTreeMap<String, FloatList>,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            shader: "genericimage2".into(),
            blending: "normal".into(),
            textures: Vec::new(),
            combos: BTreeMap::new(),
            constantshadervalues: BTreeMap::new(),
        }
    }
}

impl MaterialDesc {
    /// Texture names with unset slots as empty strings.
    pub fn texture_names(&self) -> Vec<String> {
        self.textures
            .iter()
            .map(|t| t.clone().unwrap_or_default())
            .collect()
    }

    /// Applies the texture, combo and constant overrides of an effect pass.
    pub fn merge_pass(&mut self, pass: &EffectPassDesc) {
        for (slot, texture) in pass.textures.iter().enumerate() {
            let Some(texture) = texture else {
                continue;
            };
            if self.textures.len() <= slot {
                self.textures.resize(slot + 1, None);
            }
            self.textures[slot] = Some(texture.clone());
        }
        self.combos
            .extend(pass.combos.iter().map(|(k, v)| (k.clone(), *v)));
        self.constantshadervalues.extend(
            pass.constantshadervalues
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
    }
}

/// Binds a named effect buffer to a texture slot.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct BindDesc {
    /// Buffer name (`previous` or one of the effect's fbos).
    pub name: String,
    /// Texture slot.
    pub index: usize,
}

/// Per-material overrides of an effect.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EffectPassDesc {
    /// Texture overrides per slot.
    pub textures: Vec<Option<String>>,
    /// Combo overrides.
    pub combos: BTreeMap<String, i32>,
    /// Constant overrides.
    pub constantshadervalues: BTreeMap<String, FloatList>,
    /// Buffers bound to texture slots.
    pub bind: Vec<BindDesc>,
    /// Output buffer name; empty writes the stage output.
    pub target: String,
}

/// An auxiliary render target private to one effect.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FboDesc {
    /// Name the effect's passes refer to.
    pub name: String,
    /// Downscale divisor relative to the object.
    pub scale: f32,
}

impl Default for FboDesc {
    fn default() -> Self {
        Self {
            name: String::new(),
            scale: 1.0,
        }
    }
}

/// An effect command. Only `copy` is understood.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EffectCommandDesc {
    /// Command word.
    pub command: String,
    /// Buffer read from.
    pub source: String,
    /// Buffer written to.
    pub target: String,
}

/// One stage of an image object's effect chain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EffectDesc {
    /// Effect name, for logs.
    pub name: String,
    /// Disabled effects are ignored entirely.
    pub visible: bool,
    /// Private render targets.
    pub fbos: Vec<FboDesc>,
    /// Commands run before the materials.
    pub commands: Vec<EffectCommandDesc>,
    /// Materials, drawn in order.
    pub materials: Vec<MaterialDesc>,
    /// Overrides for `materials[i]`.
    pub passes: Vec<EffectPassDesc>,
}

impl Default for EffectDesc {
    fn default() -> Self {
        Self {
            name: String::new(),
            visible: true,
            fbos: Vec::new(),
            commands: Vec::new(),
            materials: Vec::new(),
            passes: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_defaults() {
        let m: MaterialDesc = serde_json::from_str(r#"{"textures": ["a", null]}"#).unwrap();
        assert_eq!(m.shader, "genericimage2");
        assert_eq!(m.blending, "normal");
        assert_eq!(m.texture_names(), vec!["a".to_string(), String::new()]);
    }

    #[test]
    fn test_merge_pass() {
        let mut m: MaterialDesc = serde_json::from_str(
            r#"{"textures": ["a", "b"], "combos": {"X": 1}, "constantshadervalues": {"speed": 1}}"#,
        )
        .unwrap();
        let pass: EffectPassDesc = serde_json::from_str(
            r#"{"textures": [null, null, "c"], "combos": {"Y": 2}, "constantshadervalues": {"speed": "3"}}"#,
        )
        .unwrap();
        m.merge_pass(&pass);
        assert_eq!(m.texture_names(), vec!["a", "b", "c"]);
        assert_eq!(m.combos.len(), 2);
        assert_eq!(m.constantshadervalues["speed"], FloatList(vec![3.0]));
    }
}
