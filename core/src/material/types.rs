use std::collections::BTreeMap;

use crate::math::{Mat3, Mat4};

/// Fixed-function blend state of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// Source overwrites destination. The neutral mode used inside effect chains.
    #[default]
    Normal,
    /// Classic alpha blending.
    Translucent,
    /// Source is added to destination.
    Additive,
    /// Blending stage switched off entirely.
    Disabled,
}

impl BlendMode {
    /// Parses a blending token from a material description.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "normal" => Some(Self::Normal),
            "translucent" => Some(Self::Translucent),
            "additive" => Some(Self::Additive),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }

    /// True if drawing with this mode combines with the existing pixels.
    pub fn reads_destination(self) -> bool {
        matches!(self, Self::Translucent | Self::Additive)
    }
}

/// A float uniform payload (scalar, vector or matrix, column-major).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShaderValue(pub Vec<f32>);

impl ShaderValue {
    /// The raw components.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Number of float components.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the value carries no components.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<f32> for ShaderValue {
    fn from(v: f32) -> Self {
        Self(vec![v])
    }
}

impl<const N: usize> From<[f32; N]> for ShaderValue {
    fn from(v: [f32; N]) -> Self {
        Self(v.to_vec())
    }
}

impl From<&[f32]> for ShaderValue {
    fn from(v: &[f32]) -> Self {
        Self(v.to_vec())
    }
}

impl From<Vec<f32>> for ShaderValue {
    fn from(v: Vec<f32>) -> Self {
        Self(v)
    }
}

impl From<Mat4> for ShaderValue {
    fn from(m: Mat4) -> Self {
        Self(m.as_slice().to_vec())
    }
}

impl From<Mat3> for ShaderValue {
    fn from(m: Mat3) -> Self {
        Self(m.as_slice().to_vec())
    }
}

/// Uniform name to value table.
pub type ShaderValues = BTreeMap<String, ShaderValue>;

/// Vertex and fragment sources after specialization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShaderSource {
    /// Base shader template name, e.g. `genericimage2`.
    pub name: String,
    /// Specialized vertex stage source.
    pub vertex: String,
    /// Specialized fragment stage source.
    pub fragment: String,
}

/// Resolved draw state for one sub-draw of a mesh.
///
/// `textures[i]` is the texture or render-target name bound to sampler slot
/// `i`; an empty string leaves the slot unbound.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Material {
    /// Specialized shader sources.
    pub shader: ShaderSource,
    /// Texture or render-target name per sampler slot.
    pub textures: Vec<String>,
    /// Fixed-function blend mode.
    pub blend: BlendMode,
    /// Constant uniform values keyed by uniform name.
    pub constants: ShaderValues,
    /// Compile-time feature toggles the shader was specialized with.
    pub combos: BTreeMap<String, i32>,
    /// True if slot 0 is a sprite sheet.
    pub has_sprite: bool,
}

impl Material {
    /// Creates a material for the given shader template.
    pub fn new(shader_name: impl Into<String>) -> Self {
        Self {
            shader: ShaderSource {
                name: shader_name.into(),
                ..ShaderSource::default()
            },
            ..Self::default()
        }
    }

    /// Set the blend mode.
    #[must_use]
    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    /// Set the texture list.
    #[must_use]
    pub fn with_textures(mut self, textures: Vec<String>) -> Self {
        self.textures = textures;
        self
    }

    /// Add a constant uniform value.
    #[must_use]
    pub fn with_constant(mut self, name: impl Into<String>, value: impl Into<ShaderValue>) -> Self {
        self.constants.insert(name.into(), value.into());
        self
    }

    /// Texture name bound to `slot`, if any.
    pub fn texture(&self, slot: usize) -> Option<&str> {
        self.textures
            .get(slot)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_tokens() {
        assert_eq!(BlendMode::from_token("additive"), Some(BlendMode::Additive));
        assert_eq!(BlendMode::from_token("disabled"), Some(BlendMode::Disabled));
        assert_eq!(BlendMode::from_token("multiply"), None);
    }

    #[test]
    fn test_blend_destination_reads() {
        assert!(BlendMode::Translucent.reads_destination());
        assert!(BlendMode::Additive.reads_destination());
        assert!(!BlendMode::Normal.reads_destination());
        assert!(!BlendMode::Disabled.reads_destination());
    }

    #[test]
    fn test_shader_value_from_matrix() {
        let v = ShaderValue::from(Mat4::identity());
        assert_eq!(v.len(), 16);
        assert_eq!(v.as_slice()[0], 1.0);
        assert_eq!(v.as_slice()[1], 0.0);
    }

    #[test]
    fn test_empty_texture_slot_is_unbound() {
        let m = Material::new("genericimage2")
            .with_textures(vec!["a".into(), String::new()]);
        assert_eq!(m.texture(0), Some("a"));
        assert_eq!(m.texture(1), None);
        assert_eq!(m.texture(5), None);
    }
}
