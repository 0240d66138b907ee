//! Scene description records.
//!
//! A description is a JSON document `{ "general": {...}, "objects": [...] }`.
//! Each object carries exactly one discriminator key, `image`, `particle`
//! or `sound`, and is decoded into the matching record. The top-level shape
//! must be valid; individual records that fail to decode are logged and
//! skipped by [`SceneDescription::parse`].

mod material;
mod particle;
mod values;

pub use material::{
    BindDesc, EffectCommandDesc, EffectDesc, EffectPassDesc, FboDesc, MaterialDesc,
};
pub use particle::{
    EmitterDesc, EmitterParams, InitializerDesc, InstanceOverrideDesc, OperatorDesc,
    ParticleDesc, ParticleFlags, Range, Range3, RendererDesc,
};
pub use values::{FloatList, Floats};

use serde::Deserialize;

use crate::error::CompileError;

/// Model path of the reserved compose pseudo-layer.
pub const COMPOSE_LAYER_MODEL: &str = "models/util/composelayer.json";

/// Orthographic scene size.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrthoProjection {
    pub width: f32,
    pub height: f32,
    /// Use the size of the largest image object instead.
    #[serde(rename = "auto")]
    pub auto_size: bool,
}

impl Default for OrthoProjection {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            auto_size: false,
        }
    }
}

/// Scene-wide settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct General {
    pub orthogonalprojection: OrthoProjection,
    pub clearcolor: Floats<3>,
    pub zoom: f32,
    pub nearz: f32,
    pub farz: f32,
    pub ambientcolor: Floats<3>,
}

impl Default for General {
    fn default() -> Self {
        Self {
            orthogonalprojection: OrthoProjection::default(),
            clearcolor: Floats::splat(0.0),
            zoom: 1.0,
            nearz: 0.01,
            farz: 10000.0,
            ambientcolor: Floats::splat(0.2),
        }
    }
}

/// A textured card, optionally post-processed by an effect chain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageObject {
    pub id: i32,
    pub name: String,
    /// Model path; [`COMPOSE_LAYER_MODEL`] marks the compose pseudo-layer.
    pub image: String,
    pub visible: bool,
    /// Position in description coordinates (y grows downwards).
    pub origin: Floats<3>,
    pub scale: Floats<3>,
    /// Euler angles in degrees.
    pub angles: Floats<3>,
    pub size: Floats<2>,
    /// Combination of `top`, `left`, `right`, `bottom`, or `center`.
    pub alignment: String,
    pub color: Floats<3>,
    pub alpha: f32,
    pub brightness: f32,
    /// Non-zero selects a color blend mode applied by a passthrough effect.
    #[serde(rename = "colorBlendMode")]
    pub color_blend_mode: i32,
    /// Covers the whole screen.
    pub fullscreen: bool,
    /// The texture has no power-of-two padding to compensate for.
    pub nopadding: bool,
    pub material: MaterialDesc,
    pub effects: Vec<EffectDesc>,
}

impl Default for ImageObject {
    fn default() -> Self {
        Self {
            id: -1,
            name: String::new(),
            image: String::new(),
            visible: true,
            origin: Floats::default(),
            scale: Floats::splat(1.0),
            angles: Floats::default(),
            size: Floats::default(),
            alignment: "center".into(),
            color: Floats::splat(1.0),
            alpha: 1.0,
            brightness: 1.0,
            color_blend_mode: 0,
            fullscreen: false,
            nopadding: false,
            material: MaterialDesc::default(),
            effects: Vec::new(),
        }
    }
}

impl ImageObject {
    /// True for the reserved compose pseudo-layer.
    pub fn is_compose(&self) -> bool {
        self.image == COMPOSE_LAYER_MODEL
    }

    /// Number of effects that take part in the chain.
    pub fn enabled_effects(&self) -> usize {
        self.effects.iter().filter(|e| e.visible).count()
    }
}

/// A particle emitter placed in the scene.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleObject {
    pub id: i32,
    pub name: String,
    pub visible: bool,
    pub origin: Floats<3>,
    pub scale: Floats<3>,
    pub angles: Floats<3>,
    /// Inline particle system configuration.
    pub particle: ParticleDesc,
    pub instanceoverride: InstanceOverrideDesc,
}

impl Default for ParticleObject {
    fn default() -> Self {
        Self {
            id: -1,
            name: String::new(),
            visible: true,
            origin: Floats::default(),
            scale: Floats::splat(1.0),
            angles: Floats::default(),
            particle: ParticleDesc::default(),
            instanceoverride: InstanceOverrideDesc::default(),
        }
    }
}

/// A sound trigger, handed to the sound collaborator untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SoundObject {
    pub id: i32,
    pub name: String,
    /// Sound file paths, played in order or at random.
    pub sound: Vec<String>,
    pub volume: f32,
    /// `loop`, `random` or `single`.
    pub playbackmode: String,
    /// Minimum pause between random plays, in seconds.
    pub mintime: f32,
    /// Maximum pause between random plays, in seconds.
    pub maxtime: f32,
}

impl Default for SoundObject {
    fn default() -> Self {
        Self {
            id: -1,
            name: String::new(),
            sound: Vec::new(),
            volume: 1.0,
            playbackmode: "loop".into(),
            mintime: 0.0,
            maxtime: 0.0,
        }
    }
}

/// One decoded object, in description order.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectRecord {
    Image(Box<ImageObject>),
    Particle(Box<ParticleObject>),
    Sound(SoundObject),
}

impl ObjectRecord {
    /// Object id from the description.
    pub fn id(&self) -> i32 {
        match self {
            Self::Image(o) => o.id,
            Self::Particle(o) => o.id,
            Self::Sound(o) => o.id,
        }
    }
}

#[derive(Deserialize)]
struct RawDescription {
    #[serde(default)]
    general: Option<General>,
    objects: Option<Vec<serde_json::Value>>,
}

/// A parsed scene description.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneDescription {
    pub general: General,
    /// Decoded objects in declaration order.
    pub objects: Vec<ObjectRecord>,
}

fn has_tag(object: &serde_json::Value, tag: &str) -> bool {
    object.get(tag).is_some_and(|v| !v.is_null())
}

fn decode<T: serde::de::DeserializeOwned>(
    index: usize,
    kind: &str,
    object: serde_json::Value,
) -> Option<T> {
    match serde_json::from_value(object) {
        Ok(record) => Some(record),
        Err(e) => {
            log::warn!("Skipping {kind} object #{index}: {e}");
            None
        }
    }
}

impl SceneDescription {
    /// Parses a description.
    ///
    /// Invalid JSON or a missing `objects` array fails the whole parse.
    /// Objects without a known tag and records that fail to decode are
    /// logged and skipped.
    pub fn parse(text: &str) -> Result<Self, CompileError> {
        let raw: RawDescription = serde_json::from_str(text)?;
        let objects = raw.objects.ok_or(CompileError::MissingObjects)?;

        let mut records = Vec::with_capacity(objects.len());
        for (index, object) in objects.into_iter().enumerate() {
            let record = if has_tag(&object, "image") {
                decode(index, "image", object).map(|o| ObjectRecord::Image(Box::new(o)))
            } else if has_tag(&object, "particle") {
                decode(index, "particle", object).map(|o| ObjectRecord::Particle(Box::new(o)))
            } else if has_tag(&object, "sound") {
                decode(index, "sound", object).map(ObjectRecord::Sound)
            } else {
                log::debug!("Object #{index} has no image, particle or sound tag");
                None
            };
            records.extend(record);
        }

        Ok(Self {
            general: raw.general.unwrap_or_default(),
            objects: records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dispatches_by_tag() {
        let desc = SceneDescription::parse(
            r#"{
                "general": {"clearcolor": "0.1 0.2 0.3"},
                "objects": [
                    {"id": 1, "image": "models/a.json", "size": "200 100"},
                    {"id": 2, "particle": {"maxcount": 10}},
                    {"id": 3, "sound": ["sounds/rain.ogg"]},
                    {"id": 4, "light": "point"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(desc.general.clearcolor.0, [0.1, 0.2, 0.3]);
        let ids: Vec<i32> = desc.objects.iter().map(ObjectRecord::id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(matches!(&desc.objects[0], ObjectRecord::Image(o) if o.size.0 == [200.0, 100.0]));
    }

    #[test]
    fn test_bad_record_is_skipped() {
        let desc = SceneDescription::parse(
            r#"{"objects": [{"id": 1, "image": "a", "origin": "1 x 2"}, {"id": 2, "image": "b"}]}"#,
        )
        .unwrap();
        assert_eq!(desc.objects.len(), 1);
        assert_eq!(desc.objects[0].id(), 2);
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(
            SceneDescription::parse("{not json"),
            Err(CompileError::Json(_))
        ));
        assert!(matches!(
            SceneDescription::parse(r#"{"general": {}}"#),
            Err(CompileError::MissingObjects)
        ));
        assert!(matches!(
            SceneDescription::parse(r#"{"objects": 3}"#),
            Err(CompileError::Json(_))
        ));
    }
}
