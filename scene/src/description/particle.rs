//! Particle object records.
//!
//! Emitters, initializers and operators are tagged by their `name` field.
//! Each entry is decoded on its own so that one unknown or malformed entry
//! does not take the rest of the particle system down with it.

use bitflags::bitflags;
use serde::Deserialize;

use super::material::MaterialDesc;
use super::values::Floats;

bitflags! {
    /// Particle system flags, stored as an integer in descriptions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ParticleFlags: u32 {
        /// Particles are simulated in world space.
        const WORLD_SPACE = 1 << 0;
        /// Sprite sheet frames are not cross-faded.
        const SPRITE_NO_FRAME_BLENDING = 1 << 1;
        /// Drawn through the perspective camera.
        const PERSPECTIVE = 1 << 2;
    }
}

impl<'de> Deserialize<'de> for ParticleFlags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_bits_truncate(u32::deserialize(deserializer)?))
    }
}

/// A spawn source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum EmitterDesc {
    /// Box-shaped spawn volume.
    BoxRandom(EmitterParams),
    /// Spherical spawn shell.
    SphereRandom(EmitterParams),
}

/// Parameters shared by every emitter shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmitterParams {
    /// Particles per second.
    pub rate: f32,
    /// Offset from the object origin.
    pub origin: Floats<3>,
    /// Inner extent.
    pub distancemin: Floats<3>,
    /// Outer extent.
    pub distancemax: Floats<3>,
    /// Per-axis multiplier.
    pub directions: Floats<3>,
}

impl Default for EmitterParams {
    fn default() -> Self {
        Self {
            rate: 5.0,
            origin: Floats::default(),
            distancemin: Floats::default(),
            distancemax: Floats::default(),
            directions: Floats([1.0, 1.0, 0.0]),
        }
    }
}

/// Scalar range of a random initializer.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Default for Range {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

/// Vector range of a random initializer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Range3 {
    pub min: Floats<3>,
    pub max: Floats<3>,
}

/// Sets up freshly spawned particles.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum InitializerDesc {
    LifetimeRandom(Range),
    SizeRandom(Range),
    AlphaRandom(Range),
    /// Color components are given in `0..=255`.
    ColorRandom(Range3),
    VelocityRandom(Range3),
    RotationRandom(Range3),
    AngularVelocityRandom(Range3),
}

fn default_half() -> f32 {
    0.5
}

fn default_one() -> f32 {
    1.0
}

/// Updates live particles every step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum OperatorDesc {
    Movement {
        #[serde(default)]
        gravity: Floats<3>,
        #[serde(default)]
        drag: f32,
    },
    AngularMovement {
        #[serde(default)]
        force: Floats<3>,
        #[serde(default)]
        drag: f32,
    },
    AlphaFade {
        #[serde(default = "default_half")]
        fadeintime: f32,
        #[serde(default = "default_half")]
        fadeouttime: f32,
    },
    SizeChange {
        #[serde(default)]
        starttime: f32,
        #[serde(default = "default_one")]
        endtime: f32,
        #[serde(default = "default_one")]
        startvalue: f32,
        #[serde(default)]
        endvalue: f32,
    },
    ColorChange {
        #[serde(default)]
        starttime: f32,
        #[serde(default = "default_one")]
        endtime: f32,
        #[serde(default = "ones")]
        startvalue: Floats<3>,
        #[serde(default = "ones")]
        endvalue: Floats<3>,
    },
}

fn ones() -> Floats<3> {
    Floats::splat(1.0)
}

/// How particles are drawn.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RendererDesc {
    /// `sprite` or `spritetrail`.
    pub name: String,
    /// Trail length in seconds.
    pub length: f32,
    /// Maximum trail length in pixels.
    pub maxlength: f32,
}

/// Particle system configuration carried inline by a particle object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleDesc {
    /// Requested particle capacity.
    pub maxcount: u32,
    /// `randomframe` or `sequence`.
    pub animationmode: String,
    /// Frames played over a particle's lifetime in sequence mode.
    pub sequencemultiplier: f32,
    pub flags: ParticleFlags,
    /// Particle material.
    pub material: MaterialDesc,
    /// Renderers; only the first one is used.
    pub renderers: Vec<RendererDesc>,
    /// Raw emitter entries, see [`EmitterDesc`].
    pub emitters: Vec<serde_json::Value>,
    /// Raw initializer entries, see [`InitializerDesc`].
    pub initializers: Vec<serde_json::Value>,
    /// Raw operator entries, see [`OperatorDesc`].
    pub operators: Vec<serde_json::Value>,
}

impl Default for ParticleDesc {
    fn default() -> Self {
        Self {
            maxcount: 20,
            animationmode: "sequence".into(),
            sequencemultiplier: 1.0,
            flags: ParticleFlags::empty(),
            material: MaterialDesc {
                shader: "genericparticle".into(),
                blending: "translucent".into(),
                ..MaterialDesc::default()
            },
            renderers: Vec::new(),
            emitters: Vec::new(),
            initializers: Vec::new(),
            operators: Vec::new(),
        }
    }
}

/// Per-instance multipliers of a particle object.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstanceOverrideDesc {
    /// Adds the override initializer when set.
    pub enabled: bool,
    pub alpha: f32,
    pub color: Floats<3>,
    /// Emission rate multiplier.
    pub count: f32,
    pub lifetime: f32,
    /// Simulation speed multiplier.
    pub rate: f32,
    pub size: f32,
    pub speed: f32,
}

impl Default for InstanceOverrideDesc {
    fn default() -> Self {
        Self {
            enabled: false,
            alpha: 1.0,
            color: Floats::splat(1.0),
            count: 1.0,
            lifetime: 1.0,
            rate: 1.0,
            size: 1.0,
            speed: 1.0,
        }
    }
}
