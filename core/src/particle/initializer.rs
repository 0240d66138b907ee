use crate::math::Vec3;

use super::random::SceneRng;
use super::system::Particle;

/// Per-instance multipliers applied on top of the configured initializers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceOverride {
    /// Lifetime multiplier.
    pub lifetime: f32,
    /// Size multiplier.
    pub size: f32,
    /// Alpha multiplier.
    pub alpha: f32,
    /// Velocity multiplier.
    pub speed: f32,
    /// Color multiplier.
    pub color: [f32; 3],
}

impl Default for InstanceOverride {
    fn default() -> Self {
        Self {
            lifetime: 1.0,
            size: 1.0,
            alpha: 1.0,
            speed: 1.0,
            color: [1.0; 3],
        }
    }
}

/// Sets up attributes of a freshly spawned particle.
#[derive(Debug, Clone, PartialEq)]
pub enum Initializer {
    /// Lifetime in seconds.
    LifetimeRandom { min: f32, max: f32 },
    /// Quad size.
    SizeRandom { min: f32, max: f32 },
    /// Opacity.
    AlphaRandom { min: f32, max: f32 },
    /// Color, components in `[0, 1]`.
    ColorRandom { min: [f32; 3], max: [f32; 3] },
    /// Initial velocity.
    VelocityRandom { min: [f32; 3], max: [f32; 3] },
    /// Initial rotation in radians.
    RotationRandom { min: [f32; 3], max: [f32; 3] },
    /// Initial angular velocity in radians per second.
    AngularVelocityRandom { min: [f32; 3], max: [f32; 3] },
    /// Instance override multipliers, applied after everything else.
    Override(InstanceOverride),
}

impl Initializer {
    /// Applies this initializer to one particle.
    pub fn apply(&self, particle: &mut Particle, rng: &SceneRng) {
        match self {
            Self::LifetimeRandom { min, max } => {
                let lifetime = rng.range(*min, *max);
                particle.lifetime = lifetime;
                particle.lifetime_init = lifetime;
            }
            Self::SizeRandom { min, max } => {
                particle.size = rng.range(*min, *max);
                particle.size_init = particle.size;
            }
            Self::AlphaRandom { min, max } => {
                particle.alpha = rng.range(*min, *max);
                particle.alpha_init = particle.alpha;
            }
            Self::ColorRandom { min, max } => {
                particle.color = Vec3::from(rng.range3(*min, *max));
                particle.color_init = particle.color;
            }
            Self::VelocityRandom { min, max } => {
                particle.velocity = Vec3::from(rng.range3(*min, *max));
            }
            Self::RotationRandom { min, max } => {
                particle.rotation = Vec3::from(rng.range3(*min, *max));
            }
            Self::AngularVelocityRandom { min, max } => {
                particle.angular_velocity = Vec3::from(rng.range3(*min, *max));
            }
            Self::Override(over) => {
                particle.lifetime *= over.lifetime;
                particle.lifetime_init *= over.lifetime;
                particle.size *= over.size;
                particle.size_init *= over.size;
                particle.alpha *= over.alpha;
                particle.alpha_init *= over.alpha;
                particle.velocity *= over.speed;
                particle.color = particle.color.component_mul(&Vec3::from(over.color));
                particle.color_init = particle.color;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_sets_init() {
        let rng = SceneRng::seeded(1);
        let mut p = Particle::default();
        Initializer::LifetimeRandom { min: 2.0, max: 3.0 }.apply(&mut p, &rng);
        assert!((2.0..3.0).contains(&p.lifetime));
        assert_eq!(p.lifetime, p.lifetime_init);
    }

    #[test]
    fn test_override_scales() {
        let rng = SceneRng::seeded(1);
        let mut p = Particle {
            lifetime: 2.0,
            lifetime_init: 2.0,
            size: 10.0,
            size_init: 10.0,
            ..Particle::default()
        };
        p.velocity = Vec3::new(1.0, 0.0, 0.0);
        let over = InstanceOverride {
            lifetime: 0.5,
            size: 3.0,
            speed: 2.0,
            ..InstanceOverride::default()
        };
        Initializer::Override(over).apply(&mut p, &rng);
        assert_eq!(p.lifetime, 1.0);
        assert_eq!(p.lifetime_init, 1.0);
        assert_eq!(p.size, 30.0);
        assert_eq!(p.velocity.x, 2.0);
    }
}
