use crate::math::Vec3;

use super::random::SceneRng;

/// Spawn volume of an emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterShape {
    /// Axis-aligned shell between `distance_min` and `distance_max` per axis.
    Box,
    /// Spherical shell between `distance_min.x` and `distance_max.x`.
    Sphere,
}

/// Continuous particle source.
#[derive(Debug, Clone, PartialEq)]
pub struct Emitter {
    /// Spawn volume.
    pub shape: EmitterShape,
    /// Particles per second.
    pub rate: f32,
    /// Offset of the spawn volume from the subsystem origin.
    pub origin: [f32; 3],
    /// Inner extent.
    pub distance_min: [f32; 3],
    /// Outer extent.
    pub distance_max: [f32; 3],
    /// Per-axis multiplier, zero flattens an axis.
    pub directions: [f32; 3],
    accumulator: f32,
}

impl Emitter {
    /// Creates an emitter spawning `rate` particles per second at its origin.
    pub fn new(shape: EmitterShape, rate: f32) -> Self {
        Self {
            shape,
            rate,
            origin: [0.0; 3],
            distance_min: [0.0; 3],
            distance_max: [0.0; 3],
            directions: [1.0, 1.0, 0.0],
            accumulator: 0.0,
        }
    }

    /// Set the spawn volume extents.
    #[must_use]
    pub fn with_distance(mut self, min: [f32; 3], max: [f32; 3]) -> Self {
        self.distance_min = min;
        self.distance_max = max;
        self
    }

    /// Set the spawn volume offset.
    #[must_use]
    pub fn with_origin(mut self, origin: [f32; 3]) -> Self {
        self.origin = origin;
        self
    }

    /// Set the per-axis multipliers.
    #[must_use]
    pub fn with_directions(mut self, directions: [f32; 3]) -> Self {
        self.directions = directions;
        self
    }

    /// Whole particles due after `dt` seconds; the fraction carries over.
    pub fn spawn_count(&mut self, dt: f32) -> usize {
        self.accumulator += (self.rate * dt).max(0.0);
        let whole = self.accumulator.floor();
        self.accumulator -= whole;
        whole as usize
    }

    /// Random spawn position relative to the subsystem origin.
    pub fn spawn_position(&self, rng: &SceneRng) -> Vec3 {
        let offset = match self.shape {
            EmitterShape::Box => {
                let mut v = [0.0; 3];
                for (axis, value) in v.iter_mut().enumerate() {
                    let distance = rng.range(self.distance_min[axis], self.distance_max[axis]);
                    let sign = if rng.next() < 0.5 { -1.0 } else { 1.0 };
                    *value = distance * sign;
                }
                Vec3::from(v)
            }
            EmitterShape::Sphere => {
                let direction = Vec3::new(
                    rng.range(-1.0, 1.0),
                    rng.range(-1.0, 1.0),
                    rng.range(-1.0, 1.0),
                );
                let direction = direction.try_normalize(1e-6).unwrap_or_else(Vec3::x);
                direction * rng.range(self.distance_min[0], self.distance_max[0])
            }
        };
        Vec3::from(self.origin) + offset.component_mul(&Vec3::from(self.directions))
    }
}
