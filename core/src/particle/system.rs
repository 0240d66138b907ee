use crate::math::Vec3;
use crate::mesh::generators::{
    ATTR_COLOR, ATTR_POSITION, ATTR_TEXCOORD_C2, ATTR_TEXCOORD_VEC4, ATTR_TEXCOORD_VEC4_C1,
};
use crate::mesh::{Mesh, MeshId};

use super::animation::FramePolicy;
use super::emitter::Emitter;
use super::initializer::Initializer;
use super::operator::Operator;
use super::random::SceneRng;

/// Hard ceiling on live particles per subsystem.
pub const DEFAULT_PARTICLE_CAP: usize = 4000;

const QUAD_CORNERS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// State of one live particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Euler rotation in radians.
    pub rotation: Vec3,
    pub angular_velocity: Vec3,
    pub size: f32,
    pub size_init: f32,
    pub alpha: f32,
    pub alpha_init: f32,
    pub color: Vec3,
    pub color_init: Vec3,
    /// Seconds left to live.
    pub lifetime: f32,
    /// Lifetime at spawn.
    pub lifetime_init: f32,
    /// Sprite-sheet frame; negative disables animation.
    pub frame: f32,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            velocity: Vec3::zeros(),
            rotation: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            size: 20.0,
            size_init: 20.0,
            alpha: 1.0,
            alpha_init: 1.0,
            color: Vec3::repeat(1.0),
            color_init: Vec3::repeat(1.0),
            lifetime: 1.0,
            lifetime_init: 1.0,
            frame: 0.0,
        }
    }
}

impl Particle {
    /// Fraction of the lifetime already used, in `[0, 1]`.
    pub fn life_progress(&self) -> f32 {
        if self.lifetime_init <= 0.0 {
            return 1.0;
        }
        (1.0 - self.lifetime / self.lifetime_init).clamp(0.0, 1.0)
    }
}

/// Fixed-capacity particle simulation publishing into one dynamic mesh.
#[derive(Debug, Clone)]
pub struct ParticleSubsystem {
    particles: Vec<Particle>,
    capacity: usize,
    emitters: Vec<Emitter>,
    initializers: Vec<Initializer>,
    operators: Vec<Operator>,
    policy: FramePolicy,
    frame_count: u32,
    time_scale: f32,
    rng: SceneRng,
    mesh: MeshId,
}

impl ParticleSubsystem {
    /// Creates an empty subsystem holding at most `capacity` particles.
    pub fn new(mesh: MeshId, capacity: usize, rng: SceneRng) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
            emitters: Vec::new(),
            initializers: Vec::new(),
            operators: Vec::new(),
            policy: FramePolicy::default(),
            frame_count: 1,
            time_scale: 1.0,
            rng,
            mesh,
        }
    }

    /// Adds an emitter.
    pub fn add_emitter(&mut self, emitter: Emitter) {
        self.emitters.push(emitter);
    }

    /// Adds an initializer; initializers run in insertion order.
    pub fn add_initializer(&mut self, initializer: Initializer) {
        self.initializers.push(initializer);
    }

    /// Adds an operator; operators run in insertion order.
    pub fn add_operator(&mut self, operator: Operator) {
        self.operators.push(operator);
    }

    /// Sets the animation-frame policy.
    pub fn set_frame_policy(&mut self, policy: FramePolicy) {
        self.policy = policy;
    }

    /// Sets the number of sprite-sheet frames `RandomOne` picks from.
    pub fn set_frame_count(&mut self, frame_count: u32) {
        self.frame_count = frame_count.max(1);
    }

    /// Sets the simulation speed multiplier.
    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale.max(0.0);
    }

    /// Mesh this subsystem publishes into.
    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    /// Capacity ceiling.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live particles.
    pub fn live_count(&self) -> usize {
        self.particles.len()
    }

    /// Live particles.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// The active frame policy.
    pub fn frame_policy(&self) -> FramePolicy {
        self.policy
    }

    /// Advances the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let dt = dt * self.time_scale;
        let first_new = self.particles.len();

        // Emit.
        for emitter in &mut self.emitters {
            let remaining = self.capacity - self.particles.len();
            let count = emitter.spawn_count(dt).min(remaining);
            for _ in 0..count {
                self.particles.push(Particle {
                    position: emitter.spawn_position(&self.rng),
                    ..Particle::default()
                });
            }
        }

        // Initialize.
        for particle in &mut self.particles[first_new..] {
            for initializer in &self.initializers {
                initializer.apply(particle, &self.rng);
            }
        }

        // Operate.
        for particle in &mut self.particles {
            particle.lifetime -= dt;
            for operator in &self.operators {
                operator.apply(particle, dt);
            }
        }

        // Post-process.
        for (i, particle) in self.particles.iter_mut().enumerate() {
            self.policy
                .apply(particle, i >= first_new, self.frame_count, &self.rng);
        }

        // Compact.
        self.particles.retain(|p| p.lifetime > 0.0);
        debug_assert!(self.particles.len() <= self.capacity);
    }

    /// Writes the live set into `mesh` and sets its draw count.
    ///
    /// Each particle becomes four vertices sharing position, color and frame
    /// and differing in their corner coordinate.
    pub fn publish(&self, mesh: &mut Mesh) {
        let Some(vertices) = mesh.vertex_arrays.first_mut() else {
            return;
        };
        let stride = vertices.stride();
        let capacity = vertices.vertex_count() / 4;
        let live = self.particles.len().min(capacity);

        let position = vertices.offset_of(ATTR_POSITION);
        let corner = vertices.offset_of(ATTR_TEXCOORD_VEC4);
        let color = vertices.offset_of(ATTR_COLOR);
        let extra = vertices.offset_of(ATTR_TEXCOORD_VEC4_C1);
        let frame = vertices.offset_of(ATTR_TEXCOORD_C2);

        let data = vertices.data_mut();
        for (i, particle) in self.particles.iter().take(live).enumerate() {
            for (c, uv) in QUAD_CORNERS.iter().enumerate() {
                let base = (i * 4 + c) * stride;
                if let Some(o) = position {
                    data[base + o..base + o + 3].copy_from_slice(particle.position.as_slice());
                }
                if let Some(o) = corner {
                    data[base + o..base + o + 4].copy_from_slice(&[
                        uv[0],
                        uv[1],
                        particle.rotation.z,
                        particle.size,
                    ]);
                }
                if let Some(o) = color {
                    data[base + o..base + o + 4].copy_from_slice(&[
                        particle.color.x,
                        particle.color.y,
                        particle.color.z,
                        particle.alpha,
                    ]);
                }
                if let Some(o) = extra {
                    data[base + o..base + o + 4].copy_from_slice(&[
                        particle.rotation.x,
                        particle.rotation.y,
                        particle.velocity.norm(),
                        0.0,
                    ]);
                }
                if let Some(o) = frame {
                    data[base + o..base + o + 2].copy_from_slice(&[particle.frame.max(0.0), 0.0]);
                }
            }
        }

        if let Some(indices) = mesh.index_arrays.first_mut() {
            indices.set_render_count(live * 6);
        }
    }
}
