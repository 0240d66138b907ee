//! Bounded CPU particle simulation.
//!
//! A [`ParticleSubsystem`] owns a fixed-capacity particle pool and steps it
//! once per frame in a fixed order:
//!
//! 1. **emit** - emitters accumulate spawns from rate x elapsed time,
//!    truncated to the remaining capacity
//! 2. **initialize** - initializers run on the newly spawned particles only
//! 3. **operate** - particles age, then operators run on every live particle
//! 4. **post-process** - the [`FramePolicy`] updates animation frames
//! 5. **compact** - particles whose lifetime reached zero are removed
//!
//! [`ParticleSubsystem::publish`] then writes the live set into the dynamic
//! quad mesh the executor draws.
//!
//! Emitters, initializers and operators are plain enums; every random draw
//! goes through one [`SceneRng`] shared by all subsystems of a scene.

mod animation;
mod emitter;
mod initializer;
mod operator;
mod random;
mod system;

pub use animation::FramePolicy;
pub use emitter::{Emitter, EmitterShape};
pub use initializer::{Initializer, InstanceOverride};
pub use operator::Operator;
pub use random::SceneRng;
pub use system::{DEFAULT_PARTICLE_CAP, Particle, ParticleSubsystem};
