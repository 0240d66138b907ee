use super::random::SceneRng;
use super::system::Particle;

/// How a particle's sprite-sheet frame evolves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FramePolicy {
    /// A random whole frame picked once at spawn and kept for life.
    RandomOne,
    /// Frame runs from 0 to the multiplier over the particle's lifetime.
    Sequence(f32),
}

impl Default for FramePolicy {
    fn default() -> Self {
        Self::Sequence(1.0)
    }
}

impl FramePolicy {
    /// Maps an `animationmode` token; anything unrecognized plays in sequence.
    pub fn from_mode(mode: &str, multiplier: f32) -> Self {
        match mode {
            "randomframe" => Self::RandomOne,
            _ => Self::Sequence(multiplier),
        }
    }

    /// Updates `particle.frame`. A negative frame marks a particle without
    /// animation and is left untouched.
    pub fn apply(&self, particle: &mut Particle, spawned: bool, frame_count: u32, rng: &SceneRng) {
        if particle.frame < 0.0 {
            return;
        }
        match *self {
            Self::RandomOne => {
                if spawned {
                    particle.frame = (rng.next() * frame_count.max(1) as f32).floor();
                }
            }
            Self::Sequence(multiplier) => {
                if particle.lifetime_init > 0.0 {
                    let remaining = particle.lifetime / particle.lifetime_init;
                    particle.frame = (1.0 - remaining) * multiplier;
                }
            }
        }
    }
}
