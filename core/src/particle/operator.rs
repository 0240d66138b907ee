use crate::math::Vec3;

use super::system::Particle;

/// Per-step update applied to every live particle.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// Integrates velocity under constant acceleration and linear drag.
    Movement { gravity: [f32; 3], drag: f32 },
    /// Integrates angular velocity under constant torque and drag.
    AngularMovement { force: [f32; 3], drag: f32 },
    /// Fades alpha in over `[0, fade_in]` and out over `[fade_out, 1]` of life.
    AlphaFade { fade_in: f32, fade_out: f32 },
    /// Scales size from `start_value` to `end_value` over a life window.
    SizeChange {
        start_time: f32,
        end_time: f32,
        start_value: f32,
        end_value: f32,
    },
    /// Multiplies color from `start_value` to `end_value` over a life window.
    ColorChange {
        start_time: f32,
        end_time: f32,
        start_value: [f32; 3],
        end_value: [f32; 3],
    },
}

fn window_progress(life: f32, start: f32, end: f32) -> f32 {
    if end <= start {
        return if life >= end { 1.0 } else { 0.0 };
    }
    ((life - start) / (end - start)).clamp(0.0, 1.0)
}

impl Operator {
    /// Applies this operator to one particle for a step of `dt` seconds.
    pub fn apply(&self, particle: &mut Particle, dt: f32) {
        let life = particle.life_progress();
        match self {
            Self::Movement { gravity, drag } => {
                particle.velocity += Vec3::from(*gravity) * dt;
                particle.velocity *= (1.0 - drag * dt).max(0.0);
                particle.position += particle.velocity * dt;
            }
            Self::AngularMovement { force, drag } => {
                particle.angular_velocity += Vec3::from(*force) * dt;
                particle.angular_velocity *= (1.0 - drag * dt).max(0.0);
                particle.rotation += particle.angular_velocity * dt;
            }
            Self::AlphaFade { fade_in, fade_out } => {
                let mut factor = 1.0;
                if *fade_in > 0.0 && life < *fade_in {
                    factor = life / fade_in;
                }
                if *fade_out < 1.0 && life > *fade_out {
                    factor = factor.min(1.0 - (life - fade_out) / (1.0 - fade_out));
                }
                particle.alpha = particle.alpha_init * factor.clamp(0.0, 1.0);
            }
            Self::SizeChange {
                start_time,
                end_time,
                start_value,
                end_value,
            } => {
                let t = window_progress(life, *start_time, *end_time);
                particle.size = particle.size_init * (start_value + (end_value - start_value) * t);
            }
            Self::ColorChange {
                start_time,
                end_time,
                start_value,
                end_value,
            } => {
                let t = window_progress(life, *start_time, *end_time);
                let start = Vec3::from(*start_value);
                let factor = start + (Vec3::from(*end_value) - start) * t;
                particle.color = particle.color_init.component_mul(&factor);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_life(progress: f32) -> Particle {
        Particle {
            lifetime: 1.0 - progress,
            lifetime_init: 1.0,
            ..Particle::default()
        }
    }

    #[test]
    fn test_movement_integrates() {
        let mut p = at_life(0.0);
        p.velocity = Vec3::new(10.0, 0.0, 0.0);
        Operator::Movement {
            gravity: [0.0, -10.0, 0.0],
            drag: 0.0,
        }
        .apply(&mut p, 0.5);
        assert_eq!(p.velocity, Vec3::new(10.0, -5.0, 0.0));
        assert_eq!(p.position, Vec3::new(5.0, -2.5, 0.0));
    }

    #[test]
    fn test_alpha_fade_edges() {
        let fade = Operator::AlphaFade {
            fade_in: 0.25,
            fade_out: 0.75,
        };
        let mut early = at_life(0.125);
        fade.apply(&mut early, 0.0);
        assert!((early.alpha - 0.5).abs() < 1e-6);

        let mut middle = at_life(0.5);
        fade.apply(&mut middle, 0.0);
        assert_eq!(middle.alpha, 1.0);

        let mut late = at_life(0.875);
        fade.apply(&mut late, 0.0);
        assert!((late.alpha - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_size_change_lerps() {
        let mut p = at_life(0.5);
        p.size_init = 10.0;
        Operator::SizeChange {
            start_time: 0.0,
            end_time: 1.0,
            start_value: 1.0,
            end_value: 0.0,
        }
        .apply(&mut p, 0.0);
        assert!((p.size - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_color_change_end() {
        let mut p = at_life(1.0);
        Operator::ColorChange {
            start_time: 0.0,
            end_time: 0.5,
            start_value: [1.0, 1.0, 1.0],
            end_value: [1.0, 0.0, 0.0],
        }
        .apply(&mut p, 0.0);
        assert_eq!(p.color, Vec3::new(1.0, 0.0, 0.0));
    }
}
