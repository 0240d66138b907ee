//! Particle objects.

use std::collections::BTreeMap;

use lumenwall_core::material::ShaderValues;
use lumenwall_core::mesh::generators::generate_particle_quads;
use lumenwall_core::particle::{
    Emitter, EmitterShape, FramePolicy, Initializer, InstanceOverride, Operator,
    ParticleSubsystem,
};
use lumenwall_core::scene::{Node, NodeTransform};
use serde::de::DeserializeOwned;

use super::{Builder, PERSPECTIVE_CAMERA};
use crate::description::{
    EmitterDesc, InitializerDesc, InstanceOverrideDesc, OperatorDesc, ParticleFlags,
    ParticleObject,
};
use crate::error::CompileError;

const TRAIL_RENDERER: &str = "spritetrail";

impl Builder<'_> {
    pub(super) fn add_particle(&mut self, object: &ParticleObject) -> Result<(), CompileError> {
        if !object.visible {
            return Ok(());
        }
        let config = &object.particle;

        let mut origin = object.origin.0;
        origin[1] = self.scene.ortho[1] as f32 - origin[1];
        let mut node = Node::new().with_id(object.id).with_transform(
            NodeTransform::IDENTITY
                .with_translation(origin)
                .with_angles(object.angles.0)
                .with_scale(object.scale.0),
        );
        if config.flags.contains(ParticleFlags::PERSPECTIVE) {
            node = node.with_camera(PERSPECTIVE_CAMERA);
        }

        let mut base = ShaderValues::new();
        base.insert("g_OrientationUp".into(), [0.0f32, -1.0, 0.0].into());
        base.insert("g_OrientationRight".into(), [1.0f32, 0.0, 0.0].into());
        base.insert("g_OrientationForward".into(), [0.0f32, 0.0, 1.0].into());
        base.insert("g_ViewUp".into(), [0.0f32, 1.0, 0.0].into());
        base.insert("g_ViewRight".into(), [1.0f32, 0.0, 0.0].into());

        let mut combos = BTreeMap::new();
        let trail = config
            .renderers
            .first()
            .filter(|renderer| renderer.name == TRAIL_RENDERER);
        if let Some(renderer) = trail {
            base.insert(
                "g_RenderVar0".into(),
                [renderer.length, renderer.maxlength, 0.0, 0.0].into(),
            );
            combos.insert("THICKFORMAT".to_string(), 1);
            combos.insert("TRAILRENDERER".to_string(), 1);
        }
        if !config.flags.contains(ParticleFlags::SPRITE_NO_FRAME_BLENDING) {
            combos.insert("SPRITESHEETBLEND".to_string(), 1);
        }

        let material = self.load_material(&config.material, &base, combos)?;
        let frame_count = material
            .texture(0)
            .and_then(|name| self.scene.textures.get(name))
            .and_then(|texture| texture.header.sprite.as_ref())
            .map(|sheet| sheet.frames.len());

        let capacity = (config.maxcount as usize).min(self.options.particle_cap);
        if capacity < config.maxcount as usize {
            log::warn!(
                "Particle object {}: maxcount {} clamped to {capacity}",
                object.id,
                config.maxcount
            );
        }
        let mut mesh = generate_particle_quads(capacity, material.has_sprite || trail.is_some());
        mesh.add_material(material);
        let mesh = self.scene.add_mesh(mesh);

        let mut subsystem = ParticleSubsystem::new(mesh, capacity, self.rng.clone());
        subsystem.set_frame_policy(FramePolicy::from_mode(
            &config.animationmode,
            config.sequencemultiplier,
        ));
        if let Some(frames) = frame_count {
            subsystem.set_frame_count(frames as u32);
        }
        let overrides = &object.instanceoverride;
        subsystem.set_time_scale(overrides.rate);

        for emitter in decode_all::<EmitterDesc>(object.id, "emitter", &config.emitters) {
            subsystem.add_emitter(emitter_from(emitter, overrides.count));
        }
        for initializer in
            decode_all::<InitializerDesc>(object.id, "initializer", &config.initializers)
        {
            subsystem.add_initializer(initializer_from(initializer));
        }
        for operator in decode_all::<OperatorDesc>(object.id, "operator", &config.operators) {
            subsystem.add_operator(operator_from(operator));
        }
        if overrides.enabled {
            subsystem.add_initializer(Initializer::Override(override_from(overrides)));
        }
        self.scene.particle_systems.push(subsystem);

        let root = self.scene.nodes.root();
        self.scene.nodes.add_child(root, node.with_mesh(mesh));
        Ok(())
    }
}

/// Decodes every entry it can; unknown kinds are logged and skipped.
fn decode_all<T: DeserializeOwned>(id: i32, kind: &str, raw: &[serde_json::Value]) -> Vec<T> {
    raw.iter()
        .filter_map(|value| match serde_json::from_value::<T>(value.clone()) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                let name = value.get("name").and_then(|n| n.as_str()).unwrap_or("?");
                log::warn!("Particle object {id}: {kind} '{name}' skipped: {e}");
                None
            }
        })
        .collect()
}

fn emitter_from(desc: EmitterDesc, count: f32) -> Emitter {
    let (shape, params) = match desc {
        EmitterDesc::BoxRandom(params) => (EmitterShape::Box, params),
        EmitterDesc::SphereRandom(params) => (EmitterShape::Sphere, params),
    };
    Emitter::new(shape, params.rate * count)
        .with_origin(params.origin.0)
        .with_distance(params.distancemin.0, params.distancemax.0)
        .with_directions(params.directions.0)
}

fn initializer_from(desc: InitializerDesc) -> Initializer {
    match desc {
        InitializerDesc::LifetimeRandom(r) => Initializer::LifetimeRandom {
            min: r.min,
            max: r.max,
        },
        InitializerDesc::SizeRandom(r) => Initializer::SizeRandom {
            min: r.min,
            max: r.max,
        },
        InitializerDesc::AlphaRandom(r) => Initializer::AlphaRandom {
            min: r.min,
            max: r.max,
        },
        InitializerDesc::ColorRandom(r) => Initializer::ColorRandom {
            min: r.min.0.map(|c| c / 255.0),
            max: r.max.0.map(|c| c / 255.0),
        },
        InitializerDesc::VelocityRandom(r) => Initializer::VelocityRandom {
            min: r.min.0,
            max: r.max.0,
        },
        InitializerDesc::RotationRandom(r) => Initializer::RotationRandom {
            min: r.min.0,
            max: r.max.0,
        },
        InitializerDesc::AngularVelocityRandom(r) => Initializer::AngularVelocityRandom {
            min: r.min.0,
            max: r.max.0,
        },
    }
}

fn operator_from(desc: OperatorDesc) -> Operator {
    match desc {
        OperatorDesc::Movement { gravity, drag } => Operator::Movement {
            gravity: gravity.0,
            drag,
        },
        OperatorDesc::AngularMovement { force, drag } => Operator::AngularMovement {
            force: force.0,
            drag,
        },
        OperatorDesc::AlphaFade {
            fadeintime,
            fadeouttime,
        } => Operator::AlphaFade {
            fade_in: fadeintime,
            fade_out: fadeouttime,
        },
        OperatorDesc::SizeChange {
            starttime,
            endtime,
            startvalue,
            endvalue,
        } => Operator::SizeChange {
            start_time: starttime,
            end_time: endtime,
            start_value: startvalue,
            end_value: endvalue,
        },
        OperatorDesc::ColorChange {
            starttime,
            endtime,
            startvalue,
            endvalue,
        } => Operator::ColorChange {
            start_time: starttime,
            end_time: endtime,
            start_value: startvalue.0,
            end_value: endvalue.0,
        },
    }
}

fn override_from(desc: &InstanceOverrideDesc) -> InstanceOverride {
    InstanceOverride {
        lifetime: desc.lifetime,
        size: desc.size,
        alpha: desc.alpha,
        speed: desc.speed,
        color: desc.color.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_entries_are_skipped() {
        let raw = vec![
            json!({"name": "movement", "gravity": "0 -10 0"}),
            json!({"name": "vortex"}),
            json!({"name": "alphafade"}),
        ];
        let ops = decode_all::<OperatorDesc>(1, "operator", &raw);
        assert_eq!(ops.len(), 2);
        assert_eq!(
            operator_from(ops[0].clone()),
            Operator::Movement {
                gravity: [0.0, -10.0, 0.0],
                drag: 0.0
            }
        );
    }

    #[test]
    fn test_emitter_rate_scaled_by_count() {
        let desc: EmitterDesc =
            serde_json::from_value(json!({"name": "sphererandom", "rate": 10})).unwrap();
        let emitter = emitter_from(desc, 2.5);
        assert_eq!(emitter.shape, EmitterShape::Sphere);
        assert_eq!(emitter.rate, 25.0);
    }

    #[test]
    fn test_color_initializer_is_normalized() {
        let desc: InitializerDesc = serde_json::from_value(
            json!({"name": "colorrandom", "min": "0 127.5 255", "max": "255 255 255"}),
        )
        .unwrap();
        let Initializer::ColorRandom { min, max } = initializer_from(desc) else {
            panic!("expected a color initializer");
        };
        assert_eq!(min, [0.0, 0.5, 1.0]);
        assert_eq!(max, [1.0; 3]);
    }
}
