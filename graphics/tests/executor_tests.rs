//! Frame executor integration tests against the recording backend.

mod common;

use rstest::rstest;

use common::{SURFACE, TestContext, add_effect_layer, add_plain_image, empty_scene};
use lumenwall_core::pool::PoolError;
use lumenwall_core::scene::DEFAULT_TARGET;
use lumenwall_core::texture::{SceneTexture, SpriteFrame, SpriteSheet, TextureHeader};
use lumenwall_graphics::backend::{DummyCommand, GpuTexture};
use lumenwall_graphics::{DummyBackend, FrameExecutor, GraphicsError, PoolLimits, Viewport};

fn draw_labels(ctx: &TestContext) -> Vec<String> {
    ctx.recorder
        .draws()
        .into_iter()
        .filter_map(|c| match c {
            DummyCommand::Draw { label, .. } => Some(label),
            _ => None,
        })
        .collect()
}

#[test]
fn test_effect_chain_renders_in_order() {
    let mut ctx = TestContext::new();
    let mut scene = empty_scene();
    add_plain_image(&mut scene, 1, "background");
    add_effect_layer(&mut scene, 2, (64, 64), 2);

    let mut executor = FrameExecutor::new(&scene, SURFACE).unwrap();
    executor.prepare(&scene, &mut ctx.device).unwrap();
    let stats = executor.execute(&scene, &mut ctx.device);

    assert_eq!(stats.draws, 4);
    assert_eq!(stats.skipped, 0);
    assert!(stats.presented);
    assert_eq!(
        draw_labels(&ctx),
        vec![
            "node 1",
            "layer 2",
            "layer 2 effect 0 pass 0",
            "layer 2 effect 1 pass 0"
        ]
    );
    assert!(matches!(
        ctx.recorder.commands().last(),
        Some(DummyCommand::Present(_))
    ));
}

#[test]
fn test_effect_passes_sample_the_previous_stage() {
    let mut ctx = TestContext::new();
    let mut scene = empty_scene();
    add_effect_layer(&mut scene, 1, (64, 64), 2);

    let mut executor = FrameExecutor::new(&scene, SURFACE).unwrap();
    executor.prepare(&scene, &mut ctx.device).unwrap();
    executor.execute(&scene, &mut ctx.device);

    let draws = ctx.recorder.draws();
    let (layer_fb, first_input, first_fb, second_input) = match draws.as_slice() {
        [
            DummyCommand::Draw { target: a, .. },
            DummyCommand::Draw {
                textures: b,
                target: c,
                ..
            },
            DummyCommand::Draw { textures: d, .. },
        ] => (*a, b[0], *c, d[0]),
        other => panic!("unexpected draws: {other:?}"),
    };
    assert!(first_input.is_some() && second_input.is_some());
    assert_ne!(first_input, second_input);
    assert_ne!(layer_fb, first_fb);
}

#[test]
fn test_missing_output_skips_only_that_pass() {
    let mut ctx = TestContext::new();
    let mut scene = empty_scene();
    add_effect_layer(&mut scene, 1, (64, 64), 2);
    if let Some(layer) = scene
        .cameras
        .get_mut("layer1")
        .and_then(|c| c.effect_layer.as_mut())
    {
        layer.effects[0].passes[0].output = "_rt_nowhere".into();
    }

    let mut executor = FrameExecutor::new(&scene, SURFACE).unwrap();
    executor.prepare(&scene, &mut ctx.device).unwrap();
    let stats = executor.execute(&scene, &mut ctx.device);

    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.draws, 2);
    assert!(stats.presented);
}

#[test]
fn test_unknown_textures_stay_unbound() {
    let mut ctx = TestContext::new();
    let mut scene = empty_scene();
    add_plain_image(&mut scene, 1, "_rt_imageLayerComposite_77_a");
    add_plain_image(&mut scene, 2, "not_loaded");

    let mut executor = FrameExecutor::new(&scene, SURFACE).unwrap();
    executor.prepare(&scene, &mut ctx.device).unwrap();
    let stats = executor.execute(&scene, &mut ctx.device);

    assert_eq!(stats.draws, 2);
    for draw in ctx.recorder.draws() {
        let DummyCommand::Draw { textures, .. } = draw else {
            unreachable!();
        };
        assert_eq!(textures, vec![None]);
    }
}

#[test]
fn test_incomplete_framebuffer_skips_draws() {
    // The default target is the first store realized: texture 1, framebuffer 2.
    let mut backend = DummyBackend::new();
    backend.mark_incomplete(GpuTexture(1));
    let mut ctx = TestContext::with_backend(backend, PoolLimits::default());

    let mut scene = empty_scene();
    add_plain_image(&mut scene, 1, "background");
    add_plain_image(&mut scene, 2, "foreground");

    let mut executor = FrameExecutor::new(&scene, SURFACE).unwrap();
    executor.prepare(&scene, &mut ctx.device).unwrap();
    let stats = executor.execute(&scene, &mut ctx.device);

    assert_eq!(stats.draws, 0);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.clears, 1);
    assert!(stats.presented);
}

#[test]
fn test_failed_shader_skips_draw() {
    let mut ctx =
        TestContext::with_backend(DummyBackend::new().with_failing_shaders(), PoolLimits::default());
    let mut scene = empty_scene();
    add_plain_image(&mut scene, 1, "background");

    let mut executor = FrameExecutor::new(&scene, SURFACE).unwrap();
    executor.prepare(&scene, &mut ctx.device).unwrap();
    let stats = executor.execute(&scene, &mut ctx.device);
    assert_eq!(stats.draws, 0);
    assert_eq!(stats.skipped, 1);
    assert!(stats.presented);
}

#[rstest]
#[case::doubled((640, 480))]
#[case::portrait((240, 320))]
fn test_resize_rederives_screen_targets(#[case] surface: (u32, u32)) {
    let mut ctx = TestContext::new();
    let mut scene = empty_scene();
    add_plain_image(&mut scene, 1, "background");

    let mut executor = FrameExecutor::new(&scene, SURFACE).unwrap();
    executor.prepare(&scene, &mut ctx.device).unwrap();
    executor.resize(&mut ctx.device, surface).unwrap();
    assert_eq!(executor.surface(), surface);

    ctx.recorder.clear();
    executor.execute(&scene, &mut ctx.device);

    let viewports: Vec<Viewport> = ctx
        .recorder
        .draws()
        .into_iter()
        .filter_map(|c| match c {
            DummyCommand::Draw { viewport, .. } => Some(viewport),
            _ => None,
        })
        .collect();
    assert_eq!(viewports, vec![Viewport::full(surface.0, surface.1)]);
}

#[test]
fn test_sprite_sheet_switches_slots() {
    let mut ctx = TestContext::new();
    let mut scene = empty_scene();
    let frame = SpriteFrame {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
        duration: 0.1,
    };
    scene.textures.insert(
        "flame".into(),
        SceneTexture {
            name: "flame".into(),
            header: TextureHeader {
                slot_count: 3,
                sprite: Some(SpriteSheet {
                    frames: vec![frame; 3],
                }),
                ..TextureHeader::sized(32, 32)
            },
        },
    );
    add_plain_image(&mut scene, 1, "flame");

    let mut executor = FrameExecutor::new(&scene, SURFACE).unwrap();
    executor.prepare(&scene, &mut ctx.device).unwrap();

    let slots: Vec<GpuTexture> = ctx
        .recorder
        .commands()
        .into_iter()
        .filter_map(|c| match c {
            DummyCommand::CreateTexture { texture, label, .. }
                if label.as_deref() == Some("flame") =>
            {
                Some(texture)
            }
            _ => None,
        })
        .collect();
    assert_eq!(slots.len(), 3);

    let mut sampled = Vec::new();
    for time in [0.05, 0.15, 0.25, 0.35] {
        scene.set_time(time);
        ctx.recorder.clear();
        executor.execute(&scene, &mut ctx.device);
        match ctx.recorder.draws().as_slice() {
            [DummyCommand::Draw { textures, .. }] => sampled.push(textures[0]),
            other => panic!("unexpected draws: {other:?}"),
        }
    }
    assert_eq!(
        sampled,
        vec![Some(slots[0]), Some(slots[1]), Some(slots[2]), Some(slots[0])]
    );
}

#[test]
fn test_pool_exhaustion_surfaces_at_prepare() {
    let limits = PoolLimits {
        textures: 1,
        ..PoolLimits::default()
    };
    let mut ctx = TestContext::with_backend(DummyBackend::new(), limits);
    let mut scene = empty_scene();
    add_effect_layer(&mut scene, 1, (64, 64), 2);

    let mut executor = FrameExecutor::new(&scene, SURFACE).unwrap();
    let err = executor.prepare(&scene, &mut ctx.device).unwrap_err();
    assert!(matches!(
        err,
        GraphicsError::Pool(PoolError::Exhausted { capacity: 1 })
    ));

    // Execution still completes with whatever storage exists.
    let stats = executor.execute(&scene, &mut ctx.device);
    assert!(stats.skipped > 0);
    assert!(stats.presented);
}

#[test]
fn test_release_frees_every_resource() {
    let mut ctx = TestContext::new();
    let mut scene = empty_scene();
    scene.textures.insert(
        "background".into(),
        SceneTexture {
            name: "background".into(),
            header: TextureHeader::sized(16, 16),
        },
    );
    add_plain_image(&mut scene, 1, "background");
    add_effect_layer(&mut scene, 2, (64, 64), 3);

    let mut executor = FrameExecutor::new(&scene, SURFACE).unwrap();
    executor.prepare(&scene, &mut ctx.device).unwrap();
    assert_ne!(ctx.device.pool().counts(), (0, 0, 0));

    executor.release(&mut ctx.device);
    assert_eq!(ctx.device.pool().counts(), (0, 0, 0));
}

#[test]
fn test_default_target_is_presented() {
    let mut ctx = TestContext::new();
    let scene = empty_scene();
    let mut executor = FrameExecutor::new(&scene, SURFACE).unwrap();
    executor.prepare(&scene, &mut ctx.device).unwrap();
    let stats = executor.execute(&scene, &mut ctx.device);

    let default = executor.graph().target(DEFAULT_TARGET).unwrap();
    assert!(executor.compiled().physical_index(default).is_some());
    assert_eq!(stats.clears, 1);
    assert!(stats.presented);
}
