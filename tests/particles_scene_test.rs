use std::{f32::consts::PI, time::Duration};

use orbit_scenes::{
    data_structures::scene_graph::{Geometry, Light, Scene},
    flow::SceneFlow,
    frame_loop::{CancelToken, FrameContext, FrameLoop, ManualClock},
    input::Viewport,
    scenes::particles::{FontSource, ParticlesConfig, ParticlesFlow, build_particles},
};
use rand::{SeedableRng, rngs::StdRng};

use crate::common::test_utils::{
    CountdownScheduler, RecordingRenderer, TEST_FONT, assert_close,
};

mod common;

#[test]
fn builds_five_hundred_particles_inside_the_box() {
    let config = ParticlesConfig::default();
    let mut scene = Scene::new();
    let particles = build_particles(&config, &mut scene, &mut StdRng::seed_from_u64(7)).unwrap();

    assert_eq!(particles.len(), 500);
    assert_eq!(scene.node_count(), 500);
    for &id in particles.ids() {
        let transform = scene.node(id).transform;
        assert!((-15.0..=15.0).contains(&transform.position.x));
        assert!((-10.0..=10.0).contains(&transform.position.y));
        assert!((-10.0..=10.0).contains(&transform.position.z));
        for angle in [transform.rotation.x, transform.rotation.y, transform.rotation.z] {
            assert!((0.0..PI).contains(&angle), "rotation {} out of range", angle);
        }
    }
}

#[test]
fn both_shapes_appear() {
    let config = ParticlesConfig::default();
    let mut scene = Scene::new();
    let particles = build_particles(&config, &mut scene, &mut StdRng::seed_from_u64(42)).unwrap();

    let tori = particles
        .ids()
        .iter()
        .filter(|&&id| {
            matches!(
                scene.geometry(scene.node(id).geometry),
                Geometry::Torus { .. }
            )
        })
        .count();
    assert!(tori > 150 && tori < 350, "{} tori out of 500", tori);
}

#[test]
fn same_seed_same_scene() {
    let config = ParticlesConfig::default();
    let mut a = Scene::new();
    let mut b = Scene::new();
    build_particles(&config, &mut a, &mut StdRng::seed_from_u64(3)).unwrap();
    build_particles(&config, &mut b, &mut StdRng::seed_from_u64(3)).unwrap();

    let transforms = |scene: &Scene| {
        scene
            .nodes()
            .map(|(_, node)| node.transform)
            .collect::<Vec<_>>()
    };
    assert_eq!(transforms(&a), transforms(&b));
}

fn init(flow: &mut ParticlesFlow) -> FrameContext {
    let mut frame = FrameContext::new(Viewport::new(1024.0, 768.0, 1.0));
    flow.on_init(&mut frame).resolve_blocking(&mut frame);
    frame
}

#[test]
fn zero_particles_leaves_lights_and_text() {
    let config = ParticlesConfig {
        count: 0,
        ..Default::default()
    };
    let mut flow = ParticlesFlow::with_rng(config, StdRng::seed_from_u64(1))
        .with_font(FontSource::Json(TEST_FONT.to_string()));
    let frame = init(&mut flow);

    assert!(flow.particles().is_empty());
    assert_eq!(frame.scene.node_count(), 1);
    assert_eq!(frame.scene.lights.len(), 2);
    assert!(matches!(frame.scene.lights[0], Light::Ambient { .. }));
    assert!(matches!(frame.scene.lights[1], Light::Directional { .. }));

    let (_, text) = frame.scene.nodes().next().unwrap();
    match frame.scene.geometry(text.geometry) {
        Geometry::Custom { data, .. } => {
            let (min, max) = data.bounds().unwrap();
            // centered on the origin
            assert_close(min.x + max.x, 0.0);
            assert_close(min.y + max.y, 0.0);
            assert_close(min.z + max.z, 0.0);
        }
        other => panic!("expected text geometry, got {:?}", other),
    }
}

#[test]
fn missing_font_falls_back_to_a_box() {
    let config = ParticlesConfig {
        count: 10,
        ..Default::default()
    };
    let mut flow = ParticlesFlow::with_rng(config, StdRng::seed_from_u64(1))
        .with_font(FontSource::Asset("fonts/does_not_exist.typeface.json".to_string()));
    let frame = init(&mut flow);

    assert_eq!(frame.scene.node_count(), 11);
    let (_, text) = frame.scene.nodes().last().unwrap();
    assert!(matches!(
        frame.scene.geometry(text.geometry),
        Geometry::Box { .. }
    ));
}

#[test]
fn bundled_font_builds_the_text_mesh() {
    let config = ParticlesConfig {
        count: 10,
        ..Default::default()
    };
    let mut flow = ParticlesFlow::with_rng(config, StdRng::seed_from_u64(1));
    let frame = init(&mut flow);

    assert_eq!(frame.scene.node_count(), 11);
    let (_, text) = frame.scene.nodes().last().unwrap();
    match frame.scene.geometry(text.geometry) {
        Geometry::Custom { data, .. } => {
            let (min, max) = data.bounds().unwrap();
            assert!(max.x - min.x > 4.0);
            assert_close(min.x + max.x, 0.0);
        }
        other => panic!("expected text geometry, got {:?}", other),
    }
}

#[test]
fn camera_and_clear_colour_are_configured() {
    let mut flow = ParticlesFlow::with_rng(ParticlesConfig::default(), StdRng::seed_from_u64(9))
        .with_font(FontSource::Json(TEST_FONT.to_string()));
    let frame = init(&mut flow);

    assert_close(frame.camera.position.x, 1.0);
    assert_close(frame.camera.position.y, 1.0);
    assert_close(frame.camera.position.z, 5.0);
    assert_close(frame.projection.aspect, 1024.0 / 768.0);
    assert_close(frame.projection.zfar, 100.0);
    let grey = frame.clear_colour;
    assert!((grey.r - grey.g).abs() < 1e-9 && (grey.g - grey.b).abs() < 1e-9);
    assert!(grey.r > 0.2 && grey.r < 0.3);
}

#[test]
fn particles_rotate_with_elapsed_time() {
    let config = ParticlesConfig {
        count: 20,
        ..Default::default()
    };
    let mut flow = ParticlesFlow::with_rng(config, StdRng::seed_from_u64(5))
        .with_font(FontSource::Json(TEST_FONT.to_string()));
    let mut frame = init(&mut flow);
    let z_before: Vec<f32> = flow
        .particles()
        .ids()
        .iter()
        .map(|&id| frame.scene.node(id).transform.rotation.z)
        .collect();

    let clock = ManualClock::new();
    let mut frame_loop = FrameLoop::new(clock.clone());
    let mut renderer = RecordingRenderer::new();
    frame_loop
        .tick(&mut frame, &mut flow, &mut renderer)
        .unwrap();
    clock.advance(Duration::from_secs(3));
    frame_loop
        .tick(&mut frame, &mut flow, &mut renderer)
        .unwrap();

    for (&id, z) in flow.particles().ids().iter().zip(z_before) {
        let rotation = frame.scene.node(id).transform.rotation;
        assert_close(rotation.x, 0.3);
        assert_close(rotation.y, 0.3);
        assert_eq!(rotation.z, z);
    }
    assert_eq!(renderer.renders.len(), 2);
    assert_eq!(renderer.last().node_count, 21);
}

#[test]
fn headless_run_renders_every_frame() {
    let mut flow = ParticlesFlow::with_rng(ParticlesConfig::default(), StdRng::seed_from_u64(11))
        .with_font(FontSource::Json(TEST_FONT.to_string()));
    let mut frame = init(&mut flow);
    let mut renderer = RecordingRenderer::new();
    let token = CancelToken::new();

    let frames = FrameLoop::new(ManualClock::new())
        .run_until_cancelled(
            &mut frame,
            &mut flow,
            &mut renderer,
            &mut CountdownScheduler::new(4),
            &token,
        )
        .unwrap();

    assert_eq!(frames, 4);
    assert!(renderer.renders.iter().all(|r| r.node_count == 501));
}
