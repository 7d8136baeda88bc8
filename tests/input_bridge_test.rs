use orbit_scenes::{
    frame_loop::{FrameContext, SceneRenderer},
    input::{InputBridge, InputEvent, Viewport},
};

use crate::common::test_utils::{RecordingRenderer, assert_close};

mod common;

fn resize(width: f64, height: f64, scale_factor: f64) -> InputEvent {
    InputEvent::Resized {
        width,
        height,
        scale_factor,
    }
}

#[test]
fn resize_updates_viewport_and_aspect() {
    let mut frame = FrameContext::new(Viewport::fixed(800, 600));
    let mut renderer = RecordingRenderer::new();
    let bridge = InputBridge::new(true);

    assert!(bridge.handle(&mut frame, Some(&mut renderer), &resize(1280.0, 720.0, 1.0)));

    assert_eq!(frame.viewport.width, 1280.0);
    assert_eq!(frame.viewport.height, 720.0);
    assert_close(frame.projection.aspect, 1280.0 / 720.0);
    assert_eq!(renderer.resizes.len(), 1);
    assert_eq!(renderer.resizes[0].width, 1280);
    assert_eq!(renderer.resizes[0].height, 720);
}

#[test]
fn pixel_ratio_is_capped_at_two() {
    let mut frame = FrameContext::new(Viewport::fixed(800, 600));
    let mut renderer = RecordingRenderer::new();
    let bridge = InputBridge::default();

    for (host, applied) in [(1.0, 1.0), (1.25, 1.25), (2.0, 2.0), (3.0, 2.0)] {
        bridge.handle(&mut frame, Some(&mut renderer), &resize(400.0, 300.0, host));
        assert_eq!(frame.viewport.pixel_ratio, applied);
        let size = renderer.resizes.last().unwrap();
        assert_eq!(size.pixel_ratio, applied);
        assert_eq!(size.width, (400.0 * applied) as u32);
    }
}

#[test]
fn zero_sized_resize_is_ignored() {
    let mut frame = FrameContext::new(Viewport::fixed(800, 600));
    let mut renderer = RecordingRenderer::new();
    let bridge = InputBridge::default();
    let aspect = frame.projection.aspect;

    assert!(!bridge.handle(&mut frame, Some(&mut renderer), &resize(0.0, 600.0, 1.0)));
    assert!(!bridge.handle(&mut frame, Some(&mut renderer), &resize(800.0, 0.0, 1.0)));

    assert_eq!(frame.viewport, Viewport::fixed(800, 600));
    assert_eq!(frame.projection.aspect, aspect);
    assert!(renderer.resizes.is_empty());
}

#[test]
fn fixed_viewport_ignores_resize() {
    let mut frame = FrameContext::new(Viewport::fixed(800, 600));
    let bridge = InputBridge::new(false);

    assert!(!bridge.handle(&mut frame, None, &resize(1920.0, 1080.0, 2.0)));
    assert_eq!(frame.viewport, Viewport::fixed(800, 600));
}

#[test]
fn pointer_move_normalizes_cursor() {
    let mut frame = FrameContext::new(Viewport::fixed(800, 600));
    let bridge = InputBridge::default();

    bridge.handle(&mut frame, None, &InputEvent::PointerMoved { x: 200.0, y: 450.0 });

    assert_eq!(frame.cursor.x, 200.0 / 800.0 - 0.5);
    assert_eq!(frame.cursor.y, -(450.0 / 600.0) + 0.5);
}

#[test]
fn pointer_move_uses_latest_viewport() {
    let mut frame = FrameContext::new(Viewport::fixed(800, 600));
    let bridge = InputBridge::default();

    bridge.handle(&mut frame, None, &resize(1000.0, 500.0, 1.0));
    bridge.handle(&mut frame, None, &InputEvent::PointerMoved { x: 1000.0, y: 0.0 });
    assert_eq!((frame.cursor.x, frame.cursor.y), (0.5, 0.5));

    // last writer wins
    bridge.handle(&mut frame, None, &InputEvent::PointerMoved { x: 500.0, y: 250.0 });
    assert_eq!((frame.cursor.x, frame.cursor.y), (0.0, 0.0));
}

#[test]
fn renderer_can_be_used_through_the_trait() {
    let mut renderer = RecordingRenderer::new();
    let frame = FrameContext::new(Viewport::fixed(800, 600));
    let dynamic: &mut dyn SceneRenderer = &mut renderer;
    dynamic.render(&frame).unwrap();
    assert_eq!(renderer.renders.len(), 1);
    assert_eq!(renderer.last().node_count, 0);
}

#[test]
fn surface_recovers_at_the_last_applied_size() {
    let mut frame = FrameContext::new(Viewport::fixed(800, 600));
    let mut renderer = RecordingRenderer::new();
    let bridge = InputBridge::new(true);

    bridge.handle(&mut frame, Some(&mut renderer), &resize(1200.0, 900.0, 3.0));
    let size = frame.surface_size();
    assert_eq!((size.width, size.height), (2400, 1800));
    assert_eq!(size.pixel_ratio, 2.0);
    assert_eq!(&size, renderer.resizes.last().unwrap());

    let mut fixed = FrameContext::new(Viewport::fixed(800, 600));
    InputBridge::new(false).handle(&mut fixed, None, &resize(1920.0, 1080.0, 2.0));
    let size = fixed.surface_size();
    assert_eq!((size.width, size.height), (800, 600));
    assert_eq!(size.pixel_ratio, 1.0);
}
