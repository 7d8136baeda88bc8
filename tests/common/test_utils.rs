use orbit_scenes::{
    Point3,
    flow::{Out, SceneFlow},
    frame_loop::{CancelToken, FrameContext, FrameScheduler, FrameTime, SceneRenderer, SurfaceSize},
};

/// What the renderer saw on one render call.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRecord {
    pub node_count: usize,
    pub camera_position: Point3<f32>,
    pub camera_target: Point3<f32>,
    pub aspect: f32,
    pub clear_colour: wgpu::Color,
}

/// Headless renderer that remembers every call.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub renders: Vec<RenderRecord>,
    pub resizes: Vec<SurfaceSize>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> &RenderRecord {
        self.renders.last().expect("nothing was rendered")
    }
}

impl SceneRenderer for RecordingRenderer {
    fn render(&mut self, frame: &FrameContext) -> anyhow::Result<()> {
        self.renders.push(RenderRecord {
            node_count: frame.scene.node_count(),
            camera_position: frame.camera.position,
            camera_target: frame.camera.target,
            aspect: frame.projection.aspect,
            clear_colour: frame.clear_colour,
        });
        Ok(())
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.resizes.push(size);
    }
}

/// Allows `frames` more frames, then cancels the token.
#[derive(Debug)]
pub struct CountdownScheduler {
    remaining: u32,
    pub calls: u32,
}

impl CountdownScheduler {
    pub fn new(frames: u32) -> Self {
        Self {
            remaining: frames,
            calls: 0,
        }
    }
}

impl FrameScheduler for CountdownScheduler {
    fn next_frame(&mut self, token: &CancelToken) {
        self.calls += 1;
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            token.cancel();
        }
    }
}

/// Flow that only counts its hooks and remembers the frame times it saw.
#[derive(Debug, Default)]
pub struct CountingFlow {
    pub init_invocations: u32,
    pub update_invocations: u32,
    pub times: Vec<FrameTime>,
}

impl SceneFlow for CountingFlow {
    fn on_init(&mut self, _: &mut FrameContext) -> Out {
        self.init_invocations += 1;
        Out::Empty
    }

    fn on_update(&mut self, _: &mut FrameContext, time: FrameTime) -> Out {
        self.update_invocations += 1;
        self.times.push(time);
        Out::Empty
    }
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {} to be close to {}",
        actual,
        expected
    );
}

/// A small typeface: a box for `?`, a hollow `O`, a curved `C` and a space.
/// Every other character falls back to `?`.
pub const TEST_FONT: &str = r#"{
    "familyName": "Test Sans",
    "resolution": 1000,
    "boundingBox": { "yMin": -200, "xMin": 0, "yMax": 800, "xMax": 700 },
    "underlineThickness": 50,
    "glyphs": {
        "?": { "ha": 600, "x_min": 100, "x_max": 500, "o": "m 100 0 l 500 0 l 500 700 l 100 700 l 100 0" },
        "O": { "ha": 700, "o": "m 50 0 l 650 0 l 650 700 l 50 700 l 50 0 m 200 150 l 200 550 l 500 550 l 500 150 l 200 150" },
        "C": { "ha": 700, "o": "m 100 0 l 500 0 q 500 400 700 200 l 100 400 l 100 0" },
        " ": { "ha": 300, "o": "" }
    }
}"#;
