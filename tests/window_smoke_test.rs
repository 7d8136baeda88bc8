#[cfg(feature = "integration-tests")]
use orbit_scenes::{
    flow::{Out, SceneFlow, ViewportMode},
    frame_loop::{CancelToken, FrameContext, FrameTime},
    scenes::cube::CubeFlow,
};

/// Runs the wrapped flow for a fixed number of frames.
#[cfg(feature = "integration-tests")]
struct Bounded {
    inner: CubeFlow,
    frames: u64,
    token: CancelToken,
}

#[cfg(feature = "integration-tests")]
impl SceneFlow for Bounded {
    fn on_init(&mut self, frame: &mut FrameContext) -> Out {
        self.inner.on_init(frame)
    }

    fn on_update(&mut self, frame: &mut FrameContext, time: FrameTime) -> Out {
        if time.frame + 1 >= self.frames {
            self.token.cancel();
        }
        self.inner.on_update(frame, time)
    }

    fn viewport_mode(&self) -> ViewportMode {
        self.inner.viewport_mode()
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn cube_renders_a_few_frames_and_exits() {
    let token = CancelToken::new();
    let flow = Bounded {
        inner: CubeFlow::default(),
        frames: 10,
        token: token.clone(),
    };

    if let Err(e) = orbit_scenes::flow::run_with_token(flow, token.clone()) {
        panic!("{:#}", e);
    }
    assert!(token.is_cancelled());
}
