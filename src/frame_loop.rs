//! Time source, cancellation and the per-frame tick.
//!
//! Everything here is free of GPU and window types so the loop can be driven
//! headlessly with a [`ManualClock`] and a custom [`FrameScheduler`].

use std::{
    cell::Cell,
    rc::Rc,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use crate::{
    camera::{Camera, Projection},
    data_structures::scene_graph::Scene,
    flow::{Out, SceneFlow},
    input::{Cursor, Viewport},
};

pub trait Clock {
    /// Monotonic time since an arbitrary origin.
    fn now(&self) -> Duration;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: instant::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: instant::Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Timing of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Time since the first tick.
    pub elapsed: Duration,
    /// Time since the previous tick, zero on the first.
    pub delta: Duration,
    /// Zero-based tick counter.
    pub frame: u64,
}

impl FrameTime {
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

/// Shared stop flag. Clones observe the same cancellation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Physical size of the render surface and the pixel ratio it was derived with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

/// The mutable state a demo shares between input handling and frames.
#[derive(Debug, Clone)]
pub struct FrameContext {
    pub scene: Scene,
    pub camera: Camera,
    pub projection: Projection,
    pub cursor: Cursor,
    pub viewport: Viewport,
    pub clear_colour: wgpu::Color,
}

impl FrameContext {
    pub fn new(viewport: Viewport) -> Self {
        let size = viewport.surface_size();
        Self {
            scene: Scene::new(),
            camera: Camera::new((0.0, 0.0, 3.0), (0.0, 0.0, 0.0)),
            projection: Projection::new(size.width, size.height, cgmath::Deg(75.0), 0.1, 1000.0),
            cursor: Cursor::default(),
            viewport,
            clear_colour: wgpu::Color::BLACK,
        }
    }

    /// Physical size the render surface must have. Follows the viewport, so
    /// the pixel ratio cap and fixed viewports carry over.
    pub fn surface_size(&self) -> SurfaceSize {
        self.viewport.surface_size()
    }
}

/// Draws a [`FrameContext`]. Implemented by the GPU renderer and by test doubles.
pub trait SceneRenderer {
    fn render(&mut self, frame: &FrameContext) -> anyhow::Result<()>;
    fn resize(&mut self, size: SurfaceSize);
}

/// Decides when the next tick happens.
pub trait FrameScheduler {
    fn next_frame(&mut self, token: &CancelToken);
}

#[derive(Debug)]
pub struct FrameLoop<C: Clock> {
    clock: C,
    start: Option<Duration>,
    last: Duration,
    frames: u64,
}

impl<C: Clock> FrameLoop<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            start: None,
            last: Duration::ZERO,
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn next_time(&mut self) -> FrameTime {
        let now = self.clock.now();
        let start = *self.start.get_or_insert(now);
        let delta = if self.frames == 0 {
            Duration::ZERO
        } else {
            now.saturating_sub(self.last)
        };
        let time = FrameTime {
            elapsed: now.saturating_sub(start),
            delta,
            frame: self.frames,
        };
        self.last = now;
        self.frames += 1;
        time
    }

    /// Runs one frame: updates the flow, then issues exactly one render call.
    ///
    /// The flow's output is returned unresolved so the caller can decide how
    /// to run its futures.
    pub fn tick(
        &mut self,
        frame: &mut FrameContext,
        flow: &mut dyn SceneFlow,
        renderer: &mut dyn SceneRenderer,
    ) -> anyhow::Result<Out> {
        let time = self.next_time();
        let out = flow.on_update(frame, time);
        renderer.render(frame)?;
        Ok(out)
    }

    /// Ticks until `token` is cancelled, resolving flow outputs in place.
    ///
    /// Returns the number of frames rendered.
    pub fn run_until_cancelled(
        &mut self,
        frame: &mut FrameContext,
        flow: &mut dyn SceneFlow,
        renderer: &mut dyn SceneRenderer,
        scheduler: &mut dyn FrameScheduler,
        token: &CancelToken,
    ) -> anyhow::Result<u64> {
        let first = self.frames;
        while !token.is_cancelled() {
            let out = self.tick(frame, flow, renderer)?;
            out.resolve_blocking(frame);
            scheduler.next_frame(token);
        }
        log::info!("frame loop cancelled after {} frames", self.frames - first);
        Ok(self.frames - first)
    }
}
