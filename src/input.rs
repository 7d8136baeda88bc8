//! Viewport, normalized cursor and the bridge that turns host events into
//! state changes on the [`FrameContext`].

use crate::frame_loop::{FrameContext, SceneRenderer, SurfaceSize};

/// Upper bound for the device pixel ratio applied to the render surface.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

pub fn capped_pixel_ratio(host_ratio: f64) -> f64 {
    if host_ratio.is_finite() && host_ratio > 0.0 {
        host_ratio.min(MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}

/// Logical size of the drawing area plus the pixel ratio applied to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, host_ratio: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio: capped_pixel_ratio(host_ratio),
        }
    }

    /// A viewport that is never resized and renders at ratio 1.
    pub fn fixed(width: u32, height: u32) -> Self {
        Self::new(width as f64, height as f64, 1.0)
    }

    pub fn aspect(&self) -> f32 {
        (self.width / self.height) as f32
    }

    /// Physical size of the render surface.
    pub fn surface_size(&self) -> SurfaceSize {
        SurfaceSize {
            width: (self.width * self.pixel_ratio).round().max(1.0) as u32,
            height: (self.height * self.pixel_ratio).round().max(1.0) as u32,
            pixel_ratio: self.pixel_ratio,
        }
    }
}

/// Cursor position normalized to roughly `[-0.5, 0.5]` on both axes, y up.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
}

impl Cursor {
    pub fn on_pointer_move(&mut self, px: f64, py: f64, viewport: &Viewport) {
        self.x = px / viewport.width - 0.5;
        self.y = -(py / viewport.height) + 0.5;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Host events in logical pixels, independent of the windowing backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Resized {
        width: f64,
        height: f64,
        scale_factor: f64,
    },
    PointerMoved {
        x: f64,
        y: f64,
    },
    PointerButton {
        button: PointerButton,
        pressed: bool,
    },
    /// Positive when the wheel rolls towards the user, which zooms out.
    Wheel {
        delta_y: f64,
    },
}

/// Applies resize and pointer events to the shared frame state.
#[derive(Debug, Clone, Copy)]
pub struct InputBridge {
    /// Fixed-size demos ignore resize events.
    pub track_resize: bool,
}

impl Default for InputBridge {
    fn default() -> Self {
        Self { track_resize: true }
    }
}

impl InputBridge {
    pub fn new(track_resize: bool) -> Self {
        Self { track_resize }
    }

    /// Returns `true` if the event changed the frame state.
    pub fn handle(
        &self,
        frame: &mut FrameContext,
        renderer: Option<&mut dyn SceneRenderer>,
        event: &InputEvent,
    ) -> bool {
        match *event {
            InputEvent::Resized {
                width,
                height,
                scale_factor,
            } => {
                if !self.track_resize {
                    return false;
                }
                match frame.on_resize(width, height, scale_factor) {
                    Some(size) => {
                        if let Some(renderer) = renderer {
                            renderer.resize(size);
                        }
                        true
                    }
                    None => false,
                }
            }
            InputEvent::PointerMoved { x, y } => {
                let viewport = frame.viewport;
                frame.cursor.on_pointer_move(x, y, &viewport);
                true
            }
            InputEvent::PointerButton { .. } | InputEvent::Wheel { .. } => false,
        }
    }
}

impl FrameContext {
    /// Stores the new viewport and updates the projection aspect.
    ///
    /// Returns the physical surface size to configure, or `None` when either
    /// dimension is zero (minimized window).
    pub fn on_resize(&mut self, width: f64, height: f64, host_ratio: f64) -> Option<SurfaceSize> {
        if width <= 0.0 || height <= 0.0 {
            log::debug!("ignoring resize to {}x{}", width, height);
            return None;
        }
        self.viewport = Viewport::new(width, height, host_ratio);
        self.projection.set_aspect(self.viewport.aspect());
        Some(self.viewport.surface_size())
    }
}
