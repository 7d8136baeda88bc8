//! Flow control and application event loop.
//!
//! A "flow" is one demo: it builds its scene, reacts to input and advances its
//! animation state once per frame. The [`App`] owns the window, the GPU
//! renderer and the [`FrameContext`] shared with the flow, and drives the
//! [`FrameLoop`] from winit's redraw events.
//!
//! # User-facing types
//!
//! - [`SceneFlow`] is the trait every demo implements
//! - [`Out`] lets lifecycle hooks hand back futures whose results mutate the frame state
//!
//! # Lifecycle Flow
//!
//! 1. The window is created and the viewport derived from it
//! 2. `on_init` builds the scene (futures it returns are resolved off the hot path)
//! 3. The GPU context is created
//! 4. Every host event is translated into an [`InputEvent`], applied by the
//!    [`InputBridge`] and then passed to `on_input`
//! 5. Every redraw ticks the frame loop: `on_update`, one render, next redraw request
//! 6. Closing the window or cancelling the [`CancelToken`] ends the loop

use std::{fmt::Debug, pin::Pin, sync::Arc};

use winit::{
    application::ApplicationHandler,
    event::{MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    frame_loop::{CancelToken, FrameContext, FrameLoop, FrameTime, SceneRenderer, SystemClock},
    input::{InputBridge, InputEvent, PointerButton, Viewport},
    render::Renderer,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// A deferred change to the frame state, produced by an async operation.
pub type StateMutation = Box<dyn FnOnce(&mut FrameContext)>;

///
/// Output type of every lifecycle hook.
///
/// `Out::FutFn` holds futures that resolve to state mutations. Natively they are
/// blocked on by the app's tokio runtime and applied right away; on the web they
/// are spawned and their mutations are delivered back through the event loop.
///
/// `Empty` is the default output used when nothing asynchronous happens.
///
pub enum Out {
    FutFn(Vec<Box<dyn Future<Output = StateMutation>>>),
    Empty,
}

impl Default for Out {
    fn default() -> Self {
        Self::Empty
    }
}

impl Debug for Out {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FutFn(futures) => write!(f, "FutFn({} futures)", futures.len()),
            Self::Empty => f.write_str("Empty"),
        }
    }
}

impl Out {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    fn into_joined(self) -> Option<impl Future<Output = Vec<StateMutation>>> {
        match self {
            Out::FutFn(futures) => {
                let futures: Vec<Pin<Box<dyn Future<Output = StateMutation>>>> =
                    futures.into_iter().map(Pin::from).collect();
                Some(futures::future::join_all(futures))
            }
            Out::Empty => None,
        }
    }

    /// Resolves all futures on the current thread and applies their mutations.
    pub fn resolve_blocking(self, frame: &mut FrameContext) {
        if let Some(fut) = self.into_joined() {
            for mutation in futures::executor::block_on(fut) {
                mutation(frame);
            }
        }
    }
}

/// How the drawing area is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportMode {
    /// Fixed physical size, resize events are ignored.
    Fixed { width: u32, height: u32 },
    /// Follows the window, with the pixel ratio capped.
    Window,
}

/// Trait for implementing a demo.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once the window exists; build the scene and set camera,
///    projection and clear colour on the frame
/// 2. `on_input()` is called for each translated host event, after the frame's
///    viewport and cursor were updated
/// 3. `on_update()` is called every frame right before rendering
///
pub trait SceneFlow {
    fn on_init(&mut self, frame: &mut FrameContext) -> Out;

    fn on_input(&mut self, _frame: &mut FrameContext, _event: &InputEvent) -> Out {
        Out::Empty
    }

    fn on_update(&mut self, frame: &mut FrameContext, time: FrameTime) -> Out;

    fn viewport_mode(&self) -> ViewportMode {
        ViewportMode::Window
    }

    fn title(&self) -> &str {
        "orbit-scenes"
    }
}

impl Debug for dyn SceneFlow + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SceneFlow")
    }
}

pub(crate) enum FlowEvent {
    #[allow(dead_code)]
    Initialized(Renderer),
    #[allow(dead_code)]
    Mut(StateMutation),
    #[allow(dead_code)]
    Exit,
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::Mut(_) => f.write_str("Mut(|&mut FrameContext| -> {...})"),
            Self::Exit => f.write_str("Exit"),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    flow: Box<dyn SceneFlow>,
    frame: FrameContext,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    frame_loop: FrameLoop<SystemClock>,
    bridge: InputBridge,
    token: CancelToken,
}

impl App {
    fn new(
        event_loop: &EventLoop<FlowEvent>,
        flow: Box<dyn SceneFlow>,
        token: CancelToken,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        let (viewport, bridge) = match flow.viewport_mode() {
            ViewportMode::Fixed { width, height } => {
                (Viewport::fixed(width, height), InputBridge::new(false))
            }
            ViewportMode::Window => (Viewport::fixed(800, 600), InputBridge::new(true)),
        };
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            flow,
            frame: FrameContext::new(viewport),
            window: None,
            renderer: None,
            frame_loop: FrameLoop::new(SystemClock::default()),
            bridge,
            token,
        })
    }

    /// Factor between winit's physical coordinates and the viewport's.
    fn input_scale(&self) -> f64 {
        match (self.flow.viewport_mode(), &self.window) {
            (ViewportMode::Window, Some(window)) => window.scale_factor(),
            _ => 1.0,
        }
    }

    fn translate(&self, event: &WindowEvent) -> Option<InputEvent> {
        let scale = self.input_scale();
        match event {
            WindowEvent::Resized(size) => Some(InputEvent::Resized {
                width: size.width as f64 / scale,
                height: size.height as f64 / scale,
                scale_factor: scale,
            }),
            WindowEvent::CursorMoved { position, .. } => Some(InputEvent::PointerMoved {
                x: position.x / scale,
                y: position.y / scale,
            }),
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Right => PointerButton::Secondary,
                    MouseButton::Middle => PointerButton::Middle,
                    _ => return None,
                };
                Some(InputEvent::PointerButton {
                    button,
                    pressed: state.is_pressed(),
                })
            }
            // winit reports scrolling up as positive, the browser as negative.
            WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Wheel {
                delta_y: match delta {
                    MouseScrollDelta::LineDelta(_, y) => -(*y as f64) * 100.0,
                    MouseScrollDelta::PixelDelta(position) => -position.y,
                },
            }),
            _ => None,
        }
    }

    fn handle_input(&mut self, event: InputEvent) {
        self.bridge.handle(
            &mut self.frame,
            self.renderer
                .as_mut()
                .map(|renderer| renderer as &mut dyn SceneRenderer),
            &event,
        );
        let out = self.flow.on_input(&mut self.frame, &event);
        handle_flow_output(
            #[cfg(not(target_arch = "wasm32"))]
            &self.async_runtime,
            &mut self.frame,
            self.proxy.clone(),
            out,
        );
    }

    fn viewport_for(&self, window: &Window) -> Viewport {
        match self.flow.viewport_mode() {
            ViewportMode::Fixed { width, height } => Viewport::fixed(width, height),
            ViewportMode::Window => {
                let size = window.inner_size();
                let scale = window.scale_factor();
                if size.width == 0 || size.height == 0 {
                    return self.frame.viewport;
                }
                Viewport::new(size.width as f64 / scale, size.height as f64 / scale, scale)
            }
        }
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(self.flow.title());
        if let ViewportMode::Fixed { width, height } = self.flow.viewport_mode() {
            window_attributes = window_attributes
                .with_inner_size(winit::dpi::PhysicalSize::new(width, height))
                .with_resizable(false);
        }

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_SELECTOR: &str = "canvas.webgl";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document
                .query_selector(CANVAS_SELECTOR)
                .ok()
                .flatten()
                .unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create a window: {}", e);
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let viewport = self.viewport_for(&window);
        self.frame.viewport = viewport;
        self.frame.projection.set_aspect(viewport.aspect());
        let out = self.flow.on_init(&mut self.frame);
        handle_flow_output(
            #[cfg(not(target_arch = "wasm32"))]
            &self.async_runtime,
            &mut self.frame,
            self.proxy.clone(),
            out,
        );

        let size = self.frame.surface_size();
        let init_future = Renderer::new(window, size);

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(renderer) => {
                    renderer.window().request_redraw();
                    self.renderer = Some(renderer);
                }
                Err(e) => {
                    log::error!("App initialization failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok(renderer) => {
                        if proxy.send_event(FlowEvent::Initialized(renderer)).is_err() {
                            log::error!("Event loop closed before the renderer was ready");
                        }
                    }
                    Err(e) => {
                        log::error!("App initialization failed: {:#}", e);
                        let _ = proxy.send_event(FlowEvent::Exit);
                    }
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            FlowEvent::Initialized(mut renderer) => {
                // This is the message from our wasm `spawn_local`
                if let Some(window) = &self.window {
                    let viewport = self.viewport_for(window);
                    if let Some(size) =
                        self.frame
                            .on_resize(viewport.width, viewport.height, viewport.pixel_ratio)
                    {
                        renderer.resize(size);
                    }
                }
                renderer.window().request_redraw();
                self.renderer = Some(renderer);
            }
            FlowEvent::Mut(mutation) => mutation(&mut self.frame),
            FlowEvent::Exit => {
                self.token.cancel();
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if let Some(input) = self.translate(&event) {
            self.handle_input(input);
        }

        match event {
            WindowEvent::CloseRequested => {
                self.token.cancel();
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let Some(renderer) = self.renderer.as_mut() else {
                    return;
                };
                let result = self
                    .frame_loop
                    .tick(&mut self.frame, self.flow.as_mut(), renderer);
                match result {
                    Ok(out) => handle_flow_output(
                        #[cfg(not(target_arch = "wasm32"))]
                        &self.async_runtime,
                        &mut self.frame,
                        self.proxy.clone(),
                        out,
                    ),
                    Err(e) => log::error!("Unable to render {:#}", e),
                }
                if self.token.is_cancelled() {
                    log::info!("exiting after {} frames", self.frame_loop.frames());
                    event_loop.exit();
                } else if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn handle_flow_output(
    #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    frame: &mut FrameContext,
    #[allow(unused_variables)] proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    out: Out,
) {
    let Some(fut) = out.into_joined() else {
        return;
    };

    // Mutate the state if the arch supports blocking, create an event otherwise
    #[cfg(not(target_arch = "wasm32"))]
    {
        let resolved: Vec<StateMutation> = async_runtime.block_on(fut);
        resolved.into_iter().for_each(|mutation| {
            mutation(frame);
        });
    }

    #[cfg(target_arch = "wasm32")]
    {
        let _ = frame;
        wasm_bindgen_futures::spawn_local(async move {
            let resolved = fut.await;
            for mutation in resolved {
                if proxy.send_event(FlowEvent::Mut(mutation)).is_err() {
                    log::error!("Event loop was closed before all mutations could be applied");
                }
            }
        });
    }
}

/// Runs `flow` in a window until the window is closed.
pub fn run<F: SceneFlow + 'static>(flow: F) -> anyhow::Result<()> {
    run_with_token(flow, CancelToken::new())
}

/// Like [`run`], but also stops once `token` is cancelled.
pub fn run_with_token<F: SceneFlow + 'static>(flow: F, token: CancelToken) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop: EventLoop<FlowEvent> = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        winit::event_loop::EventLoop::with_user_event()
            .with_any_thread(true)
            .build()?
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop: EventLoop<FlowEvent> = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        winit::event_loop::EventLoop::with_user_event()
            .with_any_thread(true)
            .build()?
    };

    #[cfg(not(feature = "integration-tests"))]
    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, Box::new(flow), token)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
