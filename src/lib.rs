//! orbit-scenes
//!
//! Two small 3D scene demos on top of `wgpu`, running natively and in the
//! browser: a grey cube watched by a cursor-driven camera, and a metallic text
//! label floating in a cloud of 500 rotating particles. The crate is split into
//! a GPU-free core (scene graph, input bridge, frame loop, tweens, geometry) and
//! a thin `wgpu`/`winit` shell that drives it.
//!
//! High-level modules
//! - `camera`: camera, projection, cursor orbit mapping and damped orbit controls
//! - `context`: GPU and window context that owns device/queue/pipelines
//! - `data_structures`: scene graph, per-instance transforms, GPU meshes, textures
//! - `flow`: the `SceneFlow` trait and the winit application driving it
//! - `frame_loop`: clock, cancellation and the per-frame tick
//! - `input`: viewport, normalized cursor and the resize/pointer bridge
//! - `pipelines`: render pipelines (opaque, transparent) and light uniforms
//! - `render`: batching of scene nodes into instanced draws
//! - `resources`: asset loading (fonts) and procedural geometry
//! - `scenes`: the two demos
//! - `tween`: fire-and-forget property tweens
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod frame_loop;
pub mod input;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scenes;
pub mod tween;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::event::WindowEvent;
