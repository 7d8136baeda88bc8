//! Engine data structures: scene graph, instances, GPU meshes and textures.
//!
//! - `scene_graph` holds geometries, materials, lights and mesh nodes
//! - `instance` holds per-instance transformation data for instanced draws
//! - `model` contains vertex formats, uploaded meshes and draw helpers
//! - `texture` wraps the depth buffer

pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
