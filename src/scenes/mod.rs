//! The two demos, each a [`SceneFlow`](crate::flow::SceneFlow).
//!
//! - `cube`: grey box, cursor-orbit camera, one tween
//! - `particles`: extruded text plus 500 rotating particles under two lights

pub mod cube;
pub mod particles;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::prelude::*;

    use crate::{
        flow,
        scenes::{cube::CubeFlow, particles::ParticlesFlow},
    };

    #[wasm_bindgen(js_name = runCube)]
    pub fn run_cube() -> Result<(), JsValue> {
        flow::run(CubeFlow::default()).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
    }

    #[wasm_bindgen(js_name = runParticles)]
    pub fn run_particles() -> Result<(), JsValue> {
        flow::run(ParticlesFlow::default()).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
    }
}
