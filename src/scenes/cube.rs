//! A grey cube watched by a camera that circles it with the cursor, and a
//! one-shot tween sliding the cube along x.

use std::time::Duration;

use cgmath::{Deg, Point3, Vector3};

use crate::{
    camera::{CameraConfig, OrbitConfig, OrbitControls, cursor_orbit_position},
    data_structures::scene_graph::{Geometry, Material, NodeId, Scene, Transform, clear_colour},
    flow::{Out, SceneFlow, ViewportMode},
    frame_loop::{FrameContext, FrameTime},
    input::InputEvent,
    tween::{TweenProperty, Tweens},
};

#[derive(Debug, Clone, PartialEq)]
pub struct CubeConfig {
    pub size: Vector3<f32>,
    pub colour: u32,
    pub viewport: (u32, u32),
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    /// Radius of the circle the camera follows with the cursor.
    pub orbit_radius: f32,
    pub tween_to_x: f32,
    pub tween_duration: Duration,
    pub tween_delay: Duration,
    pub clear_colour: u32,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            size: Vector3::new(1.0, 1.0, 1.0),
            colour: 0xa9a9a9,
            viewport: (800, 600),
            camera: CameraConfig {
                position: Point3::new(0.0, 0.0, 3.0),
                target: Point3::new(0.0, 0.0, 0.0),
                fovy: Deg(75.0),
                znear: 0.1,
                zfar: 1000.0,
            },
            orbit: OrbitConfig::default(),
            orbit_radius: 3.0,
            tween_to_x: 2.0,
            tween_duration: Duration::from_secs(1),
            tween_delay: Duration::from_secs(1),
            clear_colour: 0x000000,
        }
    }
}

/// Adds the cube to `scene` and returns its node.
pub fn build_scene(config: &CubeConfig, scene: &mut Scene) -> anyhow::Result<NodeId> {
    let geometry = scene.add_geometry(Geometry::Box {
        width: config.size.x,
        height: config.size.y,
        depth: config.size.z,
    });
    let material = scene.add_material(Material::Basic {
        colour: config.colour,
    });
    scene.add_mesh(geometry, material, Transform::default())
}

#[derive(Debug)]
pub struct CubeFlow {
    pub config: CubeConfig,
    pub controls: OrbitControls,
    pub tweens: Tweens,
    cube: Option<NodeId>,
}

impl Default for CubeFlow {
    fn default() -> Self {
        Self::new(CubeConfig::default())
    }
}

impl CubeFlow {
    pub fn new(config: CubeConfig) -> Self {
        Self {
            controls: OrbitControls::new(config.orbit),
            config,
            tweens: Tweens::new(),
            cube: None,
        }
    }

    pub fn cube(&self) -> Option<NodeId> {
        self.cube
    }
}

impl SceneFlow for CubeFlow {
    fn on_init(&mut self, frame: &mut FrameContext) -> Out {
        let cube = match build_scene(&self.config, &mut frame.scene) {
            Ok(cube) => cube,
            Err(e) => {
                log::error!("cube scene not built: {:#}", e);
                return Out::Empty;
            }
        };
        self.cube = Some(cube);

        frame.camera = self.config.camera.camera();
        frame.projection = self.config.camera.projection(&frame.viewport);
        frame.clear_colour = clear_colour(self.config.clear_colour);
        self.controls.target = self.config.camera.target;

        self.tweens.to(
            cube,
            TweenProperty::PositionX,
            self.config.tween_to_x,
            self.config.tween_duration,
            self.config.tween_delay,
        );
        log::info!("cube scene ready");
        Out::Empty
    }

    fn on_input(&mut self, frame: &mut FrameContext, event: &InputEvent) -> Out {
        self.controls.handle_input(event, &frame.viewport);
        Out::Empty
    }

    fn on_update(&mut self, frame: &mut FrameContext, time: FrameTime) -> Out {
        self.tweens.advance(time.delta, &mut frame.scene);
        self.controls.update(&mut frame.camera);

        // The cursor wins over whatever the orbit controls did this frame.
        frame.camera.position = cursor_orbit_position(&frame.cursor, self.config.orbit_radius);
        if let Some(cube) = self.cube {
            let position = frame.scene.node(cube).transform.position;
            frame.camera.look_at(Point3::new(position.x, position.y, position.z));
        }
        Out::Empty
    }

    fn viewport_mode(&self) -> ViewportMode {
        let (width, height) = self.config.viewport;
        ViewportMode::Fixed { width, height }
    }

    fn title(&self) -> &str {
        "cube"
    }
}
