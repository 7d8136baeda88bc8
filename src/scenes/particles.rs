//! "Metalness Color" text floating in a cloud of rotating tori and tetrahedra.

use std::f32::consts::PI;

use cgmath::{Deg, Point3, Vector3};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    camera::{CameraConfig, OrbitConfig, OrbitControls},
    data_structures::scene_graph::{
        Geometry, Light, Material, NodeId, PhysicalMaterial, Scene, StandardMaterial, Transform,
        clear_colour,
    },
    flow::{Out, SceneFlow, StateMutation},
    frame_loop::{FrameContext, FrameTime},
    input::InputEvent,
    resources::font::{Font, TextParams, load_font, text_geometry},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ParticlesConfig {
    pub count: usize,
    /// Full size of the box particles are spread over, centered on the origin.
    pub extent: Vector3<f32>,
    /// (radius, tube, radial segments, tubular segments)
    pub torus: (f32, f32, u32, u32),
    pub tetrahedron_radius: f32,
    pub torus_material: PhysicalMaterial,
    pub tetrahedron_material: PhysicalMaterial,
    /// Radians per second on x and y.
    pub rotation_speed: f32,
    pub text: String,
    pub text_params: TextParams,
    pub text_material: StandardMaterial,
    pub font_path: String,
    pub ambient: Light,
    pub directional: Light,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub clear_colour: u32,
}

impl Default for ParticlesConfig {
    fn default() -> Self {
        Self {
            count: 500,
            extent: Vector3::new(30.0, 20.0, 20.0),
            torus: (0.2, 0.05, 16, 32),
            tetrahedron_radius: 0.3,
            torus_material: PhysicalMaterial {
                colour: 0xc0c0c0,
                metalness: 1.0,
                roughness: 0.2,
                clearcoat: 0.9,
                clearcoat_roughness: 0.1,
                transparent: true,
                opacity: 0.9,
            },
            tetrahedron_material: PhysicalMaterial {
                colour: 0xf0f0f0,
                metalness: 1.0,
                roughness: 0.6,
                clearcoat: 1.0,
                clearcoat_roughness: 0.2,
                transparent: true,
                opacity: 0.9,
            },
            rotation_speed: 0.1,
            text: "Metalness Color".to_string(),
            text_params: TextParams::default(),
            // metalness above 1 is kept as configured and clamped for shading
            text_material: StandardMaterial {
                colour: 0xc0c0c0,
                metalness: 2.0,
                roughness: 0.5,
            },
            font_path: "fonts/orbit_block.typeface.json".to_string(),
            ambient: Light::Ambient {
                colour: 0xffffff,
                intensity: 0.5,
            },
            directional: Light::Directional {
                colour: 0xffffff,
                intensity: 1.0,
                position: Vector3::new(2.0, 2.0, 5.0),
            },
            camera: CameraConfig {
                position: Point3::new(1.0, 1.0, 5.0),
                target: Point3::new(0.0, 0.0, 0.0),
                fovy: Deg(75.0),
                znear: 0.1,
                zfar: 100.0,
            },
            orbit: OrbitConfig::default(),
            clear_colour: 0x808080,
        }
    }
}

/// The particle nodes, fixed after construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleSet {
    ids: Vec<NodeId>,
}

impl ParticleSet {
    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Sets the x and y rotation of every particle to `angle`.
    pub fn rotate_to(&self, scene: &mut Scene, angle: f32) {
        for &id in &self.ids {
            let rotation = &mut scene.node_mut(id).transform.rotation;
            rotation.x = angle;
            rotation.y = angle;
        }
    }
}

/// Spreads `config.count` tori and tetrahedra uniformly over `config.extent`.
pub fn build_particles<R: Rng>(
    config: &ParticlesConfig,
    scene: &mut Scene,
    rng: &mut R,
) -> anyhow::Result<ParticleSet> {
    let (radius, tube, radial_segments, tubular_segments) = config.torus;
    let torus = scene.add_geometry(Geometry::Torus {
        radius,
        tube,
        radial_segments,
        tubular_segments,
    });
    let tetrahedron = scene.add_geometry(Geometry::Tetrahedron {
        radius: config.tetrahedron_radius,
    });
    let torus_material = scene.add_material(Material::Physical(config.torus_material));
    let tetrahedron_material = scene.add_material(Material::Physical(config.tetrahedron_material));

    let ids = (0..config.count)
        .map(|_| {
            let position = Vector3::new(
                (rng.gen_range(0.0..1.0) - 0.5) * config.extent.x,
                (rng.gen_range(0.0..1.0) - 0.5) * config.extent.y,
                (rng.gen_range(0.0..1.0) - 0.5) * config.extent.z,
            );
            let is_torus = rng.gen_range(0.0..1.0) > 0.5;
            let rotation = Vector3::new(
                rng.gen_range(0.0..PI),
                rng.gen_range(0.0..PI),
                rng.gen_range(0.0..PI),
            );
            let (geometry, material) = if is_torus {
                (torus, torus_material)
            } else {
                (tetrahedron, tetrahedron_material)
            };
            scene.add_mesh(geometry, material, Transform { position, rotation })
        })
        .collect::<anyhow::Result<_>>()?;
    Ok(ParticleSet { ids })
}

/// Adds the centered text mesh, or a box of the text's nominal footprint if
/// the font could not be loaded or the text could not be built.
pub fn insert_text(
    scene: &mut Scene,
    text: &str,
    params: &TextParams,
    material: StandardMaterial,
    font: anyhow::Result<Font>,
) -> anyhow::Result<NodeId> {
    let geometry = font.and_then(|font| {
        let mut data = text_geometry(&font, text, params)?;
        data.center();
        Ok(Geometry::Custom {
            label: format!("text {:?}", text),
            data,
        })
    });
    let geometry = match geometry {
        Ok(geometry) => geometry,
        Err(e) => {
            log::warn!("text {:?} replaced by a placeholder: {:#}", text, e);
            fallback_geometry(text, params)
        }
    };
    let geometry = scene.add_geometry(geometry);
    let material = scene.add_material(Material::Standard(material));
    scene.add_mesh(geometry, material, Transform::default())
}

fn fallback_geometry(text: &str, params: &TextParams) -> Geometry {
    // roughly the advance of an average glyph
    let width = (text.chars().count() as f32 * params.size * 0.6).max(params.size);
    Geometry::Box {
        width,
        height: params.size,
        depth: params.depth,
    }
}

/// Where the typeface comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum FontSource {
    /// Path relative to the assets directory.
    Asset(String),
    /// Typeface JSON document held in memory.
    Json(String),
}

pub struct ParticlesFlow {
    pub config: ParticlesConfig,
    pub controls: OrbitControls,
    font: FontSource,
    rng: Box<dyn rand::RngCore>,
    particles: ParticleSet,
}

impl std::fmt::Debug for ParticlesFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticlesFlow")
            .field("config", &self.config)
            .field("font", &self.font)
            .field("particles", &self.particles.len())
            .finish()
    }
}

impl Default for ParticlesFlow {
    fn default() -> Self {
        Self::new(ParticlesConfig::default())
    }
}

impl ParticlesFlow {
    pub fn new(config: ParticlesConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_rng<R: rand::RngCore + 'static>(config: ParticlesConfig, rng: R) -> Self {
        let font = FontSource::Asset(config.font_path.clone());
        Self {
            controls: OrbitControls::new(config.orbit),
            config,
            font,
            rng: Box::new(rng),
            particles: ParticleSet::default(),
        }
    }

    pub fn with_font(mut self, font: FontSource) -> Self {
        self.font = font;
        self
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    fn load_text(&self) -> Box<dyn Future<Output = StateMutation>> {
        let font = self.font.clone();
        let text = self.config.text.clone();
        let params = self.config.text_params;
        let material = self.config.text_material;
        Box::new(async move {
            let font = match font {
                FontSource::Asset(path) => load_font(&path).await,
                FontSource::Json(json) => Font::from_json(&json),
            };
            let mutation: StateMutation = Box::new(move |frame: &mut FrameContext| {
                match insert_text(&mut frame.scene, &text, &params, material, font) {
                    Ok(id) => log::info!("text node {:?} added", id),
                    Err(e) => log::error!("text {:?} not added: {:#}", text, e),
                }
            });
            mutation
        })
    }
}

impl SceneFlow for ParticlesFlow {
    fn on_init(&mut self, frame: &mut FrameContext) -> Out {
        frame.scene.add_light(self.config.ambient);
        frame.scene.add_light(self.config.directional);
        match build_particles(&self.config, &mut frame.scene, &mut self.rng) {
            Ok(particles) => {
                self.particles = particles;
                log::info!("{} particles placed", self.particles.len());
            }
            Err(e) => log::error!("particles not placed: {:#}", e),
        }

        frame.camera = self.config.camera.camera();
        frame.projection = self.config.camera.projection(&frame.viewport);
        frame.clear_colour = clear_colour(self.config.clear_colour);
        self.controls.target = self.config.camera.target;

        Out::FutFn(vec![self.load_text()])
    }

    fn on_input(&mut self, frame: &mut FrameContext, event: &InputEvent) -> Out {
        self.controls.handle_input(event, &frame.viewport);
        Out::Empty
    }

    fn on_update(&mut self, frame: &mut FrameContext, time: FrameTime) -> Out {
        self.particles
            .rotate_to(&mut frame.scene, time.elapsed_secs() * self.config.rotation_speed);
        self.controls.update(&mut frame.camera);
        Out::Empty
    }

    fn title(&self) -> &str {
        "particles"
    }
}
