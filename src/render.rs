//! Render composition and pipeline batching.
//!
//! Scene nodes sharing a geometry and a material are drawn as one instanced
//! call. Each frame the [`Renderer`] regroups the nodes, refreshes the instance
//! buffers and describes the draws as a [`Render`] tree, which is then sorted
//! into the opaque and the alpha-blended pipeline.
//!
//! # Key types
//!
//! - [`Renderer`] owns the GPU [`Context`] and implements [`SceneRenderer`]
//! - [`Render<'a>`] describes the draws of one frame
//! - [`Instanced<'a>`] is one mesh, one material and an instance buffer
//!

use std::{
    collections::{BTreeMap, HashMap},
    iter,
    sync::Arc,
};

use anyhow::{Context as _, bail};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    context::Context,
    data_structures::{
        instance::InstanceRaw,
        model::{DrawModel, Mesh},
        scene_graph::{GeometryHandle, MaterialHandle, Scene},
    },
    frame_loop::{FrameContext, SceneRenderer, SurfaceSize},
    pipelines::basic::MaterialBinding,
    resources::mesh,
};

/// Data for instanced rendering: a mesh, its material and an instance buffer.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub mesh: &'a Mesh,
    pub material: &'a wgpu::BindGroup,
    pub amount: usize,
}

/// Specifies how a batch should be rendered.
///
/// - `None` renders nothing
/// - `Default(Instanced)` renders an opaque instanced batch
/// - `Transparent(Instanced)` renders an alpha-blended batch after all opaque ones
/// - `Composed(Vec<Render>)` recursively renders a composition of renders
pub enum Render<'a> {
    None,
    Default(Instanced<'a>),
    Transparent(Instanced<'a>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    /// Flattens the tree into per-pipeline lists, keeping the order of appearance.
    pub fn set_pipelines(self, basics: &mut Vec<Instanced<'a>>, trans: &mut Vec<Instanced<'a>>) {
        match self {
            Render::None => (),
            Render::Default(instanced) => basics.push(instanced),
            Render::Transparent(instanced) => trans.push(instanced),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(basics, trans)),
        }
    }
}

/// What became of one attempt to draw to the surface.
enum FrameOutcome {
    Presented,
    /// Lost, outdated or suboptimal surface.
    Reconfigure,
    Skipped(&'static str),
    Invalid,
}

struct Batch {
    buffer: wgpu::Buffer,
    capacity: usize,
    count: usize,
    transparent: bool,
}

/// GPU backed [`SceneRenderer`].
///
/// Geometries and materials are uploaded the first time a node references them
/// and are assumed to be immutable afterwards.
pub struct Renderer {
    ctx: Context,
    meshes: HashMap<GeometryHandle, Mesh>,
    materials: HashMap<MaterialHandle, MaterialBinding>,
    batches: BTreeMap<(GeometryHandle, MaterialHandle), Batch>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("meshes", &self.meshes.len())
            .field("materials", &self.materials.len())
            .field("batches", &self.batches.len())
            .finish()
    }
}

impl Renderer {
    pub async fn new(window: Arc<Window>, size: SurfaceSize) -> anyhow::Result<Self> {
        let ctx = Context::new(window, size)
            .await
            .context("Cannot create the main context")?;
        Ok(Self {
            ctx,
            meshes: HashMap::new(),
            materials: HashMap::new(),
            batches: BTreeMap::new(),
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        self.ctx.window()
    }

    /// Uploads new geometries/materials and rewrites every instance buffer.
    fn sync(&mut self, scene: &Scene) {
        let mut grouped: BTreeMap<(GeometryHandle, MaterialHandle), Vec<InstanceRaw>> =
            BTreeMap::new();
        for (_, node) in scene.nodes() {
            grouped
                .entry((node.geometry, node.material))
                .or_default()
                .push(InstanceRaw::from(&node.transform));
        }

        for (&(geometry, material), instances) in grouped.iter() {
            let device = &self.ctx.device;
            self.meshes.entry(geometry).or_insert_with(|| {
                let descriptor = scene.geometry(geometry);
                let data = mesh::build(descriptor);
                log::debug!(
                    "uploading {} ({} triangles)",
                    descriptor.label(),
                    data.triangle_count()
                );
                Mesh::upload(device, descriptor.label(), &data)
            });
            let layout = &self.ctx.material_bind_group_layout;
            self.materials
                .entry(material)
                .or_insert_with(|| MaterialBinding::new(device, layout, scene.material(material)));

            let transparent = scene.material(material).is_transparent();
            let bytes: &[u8] = bytemuck::cast_slice(instances);
            match self.batches.get_mut(&(geometry, material)) {
                Some(batch) if batch.capacity >= instances.len() => {
                    self.ctx.queue.write_buffer(&batch.buffer, 0, bytes);
                    batch.count = instances.len();
                }
                _ => {
                    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Instance Buffer"),
                        contents: bytes,
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    });
                    self.batches.insert(
                        (geometry, material),
                        Batch {
                            buffer,
                            capacity: instances.len(),
                            count: instances.len(),
                            transparent,
                        },
                    );
                }
            }
        }

        for (key, batch) in self.batches.iter_mut() {
            if !grouped.contains_key(key) {
                batch.count = 0;
            }
        }
    }

    fn on_render(&self) -> Render<'_> {
        Render::Composed(
            self.batches
                .iter()
                .map(|((geometry, material), batch)| {
                    let (Some(mesh), Some(binding)) =
                        (self.meshes.get(geometry), self.materials.get(material))
                    else {
                        return Render::None;
                    };
                    if batch.count == 0 {
                        return Render::None;
                    }
                    let instanced = Instanced {
                        instance: &batch.buffer,
                        mesh,
                        material: &binding.bind_group,
                        amount: batch.count,
                    };
                    if batch.transparent {
                        Render::Transparent(instanced)
                    } else {
                        Render::Default(instanced)
                    }
                })
                .collect(),
        )
    }

    fn draw(&self, frame: &FrameContext) -> FrameOutcome {
        let (output, suboptimal) = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output) => (output, false),
            wgpu::CurrentSurfaceTexture::Suboptimal(output) => (output, true),
            wgpu::CurrentSurfaceTexture::Timeout => return FrameOutcome::Skipped("surface timed out"),
            wgpu::CurrentSurfaceTexture::Occluded => return FrameOutcome::Skipped("window is occluded"),
            wgpu::CurrentSurfaceTexture::Outdated | wgpu::CurrentSurfaceTexture::Lost => {
                return FrameOutcome::Reconfigure;
            }
            wgpu::CurrentSurfaceTexture::Validation => return FrameOutcome::Invalid,
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            let mut basics: Vec<Instanced> = Vec::new();
            let mut trans: Vec<Instanced> = Vec::new();
            self.on_render().set_pipelines(&mut basics, &mut trans);

            for (pipeline, batch) in [
                (&self.ctx.pipelines.basic, basics),
                (&self.ctx.pipelines.transparent, trans),
            ] {
                render_pass.set_pipeline(pipeline);
                for instanced in batch {
                    if instanced.amount == 0 || instanced.instance.size() == 0 {
                        log::warn!("you attempted to render something with zero instances");
                        continue;
                    }
                    render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                    render_pass.draw_mesh_instanced(
                        instanced.mesh,
                        instanced.material,
                        0..instanced.amount as u32,
                        &self.ctx.camera.bind_group,
                        &self.ctx.light.bind_group,
                    );
                }
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        if suboptimal {
            FrameOutcome::Reconfigure
        } else {
            FrameOutcome::Presented
        }
    }
}

impl SceneRenderer for Renderer {
    fn render(&mut self, frame: &FrameContext) -> anyhow::Result<()> {
        self.sync(&frame.scene);
        self.ctx
            .camera
            .update(&self.ctx.queue, &frame.camera, &frame.projection);
        self.ctx.light.update(&self.ctx.queue, &frame.scene.lights);

        match self.draw(frame) {
            FrameOutcome::Presented => Ok(()),
            FrameOutcome::Reconfigure => {
                let size = frame.surface_size();
                log::debug!("reconfiguring the surface at {}x{}", size.width, size.height);
                self.ctx.resize(size.width, size.height);
                Ok(())
            }
            FrameOutcome::Skipped(reason) => {
                log::warn!("{}, skipping frame", reason);
                Ok(())
            }
            FrameOutcome::Invalid => bail!("Unable to acquire the next frame: surface validation failed"),
        }
    }

    fn resize(&mut self, size: SurfaceSize) {
        if self.ctx.resize(size.width, size.height) {
            log::debug!(
                "surface resized to {}x{} (pixel ratio {})",
                size.width,
                size.height,
                size.pixel_ratio
            );
        }
    }
}
