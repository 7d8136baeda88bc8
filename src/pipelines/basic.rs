use wgpu::util::DeviceExt;

use crate::data_structures::{
    instance::InstanceRaw,
    model::{self, Vertex},
    scene_graph::{Material, linear_rgb},
    texture::DepthBuffer,
};

/// Per-material shading parameters as seen by `shader.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// linear rgb + opacity
    pub colour: [f32; 4],
    /// metalness, roughness, clearcoat, clearcoat roughness
    pub surface: [f32; 4],
    /// x: 1.0 when lit, 0.0 for flat colour
    pub flags: [f32; 4],
}

impl From<&Material> for MaterialUniform {
    fn from(material: &Material) -> Self {
        let rgba = |hex: u32, opacity: f32| {
            let [r, g, b] = linear_rgb(hex);
            [r, g, b, opacity.clamp(0.0, 1.0)]
        };
        // The shading model is only defined for coefficients in [0, 1].
        let unit = |v: f32| {
            if !(0.0..=1.0).contains(&v) {
                log::debug!("material coefficient {} clamped to [0, 1]", v);
            }
            v.clamp(0.0, 1.0)
        };
        match material {
            Material::Basic { colour } => Self {
                colour: rgba(*colour, 1.0),
                surface: [0.0; 4],
                flags: [0.0; 4],
            },
            Material::Standard(standard) => Self {
                colour: rgba(standard.colour, 1.0),
                surface: [unit(standard.metalness), unit(standard.roughness), 0.0, 0.0],
                flags: [1.0, 0.0, 0.0, 0.0],
            },
            Material::Physical(physical) => Self {
                colour: rgba(
                    physical.colour,
                    if physical.transparent {
                        physical.opacity
                    } else {
                        1.0
                    },
                ),
                surface: [
                    unit(physical.metalness),
                    unit(physical.roughness),
                    unit(physical.clearcoat),
                    unit(physical.clearcoat_roughness),
                ],
                flags: [1.0, 0.0, 0.0, 0.0],
            },
        }
    }
}

pub fn material_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("material_bind_group_layout"),
    })
}

/// Uniform buffer and bind group of one scene material.
#[derive(Debug)]
pub struct MaterialBinding {
    pub uniform: MaterialUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl MaterialBinding {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, material: &Material) -> Self {
        let uniform = MaterialUniform::from(material);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("material_bind_group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
        }
    }
}

pub fn mk_basic_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    material_bind_group_layout: &wgpu::BindGroupLayout,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    light_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Render Pipeline Layout"),
        bind_group_layouts: &[
            Some(material_bind_group_layout),
            Some(camera_bind_group_layout),
            Some(light_bind_group_layout),
        ],
        immediate_size: 0,
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Scene Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &render_pipeline_layout,
        config.format,
        Some(wgpu::BlendState {
            alpha: wgpu::BlendComponent::REPLACE,
            color: wgpu::BlendComponent::REPLACE,
        }),
        true,
        Some(DepthBuffer::FORMAT),
        &[model::ModelVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_write_enabled: bool,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: Some(depth_write_enabled),
            depth_compare: Some(wgpu::CompareFunction::Less),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}
