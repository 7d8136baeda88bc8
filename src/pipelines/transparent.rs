use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::DepthBuffer,
    },
    pipelines::basic::mk_render_pipeline,
};

/**
 * Alpha-blended variant of the basic pipeline for materials with opacity < 1.
 *
 * Same shader as the opaque pass; blending is the only difference, plus depth
 * writes are off so overlapping translucent particles do not cut each other out.
 */
pub fn mk_transparent_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    material_bind_group_layout: &wgpu::BindGroupLayout,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    light_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Transparent Pipeline Layout"),
        bind_group_layouts: &[
            Some(material_bind_group_layout),
            Some(camera_bind_group_layout),
            Some(light_bind_group_layout),
        ],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Scene Shader (blended)"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &render_pipeline_layout,
        config.format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        false,
        Some(DepthBuffer::FORMAT),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}
