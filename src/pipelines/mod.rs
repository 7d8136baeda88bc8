//! Render pipelines.
//!
//! - `basic` draws opaque instanced meshes and owns the material uniform
//! - `transparent` is the alpha-blended twin of `basic`
//! - `light` packs the scene's lights into a uniform buffer

pub mod basic;
pub mod light;
pub mod transparent;

#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        material_bind_group_layout: &wgpu::BindGroupLayout,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        light_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            basic: basic::mk_basic_pipeline(
                device,
                config,
                material_bind_group_layout,
                camera_bind_group_layout,
                light_bind_group_layout,
            ),
            transparent: transparent::mk_transparent_pipeline(
                device,
                config,
                material_bind_group_layout,
                camera_bind_group_layout,
                light_bind_group_layout,
            ),
        }
    }
}
