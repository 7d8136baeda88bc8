use std::sync::Arc;

use anyhow::Context as _;
use winit::window::Window;

use crate::{
    camera::{Camera, CameraResources, Projection},
    data_structures::texture::DepthBuffer,
    frame_loop::SurfaceSize,
    pipelines::{
        Pipelines, basic,
        light::{LightResources, LightUniform},
    },
};

/// Window, device and the GPU resources shared by every draw.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: DepthBuffer,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub light: LightResources,
    pub material_bind_group_layout: wgpu::BindGroupLayout,
    pub pipelines: Pipelines,
}

impl Context {
    pub async fn new(window: Arc<Window>, size: SurfaceSize) -> anyhow::Result<Self> {
        // The instance is a handle to our GPU
        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Could not create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No compatible graphics adapter")?;
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                ..Default::default()
            })
            .await
            .context("Could not open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Material colours are converted to linear space, an Srgb surface
        // encodes them back on write.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("The surface reports no texture formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "surface {}x{} ({:?}, pixel ratio {})",
            config.width,
            config.height,
            config.format,
            size.pixel_ratio
        );

        // Real values are written from the frame state before every draw.
        let camera = CameraResources::new(
            &device,
            &Camera::new((0.0, 0.0, 3.0), (0.0, 0.0, 0.0)),
            &Projection::new(config.width, config.height, cgmath::Deg(75.0), 0.1, 1000.0),
        );
        let light = LightResources::new(&device, LightUniform::from_lights(&[]));
        let material_bind_group_layout = basic::material_bind_group_layout(&device);

        let pipelines = Pipelines::new(
            &device,
            &config,
            &material_bind_group_layout,
            &camera.bind_group_layout,
            &light.bind_group_layout,
        );

        let depth_texture = DepthBuffer::new(&device, config.width, config.height);

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            light,
            material_bind_group_layout,
            pipelines,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Reconfigures the surface and depth buffer. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = DepthBuffer::new(&self.device, width, height);
        true
    }
}
