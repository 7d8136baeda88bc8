use wgpu::util::DeviceExt;

use crate::data_structures::scene_graph::{Light, linear_rgb};

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

/// Ambient term plus at most one directional light.
///
/// Every field is a vec4 so the struct needs no manual padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// linear rgb * intensity, summed over ambient lights
    pub ambient: [f32; 4],
    /// xyz: position the light shines from towards the origin, w: 1 if present
    pub direction: [f32; 4],
    /// linear rgb * intensity
    pub colour: [f32; 4],
}

impl LightUniform {
    pub fn from_lights(lights: &[Light]) -> Self {
        let mut uniform = Self::zeroed();
        let mut directional = 0;
        for light in lights {
            match light {
                Light::Ambient { colour, intensity } => {
                    let [r, g, b] = linear_rgb(*colour);
                    uniform.ambient[0] += r * intensity;
                    uniform.ambient[1] += g * intensity;
                    uniform.ambient[2] += b * intensity;
                }
                Light::Directional {
                    colour,
                    intensity,
                    position,
                } => {
                    directional += 1;
                    if directional > 1 {
                        continue;
                    }
                    let [r, g, b] = linear_rgb(*colour);
                    uniform.direction = [position.x, position.y, position.z, 1.0];
                    uniform.colour = [r * intensity, g * intensity, b * intensity, 1.0];
                }
            }
        }
        if directional > 1 {
            log::warn!(
                "{} directional lights in scene, only the first one is shaded",
                directional
            );
        }
        uniform
    }

    fn zeroed() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

impl LightResources {
    pub fn new(device: &wgpu::Device, uniform: LightUniform) -> Self {
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Uploads the uniform again if the lights changed since the last frame.
    pub fn update(&mut self, queue: &wgpu::Queue, lights: &[Light]) {
        let uniform = LightUniform::from_lights(lights);
        if uniform != self.uniform {
            self.uniform = uniform;
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
        }
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn ambient_lights_accumulate() {
        let lights = [
            Light::Ambient {
                colour: 0xffffff,
                intensity: 0.5,
            },
            Light::Ambient {
                colour: 0xffffff,
                intensity: 0.25,
            },
        ];
        let uniform = LightUniform::from_lights(&lights);
        assert!((uniform.ambient[0] - 0.75).abs() < 1e-5);
        assert_eq!(uniform.direction[3], 0.0);
    }

    #[test]
    fn first_directional_light_wins() {
        let lights = [
            Light::Directional {
                colour: 0xffffff,
                intensity: 1.0,
                position: Vector3::new(2.0, 2.0, 5.0),
            },
            Light::Directional {
                colour: 0xff0000,
                intensity: 3.0,
                position: Vector3::new(-1.0, 0.0, 0.0),
            },
        ];
        let uniform = LightUniform::from_lights(&lights);
        assert_eq!(uniform.direction, [2.0, 2.0, 5.0, 1.0]);
        assert!((uniform.colour[1] - 1.0).abs() < 1e-5);
    }
}
