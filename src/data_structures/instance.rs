//! Per-node transformation data for instanced draws.
//!
//! Every mesh node becomes one instance of its (geometry, material) batch, so a
//! whole particle cloud is a single draw call. The node transform is packed as
//! a model matrix plus the rotation-only normal matrix.

use cgmath::{Matrix3, Matrix4};

use crate::data_structures::{model, scene_graph::Transform};

/// The instance data as it is laid out in the instance buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
}

impl InstanceRaw {
    // mat4 takes four vec4 slots, the normal matrix three vec3 slots
    const ATTRIBS: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
        9 => Float32x3,
        10 => Float32x3,
        11 => Float32x3,
    ];

    pub fn model(&self) -> Matrix4<f32> {
        self.model.into()
    }
}

impl From<&Transform> for InstanceRaw {
    fn from(transform: &Transform) -> Self {
        let rotation = transform.quaternion();
        Self {
            model: (Matrix4::from_translation(transform.position) * Matrix4::from(rotation)).into(),
            normal: Matrix3::from(rotation).into(),
        }
    }
}

impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}
