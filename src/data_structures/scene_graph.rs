//! Scene graph: geometries, materials, lights and mesh nodes.
//!
//! The scene owns every renderable object. Geometries and materials are stored
//! once and referenced by handle so that hundreds of particles can share a
//! single torus and a single material, which is also what lets the renderer
//! collapse them into one instanced draw. Nodes are never removed; a
//! [`NodeId`] stays valid for the lifetime of the scene.

use anyhow::bail;
use cgmath::{Quaternion, Rad, Rotation3, Vector3};

use crate::resources::mesh::MeshData;

/// Index of a [`MeshNode`] inside its [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Index of a [`Geometry`] inside its [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryHandle(usize);

/// Index of a [`Material`] inside its [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialHandle(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl GeometryHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl MaterialHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Shape descriptors. Vertex data is generated lazily by `resources::mesh`.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
    Tetrahedron {
        radius: f32,
    },
    /// Pre-built vertex data, e.g. extruded text.
    Custom { label: String, data: MeshData },
}

impl Geometry {
    pub fn label(&self) -> &str {
        match self {
            Geometry::Box { .. } => "box",
            Geometry::Torus { .. } => "torus",
            Geometry::Tetrahedron { .. } => "tetrahedron",
            Geometry::Custom { label, .. } => label,
        }
    }
}

/// Lit material with a metal/roughness response.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StandardMaterial {
    pub colour: u32,
    pub metalness: f32,
    pub roughness: f32,
}

/// [`StandardMaterial`] plus a clear coat layer and optional transparency.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalMaterial {
    pub colour: u32,
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub transparent: bool,
    pub opacity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material {
    /// Unlit, flat colour.
    Basic { colour: u32 },
    Standard(StandardMaterial),
    Physical(PhysicalMaterial),
}

impl Material {
    pub fn is_transparent(&self) -> bool {
        match self {
            Material::Physical(physical) => physical.transparent && physical.opacity < 1.0,
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Ambient {
        colour: u32,
        intensity: f32,
    },
    /// Shines from `position` towards the origin.
    Directional {
        colour: u32,
        intensity: f32,
        position: Vector3<f32>,
    },
}

/// Position plus XYZ Euler rotation in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
}

impl Transform {
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Rotation as a quaternion, applying x, then y, then z in the local frame.
    pub fn quaternion(&self) -> Quaternion<f32> {
        Quaternion::from_angle_x(Rad(self.rotation.x))
            * Quaternion::from_angle_y(Rad(self.rotation.y))
            * Quaternion::from_angle_z(Rad(self.rotation.z))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

/// A renderable object: shape + surface + transform.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshNode {
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    pub transform: Transform,
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    geometries: Vec<Geometry>,
    materials: Vec<Material>,
    nodes: Vec<MeshNode>,
    pub lights: Vec<Light>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryHandle {
        self.geometries.push(geometry);
        GeometryHandle(self.geometries.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        self.materials.push(material);
        MaterialHandle(self.materials.len() - 1)
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Inserts a mesh node. Fails if a handle does not belong to this scene.
    pub fn add_mesh(
        &mut self,
        geometry: GeometryHandle,
        material: MaterialHandle,
        transform: Transform,
    ) -> anyhow::Result<NodeId> {
        if geometry.0 >= self.geometries.len() {
            bail!("geometry {:?} is not part of this scene", geometry);
        }
        if material.0 >= self.materials.len() {
            bail!("material {:?} is not part of this scene", material);
        }
        self.nodes.push(MeshNode {
            geometry,
            material,
            transform,
        });
        Ok(NodeId(self.nodes.len() - 1))
    }

    pub fn geometry(&self, handle: GeometryHandle) -> &Geometry {
        &self.geometries[handle.0]
    }

    pub fn material(&self, handle: MaterialHandle) -> &Material {
        &self.materials[handle.0]
    }

    pub fn node(&self, id: NodeId) -> &MeshNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut MeshNode {
        &mut self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &MeshNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx), node))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }
}

/// Converts a `0xRRGGBB` sRGB colour into linear RGB components.
pub fn linear_rgb(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0)]
}

/// Clear colour for an sRGB surface from a `0xRRGGBB` value.
pub fn clear_colour(hex: u32) -> wgpu::Color {
    let [r, g, b] = linear_rgb(hex);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Geometry {
        Geometry::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        }
    }

    #[test]
    fn add_mesh_rejects_handles_from_another_scene() {
        let mut other = Scene::new();
        other.add_geometry(unit_box());
        let foreign_geometry = other.add_geometry(unit_box());
        other.add_material(Material::Basic { colour: 0xff0000 });
        let foreign_material = other.add_material(Material::Basic { colour: 0x00ff00 });

        let mut scene = Scene::new();
        let geometry = scene.add_geometry(unit_box());
        let material = scene.add_material(Material::Basic { colour: 0x0000ff });

        let err = scene
            .add_mesh(foreign_geometry, material, Transform::default())
            .unwrap_err();
        assert!(err.to_string().contains("geometry"));
        let err = scene
            .add_mesh(geometry, foreign_material, Transform::default())
            .unwrap_err();
        assert!(err.to_string().contains("material"));
        assert_eq!(scene.node_count(), 0);

        let id = scene
            .add_mesh(geometry, material, Transform::at(Vector3::new(0.0, 1.0, 0.0)))
            .unwrap();
        assert_eq!(scene.node_count(), 1);
        assert_eq!(scene.geometry_count(), 1);
        assert_eq!(scene.node(id).transform.position.y, 1.0);
        assert_eq!(scene.node(id).transform.rotation, Vector3::new(0.0, 0.0, 0.0));
    }
}
