//! Procedural geometry: boxes, tori and tetrahedra as indexed triangle lists.
//!
//! All generators emit counter-clockwise front faces and outward normals so the
//! shared pipeline can cull back faces.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3};

use crate::data_structures::{model::ModelVertex, scene_graph::Geometry};

/// CPU-side vertex and index data of one geometry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds as (min, max). `None` for empty meshes.
    pub fn bounds(&self) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let first: Vector3<f32> = self.vertices.first()?.position.into();
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            let p: Vector3<f32> = v.position.into();
            (
                Vector3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
                Vector3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
            )
        }))
    }

    /// Translates the mesh so its bounding box is centered on the origin.
    pub fn center(&mut self) {
        let Some((min, max)) = self.bounds() else {
            return;
        };
        let offset = (min + max) * -0.5;
        for v in self.vertices.iter_mut() {
            let p = Vector3::from(v.position) + offset;
            v.position = p.into();
        }
    }

    /// Appends one triangle with its own flat normal.
    pub(crate) fn push_flat_triangle(&mut self, a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) {
        let n = (b - a).cross(c - a);
        let normal = if n.magnitude2() > 0.0 {
            n.normalize()
        } else {
            Vector3::unit_z()
        };
        let base = self.vertices.len() as u32;
        for p in [a, b, c] {
            self.vertices.push(ModelVertex {
                position: p.into(),
                normal: normal.into(),
            });
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
}

/// Builds the vertex data for a geometry descriptor.
pub fn build(geometry: &Geometry) -> MeshData {
    match geometry {
        Geometry::Box {
            width,
            height,
            depth,
        } => cuboid(*width, *height, *depth),
        Geometry::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
        } => torus(*radius, *tube, *radial_segments, *tubular_segments),
        Geometry::Tetrahedron { radius } => tetrahedron(*radius),
        Geometry::Custom { data, .. } => data.clone(),
    }
}

pub fn cuboid(width: f32, height: f32, depth: f32) -> MeshData {
    let half = Vector3::new(width, height, depth) * 0.5;
    let mut data = MeshData::default();
    // (normal, u, v) with u x v == normal so every face winds counter-clockwise
    let faces = [
        (Vector3::unit_x(), -Vector3::unit_z(), Vector3::unit_y()),
        (-Vector3::unit_x(), Vector3::unit_z(), Vector3::unit_y()),
        (Vector3::unit_y(), Vector3::unit_x(), -Vector3::unit_z()),
        (-Vector3::unit_y(), Vector3::unit_x(), Vector3::unit_z()),
        (Vector3::unit_z(), Vector3::unit_x(), Vector3::unit_y()),
        (-Vector3::unit_z(), -Vector3::unit_x(), Vector3::unit_y()),
    ];
    let scale = |v: Vector3<f32>| Vector3::new(v.x * half.x, v.y * half.y, v.z * half.z);
    for (normal, u, v) in faces {
        let (n, u, v) = (scale(normal), scale(u), scale(v));
        let corners = [n - u - v, n + u - v, n + u + v, n - u + v];
        let base = data.vertices.len() as u32;
        for corner in corners {
            data.vertices.push(ModelVertex {
                position: corner.into(),
                normal: normal.into(),
            });
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    data
}

pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let radial = radial_segments.max(2);
    let tubular = tubular_segments.max(3);
    let mut data = MeshData::default();

    for j in 0..=radial {
        let v = j as f32 / radial as f32 * PI * 2.0;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * PI * 2.0;
            let position = Vector3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Vector3::new(radius * u.cos(), radius * u.sin(), 0.0);
            data.vertices.push(ModelVertex {
                position: position.into(),
                normal: (position - center).normalize().into(),
            });
        }
    }

    let row = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            data.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    data
}

pub fn tetrahedron(radius: f32) -> MeshData {
    let corners = [
        Vector3::new(1.0, 1.0, 1.0),
        Vector3::new(-1.0, -1.0, 1.0),
        Vector3::new(-1.0, 1.0, -1.0),
        Vector3::new(1.0, -1.0, -1.0),
    ]
    .map(|c: Vector3<f32>| c.normalize() * radius);
    let faces = [[2, 1, 0], [0, 3, 2], [1, 3, 0], [2, 3, 1]];

    let mut data = MeshData::default();
    for [a, b, c] in faces {
        data.push_flat_triangle(corners[a], corners[b], corners[c]);
    }
    data
}
