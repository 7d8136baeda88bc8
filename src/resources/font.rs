//! Typeface fonts and extruded 3D text.
//!
//! Fonts use the typeface JSON layout: a `glyphs` map whose entries carry an
//! advance (`ha`) and an outline string of `m`/`l`/`q`/`b` commands in font
//! units. Outlines are flattened into contours, grouped into shapes with holes,
//! triangulated for the caps and extruded (optionally with a rounded bevel).

use std::{collections::HashMap, f32::consts::FRAC_PI_2};

use anyhow::{Context, bail};
use cgmath::{InnerSpace, Vector2, Vector3};
use serde::Deserialize;

use crate::{
    data_structures::model::ModelVertex,
    resources::{load_string, mesh::MeshData, triangulate},
};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    #[serde(default)]
    pub family_name: Option<String>,
    pub resolution: f32,
    pub glyphs: HashMap<String, Glyph>,
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub underline_thickness: f32,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub y_min: f32,
    pub y_max: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Glyph {
    /// Horizontal advance in font units.
    pub ha: f32,
    #[serde(default)]
    pub o: String,
}

/// Rounded edge between the caps and the side walls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bevel {
    pub thickness: f32,
    pub size: f32,
    pub offset: f32,
    pub segments: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextParams {
    pub size: f32,
    pub depth: f32,
    pub curve_segments: u32,
    pub bevel: Option<Bevel>,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            size: 1.0,
            depth: 0.2,
            curve_segments: 12,
            bevel: Some(Bevel {
                thickness: 0.03,
                size: 0.02,
                offset: 0.0,
                segments: 5,
            }),
        }
    }
}

/// A filled region: one outer contour and the holes cut into it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shape {
    pub outer: Vec<Vector2<f32>>,
    pub holes: Vec<Vec<Vector2<f32>>>,
}

impl Font {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let font: Font = serde_json::from_str(json).context("malformed typeface JSON")?;
        if font.resolution <= 0.0 {
            bail!("typeface resolution must be positive, got {}", font.resolution);
        }
        Ok(font)
    }

    /// Lays out `text` (newlines start a new line) and returns its shapes in
    /// scene units, baseline of the first line at y = 0.
    pub fn shapes(&self, text: &str, size: f32, curve_segments: u32) -> anyhow::Result<Vec<Shape>> {
        let scale = size / self.resolution;
        let line_height =
            (self.bounding_box.y_max - self.bounding_box.y_min + self.underline_thickness) * scale;
        let mut offset = Vector2::new(0.0, 0.0);
        let mut shapes = Vec::new();

        for c in text.chars() {
            if c == '\n' {
                offset.x = 0.0;
                offset.y -= line_height;
                continue;
            }
            let glyph = match self.glyphs.get(c.to_string().as_str()).or_else(|| self.glyphs.get("?")) {
                Some(glyph) => glyph,
                None => {
                    log::warn!(
                        "character {:?} is missing from font {:?}",
                        c,
                        self.family_name.as_deref().unwrap_or("unnamed")
                    );
                    continue;
                }
            };
            let contours = parse_outline(&glyph.o, scale, offset, curve_segments.max(1))
                .with_context(|| format!("invalid outline for glyph {:?}", c))?;
            shapes.append(&mut group_contours(contours));
            offset.x += glyph.ha * scale;
        }
        Ok(shapes)
    }
}

/// Reads a typeface JSON asset.
pub async fn load_font(file_name: &str) -> anyhow::Result<Font> {
    let json = load_string(file_name)
        .await
        .with_context(|| format!("failed to load font {}", file_name))?;
    Font::from_json(&json).with_context(|| format!("failed to parse font {}", file_name))
}

/// Builds the extruded mesh for `text`. The result is not centered.
pub fn text_geometry(font: &Font, text: &str, params: &TextParams) -> anyhow::Result<MeshData> {
    let shapes = font.shapes(text, params.size, params.curve_segments)?;
    let data = extrude(&shapes, params.depth, params.bevel.as_ref());
    if data.vertices.is_empty() {
        bail!("text {:?} produced no geometry", text);
    }
    Ok(data)
}

fn read_point<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    scale: f32,
    offset: Vector2<f32>,
) -> anyhow::Result<Vector2<f32>> {
    let mut coord = || -> anyhow::Result<f32> {
        let token = tokens
            .next()
            .context("outline ends in the middle of a command")?;
        token
            .parse::<f32>()
            .with_context(|| format!("{:?} is not a number", token))
    };
    let x = coord()?;
    let y = coord()?;
    Ok(Vector2::new(x * scale + offset.x, y * scale + offset.y))
}

fn parse_outline(
    outline: &str,
    scale: f32,
    offset: Vector2<f32>,
    segments: u32,
) -> anyhow::Result<Vec<Vec<Vector2<f32>>>> {
    let mut tokens = outline.split_whitespace();
    let mut contours = Vec::new();
    let mut current: Vec<Vector2<f32>> = Vec::new();

    while let Some(command) = tokens.next() {
        match command {
            "m" => {
                if !current.is_empty() {
                    contours.push(std::mem::take(&mut current));
                }
                current.push(read_point(&mut tokens, scale, offset)?);
            }
            "l" => current.push(read_point(&mut tokens, scale, offset)?),
            "q" => {
                // end point first, then the control point
                let end = read_point(&mut tokens, scale, offset)?;
                let control = read_point(&mut tokens, scale, offset)?;
                let start = *current.last().context("curve without a start point")?;
                for i in 1..=segments {
                    let t = i as f32 / segments as f32;
                    let u = 1.0 - t;
                    current.push(start * (u * u) + control * (2.0 * u * t) + end * (t * t));
                }
            }
            "b" => {
                let end = read_point(&mut tokens, scale, offset)?;
                let c1 = read_point(&mut tokens, scale, offset)?;
                let c2 = read_point(&mut tokens, scale, offset)?;
                let start = *current.last().context("curve without a start point")?;
                for i in 1..=segments {
                    let t = i as f32 / segments as f32;
                    let u = 1.0 - t;
                    current.push(
                        start * (u * u * u)
                            + c1 * (3.0 * u * u * t)
                            + c2 * (3.0 * u * t * t)
                            + end * (t * t * t),
                    );
                }
            }
            "z" => {}
            other => bail!("unknown outline command {:?}", other),
        }
    }
    if !current.is_empty() {
        contours.push(current);
    }

    Ok(contours.into_iter().filter_map(clean_contour).collect())
}

/// Drops repeated points and the closing duplicate; rejects degenerate contours.
fn clean_contour(points: Vec<Vector2<f32>>) -> Option<Vec<Vector2<f32>>> {
    let mut cleaned: Vec<Vector2<f32>> = Vec::with_capacity(points.len());
    for p in points {
        if cleaned.last().map_or(true, |last| (p - *last).magnitude2() > 1e-12) {
            cleaned.push(p);
        }
    }
    while cleaned.len() > 1 && (cleaned[0] - cleaned[cleaned.len() - 1]).magnitude2() <= 1e-12 {
        cleaned.pop();
    }
    (cleaned.len() >= 3 && triangulate::signed_area(&cleaned).abs() > 1e-12).then_some(cleaned)
}

/// Sorts contours into outers and holes by nesting depth, independent of winding.
fn group_contours(contours: Vec<Vec<Vector2<f32>>>) -> Vec<Shape> {
    let depth: Vec<usize> = contours
        .iter()
        .enumerate()
        .map(|(i, contour)| {
            contours
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && triangulate::contains(other, contour[0]))
                .count()
        })
        .collect();

    let mut shapes: Vec<(usize, Shape)> = contours
        .iter()
        .enumerate()
        .filter(|(i, _)| depth[*i] % 2 == 0)
        .map(|(i, outer)| {
            (
                i,
                Shape {
                    outer: outer.clone(),
                    holes: Vec::new(),
                },
            )
        })
        .collect();

    for (i, hole) in contours.iter().enumerate().filter(|(i, _)| depth[*i] % 2 == 1) {
        let owner = shapes
            .iter_mut()
            .filter(|(j, shape)| *j != i && triangulate::contains(&shape.outer, hole[0]))
            .min_by(|(_, a), (_, b)| {
                triangulate::signed_area(&a.outer)
                    .abs()
                    .total_cmp(&triangulate::signed_area(&b.outer).abs())
            });
        match owner {
            Some((_, shape)) => shape.holes.push(hole.clone()),
            None => log::debug!("dropping orphaned hole contour"),
        }
    }

    shapes.into_iter().map(|(_, shape)| shape).collect()
}

/// Outward offset direction per vertex, scaled so offset edges stay parallel.
fn bevel_directions(contour: &[Vector2<f32>]) -> Vec<Vector2<f32>> {
    let n = contour.len();
    let edge_normal = |a: Vector2<f32>, b: Vector2<f32>| {
        let d = b - a;
        let normal = Vector2::new(d.y, -d.x);
        if normal.magnitude2() > 0.0 {
            normal.normalize()
        } else {
            normal
        }
    };
    (0..n)
        .map(|i| {
            let prev = contour[(i + n - 1) % n];
            let next = contour[(i + 1) % n];
            let n1 = edge_normal(prev, contour[i]);
            let n2 = edge_normal(contour[i], next);
            let bisector = n1 + n2;
            if bisector.magnitude2() < 1e-12 {
                return n1;
            }
            let bisector = bisector.normalize();
            // miter length 1/cos(half angle), capped for very sharp corners
            bisector / bisector.dot(n1).max(0.25)
        })
        .collect()
}

fn extrude(shapes: &[Shape], depth: f32, bevel: Option<&Bevel>) -> MeshData {
    // (z, outward offset) per ring, back to front
    let mut layers: Vec<(f32, f32)> = Vec::new();
    match bevel {
        Some(bevel) => {
            let segments = bevel.segments.max(1);
            let ring = |b: u32| {
                let t = b as f32 / segments as f32 * FRAC_PI_2;
                (bevel.thickness * t.cos(), bevel.size * t.sin() + bevel.offset)
            };
            layers.extend((0..segments).map(ring).map(|(z, s)| (-z, s)));
            layers.push((0.0, bevel.size + bevel.offset));
            layers.push((depth, bevel.size + bevel.offset));
            layers.extend((0..segments).rev().map(ring).map(|(z, s)| (depth + z, s)));
        }
        None => {
            layers.push((0.0, 0.0));
            layers.push((depth, 0.0));
        }
    }

    let mut data = MeshData::default();
    for shape in shapes {
        let outer = {
            let mut outer = shape.outer.clone();
            if triangulate::signed_area(&outer) < 0.0 {
                outer.reverse();
            }
            outer
        };
        let holes: Vec<Vec<Vector2<f32>>> = shape
            .holes
            .iter()
            .map(|hole| {
                let mut hole = hole.clone();
                if triangulate::signed_area(&hole) > 0.0 {
                    hole.reverse();
                }
                hole
            })
            .collect();

        let contours: Vec<(&Vec<Vector2<f32>>, Vec<Vector2<f32>>)> = std::iter::once(&outer)
            .chain(holes.iter())
            .map(|contour| (contour, bevel_directions(contour)))
            .collect();
        let ring = |contour: &[Vector2<f32>], dirs: &[Vector2<f32>], expand: f32| {
            contour
                .iter()
                .zip(dirs)
                .map(|(p, d)| *p + *d * expand)
                .collect::<Vec<_>>()
        };

        // caps
        let (back_z, back_expand) = layers[0];
        let (front_z, front_expand) = layers[layers.len() - 1];
        for (z, expand, facing) in [(back_z, back_expand, -1.0f32), (front_z, front_expand, 1.0)] {
            let rings: Vec<Vec<Vector2<f32>>> = contours
                .iter()
                .map(|(contour, dirs)| ring(contour, dirs, expand))
                .collect();
            let (points, triangles) = triangulate::triangulate(&rings[0], &rings[1..]);
            let base = data.vertices.len() as u32;
            data.vertices.extend(points.iter().map(|p| ModelVertex {
                position: [p.x, p.y, z],
                normal: [0.0, 0.0, facing],
            }));
            for [a, b, c] in triangles {
                let (a, b, c) = (base + a as u32, base + b as u32, base + c as u32);
                if facing > 0.0 {
                    data.indices.extend_from_slice(&[a, b, c]);
                } else {
                    data.indices.extend_from_slice(&[a, c, b]);
                }
            }
        }

        // side walls
        for (contour, dirs) in contours.iter() {
            let rings: Vec<Vec<Vector3<f32>>> = layers
                .iter()
                .map(|(z, expand)| {
                    ring(contour, dirs, *expand)
                        .into_iter()
                        .map(|p| Vector3::new(p.x, p.y, *z))
                        .collect()
                })
                .collect();
            for pair in rings.windows(2) {
                let (lower, upper) = (&pair[0], &pair[1]);
                let n = lower.len();
                for i in 0..n {
                    let j = (i + 1) % n;
                    data.push_flat_triangle(lower[i], lower[j], upper[j]);
                    data.push_flat_triangle(lower[i], upper[j], upper[i]);
                }
            }
        }
    }
    data
}
