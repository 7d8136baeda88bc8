//! Ear-clipping triangulation of simple polygons with holes.
//!
//! Holes are first stitched into the outer contour through a zero-width bridge
//! (outer vertex -> rightmost hole vertex -> around the hole -> back), which
//! turns the shape into one weakly simple polygon that plain ear clipping can
//! handle.

use cgmath::Vector2;

const EPSILON: f32 = 1e-9;

fn cross(o: Vector2<f32>, a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Shoelace area; positive for counter-clockwise contours.
pub fn signed_area(points: &[Vector2<f32>]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        * 0.5
}

/// Even-odd point in polygon test.
pub fn contains(polygon: &[Vector2<f32>], p: Vector2<f32>) -> bool {
    let n = polygon.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn in_triangle(a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>, p: Vector2<f32>) -> bool {
    cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0
}

fn oriented(points: &[Vector2<f32>], counter_clockwise: bool) -> Vec<Vector2<f32>> {
    let mut points = points.to_vec();
    if (signed_area(&points) > 0.0) != counter_clockwise {
        points.reverse();
    }
    points
}

/// Splices `hole` (clockwise) into `polygon` (counter-clockwise).
fn bridge_hole(polygon: &mut Vec<Vector2<f32>>, hole: &[Vector2<f32>]) {
    let Some(m_idx) = (0..hole.len()).max_by(|&a, &b| hole[a].x.total_cmp(&hole[b].x)) else {
        return;
    };
    let m = hole[m_idx];
    let n = polygon.len();

    // Closest edge hit by a ray from M towards +x.
    let mut hit: Option<(usize, f32)> = None;
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[(i + 1) % n]);
        if (a.y - m.y) * (b.y - m.y) > 0.0 || (a.y - b.y).abs() < EPSILON {
            continue;
        }
        let x = a.x + (m.y - a.y) / (b.y - a.y) * (b.x - a.x);
        if x >= m.x && hit.map_or(true, |(_, best)| x < best) {
            hit = Some((i, x));
        }
    }

    let p_idx = match hit {
        Some((i, x)) => {
            let j = (i + 1) % n;
            let p = if polygon[i].x > polygon[j].x { i } else { j };
            let intersection = Vector2::new(x, m.y);
            // A reflex vertex inside (M, I, P) would block the bridge; take the
            // one closest in angle to the ray instead.
            let (tri_b, tri_c) = if m.y < polygon[p].y {
                (intersection, polygon[p])
            } else {
                (polygon[p], intersection)
            };
            (0..n)
                .filter(|&k| k != p)
                .filter(|&k| {
                    let prev = polygon[(k + n - 1) % n];
                    let next = polygon[(k + 1) % n];
                    cross(prev, polygon[k], next) < 0.0
                        && in_triangle(m, tri_b, tri_c, polygon[k])
                })
                .min_by(|&a, &b| {
                    let angle = |k: usize| {
                        let d = polygon[k] - m;
                        (d.y.atan2(d.x).abs(), d.x * d.x + d.y * d.y)
                    };
                    angle(a).partial_cmp(&angle(b)).unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap_or(p)
        }
        None => (0..n)
            .min_by(|&a, &b| {
                let d = |k: usize| {
                    let v = polygon[k] - m;
                    v.x * v.x + v.y * v.y
                };
                d(a).total_cmp(&d(b))
            })
            .unwrap_or(0),
    };

    let mut merged = Vec::with_capacity(n + hole.len() + 2);
    merged.extend_from_slice(&polygon[..=p_idx]);
    merged.extend(hole[m_idx..].iter().chain(hole[..=m_idx].iter()).copied());
    merged.push(polygon[p_idx]);
    merged.extend_from_slice(&polygon[p_idx + 1..]);
    *polygon = merged;
}

/// Triangulates `outer` with `holes`. Winding of the inputs does not matter.
///
/// Returns the merged vertex list and counter-clockwise triangles indexing it.
pub fn triangulate(
    outer: &[Vector2<f32>],
    holes: &[Vec<Vector2<f32>>],
) -> (Vec<Vector2<f32>>, Vec<[usize; 3]>) {
    let mut polygon = oriented(outer, true);
    let mut holes: Vec<Vec<Vector2<f32>>> = holes
        .iter()
        .filter(|hole| hole.len() >= 3)
        .map(|hole| oriented(hole, false))
        .collect();
    holes.sort_by(|a, b| {
        let max_x = |h: &Vec<Vector2<f32>>| h.iter().fold(f32::MIN, |acc, p| acc.max(p.x));
        max_x(b).total_cmp(&max_x(a))
    });
    for hole in holes.iter() {
        bridge_hole(&mut polygon, hole);
    }

    let mut triangles = Vec::new();
    let mut remaining: Vec<usize> = (0..polygon.len()).collect();
    while remaining.len() > 3 {
        let len = remaining.len();
        let corner = |k: usize| {
            (
                remaining[(k + len - 1) % len],
                remaining[k],
                remaining[(k + 1) % len],
            )
        };
        let ear = (0..len).find(|&k| {
            let (i0, i1, i2) = corner(k);
            let (a, b, c) = (polygon[i0], polygon[i1], polygon[i2]);
            if cross(a, b, c) <= EPSILON {
                return false;
            }
            !remaining.iter().any(|&j| {
                let p = polygon[j];
                p != a && p != b && p != c && in_triangle(a, b, c, p)
            })
        });
        match ear {
            Some(k) => {
                let (i0, i1, i2) = corner(k);
                triangles.push([i0, i1, i2]);
                remaining.remove(k);
            }
            None => {
                // Degenerate input: drop a collinear vertex if there is one,
                // otherwise clip anyway to guarantee progress.
                let flat = (0..len).find(|&k| {
                    let (i0, i1, i2) = corner(k);
                    cross(polygon[i0], polygon[i1], polygon[i2]).abs() <= EPSILON
                });
                match flat {
                    Some(k) => {
                        remaining.remove(k);
                    }
                    None => {
                        let (i0, i1, i2) = corner(0);
                        triangles.push([i0, i1, i2]);
                        remaining.remove(0);
                    }
                }
            }
        }
    }
    if let &[i0, i1, i2] = remaining.as_slice() {
        if cross(polygon[i0], polygon[i1], polygon[i2]) > EPSILON {
            triangles.push([i0, i1, i2]);
        }
    }

    (polygon, triangles)
}
