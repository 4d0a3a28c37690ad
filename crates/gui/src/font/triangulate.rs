//! Ear-clipping triangulation of glyph shapes.
//!
//! Holes are joined to their outer contour with a zero-width bridge first,
//! so the clipper only ever sees one simple polygon per shape.

use kurbo::Point;

use super::outline::{contains, signed_area, Contour};

const EPSILON: f64 = 1e-10;

/// One filled region: an outer contour and the holes cut from it
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub outer: Contour,
    pub holes: Vec<Contour>,
}

/// Group the contours of one glyph into shapes. The winding of the largest
/// contour is taken as solid; contours wound the other way are holes and
/// belong to the smallest solid containing them.
pub fn group_contours(contours: Vec<Contour>) -> Vec<Shape> {
    let contours: Vec<(f64, Contour)> = contours
        .into_iter()
        .map(|c| (signed_area(&c), c))
        .filter(|(area, _)| area.abs() > EPSILON)
        .collect();

    let Some(solid_sign) = contours
        .iter()
        .map(|(area, _)| *area)
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .map(f64::signum)
    else {
        return Vec::new();
    };

    let (solids, holes): (Vec<_>, Vec<_>) = contours
        .into_iter()
        .partition(|(area, _)| area.signum() == solid_sign);

    let mut shapes: Vec<(f64, Shape)> = solids
        .into_iter()
        .map(|(area, outer)| {
            (
                area.abs(),
                Shape {
                    outer,
                    holes: Vec::new(),
                },
            )
        })
        .collect();

    for (_, hole) in holes {
        let owner = shapes
            .iter_mut()
            .filter(|(_, shape)| contains(&shape.outer, hole[0]))
            .min_by(|a, b| a.0.total_cmp(&b.0));
        match owner {
            Some((_, shape)) => shape.holes.push(hole),
            None => tracing::debug!("Dropping hole outside every outer contour"),
        }
    }

    shapes.into_iter().map(|(_, shape)| shape).collect()
}

/// Triangulate a shape. Triangles are counter-clockwise (y up).
pub fn triangulate(shape: &Shape) -> Vec<[Point; 3]> {
    let mut polygon = oriented(&shape.outer, true);

    let mut holes: Vec<Contour> = shape.holes.iter().map(|h| oriented(h, false)).collect();
    holes.sort_by(|a, b| max_x(b).total_cmp(&max_x(a)));
    for hole in &holes {
        polygon = bridge_hole(polygon, hole);
    }

    ear_clip(&polygon)
}

pub(crate) fn oriented(contour: &[Point], ccw: bool) -> Contour {
    let mut points = contour.to_vec();
    if (signed_area(&points) > 0.0) != ccw {
        points.reverse();
    }
    points
}

fn max_x(contour: &[Point]) -> f64 {
    contour.iter().map(|p| p.x).fold(f64::MIN, f64::max)
}

/// Splice `hole` into `polygon` through a bridge from the hole's rightmost
/// vertex to a visible polygon vertex.
fn bridge_hole(polygon: Contour, hole: &[Point]) -> Contour {
    let Some((mi, m)) = hole
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.x.total_cmp(&b.1.x))
    else {
        return polygon;
    };
    let Some(pi) = bridge_vertex(&polygon, m) else {
        tracing::debug!("No bridge found for hole, leaving it filled");
        return polygon;
    };

    let mut merged = Vec::with_capacity(polygon.len() + hole.len() + 2);
    merged.extend_from_slice(&polygon[..=pi]);
    merged.extend(hole[mi..].iter().chain(hole[..=mi].iter()).copied());
    merged.extend_from_slice(&polygon[pi..]);
    merged
}

/// Cast a ray from `m` towards +x, take the nearest edge hit, then prefer
/// any vertex inside the hit triangle that lies closest to the ray.
fn bridge_vertex(polygon: &[Point], m: Point) -> Option<usize> {
    let n = polygon.len();
    let mut hit: Option<(f64, usize)> = None;

    for i in 0..n {
        let (a, b) = (polygon[i], polygon[(i + 1) % n]);
        if (a.y > m.y) == (b.y > m.y) {
            continue;
        }
        let x = a.x + (m.y - a.y) / (b.y - a.y) * (b.x - a.x);
        if x < m.x || hit.is_some_and(|(best, _)| x >= best) {
            continue;
        }
        let candidate = if a.x > b.x { i } else { (i + 1) % n };
        hit = Some((x, candidate));
    }

    let (x, mut pi) = hit?;
    let p = polygon[pi];
    let i = Point::new(x, m.y);
    let mut best = (f64::MAX, f64::MAX);

    for (j, &v) in polygon.iter().enumerate() {
        if v == p || !in_triangle(v, m, i, p) {
            continue;
        }
        let d = v - m;
        let key = (d.y.abs().atan2(d.x), d.hypot2());
        if key < best {
            best = key;
            pi = j;
        }
    }

    // After earlier bridges a vertex can appear twice; pick the copy whose
    // interior wedge faces the hole
    let chosen = polygon
        .iter()
        .enumerate()
        .filter(|(_, &v)| v == polygon[pi])
        .map(|(j, _)| j)
        .find(|&j| locally_inside(polygon, j, m));
    Some(chosen.unwrap_or(pi))
}

/// Whether the direction from vertex `j` towards `m` points into the
/// (counter-clockwise) polygon's interior
fn locally_inside(polygon: &[Point], j: usize, m: Point) -> bool {
    let n = polygon.len();
    let a = polygon[(j + n - 1) % n];
    let v = polygon[j];
    let c = polygon[(j + 1) % n];
    let d = m - v;
    if (v - a).cross(c - v) >= 0.0 {
        (c - v).cross(d) >= 0.0 && d.cross(a - v) >= 0.0
    } else {
        !((a - v).cross(d) > 0.0 && d.cross(c - v) > 0.0)
    }
}

fn ear_clip(polygon: &[Point]) -> Vec<[Point; 3]> {
    let mut idx: Vec<usize> = (0..polygon.len()).collect();
    let mut triangles = Vec::with_capacity(polygon.len().saturating_sub(2));
    let mut i = 0;
    let mut misses = 0;

    while idx.len() > 3 {
        let n = idx.len();
        i %= n;
        let a = polygon[idx[(i + n - 1) % n]];
        let b = polygon[idx[i]];
        let c = polygon[idx[(i + 1) % n]];
        let turn = (b - a).cross(c - b);

        if turn.abs() <= EPSILON {
            // Collinear or doubled-back vertex: drop it, no area is lost
            idx.remove(i);
            misses = 0;
        } else if turn > 0.0 && is_ear(polygon, &idx, a, b, c) {
            triangles.push([a, b, c]);
            idx.remove(i);
            misses = 0;
        } else if misses > n {
            tracing::debug!("Ear clipping stalled with {n} vertices left, forcing a cut");
            triangles.push([a, b, c]);
            idx.remove(i);
            misses = 0;
        } else {
            i += 1;
            misses += 1;
        }
    }

    if let [a, b, c] = idx[..] {
        let (a, b, c) = (polygon[a], polygon[b], polygon[c]);
        if (b - a).cross(c - b).abs() > EPSILON {
            triangles.push([a, b, c]);
        }
    }

    triangles
}

fn is_ear(polygon: &[Point], idx: &[usize], a: Point, b: Point, c: Point) -> bool {
    idx.iter()
        .map(|&k| polygon[k])
        .filter(|&p| p != a && p != b && p != c)
        .all(|p| !in_triangle(p, a, b, c))
}

/// Inclusive of the edges
fn in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let d1 = (b - a).cross(p - a);
    let d2 = (c - b).cross(p - b);
    let d3 = (a - c).cross(p - c);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}
