//! Exact geometric queries used by the distance and sign passes.
//!
//! Point-to-triangle distance is closed form: the query point is
//! classified into one of the seven Voronoi regions of the triangle
//! (three vertices, three edges, the face) from dot products of the
//! edge vectors, then projected onto that feature.

use nalgebra::{Point2, Point3};

/// The triangle feature nearest to a query point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleFeature {
    /// Vertex 0, 1 or 2.
    Vertex(u8),
    /// Edge 0 (v0-v1), 1 (v1-v2) or 2 (v2-v0).
    Edge(u8),
    /// Interior of the face.
    Face,
}

/// Result of a closest point query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint {
    /// Euclidean distance from the query point.
    pub distance: f64,
    /// Closest point on the primitive.
    pub point: Point3<f64>,
    /// Which feature the closest point lies on.
    pub feature: TriangleFeature,
}

/// Distance from `p` to the segment `a`-`b` and the closest point on it.
///
/// A zero-length segment behaves as the point `a`.
pub fn point_segment_distance(
    p: Point3<f64>,
    a: Point3<f64>,
    b: Point3<f64>,
) -> (f64, Point3<f64>) {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    let closest = if len_sq > 0.0 {
        let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
        a + ab * t
    } else {
        a
    };
    ((p - closest).norm(), closest)
}

/// Distance from `p` to the triangle `a`-`b`-`c` and the closest point on it.
///
/// Zero-area triangles fall back to the nearest of their edges, which
/// covers both the segment and single point cases.
///
/// # Example
///
/// ```
/// use mesh_sdf::point_triangle_distance;
/// use nalgebra::Point3;
///
/// let (d, closest) = point_triangle_distance(
///     Point3::new(0.25, 0.25, 2.0),
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
/// assert!((d - 2.0).abs() < 1e-12);
/// assert_eq!(closest, Point3::new(0.25, 0.25, 0.0));
/// ```
#[inline]
pub fn point_triangle_distance(
    p: Point3<f64>,
    a: Point3<f64>,
    b: Point3<f64>,
    c: Point3<f64>,
) -> (f64, Point3<f64>) {
    let q = closest_point_on_triangle(p, a, b, c);
    (q.distance, q.point)
}

/// Closest point query against a triangle, reporting the Voronoi feature.
pub fn closest_point_on_triangle(
    p: Point3<f64>,
    a: Point3<f64>,
    b: Point3<f64>,
    c: Point3<f64>,
) -> ClosestPoint {
    let ab = b - a;
    let ac = c - a;

    let scale = ab
        .norm_squared()
        .max(ac.norm_squared())
        .max((c - b).norm_squared());
    if ab.cross(&ac).norm_squared() <= (f64::EPSILON * scale).powi(2) {
        return closest_on_degenerate(p, a, b, c);
    }

    let found = |point: Point3<f64>, feature| ClosestPoint {
        distance: (p - point).norm(),
        point,
        feature,
    };

    // Projections of p relative to each vertex onto both edge directions.
    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return found(a, TriangleFeature::Vertex(0));
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return found(b, TriangleFeature::Vertex(1));
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return found(c, TriangleFeature::Vertex(2));
    }

    // Unnormalized barycentric weights of the projection onto the plane.
    let w_c = d1 * d4 - d3 * d2;
    let w_b = d5 * d2 - d1 * d6;
    let w_a = d3 * d6 - d5 * d4;

    if w_c <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let t = d1 / (d1 - d3);
        return found(a + ab * t, TriangleFeature::Edge(0));
    }
    if w_a <= 0.0 && d4 >= d3 && d5 >= d6 {
        let t = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return found(b + (c - b) * t, TriangleFeature::Edge(1));
    }
    if w_b <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let t = d2 / (d2 - d6);
        return found(a + ac * t, TriangleFeature::Edge(2));
    }

    let inv = 1.0 / (w_a + w_b + w_c);
    found(a + ab * (w_b * inv) + ac * (w_c * inv), TriangleFeature::Face)
}

fn closest_on_degenerate(
    p: Point3<f64>,
    a: Point3<f64>,
    b: Point3<f64>,
    c: Point3<f64>,
) -> ClosestPoint {
    let edges = [(a, b), (b, c), (c, a)];
    let mut best = ClosestPoint {
        distance: f64::INFINITY,
        point: a,
        feature: TriangleFeature::Vertex(0),
    };
    for (idx, (s, e)) in edges.into_iter().enumerate() {
        let (distance, point) = point_segment_distance(p, s, e);
        if distance < best.distance {
            best = ClosestPoint {
                distance,
                point,
                feature: TriangleFeature::Edge(idx as u8),
            };
        }
    }
    best
}

/// Orientation of the triangle (0,0)-(x1,y1)-(x2,y2).
///
/// Returns the sign and twice the signed area. When the area is exactly
/// zero the sign is decided by a fixed ordering of the coordinates, so
/// that it is only zero for coincident points. Two triangles sharing an
/// edge therefore never both claim a point lying exactly on it.
#[inline]
pub fn orientation_2d(x1: f64, y1: f64, x2: f64, y2: f64) -> (i8, f64) {
    let twice_area = y1 * x2 - x1 * y2;
    let sign = if twice_area > 0.0 {
        1
    } else if twice_area < 0.0 {
        -1
    } else if y2 > y1 {
        1
    } else if y2 < y1 {
        -1
    } else if x1 > x2 {
        1
    } else if x1 < x2 {
        -1
    } else {
        0
    };
    (sign, twice_area)
}

/// Robust test of `p` against the 2D triangle `a`-`b`-`c`.
///
/// Returns normalized barycentric weights of `p` when it is inside.
/// Points on shared edges and vertices are assigned to exactly one of
/// the triangles of a consistently oriented fan.
pub fn point_in_triangle_2d(
    p: Point2<f64>,
    a: Point2<f64>,
    b: Point2<f64>,
    c: Point2<f64>,
) -> Option<[f64; 3]> {
    let (a, b, c) = (a - p, b - p, c - p);

    let (sign_a, wa) = orientation_2d(b.x, b.y, c.x, c.y);
    if sign_a == 0 {
        return None;
    }
    let (sign_b, wb) = orientation_2d(c.x, c.y, a.x, a.y);
    if sign_b != sign_a {
        return None;
    }
    let (sign_c, wc) = orientation_2d(a.x, a.y, b.x, b.y);
    if sign_c != sign_a {
        return None;
    }

    let sum = wa + wb + wc;
    if sum == 0.0 {
        // Matching nonzero signs with an all-zero area: degenerate triangle.
        return None;
    }
    Some([wa / sum, wb / sum, wc / sum])
}
