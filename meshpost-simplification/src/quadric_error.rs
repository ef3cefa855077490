//! Quadric error metric helpers

use nalgebra::{Matrix4, Vector4};
use meshpost_core::Point3f;

/// Plane `(a, b, c, d)` with unit normal through the triangle, or a fallback
/// z-plane for degenerate triangles.
pub fn triangle_plane(v0: &Point3f, v1: &Point3f, v2: &Point3f) -> Vector4<f64> {
    let e1 = v1 - v0;
    let e2 = v2 - v0;
    let n = e1.cross(&e2).normalize();
    if !n.iter().all(|x| x.is_finite()) {
        return Vector4::new(0.0, 0.0, 1.0, 0.0);
    }
    let d = -n.dot(&v0.coords);
    Vector4::new(n.x as f64, n.y as f64, n.z as f64, d as f64)
}

/// Fundamental error quadric `p pᵀ` of a plane
pub fn plane_quadric(p: &Vector4<f64>) -> Matrix4<f64> {
    let (a, b, c, d) = (p[0], p[1], p[2], p[3]);
    Matrix4::new(
        a * a, a * b, a * c, a * d,
        a * b, b * b, b * c, b * d,
        a * c, b * c, c * c, c * d,
        a * d, b * d, c * d, d * d,
    )
}

/// Squared distance error `vᵀ Q v` of a position under a quadric
pub fn quadric_error(q: &Matrix4<f64>, p: &Point3f) -> f64 {
    let vh = Vector4::new(p.x as f64, p.y as f64, p.z as f64, 1.0);
    (vh.transpose() * q * vh)[0].max(0.0)
}

/// Position minimizing `q`, or the midpoint of `a` and `b` when the system is
/// singular.
pub fn optimal_position(q: &Matrix4<f64>, a: &Point3f, b: &Point3f) -> Point3f {
    let q3 = q.fixed_view::<3, 3>(0, 0);
    let q1 = q.fixed_view::<3, 1>(0, 3);

    if let Some(inv) = q3.try_inverse() {
        let p = -inv * q1;
        let candidate = Point3f::new(p[0] as f32, p[1] as f32, p[2] as f32);
        if candidate.coords.iter().all(|x| x.is_finite()) {
            return candidate;
        }
    }
    Point3f::from((a.coords + b.coords) * 0.5)
}

/// Shape quality in `[0, 1]`: 1 for an equilateral triangle, 0 for a
/// degenerate one.
pub fn triangle_quality(v0: &Point3f, v1: &Point3f, v2: &Point3f) -> f64 {
    let e0 = (v1 - v0).cast::<f64>();
    let e1 = (v2 - v1).cast::<f64>();
    let e2 = (v0 - v2).cast::<f64>();
    let sum_sq = e0.norm_squared() + e1.norm_squared() + e2.norm_squared();
    if sum_sq <= f64::EPSILON {
        return 0.0;
    }
    let double_area = e0.cross(&(-e2)).norm();
    (2.0 * 3f64.sqrt() * double_area / sum_sq).clamp(0.0, 1.0)
}
