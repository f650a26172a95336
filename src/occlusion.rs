//! Ray-cone visibility test for particles behind the assembled tree.
//!
//! The tree silhouette is modelled as an implicit right circular cone, apex
//! up. A particle is occluded when the segment from it to the camera crosses
//! the cone's lateral surface inside its vertical extent. Nothing is stored;
//! each query solves the quadratic analytically.
//!
//! All degenerate inputs fall back to "visible". Hiding a particle because
//! of numerical noise pops; leaving it lit does not.

use glam::Vec3;

/// Tolerance below which the quadratic is treated as degenerate (ray
/// parallel to the cone's lateral surface).
const COEFF_EPSILON: f32 = 1e-4;

/// Minimum ray parameter for a hit, excluding self-intersection at the
/// particle itself.
const T_MIN: f32 = 0.1;

/// Hits closer than this to the apex are ignored. Rays grazing the apex sit
/// on the boundary of the quadratic and flicker between roots otherwise.
const APEX_EPSILON: f32 = 0.01;

/// Implicit cone: apex at `(0, height, 0)`, base circle of `radius` at y=0.
#[derive(Clone, Copy, Debug)]
pub struct ConeParams {
    pub height: f32,
    pub radius: f32,
}

/// Visibility of `point` as seen from `camera`: 1.0 visible, 0.0 occluded.
///
/// Returns binary values; callers blend the result in themselves (the
/// firefly batch scales it by how assembled the tree is).
pub fn visibility(point: Vec3, camera: Vec3, cone: ConeParams) -> f32 {
    let to_camera = camera - point;
    let dist = to_camera.length();
    if !dist.is_finite() || dist < COEFF_EPSILON {
        // Camera coincident with the particle; no meaningful ray.
        return 1.0;
    }
    let dir = to_camera / dist;

    // Shift so the apex is the origin; the surface satisfies
    // x^2 + z^2 = k^2 * y^2 with y in [-height, 0].
    let p = point - Vec3::new(0.0, cone.height, 0.0);
    let k = cone.radius / cone.height;
    let k2 = k * k;

    let a = dir.x * dir.x + dir.z * dir.z - k2 * dir.y * dir.y;
    let b = 2.0 * (p.x * dir.x + p.z * dir.z - k2 * p.y * dir.y);
    let c = p.x * p.x + p.z * p.z - k2 * p.y * p.y;

    if !a.is_finite() || a.abs() < COEFF_EPSILON {
        return 1.0;
    }

    let delta = b * b - 4.0 * a * c;
    if !(delta >= 0.0) {
        // Misses the infinite cone (or NaN crept in).
        return 1.0;
    }

    let sqrt_delta = delta.sqrt();
    for t in [(-b - sqrt_delta) / (2.0 * a), (-b + sqrt_delta) / (2.0 * a)] {
        if t > T_MIN && t < dist {
            let y = p.y + t * dir.y;
            if y > -cone.height && y < -APEX_EPSILON {
                return 0.0;
            }
        }
    }
    1.0
}
