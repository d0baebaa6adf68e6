//! Ellipsoid and ray helpers used by atmosphere tests, eclipse shadow
//! volumes, and label occlusion.

use glam::DVec3;

/// Scaled distance from a point to the surface of an axis-aligned ellipsoid
/// centered at the origin, in units of the reference radius.
///
/// `eye` is the point position divided by the reference radius, expressed in
/// the ellipsoid's body frame; `recip_semi_axes` are the reciprocals of the
/// normalized semi-axes. The result is not the true surface distance unless
/// the ellipsoid is a sphere: it is the distance along the line from the
/// point to the ellipsoid center, which is what the atmosphere-density test
/// needs.
pub fn ellipsoid_surface_distance(eye: DVec3, recip_semi_axes: DVec3) -> f64 {
    (eye * recip_semi_axes).length() - 1.0
}

/// Distance from `point` to the line through `origin` with direction `dir`.
///
/// `dir` need not be normalized. A zero direction degenerates to the
/// point-to-origin distance.
pub fn distance_point_to_ray(point: DVec3, origin: DVec3, dir: DVec3) -> f64 {
    let len = dir.length();
    if len < 1e-30 {
        return (point - origin).length();
    }
    (point - origin).cross(dir).length() / len
}

/// Nearest intersection of the ray `origin + t * dir` (t >= 0) with a sphere.
///
/// Returns the parameter `t` of the first hit, or `None` when the ray misses
/// or the sphere lies entirely behind the origin.
pub fn ray_sphere_intersect(origin: DVec3, dir: DVec3, center: DVec3, radius: f64) -> Option<f64> {
    let oc = origin - center;
    let a = dir.length_squared();
    if a < 1e-30 {
        return None;
    }
    let b = 2.0 * oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let t0 = (-b - sqrt_disc) / (2.0 * a);
    let t1 = (-b + sqrt_disc) / (2.0 * a);
    if t0 >= 0.0 {
        Some(t0)
    } else if t1 >= 0.0 {
        Some(t1)
    } else {
        None
    }
}
