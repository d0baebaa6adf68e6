//! Conical approximation of the view frustum for cheap early culling.
//!
//! A full frustum test at every level of the scene hierarchy is wasteful;
//! instead the traversal tests bounding spheres against the cone subtending
//! the screen diagonal. The cone test is a necessary-but-not-sufficient
//! condition: it may admit objects the frustum would reject, but it never
//! rejects an object whose bounding sphere intersects the frustum.

use glam::DVec3;

/// Cosine of half the diagonal field of view for a viewport of the given
/// pixel dimensions. `vertical_fov` is in radians.
pub fn cos_view_cone_angle(vertical_fov: f64, width: f64, height: f64) -> f64 {
    let h = (vertical_fov / 2.0).tan();
    let diag = (1.0 + h * h + (h * width / height).powi(2)).sqrt();
    1.0 / diag
}

/// The diagonal (corner-to-corner) field of view in radians for a frustum
/// with the given vertical field of view and aspect ratio.
pub fn max_diagonal_fov(vertical_fov: f64, aspect_ratio: f64) -> f64 {
    let l = 1.0 / (vertical_fov / 2.0).tan();
    2.0 * ((aspect_ratio * aspect_ratio + 1.0).sqrt() / l).atan()
}

/// Precomputed view-cone trigonometry for one frame.
#[derive(Clone, Copy, Debug)]
pub struct ViewCone {
    cos_angle: f64,
    sin_angle: f64,
    inv_cos_angle: f64,
}

impl ViewCone {
    pub fn new(vertical_fov: f64, width: f64, height: f64) -> Self {
        let cos_angle = cos_view_cone_angle(vertical_fov, width, height);
        Self {
            cos_angle,
            sin_angle: (1.0 - cos_angle * cos_angle).max(0.0).sqrt(),
            inv_cos_angle: 1.0 / cos_angle,
        }
    }

    pub fn cos_angle(&self) -> f64 {
        self.cos_angle
    }

    /// Test whether a bounding sphere can intersect the cone.
    ///
    /// `dist_along_axis` is the signed distance of the sphere center along
    /// the view normal, `perp_dist_sq` the squared distance from the center
    /// to its projection on the view normal.
    pub fn intersects_sphere(&self, dist_along_axis: f64, perp_dist_sq: f64, radius: f64) -> bool {
        if dist_along_axis <= -radius {
            return false;
        }
        let max_perp_dist = (radius + dist_along_axis * self.sin_angle) * self.inv_cos_angle;
        perp_dist_sq < max_perp_dist * max_perp_dist
    }

    /// Convenience wrapper: test a sphere given its position relative to the
    /// viewer and the view normal (unit vector toward the view direction).
    pub fn test_sphere(&self, pos: DVec3, view_normal: DVec3, radius: f64) -> bool {
        let dist_along_axis = view_normal.dot(pos);
        let perp = pos - dist_along_axis * view_normal;
        self.intersects_sphere(dist_along_axis, perp.length_squared(), radius)
    }
}
