//! View frustum with classified sphere containment tests.
//!
//! The frustum is built geometrically from a vertical field of view rather
//! than extracted from a projection matrix: the culling code needs a
//! three-way Inside / Intersect / Outside answer and frequently re-derives
//! frustums for per-interval near/far planes, so constructing from angles is
//! both cheaper and more precise at extreme near/far ratios.

use glam::{DMat3, DVec3, DVec4};

/// Result of testing a bounding sphere against the frustum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SphereTest {
    /// Sphere is entirely inside all planes.
    Inside,
    /// Sphere straddles at least one plane.
    Intersect,
    /// Sphere is entirely behind some plane.
    Outside,
}

const LEFT: usize = 0;
const RIGHT: usize = 1;
const BOTTOM: usize = 2;
const TOP: usize = 3;
const NEAR: usize = 4;
const FAR: usize = 5;

/// A camera-space view frustum looking down -Z.
///
/// Each plane is `DVec4(a, b, c, d)` where `(a,b,c)` is the normalized
/// inward normal and `d` the offset; the signed distance of point `p` is
/// `n.dot(p) + d`. An infinite frustum omits the far plane, which is how
/// the traversal stage culls (far distances are unbounded until depth
/// partitioning assigns per-interval planes).
#[derive(Clone, Debug)]
pub struct Frustum {
    planes: [DVec4; 6],
    infinite: bool,
}

impl Frustum {
    /// Build a frustum with explicit near and far planes. `fov_y` is the
    /// vertical field of view in radians.
    pub fn perspective(fov_y: f64, aspect_ratio: f64, near: f64, far: f64) -> Self {
        let mut f = Self::perspective_infinite(fov_y, aspect_ratio, near);
        f.planes[FAR] = DVec4::new(0.0, 0.0, 1.0, far);
        f.infinite = false;
        f
    }

    /// Build a frustum with no far plane.
    pub fn perspective_infinite(fov_y: f64, aspect_ratio: f64, near: f64) -> Self {
        let h = (fov_y / 2.0).tan();
        let w = h * aspect_ratio;

        let mut planes = [DVec4::ZERO; 6];
        let side = |n: DVec3| {
            let n = n.normalize();
            DVec4::new(n.x, n.y, n.z, 0.0)
        };
        planes[BOTTOM] = side(DVec3::new(0.0, 1.0, -h));
        planes[TOP] = side(DVec3::new(0.0, -1.0, -h));
        planes[LEFT] = side(DVec3::new(1.0, 0.0, -w));
        planes[RIGHT] = side(DVec3::new(-1.0, 0.0, -w));
        planes[NEAR] = DVec4::new(0.0, 0.0, -1.0, -near);
        planes[FAR] = DVec4::new(0.0, 0.0, 1.0, f64::INFINITY);

        Self {
            planes,
            infinite: true,
        }
    }

    /// Rotate all plane normals, producing the frustum expressed in a frame
    /// rotated by `m` relative to camera space. Pure rotations leave plane
    /// offsets unchanged.
    pub fn transformed(&self, m: DMat3) -> Self {
        let mut out = self.clone();
        for plane in &mut out.planes {
            let n = m * DVec3::new(plane.x, plane.y, plane.z);
            *plane = DVec4::new(n.x, n.y, n.z, plane.w);
        }
        out
    }

    /// Classify a bounding sphere against the frustum planes.
    pub fn test_sphere(&self, center: DVec3, radius: f64) -> SphereTest {
        let n_planes = if self.infinite { 5 } else { 6 };
        let mut intersections = 0;

        for plane in &self.planes[..n_planes] {
            let dist = plane.truncate().dot(center) + plane.w;
            if dist < -radius {
                return SphereTest::Outside;
            }
            if dist <= radius {
                intersections += 1;
            }
        }

        if intersections == 0 {
            SphereTest::Inside
        } else {
            SphereTest::Intersect
        }
    }

    /// The four side-plane normals (left, right, bottom, top), used by the
    /// orbit renderer to clip polylines without near/far interference.
    pub fn side_plane_normals(&self) -> [DVec3; 4] {
        [
            self.planes[LEFT].truncate(),
            self.planes[RIGHT].truncate(),
            self.planes[BOTTOM].truncate(),
            self.planes[TOP].truncate(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_frustum() -> Frustum {
        Frustum::perspective(std::f64::consts::FRAC_PI_2, 1.0, 1.0, 1000.0)
    }

    #[test]
    fn test_sphere_in_front_is_inside() {
        let f = unit_frustum();
        assert_eq!(
            f.test_sphere(DVec3::new(0.0, 0.0, -10.0), 1.0),
            SphereTest::Inside
        );
    }

    #[test]
    fn test_sphere_behind_camera_is_outside() {
        let f = unit_frustum();
        assert_eq!(
            f.test_sphere(DVec3::new(0.0, 0.0, 10.0), 1.0),
            SphereTest::Outside
        );
    }

    #[test]
    fn test_sphere_straddling_near_plane_intersects() {
        let f = unit_frustum();
        assert_eq!(
            f.test_sphere(DVec3::new(0.0, 0.0, -1.0), 0.5),
            SphereTest::Intersect
        );
    }

    #[test]
    fn test_sphere_beyond_far_plane_is_outside() {
        let f = unit_frustum();
        assert_eq!(
            f.test_sphere(DVec3::new(0.0, 0.0, -2000.0), 1.0),
            SphereTest::Outside
        );
        // The infinite frustum keeps it.
        let inf = Frustum::perspective_infinite(std::f64::consts::FRAC_PI_2, 1.0, 1.0);
        assert_eq!(
            inf.test_sphere(DVec3::new(0.0, 0.0, -2000.0), 1.0),
            SphereTest::Inside
        );
    }

    #[test]
    fn test_sphere_far_to_the_side_is_outside() {
        let f = unit_frustum();
        // With a 90 degree fov the side planes are at 45 degrees; x >> |z|
        // puts the sphere well outside.
        assert_eq!(
            f.test_sphere(DVec3::new(100.0, 0.0, -10.0), 1.0),
            SphereTest::Outside
        );
    }

    #[test]
    fn test_transformed_frustum_follows_rotation() {
        // Rotate the frustum to look down +X instead of -Z.
        let rot = DMat3::from_rotation_y(-std::f64::consts::FRAC_PI_2);
        let f = unit_frustum().transformed(rot);
        assert_eq!(
            f.test_sphere(DVec3::new(10.0, 0.0, 0.0), 1.0),
            SphereTest::Inside
        );
        assert_eq!(
            f.test_sphere(DVec3::new(0.0, 0.0, -10.0), 1.0),
            SphereTest::Outside
        );
    }
}
