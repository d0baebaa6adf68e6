//! Geometric and photometric math shared by the render core: view frustum,
//! view-cone culling geometry, astronomical unit/magnitude conversions, and
//! ellipsoid distance helpers.

mod astro;
mod ellipsoid;
mod frustum;
mod viewcone;

pub use astro::{
    ABS_MAG_SUN, KM_PER_AU, KM_PER_LY, SOLAR_POWER, abs_to_app_mag, app_to_abs_mag, au_to_km,
    circle_area, km_to_au, km_to_ly, lum_to_abs_mag, lum_to_app_mag, ly_to_km, sphere_area,
};
pub use ellipsoid::{distance_point_to_ray, ellipsoid_surface_distance, ray_sphere_intersect};
pub use frustum::{Frustum, SphereTest};
pub use viewcone::{ViewCone, cos_view_cone_angle, max_diagonal_fov};
