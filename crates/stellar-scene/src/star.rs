//! Stars: positions in light-years, photometric properties, and the
//! optional barycentric orbit of multiple-star members.

use glam::DVec3;

use stellar_math::{lum_to_abs_mag, lum_to_app_mag, ly_to_km};

use crate::orbit::SharedOrbit;

/// Catalog identifier of a star.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StarId(pub u32);

/// A star in the catalog.
pub struct Star {
    pub id: StarId,
    pub name: String,
    /// Position of the star (or of its barycenter for orbiting members),
    /// in light-years from the coordinate origin.
    pub position_ly: DVec3,
    /// Bolometric luminosity in solar units.
    pub luminosity: f64,
    pub radius_km: f64,
    /// Effective surface temperature in kelvin. Drives illumination tint.
    pub temperature: f64,
    pub visible: bool,
    /// Barycentric orbit for members of multiple systems, in kilometers
    /// around `position_ly`.
    pub orbit: Option<SharedOrbit>,
}

impl Star {
    /// Position at time `t` in light-years, following the barycentric
    /// orbit when present.
    pub fn position_at(&self, t: f64) -> DVec3 {
        match &self.orbit {
            Some(orbit) => {
                let offset_km = orbit.position_at_time(t);
                self.position_ly + offset_km / ly_to_km(1.0)
            }
            None => self.position_ly,
        }
    }

    pub fn absolute_magnitude(&self) -> f64 {
        lum_to_abs_mag(self.luminosity)
    }

    pub fn apparent_magnitude(&self, distance_ly: f64) -> f64 {
        lum_to_app_mag(self.luminosity, distance_ly)
    }

    /// Sun-like star at the origin, for tests.
    #[cfg(any(test, feature = "test-fixtures"))]
    pub fn test_star() -> Star {
        Star {
            id: StarId(0),
            name: "test star".to_owned(),
            position_ly: DVec3::ZERO,
            luminosity: 1.0,
            radius_km: 696_000.0,
            temperature: 5772.0,
            visible: true,
            orbit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::CircularOrbit;
    use std::sync::Arc;

    #[test]
    fn test_sun_absolute_magnitude() {
        let star = Star::test_star();
        assert!((star.absolute_magnitude() - 4.83).abs() < 1e-9);
    }

    #[test]
    fn test_apparent_magnitude_at_ten_parsecs() {
        let star = Star::test_star();
        let ten_pc_ly = 32.615_637_77;
        assert!((star.apparent_magnitude(ten_pc_ly) - star.absolute_magnitude()).abs() < 1e-6);
    }

    #[test]
    fn test_barycentric_orbit_offsets_position() {
        let mut star = Star::test_star();
        star.position_ly = DVec3::new(10.0, 0.0, 0.0);
        star.orbit = Some(Arc::new(CircularOrbit::new(ly_to_km(0.001), 365.25)));
        let fixed = star.position_ly;
        let moving = star.position_at(0.0);
        assert!((moving - fixed).length() > 0.0005);
        assert!((moving - fixed).length() < 0.0015);
    }
}
