//! Astronomical unit conversions and stellar magnitude arithmetic.
//!
//! Distances inside a star system are kept in kilometers; catalog-scale
//! distances in light-years. Magnitude conversions follow the standard
//! distance-modulus relations with luminosities expressed in solar units.

/// Kilometers per astronomical unit (IAU 2012 exact definition).
pub const KM_PER_AU: f64 = 149_597_870.7;

/// Kilometers per light-year (IAU definition, exactly 9 460 730 472 580.8 km).
pub const KM_PER_LY: f64 = 9_460_730_472_580.8;

/// Light-years per parsec.
const LY_PER_PARSEC: f64 = 3.261_563_777;

/// Absolute visual magnitude of the Sun.
pub const ABS_MAG_SUN: f64 = 4.83;

/// Total radiated power of the Sun in watts, used when estimating the
/// luminosity of sunlight reflected off a planet.
pub const SOLAR_POWER: f64 = 3.828e26;

pub fn au_to_km(au: f64) -> f64 {
    au * KM_PER_AU
}

pub fn km_to_au(km: f64) -> f64 {
    km / KM_PER_AU
}

pub fn ly_to_km(ly: f64) -> f64 {
    ly * KM_PER_LY
}

pub fn km_to_ly(km: f64) -> f64 {
    km / KM_PER_LY
}

/// Convert a luminosity in solar units to an absolute magnitude.
pub fn lum_to_abs_mag(lum: f64) -> f64 {
    ABS_MAG_SUN - 2.5 * lum.log10()
}

/// Convert an absolute magnitude to an apparent magnitude at the given
/// distance in light-years.
pub fn abs_to_app_mag(abs_mag: f64, dist_ly: f64) -> f64 {
    abs_mag + 5.0 * (dist_ly / (LY_PER_PARSEC * 10.0)).log10()
}

/// Convert an apparent magnitude at the given distance back to an absolute
/// magnitude.
pub fn app_to_abs_mag(app_mag: f64, dist_ly: f64) -> f64 {
    app_mag - 5.0 * (dist_ly / (LY_PER_PARSEC * 10.0)).log10()
}

/// Apparent magnitude of an object with the given luminosity (in solar
/// units) seen from `dist_ly` light-years away.
pub fn lum_to_app_mag(lum: f64, dist_ly: f64) -> f64 {
    abs_to_app_mag(lum_to_abs_mag(lum), dist_ly)
}

/// Surface area of a sphere with radius `r`.
pub fn sphere_area(r: f64) -> f64 {
    4.0 * std::f64::consts::PI * r * r
}

/// Area of a circle with radius `r`.
pub fn circle_area(r: f64) -> f64 {
    std::f64::consts::PI * r * r
}
