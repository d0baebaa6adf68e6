//! Magnitude limits and the mapping from magnitudes to display
//! brightness.
//!
//! Auto-magnitude widens or narrows the visible magnitude range with the
//! field of view, so zooming in reveals fainter objects the way a longer
//! exposure would.

use glam::DVec3;

/// Field of view at which the configured magnitude limits apply directly.
pub const BASELINE_FOV_DEG: f64 = 45.0;

/// Widest brightness range representable on screen, in magnitudes.
const DISPLAY_MAG_RANGE: f64 = 6.0;

/// Magnitude limits for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MagnitudeLimits {
    /// Faintest visible magnitude.
    pub faintest: f64,
    /// Magnitude at which brightness saturates.
    pub saturation: f64,
}

/// Derive field-of-view-dependent magnitude limits.
///
/// At the baseline 45 degree field of view this returns the configured
/// values; narrower fields raise the faint limit.
pub fn auto_magnitude_limits(
    fov_deg: f64,
    faintest_auto_mag_45deg: f64,
    saturation_mag_night: f64,
) -> MagnitudeLimits {
    let field_corr = 2.0 * BASELINE_FOV_DEG / (fov_deg + BASELINE_FOV_DEG);
    MagnitudeLimits {
        faintest: faintest_auto_mag_45deg * field_corr.sqrt(),
        saturation: saturation_mag_night * (1.0 + field_corr * field_corr),
    }
}

/// Linear mapping from apparent magnitude to display brightness.
#[derive(Clone, Copy, Debug)]
pub struct BrightnessScale {
    pub scale: f64,
    pub bias: f64,
}

impl BrightnessScale {
    /// Build the brightness mapping for the frame's magnitude limits.
    ///
    /// When the limits span less than the displayable range the slope is
    /// pinned, so a narrow magnitude window does not blow out mid-range
    /// stars.
    pub fn new(limits: MagnitudeLimits) -> Self {
        let span = limits.faintest - limits.saturation;
        let scale = if span >= DISPLAY_MAG_RANGE {
            1.0 / span
        } else {
            1.0 / DISPLAY_MAG_RANGE
        };
        Self { scale, bias: 0.0 }
    }

    /// Display brightness of a star of `app_mag`, in `[0, 1]`.
    pub fn brightness(&self, app_mag: f64, limits: MagnitudeLimits) -> f32 {
        (((limits.faintest - app_mag) * self.scale + self.bias).clamp(0.0, 1.0)) as f32
    }

    /// Magnitude at which brightness reaches 1.0.
    pub fn saturation_point(&self, limits: MagnitudeLimits) -> f64 {
        limits.faintest - (1.0 - self.bias) / self.scale
    }

    /// Glare disc scale for a star brighter than the saturation point,
    /// in multiples of the point size. Capped so nearby stars do not
    /// flood the screen.
    pub fn glare_scale(&self, app_mag: f64, limits: MagnitudeLimits) -> f64 {
        (self.saturation_point(limits) - app_mag + 2.0).min(100.0)
    }
}

/// Opacity ramp for features near their minimum visible size: 0 at
/// `min_size`, 1 at `min_size * opaque_scale`.
pub fn size_fade(size: f64, min_size: f64, opaque_scale: f64) -> f32 {
    (((size - min_size) / (min_size * (opaque_scale - 1.0))).min(1.0).max(0.0)) as f32
}

/// Magnitude-limit reduction for an observer inside a body's atmosphere.
///
/// Daylight scattering hides faint stars, so both limits are pulled down
/// by up to 15 magnitudes at full daylight at the surface.
///
/// `observer_pos` is relative to the body center in kilometers,
/// `sun_dir` is the unit direction toward the sun.
pub fn sky_brightness_attenuation(
    observer_pos: DVec3,
    sun_dir: DVec3,
    body_radius: f64,
    semi_axes: DVec3,
    atmosphere_height: f64,
) -> f64 {
    if atmosphere_height <= 0.0 || body_radius <= 0.0 {
        return 0.0;
    }
    let recip_semi_axes = DVec3::ONE / semi_axes;
    // Distance above the surface in units of the radius, by the same
    // ellipsoid metric the horizon culling uses.
    let ellip_dist = stellar_math::ellipsoid_surface_distance(observer_pos, recip_semi_axes);
    let relative_height = atmosphere_height / body_radius;
    if ellip_dist >= relative_height || ellip_dist < 0.0 {
        return 0.0;
    }
    let density = 1.0 - ellip_dist / relative_height;
    let normal = observer_pos.normalize_or_zero();
    let illumination = (sun_dir.dot(normal) + 0.2).clamp(0.0, 1.0);
    15.0 * illumination * density
}
