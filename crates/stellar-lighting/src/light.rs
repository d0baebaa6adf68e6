//! CPU-side light source and lighting-state types.

use glam::{DVec3, Vec3};

use crate::eclipse::{EclipseShadow, RingShadow};

/// Maximum number of directional lights applied to a single object.
pub const MAX_LIGHTS: usize = 8;

/// A star acting as a light source, positioned relative to the observer.
#[derive(Clone, Debug)]
pub struct LightSource {
    /// Observer-relative position in kilometers.
    pub position: DVec3,
    /// Bolometric luminosity in solar units.
    pub luminosity: f64,
    /// Stellar radius in kilometers, for apparent-size and umbra math.
    pub radius: f64,
    /// Linear RGB illumination tint.
    pub color: Vec3,
}

impl LightSource {
    /// Apparent angular radius (radians, small-angle) seen from a point
    /// at `distance` kilometers.
    pub fn apparent_size(&self, distance: f64) -> f64 {
        if distance <= 0.0 {
            return f64::INFINITY;
        }
        self.radius / distance
    }
}

/// A body bright enough to illuminate its neighbors with reflected light.
#[derive(Clone, Debug)]
pub struct SecondaryIlluminator {
    /// Observer-relative position in kilometers.
    pub position: DVec3,
    /// Body radius in kilometers.
    pub radius: f64,
    pub albedo: f64,
    /// Reflected irradiance at one body radius, filled in by
    /// [`crate::setup::setup_secondary_light_sources`].
    pub reflected_irradiance: f64,
}

/// One normalized light applied to an object.
#[derive(Clone, Debug)]
pub struct DirectionalLight {
    /// Unit vector from the object toward the light, in world space.
    pub direction: Vec3,
    /// Irradiance after tone-mapping, in `[0, 1]` relative to the
    /// brightest light on the object.
    pub irradiance: f32,
    pub color: Vec3,
    /// Whether any shadows were found for this light.
    pub casts_shadows: bool,
}

/// Complete lighting environment for one rendered object.
#[derive(Clone, Debug, Default)]
pub struct LightingState {
    /// At most [`MAX_LIGHTS`] lights, brightest first.
    pub lights: Vec<DirectionalLight>,
    /// Eclipse shadows per light, indexed like `lights`.
    pub shadows: Vec<Vec<EclipseShadow>>,
    /// Ring shadow per light, indexed like `lights`.
    pub ring_shadows: Vec<Option<RingShadow>>,
    /// Observer position in object space, in units of the object radius,
    /// clamped to 100 radii.
    pub eye_pos_obj: Vec3,
    /// Unit vector from the object center toward the observer, object space.
    pub eye_dir_obj: Vec3,
    pub ambient: f32,
}

impl LightingState {
    /// Attach an eclipse shadow to the light at `light_index`.
    pub fn add_shadow(&mut self, light_index: usize, shadow: EclipseShadow) {
        self.shadows[light_index].push(shadow);
        self.lights[light_index].casts_shadows = true;
    }

    pub fn set_ring_shadow(&mut self, light_index: usize, shadow: RingShadow) {
        self.ring_shadows[light_index] = Some(shadow);
        self.lights[light_index].casts_shadows = true;
    }
}
