//! Per-frame light collection and per-object lighting state.

use glam::{DQuat, DVec3, Vec3};
use log::trace;

use stellar_math::KM_PER_AU;

use crate::light::{
    DirectionalLight, LightSource, LightingState, SecondaryIlluminator, MAX_LIGHTS,
};

/// Lights dimmer than the total irradiance divided by this are dropped
/// from an object's lighting state.
const IRRADIANCE_CUTOFF_RATIO: f64 = 1.0 / 10_000.0;

/// Exponent mapping a 1:10000 irradiance ratio onto a 1:255 display
/// ratio. ln(1/255) / ln(1/10000).
fn display_gamma() -> f64 {
    (1.0 / 255.0f64).ln() / (1.0 / 10_000.0f64).ln()
}

/// The observer's eye position is clamped to this many object radii when
/// expressed in object space, so shader precision is bounded.
const MAX_EYE_DISTANCE_RADII: f32 = 100.0;

/// A nearby star considered as a light source.
#[derive(Clone, Copy, Debug)]
pub struct IlluminatingStar {
    /// Observer-relative position in kilometers.
    pub position: DVec3,
    pub luminosity: f64,
    pub radius: f64,
    /// Effective temperature in kelvin.
    pub temperature: f64,
}

/// Illumination tint for a star of the given effective temperature.
///
/// A coarse blackbody approximation; applied only when tinted
/// illumination is enabled, otherwise callers use white.
pub fn star_tint(temperature: f64) -> Vec3 {
    if temperature > 30_000.0 {
        Vec3::new(0.8, 0.8, 1.0)
    } else if temperature > 10_000.0 {
        Vec3::new(0.9, 0.9, 1.0)
    } else if temperature > 5_400.0 {
        Vec3::new(1.0, 1.0, 1.0)
    } else if temperature > 3_900.0 {
        Vec3::new(1.0, 0.9, 0.8)
    } else if temperature > 2_000.0 {
        Vec3::new(1.0, 0.7, 0.7)
    } else {
        Vec3::new(1.0, 0.4, 0.4)
    }
}

/// Turn the frame's nearby stars into light sources, brightest-at-1AU
/// ordering left to the caller since brightness depends on the lit object.
pub fn setup_light_sources(stars: &[IlluminatingStar], tinted: bool) -> Vec<LightSource> {
    stars
        .iter()
        .map(|star| LightSource {
            position: star.position,
            luminosity: star.luminosity,
            radius: star.radius,
            color: if tinted {
                star_tint(star.temperature)
            } else {
                Vec3::ONE
            },
        })
        .collect()
}

/// Fill in the reflected irradiance of each secondary illuminator from
/// the frame's primary light sources.
pub fn setup_secondary_light_sources(
    illuminators: &mut [SecondaryIlluminator],
    lights: &[LightSource],
) {
    for illum in illuminators.iter_mut() {
        let mut irradiance = 0.0;
        for light in lights {
            let dist_sq_au =
                (light.position - illum.position).length_squared() / (KM_PER_AU * KM_PER_AU);
            if dist_sq_au > 0.0 {
                irradiance += light.luminosity / dist_sq_au;
            }
        }
        illum.reflected_irradiance = irradiance * illum.albedo;
    }
}

/// Fraction of an illuminator's reflected light that reaches an object,
/// accounting for the illuminator's phase as seen from the object.
///
/// `to_sun` and `to_object` are vectors from the illuminator; `radius`
/// is the illuminator's radius in the same units.
pub fn estimate_reflected_light_fraction(to_sun: DVec3, to_object: DVec3, radius: f64) -> f64 {
    let d = to_object.length();
    if d <= 0.0 {
        return 0.0;
    }
    let cos_theta = (radius / d).min(0.999);
    let denom = to_sun.length() * d;
    if denom <= 0.0 {
        return 0.0;
    }
    let cos_phi = to_sun.dot(to_object) / denom;
    let s = ((1.0 - cos_phi * cos_phi) * (1.0 - cos_theta * cos_theta))
        .max(0.0)
        .sqrt();
    (2.0 * cos_phi.max(0.0)
        + (cos_phi * cos_theta - s).max(0.0)
        + (cos_phi * cos_theta + s).max(0.0))
        * 0.25
}

/// Build the lighting state for one object.
///
/// `object_position` is observer-relative in kilometers; the observer is
/// at the origin. Lights are sorted brightest first, faint lights are
/// culled, and irradiances are tone-mapped into `[0, 1]`.
pub fn setup_object_lighting(
    lights: &[LightSource],
    secondaries: &[SecondaryIlluminator],
    object_position: DVec3,
    object_orientation: DQuat,
    object_radius: f64,
    ambient: f32,
) -> LightingState {
    struct Candidate {
        direction: DVec3,
        irradiance: f64,
        color: Vec3,
    }
    let mut candidates: Vec<Candidate> = Vec::with_capacity(lights.len() + 1);

    for light in lights {
        let to_light = light.position - object_position;
        let dist_sq_au = to_light.length_squared() / (KM_PER_AU * KM_PER_AU);
        if dist_sq_au <= 0.0 {
            continue;
        }
        candidates.push(Candidate {
            direction: to_light.normalize(),
            irradiance: light.luminosity / dist_sq_au,
            color: light.color,
        });
    }

    // Only the brightest reflecting body contributes as an extra light;
    // fainter ones are below the display threshold in practice.
    let brightest_primary = candidates
        .iter()
        .max_by(|a, b| a.irradiance.total_cmp(&b.irradiance))
        .map(|c| c.direction);
    let mut best: Option<Candidate> = None;
    for illum in secondaries {
        let to_object = object_position - illum.position;
        let dist_sq = to_object.length_squared();
        // The object itself appears in the illuminator list.
        if dist_sq <= illum.radius * illum.radius {
            continue;
        }
        // Distance in illuminator radii: reflected irradiance is the
        // value at the illuminator's surface.
        let dist_sq_radii = dist_sq / (illum.radius * illum.radius);
        let mut irradiance = illum.reflected_irradiance / dist_sq_radii;
        if let Some(sun_dir) = brightest_primary {
            irradiance *=
                estimate_reflected_light_fraction(sun_dir * KM_PER_AU, to_object, illum.radius);
        }
        if best.as_ref().map(|c| irradiance > c.irradiance).unwrap_or(true) && irradiance > 0.0 {
            best = Some(Candidate {
                direction: (illum.position - object_position).normalize(),
                irradiance,
                color: Vec3::ONE,
            });
        }
    }
    if let Some(candidate) = best {
        candidates.push(candidate);
    }

    let total_irradiance: f64 = candidates.iter().map(|c| c.irradiance).sum();
    if total_irradiance <= 0.0 {
        return LightingState {
            ambient,
            ..LightingState::default()
        };
    }
    let cutoff = total_irradiance * IRRADIANCE_CUTOFF_RATIO;
    candidates.retain(|c| c.irradiance >= cutoff);
    candidates.sort_by(|a, b| b.irradiance.total_cmp(&a.irradiance));
    candidates.truncate(MAX_LIGHTS);
    trace!(
        "object lighting: {} lights, total irradiance {total_irradiance:.3e}",
        candidates.len()
    );

    let gamma = display_gamma();
    let lights: Vec<DirectionalLight> = candidates
        .iter()
        .map(|c| DirectionalLight {
            direction: c.direction.as_vec3(),
            irradiance: (c.irradiance / total_irradiance).powf(gamma) as f32,
            color: c.color,
            casts_shadows: false,
        })
        .collect();

    let inv_orientation = object_orientation.conjugate();
    let eye_obj = inv_orientation * (-object_position);
    let mut eye_pos_obj = if object_radius > 0.0 {
        (eye_obj / object_radius).as_vec3()
    } else {
        eye_obj.as_vec3()
    };
    let eye_dir_obj = eye_pos_obj.normalize_or_zero();
    if eye_pos_obj.length() > MAX_EYE_DISTANCE_RADII {
        eye_pos_obj = eye_dir_obj * MAX_EYE_DISTANCE_RADII;
    }

    let n = lights.len();
    LightingState {
        lights,
        shadows: vec![Vec::new(); n],
        ring_shadows: vec![None; n],
        eye_pos_obj,
        eye_dir_obj,
        ambient,
    }
}
