//! Eclipse and ring-shadow geometry.
//!
//! An eclipse shadow is modeled as a cylinder of penumbra radius around
//! the light-to-caster axis. The test works on position snapshots taken
//! at the frame's time, so shadow results are stable within a frame.

use glam::{DQuat, DVec3};

use stellar_math::distance_point_to_ray;

/// Occluders smaller than this fraction of the receiver's radius are
/// skipped; their shadows would be sub-pixel at any eclipse geometry.
pub const MIN_RELATIVE_OCCLUDER_RADIUS: f64 = 0.005;

/// Shadows dimming the surface by less than one display step are discarded.
const MIN_SHADOW_DEPTH: f64 = 1.0 / 256.0;

/// Position snapshot of a shadow-casting body.
#[derive(Clone, Copy, Debug)]
pub struct CasterSnapshot {
    /// Observer-relative position in kilometers.
    pub position: DVec3,
    pub radius: f64,
    pub orientation: DQuat,
    /// Ring extents (inner, outer) in kilometers, if the caster has rings.
    pub rings: Option<(f64, f64)>,
}

/// Position snapshot of the body receiving shadows.
#[derive(Clone, Copy, Debug)]
pub struct ReceiverSnapshot {
    pub position: DVec3,
    pub radius: f64,
}

/// Position snapshot of the light source.
#[derive(Clone, Copy, Debug)]
pub struct LightSnapshot {
    pub position: DVec3,
    /// Stellar radius in kilometers.
    pub radius: f64,
}

/// A shadow cone cast across a receiver, in receiver-relative coordinates.
#[derive(Clone, Copy, Debug)]
pub struct EclipseShadow {
    /// Caster position relative to the receiver center, kilometers.
    pub origin: DVec3,
    /// Unit axis of the shadow cylinder, pointing away from the light.
    pub direction: DVec3,
    pub penumbra_radius: f64,
    pub umbra_radius: f64,
    /// Darkness at the umbra center, in `[0, 1]`. Less than 1 for
    /// annular eclipses where the occluder cannot cover the light disc.
    pub max_depth: f32,
    pub caster_orientation: DQuat,
}

/// A ring system's shadow across a receiver.
#[derive(Clone, Copy, Debug)]
pub struct RingShadow {
    /// Caster (ring center) position relative to the receiver, kilometers.
    pub origin: DVec3,
    /// Unit direction of incoming light.
    pub direction: DVec3,
    /// Ring plane normal in world space.
    pub plane_normal: DVec3,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub caster_orientation: DQuat,
}

/// Test whether `caster` shadows `receiver` with respect to `light`.
///
/// Returns `None` when the occluder is too small relative to the
/// receiver, the receiver is outside the shadow cylinder, the caster is
/// on the wrong side of the receiver, or the shadow is too shallow to
/// display.
pub fn test_eclipse(
    receiver: &ReceiverSnapshot,
    caster: &CasterSnapshot,
    light: &LightSnapshot,
) -> Option<EclipseShadow> {
    if caster.radius < receiver.radius * MIN_RELATIVE_OCCLUDER_RADIUS {
        return None;
    }

    let light_to_caster = caster.position - light.position;
    let light_dist = light_to_caster.length();
    let caster_to_receiver = receiver.position - caster.position;
    let caster_dist = caster_to_receiver.length();
    if light_dist <= 0.0 || caster_dist <= receiver.radius {
        return None;
    }

    // The receiver must lie beyond the caster along the light direction.
    if light_to_caster.dot(caster_to_receiver) <= 0.0 {
        return None;
    }

    let app_sun_radius = light.radius / light_dist;
    let app_occluder_radius = caster.radius / (caster_dist - receiver.radius);

    let max_depth = (app_occluder_radius / app_sun_radius).powi(2).min(1.0);
    if max_depth < MIN_SHADOW_DEPTH {
        return None;
    }

    let penumbra_radius = (1.0 + app_sun_radius / app_occluder_radius) * caster.radius;
    let umbra_radius =
        caster.radius * (app_occluder_radius - app_sun_radius) / app_occluder_radius;

    let axis = light_to_caster / light_dist;
    let dist_to_axis = distance_point_to_ray(receiver.position, caster.position, axis);
    if dist_to_axis >= receiver.radius + penumbra_radius {
        return None;
    }

    Some(EclipseShadow {
        origin: -caster_to_receiver,
        direction: axis,
        penumbra_radius,
        umbra_radius,
        max_depth: max_depth as f32,
        caster_orientation: caster.orientation,
    })
}

/// Test whether the caster's ring system shadows `receiver`.
///
/// The ring shadow is an oblique cylinder: the ring annulus extruded
/// along the light direction. The test is conservative against the outer
/// radius; per-pixel ring opacity is the backend's concern.
pub fn test_ring_shadow(
    receiver: &ReceiverSnapshot,
    caster: &CasterSnapshot,
    light: &LightSnapshot,
) -> Option<RingShadow> {
    let (inner_radius, outer_radius) = caster.rings?;

    let light_to_caster = caster.position - light.position;
    let light_dist = light_to_caster.length();
    let caster_to_receiver = receiver.position - caster.position;
    if light_dist <= 0.0 {
        return None;
    }
    if light_to_caster.dot(caster_to_receiver) <= 0.0 {
        return None;
    }

    let axis = light_to_caster / light_dist;
    let dist_to_axis = distance_point_to_ray(receiver.position, caster.position, axis);
    if dist_to_axis >= receiver.radius + outer_radius {
        return None;
    }

    // Light grazing the ring plane casts no usable shadow.
    let plane_normal = caster.orientation * DVec3::Y;
    if axis.dot(plane_normal).abs() < 1e-4 {
        return None;
    }

    Some(RingShadow {
        origin: -caster_to_receiver,
        direction: axis,
        plane_normal,
        inner_radius,
        outer_radius,
        caster_orientation: caster.orientation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUN_RADIUS: f64 = 696_000.0;
    const AU: f64 = 149_597_870.7;

    fn sun() -> LightSnapshot {
        LightSnapshot {
            position: DVec3::ZERO,
            radius: SUN_RADIUS,
        }
    }

    fn earth() -> ReceiverSnapshot {
        ReceiverSnapshot {
            position: DVec3::new(AU, 0.0, 0.0),
            radius: 6378.0,
        }
    }

    fn moon_at(x: f64) -> CasterSnapshot {
        CasterSnapshot {
            position: DVec3::new(x, 0.0, 0.0),
            radius: 1737.0,
            orientation: DQuat::IDENTITY,
            rings: None,
        }
    }

    #[test]
    fn test_solar_eclipse_geometry() {
        // Moon between sun and earth, on the axis.
        let shadow = test_eclipse(&earth(), &moon_at(AU - 384_400.0), &sun())
            .expect("aligned moon must eclipse earth");
        assert!(shadow.umbra_radius > 0.0, "total eclipse has a real umbra");
        assert!(shadow.penumbra_radius > shadow.umbra_radius);
        assert_eq!(shadow.max_depth, 1.0);
        assert!((shadow.direction - DVec3::X).length() < 1e-9);
    }

    #[test]
    fn test_no_eclipse_when_caster_behind_receiver() {
        let shadow = test_eclipse(&earth(), &moon_at(AU + 384_400.0), &sun());
        assert!(shadow.is_none(), "moon behind earth casts no shadow on it");
    }

    #[test]
    fn test_no_eclipse_when_off_axis() {
        let mut moon = moon_at(AU - 384_400.0);
        moon.position.y = 50_000.0;
        assert!(test_eclipse(&earth(), &moon, &sun()).is_none());
    }

    #[test]
    fn test_tiny_occluder_rejected() {
        let mut pebble = moon_at(AU - 384_400.0);
        pebble.radius = 10.0;
        assert!(test_eclipse(&earth(), &pebble, &sun()).is_none());
    }

    #[test]
    fn test_distant_small_occluder_gives_shallow_shadow() {
        // An occluder whose apparent size is far below the sun's produces
        // a shadow too shallow to display.
        let mut rock = moon_at(AU - 384_400.0);
        rock.radius = 40.0;
        let mut big_receiver = earth();
        big_receiver.radius = rock.radius / MIN_RELATIVE_OCCLUDER_RADIUS * 0.9;
        assert!(test_eclipse(&big_receiver, &rock, &sun()).is_none());
    }

    #[test]
    fn test_annular_eclipse_depth_below_one() {
        // Push the moon close to the earth and shrink it so its apparent
        // size drops below the sun's.
        let mut moon = moon_at(AU - 384_400.0);
        moon.radius = 800.0;
        let shadow = test_eclipse(&earth(), &moon, &sun()).expect("annular eclipse still shadows");
        assert!(shadow.max_depth < 1.0);
        assert!(shadow.umbra_radius < 0.0, "no umbra in an annular eclipse");
    }

    #[test]
    fn test_ring_shadow_requires_rings_and_alignment() {
        let mut saturn = moon_at(AU - 1.0e6);
        saturn.radius = 60_268.0;
        saturn.rings = Some((74_500.0, 140_220.0));
        // Tilt the ring plane so light crosses it.
        saturn.orientation = DQuat::from_rotation_z(0.4);
        let moonlet = ReceiverSnapshot {
            position: DVec3::new(AU - 1.0e6 + 200_000.0, 30_000.0, 0.0),
            radius: 500.0,
        };
        let shadow =
            test_ring_shadow(&moonlet, &saturn, &sun()).expect("moonlet sits in ring shadow");
        assert_eq!(shadow.inner_radius, 74_500.0);
        assert!(shadow.plane_normal.dot(DVec3::X).abs() > 1e-3);

        let ringless = CasterSnapshot { rings: None, ..saturn };
        assert!(test_ring_shadow(&moonlet, &ringless, &sun()).is_none());
    }

    #[test]
    fn test_ring_shadow_grazing_light_rejected() {
        let mut saturn = moon_at(AU - 1.0e6);
        saturn.radius = 60_268.0;
        saturn.rings = Some((74_500.0, 140_220.0));
        // Identity orientation puts the ring plane normal along Y, so the
        // sunlight arriving along X grazes the ring plane edge-on.
        let moonlet = ReceiverSnapshot {
            position: DVec3::new(AU - 1.0e6 + 200_000.0, 0.0, 0.0),
            radius: 500.0,
        };
        assert!(test_ring_shadow(&moonlet, &saturn, &sun()).is_none());
    }
}
