//! Solar-system bodies and their renderable attributes.

use bitflags::bitflags;
use glam::DVec3;

use stellar_math::{circle_area, km_to_ly, lum_to_app_mag, sphere_area, SOLAR_POWER};

use crate::frame::{FrameTree, TimelinePhase};

/// Classification of a body, used for visibility masks, label colors, and
/// orbit-path filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyClass {
    Planet,
    DwarfPlanet,
    Moon,
    MinorMoon,
    Asteroid,
    Comet,
    Spacecraft,
    Invisible,
}

bitflags! {
    /// Set of body classes, for orbit and label filtering.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BodyClassMask: u32 {
        const PLANET = 1 << 0;
        const DWARF_PLANET = 1 << 1;
        const MOON = 1 << 2;
        const MINOR_MOON = 1 << 3;
        const ASTEROID = 1 << 4;
        const COMET = 1 << 5;
        const SPACECRAFT = 1 << 6;
    }
}

impl BodyClass {
    pub fn mask_bit(self) -> BodyClassMask {
        match self {
            BodyClass::Planet => BodyClassMask::PLANET,
            BodyClass::DwarfPlanet => BodyClassMask::DWARF_PLANET,
            BodyClass::Moon => BodyClassMask::MOON,
            BodyClass::MinorMoon => BodyClassMask::MINOR_MOON,
            BodyClass::Asteroid => BodyClassMask::ASTEROID,
            BodyClass::Comet => BodyClassMask::COMET,
            BodyClass::Spacecraft => BodyClassMask::SPACECRAFT,
            BodyClass::Invisible => BodyClassMask::empty(),
        }
    }
}

/// Per-body override of orbit-path drawing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrbitVisibility {
    /// Follow the class mask in the render settings.
    #[default]
    UseClassVisibility,
    AlwaysVisible,
    NeverVisible,
}

/// Atmospheric shell parameters, in kilometers above the surface.
#[derive(Clone, Copy, Debug, Default)]
pub struct Atmosphere {
    pub height: f64,
    pub cloud_height: f64,
    pub mie_scale_height: f64,
}

/// Ring system extents, in kilometers from the body center.
#[derive(Clone, Copy, Debug)]
pub struct RingSystem {
    pub inner_radius: f64,
    pub outer_radius: f64,
}

/// Surface appearance parameters relevant to photometry.
#[derive(Clone, Copy, Debug)]
pub struct Surface {
    pub color: [f32; 3],
    pub albedo: f64,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            albedo: 0.5,
        }
    }
}

/// Handle to a mesh resource plus the flags the render list needs to
/// classify it without loading it.
#[derive(Clone, Copy, Debug)]
pub struct GeometryDesc {
    pub handle: u32,
    /// Whether the mesh has any translucent material.
    pub opaque: bool,
    /// Whether vertices are pre-scaled to a unit bounding sphere.
    pub normalized: bool,
}

/// A reference mark attached to a body (axes, velocity vector, frame grid).
#[derive(Clone, Debug)]
pub struct ReferenceMark {
    pub tag: String,
    /// Radius of the mark geometry in kilometers.
    pub radius: f64,
    pub opaque: bool,
}

/// A planet, moon, asteroid, comet, or spacecraft.
pub struct Body {
    pub name: String,
    pub class: BodyClass,
    /// Mean radius in kilometers.
    pub radius: f64,
    /// Semi-axes for oblate or irregular bodies; `radius` times unit for
    /// spheres.
    pub semi_axes: DVec3,
    pub surface: Surface,
    pub atmosphere: Option<Atmosphere>,
    pub rings: Option<RingSystem>,
    pub geometry: Option<GeometryDesc>,
    pub reference_marks: Vec<ReferenceMark>,
    pub visible: bool,
    /// Whether the body may be drawn as a star-like point when its disc
    /// is sub-pixel.
    pub visible_as_point: bool,
    pub secondary_illuminator: bool,
    pub labeled: bool,
    pub orbit_visibility: OrbitVisibility,
    pub timeline: Vec<TimelinePhase>,
    /// Children orbiting this body, with aggregate bounds.
    pub subtree: Option<FrameTree>,
}

impl Body {
    pub fn new(name: &str, radius: f64, class: BodyClass) -> Self {
        Self {
            name: name.to_owned(),
            class,
            radius,
            semi_axes: DVec3::splat(radius),
            surface: Surface::default(),
            atmosphere: None,
            rings: None,
            geometry: None,
            reference_marks: Vec::new(),
            visible: true,
            visible_as_point: true,
            secondary_illuminator: false,
            labeled: false,
            orbit_visibility: OrbitVisibility::default(),
            timeline: Vec::new(),
            subtree: None,
        }
    }

    /// Radius of the sphere used for visibility culling; rings extend it.
    pub fn culling_radius(&self) -> f64 {
        match &self.rings {
            Some(rings) => self.radius.max(rings.outer_radius),
            None => self.radius,
        }
    }

    /// Smallest semi-axis as a fraction of the mean radius, 1.0 for a
    /// sphere. Used to shrink the far-plane test ellipsoid.
    pub fn min_semi_axis_fraction(&self) -> f64 {
        if self.radius <= 0.0 {
            return 1.0;
        }
        self.semi_axes.min_element() / self.radius
    }

    /// Luminosity of the body in reflected sunlight, as a fraction of the
    /// illuminating star's luminosity, at `distance_km` from the star.
    pub fn reflected_luminosity(&self, star_luminosity: f64, distance_km: f64) -> f64 {
        // Power intercepted by the body's cross section, assuming the
        // star radiates isotropically.
        let power = SOLAR_POWER * star_luminosity;
        let irradiance = power / sphere_area(distance_km * 1000.0);
        let incident = irradiance * circle_area(self.radius * 1000.0);
        incident * self.surface.albedo / SOLAR_POWER
    }

    /// Apparent magnitude for a viewer at `viewer_pos`, lit by a star of
    /// `star_luminosity` at `star_pos` (all positions body-relative, km).
    pub fn apparent_magnitude(
        &self,
        star_luminosity: f64,
        star_pos: DVec3,
        viewer_pos: DVec3,
    ) -> f64 {
        let distance_to_viewer = viewer_pos.length();
        let distance_to_star = star_pos.length();
        let illuminated_fraction = if distance_to_viewer > 0.0 && distance_to_star > 0.0 {
            (1.0 + (viewer_pos / distance_to_viewer).dot(star_pos / distance_to_star)) / 2.0
        } else {
            1.0
        };
        let lum = self.reflected_luminosity(star_luminosity, distance_to_star);
        lum_to_app_mag(
            (lum * illuminated_fraction).max(f64::MIN_POSITIVE),
            km_to_ly(distance_to_viewer),
        )
    }
}
