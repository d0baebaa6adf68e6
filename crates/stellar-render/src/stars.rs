//! Point-star processing: converts catalog stars into screen points with
//! magnitude-derived brightness, plus glare discs for saturated stars.
//!
//! Stars inside the solar-system distance limit do not go to the point
//! path; they get real render-list entries so they parallax-shift and
//! depth-sort against planets.

use glam::{DVec3, Vec3};

use stellar_lighting::star_tint;
use stellar_math::{ViewCone, ly_to_km};
use stellar_scene::{Star, StarVisitor};

use crate::list::{RenderListEntry, RenderableKind};
use crate::photometry::{BrightnessScale, MagnitudeLimits};

/// Stars closer than this are treated as part of the local system and
/// rendered as discs rather than points.
pub const SOLAR_SYSTEM_MAX_DISTANCE_LY: f64 = 1.0;

/// One star rendered as an anti-aliased point.
#[derive(Clone, Copy, Debug)]
pub struct StarPoint {
    /// Unit direction from the observer, world space.
    pub direction: Vec3,
    /// Display brightness in `[0, 1]`.
    pub brightness: f32,
    pub color: [f32; 3],
}

/// Glare disc around a star brighter than the saturation point.
#[derive(Clone, Copy, Debug)]
pub struct StarGlare {
    pub direction: Vec3,
    /// Disc radius in pixels.
    pub scale: f32,
    pub color: [f32; 3],
}

/// Output of one frame's star pass.
#[derive(Clone, Debug, Default)]
pub struct PointStarList {
    pub points: Vec<StarPoint>,
    pub glares: Vec<StarGlare>,
}

/// Star visitor that splits catalog stars between the point list and the
/// render list.
pub struct PointStarProcessor {
    t: f64,
    observer_ly: DVec3,
    view_normal: DVec3,
    cone: ViewCone,
    pixel_size: f64,
    limits: MagnitudeLimits,
    scale: BrightnessScale,
    pub stars: PointStarList,
    /// Stars near enough to depth-sort against solar-system objects.
    pub near_star_entries: Vec<RenderListEntry>,
}

impl PointStarProcessor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        t: f64,
        observer_ly: DVec3,
        view_normal: DVec3,
        cone: ViewCone,
        pixel_size: f64,
        limits: MagnitudeLimits,
        scale: BrightnessScale,
    ) -> Self {
        Self {
            t,
            observer_ly,
            view_normal,
            cone,
            pixel_size,
            limits,
            scale,
            stars: PointStarList::default(),
            near_star_entries: Vec::new(),
        }
    }
}

impl StarVisitor for PointStarProcessor {
    fn process(&mut self, star: &Star, distance_ly: f64, app_mag: f64) {
        let rel_ly = star.position_at(self.t) - self.observer_ly;

        if distance_ly < SOLAR_SYSTEM_MAX_DISTANCE_LY {
            let position = rel_ly * ly_to_km(1.0);
            let distance = position.length();
            if !self
                .cone
                .test_sphere(position, self.view_normal, star.radius_km)
            {
                return;
            }
            let center_depth = self.view_normal.dot(position);
            let disc_size = if distance > 0.0 {
                2.0 * star.radius_km / (distance * self.pixel_size)
            } else {
                f64::INFINITY
            };
            self.near_star_entries.push(RenderListEntry {
                kind: RenderableKind::Star { id: star.id },
                position,
                distance,
                center_depth,
                radius: star.radius_km,
                app_mag,
                disc_size,
                opaque: true,
                near_depth: center_depth - star.radius_km,
                far_depth: center_depth + star.radius_km,
            });
            return;
        }

        if !self.cone.test_sphere(rel_ly, self.view_normal, 0.0) {
            return;
        }
        let brightness = self.scale.brightness(app_mag, self.limits);
        if brightness <= 0.0 {
            return;
        }
        let direction = rel_ly.normalize().as_vec3();
        let color = star_tint(star.temperature).to_array();
        self.stars.points.push(StarPoint {
            direction,
            brightness,
            color,
        });
        if app_mag < self.scale.saturation_point(self.limits) {
            self.stars.glares.push(StarGlare {
                direction,
                scale: self.scale.glare_scale(app_mag, self.limits) as f32,
                color,
            });
        }
    }
}
