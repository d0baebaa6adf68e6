//! Scene-graph traversal: walks active timeline phases of every frame
//! tree and fills the per-frame render, orbit-path, and label lists.
//!
//! Culling at each level is a view-cone test, not a full frustum test;
//! the cone is a necessary condition, so a body it rejects is provably
//! invisible while one it admits may still be clipped later. Subtree
//! recursion is decided by a best-case heuristic: recursion is skipped
//! only when the brightest, largest, closest object the subtree could
//! contain would still be invisible and the subtree can contribute no
//! planetshine.

use glam::DVec3;
use log::trace;

use stellar_config::DetailOptions;
use stellar_lighting::{LightSource, SecondaryIlluminator};
use stellar_math::{
    Frustum, SOLAR_POWER, SphereTest, ViewCone, circle_area, km_to_ly, lum_to_app_mag,
    ray_sphere_intersect, sphere_area,
};
use stellar_scene::{
    Body, BodyClass, BodyKey, FrameTree, StarId, StarSystem, TimelinePhase, astrocentric_position,
};

use crate::annotation::{Annotation, AnnotationContent, AnnotationLists};
use crate::flags::{ClassFilters, RenderFlags};
use crate::list::{OrbitPathListEntry, RenderListEntry, RenderableKind};
use crate::photometry::size_fade;

/// A body's planetshine reaches at most this many body radii beyond its
/// culling sphere.
const PLANETSHINE_DISTANCE_LIMIT_FACTOR: f64 = 100.0;

/// Minimum angular size, in pixels, below which a body's planetshine
/// contribution is ignored.
const PLANETSHINE_PIXEL_SIZE_LIMIT: f64 = 0.1;

/// Apparent magnitude assigned to a body with no light source at all.
const UNLIT_MAGNITUDE: f64 = 30.0;

/// Per-frame view parameters shared by the traversal passes. Positions
/// handed to the traversal are astrocentric; the context carries the
/// observer's astrocentric position so entries come out observer-relative.
#[derive(Clone)]
pub struct ViewContext {
    pub t: f64,
    /// Observer position relative to the current system's star, km.
    pub observer_pos: DVec3,
    /// Unit view direction in world space.
    pub view_normal: DVec3,
    pub cone: ViewCone,
    /// World-orientation frustum for observer-relative positions.
    pub frustum: Frustum,
    /// Radians subtended by one pixel at the current field of view.
    pub pixel_size: f64,
    /// Faintest magnitude at which a sub-pixel body still shows as a point.
    pub faintest_planet_mag: f64,
}

impl ViewContext {
    /// Projected disc diameter in pixels of a sphere of `radius` km at
    /// `distance` km.
    pub fn disc_size(&self, radius: f64, distance: f64) -> f64 {
        if distance <= 0.0 {
            return f64::INFINITY;
        }
        2.0 * radius / (distance * self.pixel_size)
    }
}

/// Lists filled by one frame's traversal, across all nearby systems.
#[derive(Default)]
pub struct TraversalLists {
    pub render_list: Vec<RenderListEntry>,
    pub orbit_paths: Vec<OrbitPathListEntry>,
    pub secondary_illuminators: Vec<SecondaryIlluminator>,
}

impl TraversalLists {
    pub fn clear(&mut self) {
        self.render_list.clear();
        self.orbit_paths.clear();
        self.secondary_illuminators.clear();
    }
}

/// Best-case luminosity of a perfectly reflective body of `radius_km` at
/// `distance_km` from a star, in units of the star's luminosity.
fn luminosity_at_opposition(star_luminosity: f64, distance_km: f64, radius_km: f64) -> f64 {
    if distance_km <= 0.0 {
        return f64::INFINITY;
    }
    let power = SOLAR_POWER * star_luminosity;
    let irradiance = power / sphere_area(distance_km * 1000.0);
    irradiance * circle_area(radius_km * 1000.0) / SOLAR_POWER
}

/// Dust-tail length of a comet at `distance_to_sun_km`, in kilometers.
fn comet_dust_tail_length(distance_to_sun_km: f64, radius_km: f64) -> f64 {
    if distance_to_sun_km <= 0.0 {
        return 0.0;
    }
    (1.0e8 / distance_to_sun_km) * (radius_km / 5.0) * 1.0e7
}

/// Recursively visit every active child phase of `tree` and append
/// render-list entries and secondary illuminators.
///
/// `center_pos` is the astrocentric position of the tree's center body
/// (zero for the star's own tree).
#[allow(clippy::too_many_arguments)]
pub fn build_render_lists(
    system: &StarSystem,
    system_id: StarId,
    tree: &FrameTree,
    center_pos: DVec3,
    lights: &[LightSource],
    flags: RenderFlags,
    ctx: &ViewContext,
    out: &mut TraversalLists,
) {
    for &key in &tree.children {
        let body = &system.bodies[key];
        let Some(phase) = body.timeline.iter().find(|p| p.includes(ctx.t)) else {
            continue;
        };

        let pos_s = center_pos
            + phase.frame.orientation_at(ctx.t).conjugate() * phase.orbit.position_at_time(ctx.t);
        let pos_v = pos_s - ctx.observer_pos;
        let distance = pos_v.length();
        let culling_radius = body.culling_radius();

        let in_cone = ctx.cone.test_sphere(pos_v, ctx.view_normal, culling_radius);

        // A body can light its neighbors from outside the screen, so the
        // planetshine test uses an inflated sphere around the same cone
        // geometry instead of the culling radius.
        if flags.contains(RenderFlags::PLANETSHINE) && body.secondary_illuminator && body.visible {
            let influence_radius =
                culling_radius + body.radius * PLANETSHINE_DISTANCE_LIMIT_FACTOR;
            let in_influence = if influence_radius > culling_radius {
                ctx.cone.test_sphere(pos_v, ctx.view_normal, influence_radius)
            } else {
                in_cone
            };
            if in_influence && ctx.disc_size(body.radius, distance) > PLANETSHINE_PIXEL_SIZE_LIMIT
            {
                out.secondary_illuminators.push(SecondaryIlluminator {
                    position: pos_v,
                    radius: body.radius,
                    albedo: body.surface.albedo,
                    reflected_irradiance: 0.0,
                });
            }
        }

        if in_cone && body.visible {
            // Brightest illumination wins; magnitudes from separate suns
            // do not add for any object dim enough to care about.
            let app_mag = lights
                .iter()
                .map(|light| {
                    body.apparent_magnitude(light.luminosity, light.position - pos_v, -pos_v)
                })
                .fold(f64::INFINITY, f64::min);
            let app_mag = if app_mag.is_finite() {
                app_mag
            } else {
                UNLIT_MAGNITUDE
            };

            let disc_size = ctx.disc_size(body.radius, distance);
            let visible_as_disc = disc_size > 1.0;
            let visible_as_point = body.visible_as_point && app_mag < ctx.faintest_planet_mag;
            if visible_as_disc || visible_as_point || body.labeled {
                add_render_list_entries(
                    system_id, key, body, pos_s, pos_v, distance, app_mag, disc_size, flags, ctx,
                    out,
                );
            }
        }

        if let Some(subtree) = &body.subtree
            && !subtree.children.is_empty()
        {
            if should_traverse_subtree(subtree, pos_v, distance, lights, flags, ctx) {
                build_render_lists(system, system_id, subtree, pos_s, lights, flags, ctx, out);
            } else {
                trace!("culled subtree of {} ({} children)", body.name, subtree.children.len());
            }
        }
    }
}

/// Decide whether a subtree can contain anything worth traversing.
///
/// Any one of three conditions forces traversal: the best-case object
/// could be bright or large enough to draw, the subtree's bounding
/// sphere intersects the frustum, or the subtree might planetshine onto
/// something visible. A false positive wastes a walk; a false negative
/// drops a visible object.
fn should_traverse_subtree(
    subtree: &FrameTree,
    center_pos_v: DVec3,
    distance: f64,
    lights: &[LightSource],
    flags: RenderFlags,
    ctx: &ViewContext,
) -> bool {
    let min_possible_distance = distance - subtree.bounding_sphere_radius;

    let (brightest_possible, largest_possible) = if min_possible_distance > 1.0 {
        let brightest = lights
            .iter()
            .map(|light| {
                let dist_to_light = (light.position - center_pos_v).length();
                let lum = luminosity_at_opposition(
                    light.luminosity,
                    dist_to_light,
                    subtree.max_child_radius,
                );
                lum_to_app_mag(lum.max(f64::MIN_POSITIVE), km_to_ly(min_possible_distance))
            })
            .fold(f64::INFINITY, f64::min);
        let largest = ctx.disc_size(subtree.max_child_radius, min_possible_distance);
        (brightest, largest)
    } else {
        // Observer potentially inside the subtree.
        (-100.0, 100.0)
    };

    if brightest_possible < ctx.faintest_planet_mag || largest_possible > 1.0 {
        let test = ctx
            .frustum
            .test_sphere(center_pos_v, subtree.bounding_sphere_radius);
        if test != SphereTest::Outside {
            return true;
        }
    }

    if flags.contains(RenderFlags::PLANETSHINE) && subtree.contains_secondary_illuminators {
        let influence_radius = subtree.bounding_sphere_radius
            + subtree.max_child_radius * PLANETSHINE_DISTANCE_LIMIT_FACTOR;
        if ctx.cone.test_sphere(center_pos_v, ctx.view_normal, influence_radius)
            && ctx.disc_size(subtree.max_child_radius, min_possible_distance.max(1.0))
                > PLANETSHINE_PIXEL_SIZE_LIMIT
        {
            return true;
        }
    }

    false
}

/// Append the entries one visible body generates: its disc or point, a
/// comet dust tail when the tail would resolve, and its reference marks.
#[allow(clippy::too_many_arguments)]
fn add_render_list_entries(
    system_id: StarId,
    key: BodyKey,
    body: &Body,
    pos_s: DVec3,
    pos_v: DVec3,
    distance: f64,
    app_mag: f64,
    disc_size: f64,
    flags: RenderFlags,
    ctx: &ViewContext,
    out: &mut TraversalLists,
) {
    let center_depth = ctx.view_normal.dot(pos_v);

    if body.class != BodyClass::Invisible {
        let opaque = body.geometry.map(|g| g.opaque).unwrap_or(true);
        out.render_list.push(RenderListEntry {
            kind: RenderableKind::Body {
                system: system_id,
                key,
            },
            position: pos_v,
            distance,
            center_depth,
            radius: body.culling_radius(),
            app_mag,
            disc_size,
            opaque,
            near_depth: center_depth - body.culling_radius(),
            far_depth: center_depth + body.culling_radius(),
        });
    }

    if body.class == BodyClass::Comet && flags.contains(RenderFlags::COMET_TAILS) {
        let tail_length = comet_dust_tail_length(pos_s.length(), body.radius);
        let tail_disc = ctx.disc_size(tail_length, distance);
        if tail_disc > 1.0 {
            out.render_list.push(RenderListEntry {
                kind: RenderableKind::CometTail {
                    system: system_id,
                    key,
                },
                position: pos_v,
                distance,
                center_depth,
                radius: tail_length,
                app_mag,
                disc_size: tail_disc,
                opaque: false,
                near_depth: center_depth - tail_length,
                far_depth: center_depth + tail_length,
            });
        }
    }

    if flags.contains(RenderFlags::REFERENCE_MARKS) {
        for (index, mark) in body.reference_marks.iter().enumerate() {
            out.render_list.push(RenderListEntry {
                kind: RenderableKind::ReferenceMark {
                    system: system_id,
                    key,
                    index,
                },
                position: pos_v,
                distance,
                center_depth,
                radius: mark.radius,
                app_mag,
                disc_size: ctx.disc_size(mark.radius, distance),
                opaque: mark.opaque,
                near_depth: center_depth - mark.radius,
                far_depth: center_depth + mark.radius,
            });
        }
    }
}

/// Whether a body's orbit path should be drawn under the current class
/// filters.
fn orbit_path_wanted(body: &Body, filters: &ClassFilters) -> bool {
    use stellar_scene::OrbitVisibility::*;
    match body.orbit_visibility {
        AlwaysVisible => true,
        NeverVisible => false,
        UseClassVisibility => filters.orbits.intersects(body.class.mask_bit()),
    }
}

/// Default orbit path color for a body class, linear RGB.
pub fn orbit_class_color(class: BodyClass) -> [f32; 3] {
    match class {
        BodyClass::Planet => [0.3, 0.323, 0.833],
        BodyClass::DwarfPlanet => [0.557, 0.235, 0.576],
        BodyClass::Moon => [0.08, 0.407, 0.392],
        BodyClass::MinorMoon => [0.08, 0.407, 0.392],
        BodyClass::Asteroid => [0.58, 0.152, 0.08],
        BodyClass::Comet => [0.639, 0.487, 0.168],
        BodyClass::Spacecraft => [0.4, 0.4, 0.4],
        BodyClass::Invisible => [0.3, 0.3, 0.3],
    }
}

/// Label color for a body class, linear RGBA.
pub fn label_class_color(class: BodyClass) -> [f32; 4] {
    match class {
        BodyClass::Planet => [0.407, 0.333, 0.964, 1.0],
        BodyClass::DwarfPlanet => [0.557, 0.235, 0.576, 1.0],
        BodyClass::Moon => [0.231, 0.733, 0.545, 1.0],
        BodyClass::MinorMoon => [0.231, 0.588, 0.545, 1.0],
        BodyClass::Asteroid => [0.596, 0.305, 0.164, 1.0],
        BodyClass::Comet => [0.768, 0.607, 0.227, 1.0],
        BodyClass::Spacecraft => [0.6, 0.6, 0.6, 1.0],
        BodyClass::Invisible => [0.5, 0.5, 0.5, 1.0],
    }
}

/// Recursively collect orbit paths whose projected size crosses the
/// drawing threshold.
///
/// Orbit positions are relative to the parent body, so the path entry's
/// origin is the parent's observer-relative position. Aperiodic orbits
/// with no finite valid range cannot be sampled and are skipped.
#[allow(clippy::too_many_arguments)]
pub fn build_orbit_lists(
    system: &StarSystem,
    tree: &FrameTree,
    center_pos: DVec3,
    flags: RenderFlags,
    filters: &ClassFilters,
    detail: &DetailOptions,
    ctx: &ViewContext,
    out: &mut TraversalLists,
) {
    let origin_v = center_pos - ctx.observer_pos;
    let center_distance = origin_v.length();

    for &key in &tree.children {
        let body = &system.bodies[key];
        let Some(phase) = body.timeline.iter().find(|p| p.includes(ctx.t)) else {
            continue;
        };

        if orbit_path_wanted(body, filters) {
            if let Some(entry) = orbit_path_entry(body, phase, origin_v, center_distance, flags, detail, ctx)
            {
                out.orbit_paths.push(entry);
            }
        }

        if let Some(subtree) = &body.subtree
            && !subtree.children.is_empty()
        {
            let pos_s = center_pos
                + phase.frame.orientation_at(ctx.t).conjugate()
                    * phase.orbit.position_at_time(ctx.t);
            let pos_v = pos_s - ctx.observer_pos;
            let distance = pos_v.length();

            // Traverse if the observer is inside the subtree or some
            // child orbit could resolve, and the subtree is on screen.
            let min_possible_distance = (distance - subtree.bounding_sphere_radius).max(1.0);
            let max_possible_orbit_size =
                ctx.disc_size(subtree.bounding_sphere_radius, min_possible_distance);
            let inside = distance < subtree.bounding_sphere_radius;
            if (inside || max_possible_orbit_size > detail.min_orbit_size)
                && ctx
                    .frustum
                    .test_sphere(pos_v, subtree.bounding_sphere_radius)
                    != SphereTest::Outside
            {
                build_orbit_lists(system, subtree, pos_s, flags, filters, detail, ctx, out);
            }
        }
    }
}

fn orbit_path_entry(
    body: &Body,
    phase: &TimelinePhase,
    origin_v: DVec3,
    center_distance: f64,
    flags: RenderFlags,
    detail: &DetailOptions,
    ctx: &ViewContext,
) -> Option<OrbitPathListEntry> {
    let orbit = &phase.orbit;
    if !orbit.is_periodic() && orbit.valid_range().is_none() {
        return None;
    }

    let radius = orbit.bounding_radius();
    let effective_distance = center_distance.max(radius * 1.0e-6).max(1.0e-6);
    let size_px = ctx.disc_size(radius, effective_distance);
    if size_px <= detail.min_orbit_size {
        return None;
    }

    Some(OrbitPathListEntry {
        orbit: orbit.clone(),
        frame_orientation: phase.frame.orientation_at(ctx.t),
        origin: origin_v,
        center_depth: ctx.view_normal.dot(origin_v),
        radius,
        opacity: size_fade(size_px, detail.min_orbit_size, 2.0),
        color: orbit_class_color(body.class),
        clamp_to_now: !orbit.is_periodic() && flags.contains(RenderFlags::PARTIAL_TRAJECTORIES),
    })
}

/// Scan the finished render list and emit depth-sorted label annotations
/// for labeled bodies whose class passes the filter.
///
/// Labels are pulled slightly in front of the body so they never z-fight
/// its surface, and dropped when the body's primary occludes it.
pub fn build_label_lists(
    system: &StarSystem,
    system_id: StarId,
    render_list: &[RenderListEntry],
    filters: &ClassFilters,
    detail: &DetailOptions,
    ctx: &ViewContext,
    annotations: &mut AnnotationLists,
) {
    for entry in render_list {
        let RenderableKind::Body { system: sys, key } = entry.kind else {
            continue;
        };
        if sys != system_id {
            continue;
        }
        let body = &system.bodies[key];
        if !body.labeled || !filters.labels.intersects(body.class.mask_bit()) {
            continue;
        }

        // A label is legible only when the body resolves or its orbit
        // would span a readable arc on screen.
        let orbit_size_px = system
            .active_phase(key, ctx.t)
            .map(|phase| ctx.disc_size(phase.orbit.bounding_radius(), entry.distance))
            .unwrap_or(0.0);
        if entry.disc_size <= 1.0 && orbit_size_px <= detail.min_orbit_size_for_label {
            continue;
        }

        let mut position = entry.position * (1.0 - body.culling_radius() * 1.01 / entry.distance);

        // Occlusion by the body's primary: if the sight line hits the
        // parent sphere first, pull the label in front of the parent or
        // drop it entirely when the parent fully hides the body.
        if let Some(parent_key) = system.active_phase(key, ctx.t).and_then(|p| p.center) {
            let parent = &system.bodies[parent_key];
            let parent_pos_v = astrocentric_position(system, parent_key, ctx.t) - ctx.observer_pos;
            if let Some(t_hit) = ray_sphere_intersect(
                DVec3::ZERO,
                entry.position / entry.distance,
                parent_pos_v,
                parent.radius,
            ) && t_hit < entry.distance
            {
                let u = t_hit / entry.distance;
                if u <= 0.0 {
                    continue;
                }
                position = entry.position * (u * 0.999);
            }
        }

        annotations.add_depth_sorted(Annotation {
            content: AnnotationContent::Label(body.name.clone()),
            position,
            depth: ctx.view_normal.dot(position),
            color: label_class_color(body.class),
            size: 1.0,
        });
    }
}

/// Add the system star's barycentric orbit to the path list when it
/// would resolve on screen. `origin_v` is the observer-relative position
/// of the barycenter in kilometers.
pub fn add_star_orbit(
    star: &stellar_scene::Star,
    origin_v: DVec3,
    detail: &DetailOptions,
    ctx: &ViewContext,
    out: &mut TraversalLists,
) {
    let Some(orbit) = &star.orbit else {
        return;
    };
    let radius = orbit.bounding_radius();
    let center_distance = origin_v.length().max(1.0e-6);
    let size_px = ctx.disc_size(radius, center_distance);
    if size_px <= detail.min_orbit_size {
        return;
    }
    out.orbit_paths.push(OrbitPathListEntry {
        orbit: orbit.clone(),
        frame_orientation: glam::DQuat::IDENTITY,
        origin: origin_v,
        center_depth: ctx.view_normal.dot(origin_v),
        radius,
        opacity: size_fade(size_px, detail.min_orbit_size, 2.0),
        color: [0.5, 0.5, 0.8],
        clamp_to_now: false,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use glam::DQuat;
    use stellar_scene::{CircularOrbit, J2000EclipticFrame, Star, StarSystem};

    const KM_PER_AU: f64 = 149_597_870.7;

    fn view_context(observer_pos: DVec3, view_normal: DVec3) -> ViewContext {
        let fov = std::f64::consts::FRAC_PI_4;
        let (width, height) = (1280.0, 800.0);
        // World frustum: rotate camera space so -Z maps onto view_normal.
        let cam = DQuat::from_rotation_arc(DVec3::NEG_Z, view_normal);
        let frustum = Frustum::perspective_infinite(fov, width / height, 1.0e-4)
            .transformed(glam::DMat3::from_quat(cam));
        ViewContext {
            t: 0.0,
            observer_pos,
            view_normal,
            cone: ViewCone::new(fov, width, height),
            frustum,
            pixel_size: 2.0 * (fov / 2.0).tan() / height,
            faintest_planet_mag: 6.0,
        }
    }

    fn phase(orbit_radius: f64, period: f64) -> TimelinePhase {
        TimelinePhase {
            orbit: Arc::new(CircularOrbit {
                radius: orbit_radius,
                period,
                phase: 0.0,
            }),
            frame: Arc::new(J2000EclipticFrame),
            center: None,
            start_time: f64::NEG_INFINITY,
            end_time: f64::INFINITY,
        }
    }

    fn one_planet_system(orbit_radius: f64, planet_radius: f64) -> (StarSystem, BodyKey) {
        let mut system = StarSystem::new(Star::test_star());
        let mut planet = Body::new("planet", planet_radius, BodyClass::Planet);
        planet.timeline.push(phase(orbit_radius, 365.25 * 86400.0));
        let key = system.add_body(planet, None);
        system.recompute_bounds();
        (system, key)
    }

    fn sun_light() -> LightSource {
        LightSource {
            position: DVec3::ZERO,
            luminosity: 1.0,
            radius: 696_000.0,
            color: glam::Vec3::ONE,
        }
    }

    #[test]
    fn test_visible_planet_gets_render_entry() {
        let (system, key) = one_planet_system(KM_PER_AU, 6378.0);
        // Observer between sun and planet, looking at the planet.
        let observer = DVec3::new(KM_PER_AU - 1.0e6, 0.0, 0.0);
        let ctx = view_context(observer, DVec3::X);
        let lights = [LightSource {
            position: -observer,
            ..sun_light()
        }];
        let mut out = TraversalLists::default();
        build_render_lists(
            &system,
            StarId(0),
            &system.tree,
            DVec3::ZERO,
            &lights,
            RenderFlags::default(),
            &ctx,
            &mut out,
        );
        assert_eq!(out.render_list.len(), 1);
        let entry = &out.render_list[0];
        assert!(matches!(entry.kind, RenderableKind::Body { key: k, .. } if k == key));
        assert!(entry.disc_size > 1.0, "disc is {} px", entry.disc_size);
        assert!((entry.distance - 1.0e6).abs() < 1.0, "distance {}", entry.distance);
    }

    #[test]
    fn test_body_behind_observer_is_culled() {
        let (system, _) = one_planet_system(KM_PER_AU, 6378.0);
        let observer = DVec3::new(KM_PER_AU - 1.0e6, 0.0, 0.0);
        // Looking away from the planet.
        let ctx = view_context(observer, -DVec3::X);
        let lights = [sun_light()];
        let mut out = TraversalLists::default();
        build_render_lists(
            &system,
            StarId(0),
            &system.tree,
            DVec3::ZERO,
            &lights,
            RenderFlags::default(),
            &ctx,
            &mut out,
        );
        assert!(out.render_list.is_empty());
    }

    #[test]
    fn test_faint_subpixel_body_is_dropped() {
        // A 1 km rock at 1 AU from the observer is sub-pixel and far too
        // faint to show as a point.
        let (system, _) = one_planet_system(KM_PER_AU, 1.0);
        let observer = DVec3::new(0.0, 0.0, -KM_PER_AU);
        let ctx = view_context(observer, (DVec3::new(KM_PER_AU, 0.0, 0.0) - observer).normalize());
        let lights = [LightSource {
            position: -observer,
            ..sun_light()
        }];
        let mut out = TraversalLists::default();
        build_render_lists(
            &system,
            StarId(0),
            &system.tree,
            DVec3::ZERO,
            &lights,
            RenderFlags::default(),
            &ctx,
            &mut out,
        );
        assert!(out.render_list.is_empty());
    }

    #[test]
    fn test_labeled_subpixel_body_is_kept() {
        let mut system = StarSystem::new(Star::test_star());
        let mut rock = Body::new("rock", 1.0, BodyClass::Asteroid);
        rock.labeled = true;
        rock.timeline.push(phase(KM_PER_AU, 365.25 * 86400.0));
        system.add_body(rock, None);
        system.recompute_bounds();

        let observer = DVec3::new(0.0, 0.0, -KM_PER_AU);
        let ctx = view_context(observer, (DVec3::new(KM_PER_AU, 0.0, 0.0) - observer).normalize());
        let lights = [LightSource {
            position: -observer,
            ..sun_light()
        }];
        let mut out = TraversalLists::default();
        build_render_lists(
            &system,
            StarId(0),
            &system.tree,
            DVec3::ZERO,
            &lights,
            RenderFlags::default(),
            &ctx,
            &mut out,
        );
        assert_eq!(out.render_list.len(), 1);
    }

    #[test]
    fn test_moon_subtree_is_traversed_when_parent_is_near() {
        let mut system = StarSystem::new(Star::test_star());
        let mut planet = Body::new("planet", 6378.0, BodyClass::Planet);
        planet.timeline.push(phase(KM_PER_AU, 365.25 * 86400.0));
        let planet_key = system.add_body(planet, None);
        let mut moon = Body::new("moon", 1737.0, BodyClass::Moon);
        moon.timeline.push(TimelinePhase {
            center: Some(planet_key),
            ..phase(384_400.0, 27.3 * 86400.0)
        });
        system.add_body(moon, Some(planet_key));
        system.recompute_bounds();

        let observer = DVec3::new(KM_PER_AU - 1.0e6, 0.0, 0.0);
        let ctx = view_context(observer, DVec3::X);
        let lights = [LightSource {
            position: -observer,
            ..sun_light()
        }];
        let mut out = TraversalLists::default();
        build_render_lists(
            &system,
            StarId(0),
            &system.tree,
            DVec3::ZERO,
            &lights,
            RenderFlags::default(),
            &ctx,
            &mut out,
        );
        let names: Vec<_> = out
            .render_list
            .iter()
            .filter_map(|e| match e.kind {
                RenderableKind::Body { key, .. } => Some(system.bodies[key].name.as_str()),
                _ => None,
            })
            .collect();
        assert!(names.contains(&"planet"), "got {names:?}");
        assert!(names.contains(&"moon"), "got {names:?}");
    }

    #[test]
    fn test_planetshine_registers_secondary_illuminator() {
        let mut system = StarSystem::new(Star::test_star());
        let mut planet = Body::new("planet", 6378.0, BodyClass::Planet);
        planet.secondary_illuminator = true;
        planet.timeline.push(phase(KM_PER_AU, 365.25 * 86400.0));
        system.add_body(planet, None);
        system.recompute_bounds();

        let observer = DVec3::new(KM_PER_AU - 1.0e5, 0.0, 0.0);
        let ctx = view_context(observer, DVec3::X);
        let lights = [sun_light()];
        let mut out = TraversalLists::default();
        let flags = RenderFlags::default() | RenderFlags::PLANETSHINE;
        build_render_lists(
            &system,
            StarId(0),
            &system.tree,
            DVec3::ZERO,
            &lights,
            flags,
            &ctx,
            &mut out,
        );
        assert_eq!(out.secondary_illuminators.len(), 1);
        assert_eq!(out.secondary_illuminators[0].radius, 6378.0);
        // Without the flag nothing is registered.
        let mut out2 = TraversalLists::default();
        build_render_lists(
            &system,
            StarId(0),
            &system.tree,
            DVec3::ZERO,
            &lights,
            RenderFlags::default(),
            &ctx,
            &mut out2,
        );
        assert!(out2.secondary_illuminators.is_empty());
    }

    #[test]
    fn test_comet_gets_tail_entry() {
        let mut system = StarSystem::new(Star::test_star());
        let mut comet = Body::new("comet", 10.0, BodyClass::Comet);
        comet.labeled = true;
        comet.timeline.push(phase(0.5 * KM_PER_AU, 10.0 * 365.25 * 86400.0));
        system.add_body(comet, None);
        system.recompute_bounds();

        let observer = DVec3::new(0.4 * KM_PER_AU, 0.0, 0.0);
        let ctx = view_context(observer, DVec3::X);
        let lights = [LightSource {
            position: -observer,
            ..sun_light()
        }];
        let mut out = TraversalLists::default();
        build_render_lists(
            &system,
            StarId(0),
            &system.tree,
            DVec3::ZERO,
            &lights,
            RenderFlags::default(),
            &ctx,
            &mut out,
        );
        let tails: Vec<_> = out
            .render_list
            .iter()
            .filter(|e| matches!(e.kind, RenderableKind::CometTail { .. }))
            .collect();
        assert_eq!(tails.len(), 1);
        assert!(!tails[0].opaque);
        // Dust tail at 0.5 AU from a 10 km nucleus.
        let expected = (1.0e8 / (0.5 * KM_PER_AU)) * (10.0 / 5.0) * 1.0e7;
        assert!((tails[0].radius - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn test_orbit_list_respects_visibility_policy() {
        let mut system = StarSystem::new(Star::test_star());
        let mut planet = Body::new("planet", 6378.0, BodyClass::Planet);
        planet.timeline.push(phase(KM_PER_AU, 365.25 * 86400.0));
        let mut hidden = Body::new("hidden", 6378.0, BodyClass::Planet);
        hidden.orbit_visibility = stellar_scene::OrbitVisibility::NeverVisible;
        hidden.timeline.push(phase(1.5 * KM_PER_AU, 2.0 * 365.25 * 86400.0));
        system.add_body(planet, None);
        system.add_body(hidden, None);
        system.recompute_bounds();

        let observer = DVec3::new(0.0, 2.0 * KM_PER_AU, 0.0);
        let ctx = view_context(observer, -DVec3::Y);
        let detail = DetailOptions::default();
        let mut out = TraversalLists::default();
        build_orbit_lists(
            &system,
            &system.tree,
            DVec3::ZERO,
            RenderFlags::default() | RenderFlags::ORBITS,
            &ClassFilters::default(),
            &detail,
            &ctx,
            &mut out,
        );
        assert_eq!(out.orbit_paths.len(), 1);
        assert!((out.orbit_paths[0].radius - KM_PER_AU).abs() < 1.0);
        assert!(out.orbit_paths[0].opacity > 0.0);
    }

    #[test]
    fn test_tiny_orbit_is_size_gated() {
        let (system, _) = one_planet_system(1000.0, 1.0);
        // From 2 AU away a 1000 km orbit is far below the pixel gate.
        let observer = DVec3::new(0.0, 2.0 * KM_PER_AU, 0.0);
        let ctx = view_context(observer, -DVec3::Y);
        let mut out = TraversalLists::default();
        build_orbit_lists(
            &system,
            &system.tree,
            DVec3::ZERO,
            RenderFlags::default() | RenderFlags::ORBITS,
            &ClassFilters::default(),
            &DetailOptions::default(),
            &ctx,
            &mut out,
        );
        assert!(out.orbit_paths.is_empty());
    }

    #[test]
    fn test_label_list_emits_depth_sorted_label() {
        let mut system = StarSystem::new(Star::test_star());
        let mut planet = Body::new("planet", 6378.0, BodyClass::Planet);
        planet.labeled = true;
        planet.timeline.push(phase(KM_PER_AU, 365.25 * 86400.0));
        system.add_body(planet, None);
        system.recompute_bounds();

        let observer = DVec3::new(KM_PER_AU - 1.0e6, 0.0, 0.0);
        let ctx = view_context(observer, DVec3::X);
        let lights = [LightSource {
            position: -observer,
            ..sun_light()
        }];
        let mut out = TraversalLists::default();
        build_render_lists(
            &system,
            StarId(0),
            &system.tree,
            DVec3::ZERO,
            &lights,
            RenderFlags::default(),
            &ctx,
            &mut out,
        );
        let mut annotations = AnnotationLists::default();
        build_label_lists(
            &system,
            StarId(0),
            &out.render_list,
            &ClassFilters::default(),
            &DetailOptions::default(),
            &ctx,
            &mut annotations,
        );
        let sorted = annotations.sorted_by_depth();
        assert_eq!(sorted.len(), 1);
        assert!(matches!(&sorted[0].content, AnnotationContent::Label(n) if n == "planet"));
        // Pulled slightly in front of the body center.
        assert!(sorted[0].depth < 1.0e6);
        assert!(sorted[0].depth > 1.0e6 - 2.0 * 6378.0 * 1.01);
    }
}
