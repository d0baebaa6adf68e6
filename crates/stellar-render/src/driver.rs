//! The frame driver: assembles one frame from catalog queries to backend
//! draw calls.
//!
//! Per-frame state (render lists, annotation queues, light sources) is
//! cleared at the start of every [`Renderer::draw`]; only the orbit
//! sample cache persists across frames. The draw sequence is fixed:
//! magnitude limits, light sources, scene traversal, point stars, cull
//! pass, depth partitioning, then one backend pass per depth interval
//! from farthest to nearest.

use glam::{DMat3, DMat4, DQuat, DVec3};
use log::debug;

use stellar_config::Settings;
use stellar_lighting::{
    CasterSnapshot, IlluminatingStar, LightSnapshot, LightSource, LightingState,
    ReceiverSnapshot, setup_light_sources, setup_object_lighting,
    setup_secondary_light_sources, test_eclipse, test_ring_shadow,
};
use stellar_math::{Frustum, SphereTest, ViewCone, ly_to_km};
use stellar_orbit::{OrbitCache, OrbitRenderParams, PlotWindow, render_orbit_plot};
use stellar_scene::{BodyKey, StarId, StarSystem, Universe, astrocentric_position};

use crate::annotation::{Annotation, AnnotationContent, AnnotationLists, MarkerShape};
use crate::backend::{PolylineBuffer, ProjectionParams, RenderBackend, Viewport};
use crate::flags::{ClassFilters, RenderFlags};
use crate::list::{RenderListEntry, RenderableKind, sort_orbit_paths, sort_render_list};
use crate::partition::{DepthInterval, MAX_FAR_NEAR_RATIO, MIN_NEAR_PLANE_DISTANCE, partition_depth};
use crate::photometry::{
    BrightnessScale, MagnitudeLimits, auto_magnitude_limits, sky_brightness_attenuation,
};
use crate::stars::{PointStarList, PointStarProcessor};
use crate::traversal::{
    TraversalLists, ViewContext, add_star_orbit, build_label_lists, build_orbit_lists,
    build_render_lists,
};

/// Camera-space chord length per pixel above which orbit segments are
/// subdivided.
const ORBIT_SUBDIVISION_PIXELS: f64 = 40.0;

/// The observing camera.
#[derive(Clone, Copy, Debug)]
pub struct Observer {
    /// Position in light-years from the coordinate origin.
    pub position_ly: DVec3,
    /// Camera-to-world rotation; the view direction is `orientation * -Z`.
    pub orientation: DQuat,
    /// Vertical field of view in radians.
    pub fov_y: f64,
}

/// A user-placed marker at a fixed universal position.
#[derive(Clone, Debug)]
pub struct Marker {
    pub position_ly: DVec3,
    pub shape: MarkerShape,
    pub color: [f32; 4],
    pub size: f32,
    /// Depth-sort against scene geometry instead of drawing on top.
    pub occludable: bool,
}

/// A selected solar-system body, highlighted with a cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub system: StarId,
    pub body: BodyKey,
}

/// The frame driver. Owns all cross-frame render state.
pub struct Renderer {
    pub flags: RenderFlags,
    pub filters: ClassFilters,
    settings: Settings,
    markers: Vec<Marker>,
    orbit_cache: OrbitCache,
    frame_count: u64,
    // Per-frame buffers, reused to avoid reallocation.
    lists: TraversalLists,
    annotations: AnnotationLists,
    polyline: PolylineBuffer,
}

impl Renderer {
    pub fn new(settings: Settings) -> Self {
        let mut flags = RenderFlags::default();
        flags.set(RenderFlags::AUTO_MAG, settings.photometry.auto_mag);
        flags.set(
            RenderFlags::TINTED_ILLUMINATION,
            settings.photometry.tinted_illumination,
        );
        Self {
            flags,
            filters: ClassFilters::default(),
            settings,
            markers: Vec::new(),
            orbit_cache: OrbitCache::default(),
            frame_count: 0,
            lists: TraversalLists::default(),
            annotations: AnnotationLists::default(),
            polyline: PolylineBuffer::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn clear_markers(&mut self) {
        self.markers.clear();
    }

    /// Drop all cached orbit plots, e.g. after switching universes.
    pub fn invalidate_orbit_cache(&mut self) {
        self.orbit_cache = OrbitCache::default();
    }

    /// Render one frame through `backend`.
    pub fn draw(
        &mut self,
        universe: &dyn Universe,
        observer: &Observer,
        viewport: Viewport,
        t: f64,
        selection: Option<Selection>,
        backend: &mut dyn RenderBackend,
    ) {
        self.frame_count += 1;
        self.lists.clear();
        self.annotations.clear();

        let (width, height) = (viewport.width.max(1) as f64, viewport.height.max(1) as f64);
        let aspect_ratio = width / height;
        let pixel_size = 2.0 * (observer.fov_y / 2.0).tan() / height;
        let view_normal = observer.orientation * DVec3::NEG_Z;
        let cone = ViewCone::new(observer.fov_y, width, height);
        let camera_frustum =
            Frustum::perspective_infinite(observer.fov_y, aspect_ratio, MIN_NEAR_PLANE_DISTANCE);
        let world_frustum = camera_frustum.transformed(DMat3::from_quat(observer.orientation));

        let phot = &self.settings.photometry;
        let mut limits = if self.flags.contains(RenderFlags::AUTO_MAG) {
            auto_magnitude_limits(
                observer.fov_y.to_degrees(),
                phot.faintest_auto_mag_45deg,
                phot.saturation_mag_night,
            )
        } else {
            MagnitudeLimits {
                faintest: phot.faintest_mag,
                saturation: phot.saturation_mag_night,
            }
        };

        // Light sources: every star near enough to illuminate the local
        // neighborhood, positioned observer-relative in kilometers.
        let near_ids = universe.near_stars(
            observer.position_ly,
            self.settings.observer.near_star_radius_ly,
        );
        let near_systems: Vec<(StarId, DVec3)> = near_ids
            .iter()
            .filter_map(|&id| {
                let star = universe.star(id)?;
                let rel_km = (star.position_at(t) - observer.position_ly) * ly_to_km(1.0);
                Some((id, rel_km))
            })
            .collect();
        let illuminating: Vec<IlluminatingStar> = near_systems
            .iter()
            .filter_map(|&(id, rel_km)| {
                let star = universe.star(id)?;
                Some(IlluminatingStar {
                    position: rel_km,
                    luminosity: star.luminosity,
                    radius: star.radius_km,
                    temperature: star.temperature,
                })
            })
            .collect();
        let lights = setup_light_sources(
            &illuminating,
            self.flags.contains(RenderFlags::TINTED_ILLUMINATION),
        );

        // Scene traversal per nearby system.
        let faintest_planet_mag = phot.faintest_planet_mag;
        let world_frustum = &world_frustum;
        let view_context = move |star_rel_km: DVec3| ViewContext {
            t,
            observer_pos: -star_rel_km,
            view_normal,
            cone,
            frustum: world_frustum.clone(),
            pixel_size,
            faintest_planet_mag,
        };
        for &(id, star_rel_km) in &near_systems {
            let Some(system) = universe.system(id) else {
                continue;
            };
            let ctx = view_context(star_rel_km);
            if self.flags.contains(RenderFlags::ORBITS) {
                let barycenter_rel =
                    (system.star.position_ly - observer.position_ly) * ly_to_km(1.0);
                add_star_orbit(
                    &system.star,
                    barycenter_rel,
                    &self.settings.detail,
                    &ctx,
                    &mut self.lists,
                );
            }
            if self.flags.contains(RenderFlags::PLANETS) {
                build_render_lists(
                    system,
                    id,
                    &system.tree,
                    DVec3::ZERO,
                    &lights,
                    self.flags,
                    &ctx,
                    &mut self.lists,
                );
            }
            if self.flags.contains(RenderFlags::ORBITS) {
                build_orbit_lists(
                    system,
                    &system.tree,
                    DVec3::ZERO,
                    self.flags,
                    &self.filters,
                    &self.settings.detail,
                    &ctx,
                    &mut self.lists,
                );
            }
        }

        setup_secondary_light_sources(&mut self.lists.secondary_illuminators, &lights);

        // An observer inside an atmosphere loses faint objects to
        // scattered daylight.
        let attenuation = self.atmosphere_attenuation(universe, &lights);
        limits.faintest -= attenuation;
        limits.saturation -= attenuation;
        let scale = BrightnessScale::new(limits);

        let mut star_points = PointStarList::default();
        if self.flags.contains(RenderFlags::STARS) {
            let mut processor = PointStarProcessor::new(
                t,
                observer.position_ly,
                view_normal,
                cone,
                pixel_size,
                limits,
                scale,
            );
            universe.visit_visible_stars(observer.position_ly, limits.faintest, t, &mut processor);
            self.lists.render_list.append(&mut processor.near_star_entries);
            star_points = processor.stars;
        }

        if self.flags.contains(RenderFlags::DSOS) {
            self.collect_dso_labels(universe, observer, cone, view_normal, limits.faintest);
        }

        if self.flags.contains(RenderFlags::LABELS) {
            for &(id, star_rel_km) in &near_systems {
                let Some(system) = universe.system(id) else {
                    continue;
                };
                build_label_lists(
                    system,
                    id,
                    &self.lists.render_list,
                    &self.filters,
                    &self.settings.detail,
                    &view_context(star_rel_km),
                    &mut self.annotations,
                );
            }
        }

        if self.flags.contains(RenderFlags::MARKERS) {
            self.collect_markers(observer, view_normal);
        }
        if let Some(selection) = selection {
            self.add_selection_cursor(universe, observer, view_normal, t, selection);
        }

        // Cull pass: full frustum test, then per-entry depth extents.
        self.lists
            .render_list
            .retain(|e| world_frustum.test_sphere(e.position, e.radius) != SphereTest::Outside);
        let cos_view_angle = cone.cos_angle();
        for entry in &mut self.lists.render_list {
            assign_depth_extents(entry, universe, cos_view_angle);
        }

        sort_render_list(&mut self.lists.render_list);
        sort_orbit_paths(&mut self.lists.orbit_paths);

        let intervals = partition_depth(
            &self.lists.render_list,
            &self.lists.orbit_paths,
            &self.annotations,
        );
        if self.settings.debug.log_depth_partitions {
            debug!(
                "frame {}: {} entries, {} orbit paths, {} depth intervals, nearest {:.3e} km",
                self.frame_count,
                self.lists.render_list.len(),
                self.lists.orbit_paths.len(),
                intervals.len(),
                intervals.last().map(|i| i.near).unwrap_or(0.0),
            );
        }

        backend.begin_frame(viewport);
        if self.flags.contains(RenderFlags::STARS) {
            backend.draw_star_points(&star_points);
        }
        for annotation in &self.annotations.background {
            backend.draw_annotation(annotation);
        }

        let depth_annotations = self.annotations.sorted_by_depth().to_vec();
        let window = PlotWindow {
            base_sample_count: self.settings.detail.orbit_path_sample_points,
            window_end: self.settings.detail.orbit_window_end,
            periods_shown: self.settings.detail.orbit_periods_shown,
        };

        // Farthest interval first; the backend clears depth between
        // intervals, so nearer geometry always wins.
        for (index, interval) in intervals.iter().enumerate() {
            backend.set_depth_interval(
                &ProjectionParams {
                    fov_y: observer.fov_y,
                    aspect_ratio,
                    near: interval.near,
                    far: interval.far,
                },
                interval.depth_range,
            );

            // Opaque geometry, nearest first for early depth rejection.
            for entry in &self.lists.render_list {
                if entry.opaque && entry.disc_size > 1.0 && interval.contains_entry(entry) {
                    let lighting = self.object_lighting(universe, entry, &lights, t);
                    backend.draw_entry(entry, &lighting);
                }
            }

            if self.flags.contains(RenderFlags::ORBITS) {
                self.draw_orbit_paths(
                    interval,
                    observer,
                    &camera_frustum,
                    pixel_size,
                    t,
                    backend,
                    &window,
                );
            }

            // Transparent geometry back to front. Sub-pixel objects draw
            // flat in the interval holding their depth; anything beyond
            // the farthest interval joins it.
            for entry in self.lists.render_list.iter().rev() {
                let sub_pixel = entry.disc_size <= 1.0
                    && (interval.contains_depth(entry.center_depth)
                        || (index == 0 && entry.center_depth > interval.far));
                let transparent =
                    !entry.opaque && entry.disc_size > 1.0 && interval.contains_entry(entry);
                if sub_pixel || transparent {
                    let lighting = self.object_lighting(universe, entry, &lights, t);
                    backend.draw_entry(entry, &lighting);
                }
            }

            for annotation in &depth_annotations {
                if interval.contains_depth(annotation.depth) {
                    backend.draw_annotation(annotation);
                }
            }
        }

        for annotation in &self.annotations.foreground {
            backend.draw_annotation(annotation);
        }
        backend.end_frame();
    }

    /// Largest sky-brightness attenuation over bodies whose atmosphere
    /// contains the observer.
    fn atmosphere_attenuation(&self, universe: &dyn Universe, lights: &[LightSource]) -> f64 {
        let mut attenuation: f64 = 0.0;
        for entry in &self.lists.render_list {
            let RenderableKind::Body { system, key } = entry.kind else {
                continue;
            };
            let Some(body) = universe.system(system).map(|s| &s.bodies[key]) else {
                continue;
            };
            let Some(atmosphere) = &body.atmosphere else {
                continue;
            };
            if entry.distance >= body.radius + atmosphere.height {
                continue;
            }
            let Some(sun) = lights.first() else {
                continue;
            };
            let observer_from_body = -entry.position;
            let sun_dir = (sun.position - entry.position).normalize_or_zero();
            attenuation = attenuation.max(sky_brightness_attenuation(
                observer_from_body / body.radius,
                sun_dir,
                body.radius,
                body.semi_axes / body.radius,
                atmosphere.height,
            ));
        }
        attenuation
    }

    fn collect_dso_labels(
        &mut self,
        universe: &dyn Universe,
        observer: &Observer,
        cone: ViewCone,
        view_normal: DVec3,
        faintest: f64,
    ) {
        struct Labeler<'a> {
            observer_ly: DVec3,
            cone: ViewCone,
            view_normal: DVec3,
            background: &'a mut Vec<Annotation>,
        }
        impl stellar_scene::DsoVisitor for Labeler<'_> {
            fn process(&mut self, dso: &stellar_scene::DeepSkyObject, _distance_ly: f64, _app_mag: f64) {
                let rel = dso.position_ly - self.observer_ly;
                if !self.cone.test_sphere(rel, self.view_normal, dso.radius_ly) {
                    return;
                }
                self.background.push(Annotation {
                    content: AnnotationContent::Label(dso.name.clone()),
                    position: rel.normalize_or_zero(),
                    depth: 0.0,
                    color: [0.4, 0.4, 0.7, 1.0],
                    size: 1.0,
                });
            }
        }
        let mut labeler = Labeler {
            observer_ly: observer.position_ly,
            cone,
            view_normal,
            background: &mut self.annotations.background,
        };
        universe.visit_visible_dsos(observer.position_ly, faintest, &mut labeler);
    }

    fn collect_markers(&mut self, observer: &Observer, view_normal: DVec3) {
        for marker in &self.markers {
            let position = (marker.position_ly - observer.position_ly) * ly_to_km(1.0);
            let depth = view_normal.dot(position);
            let annotation = Annotation {
                content: AnnotationContent::Marker(marker.shape),
                position,
                depth,
                color: marker.color,
                size: marker.size,
            };
            if marker.occludable && depth > 0.0 {
                self.annotations.add_depth_sorted(annotation);
            } else {
                self.annotations.foreground.push(annotation);
            }
        }
    }

    /// Highlight the selected body with a crosshair pair: an occludable
    /// cursor at the body and an always-visible one on top.
    fn add_selection_cursor(
        &mut self,
        universe: &dyn Universe,
        observer: &Observer,
        view_normal: DVec3,
        t: f64,
        selection: Selection,
    ) {
        let Some(system) = universe.system(selection.system) else {
            return;
        };
        if !system.bodies.contains_key(selection.body) {
            return;
        }
        let star_rel = (system.star.position_at(t) - observer.position_ly) * ly_to_km(1.0);
        let position = star_rel + astrocentric_position(system, selection.body, t);
        let distance = position.length();
        if distance <= 0.0 {
            return;
        }
        let body = &system.bodies[selection.body];
        let scaled = position * (1.0 - body.culling_radius() * 1.01 / distance);
        let cursor = |position: DVec3, depth: f64| Annotation {
            content: AnnotationContent::Marker(MarkerShape::Crosshair),
            position,
            depth,
            color: [0.4, 1.0, 0.4, 1.0],
            size: 20.0,
        };
        self.annotations
            .add_depth_sorted(cursor(scaled, view_normal.dot(scaled)));
        self.annotations.foreground.push(cursor(position, 0.0));
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_orbit_paths(
        &mut self,
        interval: &DepthInterval,
        observer: &Observer,
        camera_frustum: &Frustum,
        pixel_size: f64,
        t: f64,
        backend: &mut dyn RenderBackend,
        window: &PlotWindow,
    ) {
        let inv_camera = DMat4::from_quat(observer.orientation.conjugate());
        let side_normals = camera_frustum.side_plane_normals();
        let fade_fraction = self.settings.detail.linear_fade_fraction;

        for path in &self.lists.orbit_paths {
            if !interval.overlaps_orbit(path) {
                continue;
            }
            let Some(plot) =
                self.orbit_cache
                    .get_or_update(&path.orbit, t, window, self.frame_count)
            else {
                continue;
            };
            let fade = if fade_fraction > 0.0 && path.orbit.is_periodic()
                && let (Some(start), Some(end)) = (plot.start_time(), plot.end_time())
            {
                Some((start, start + (end - start) * fade_fraction))
            } else {
                None
            };
            let params = OrbitRenderParams {
                modelview: inv_camera
                    * DMat4::from_translation(path.origin)
                    * DMat4::from_quat(path.frame_orientation.conjugate()),
                near: interval.near,
                far: interval.far,
                side_normals,
                subdivision_threshold: pixel_size * ORBIT_SUBDIVISION_PIXELS,
                fade,
                clamp_end: path.clamp_to_now.then_some(t),
            };
            self.polyline.clear();
            render_orbit_plot(plot, &params, &mut self.polyline);
            if !self.polyline.is_empty() {
                backend.draw_orbit_path(path, &self.polyline);
            }
        }
    }

    /// Lighting environment for one render-list entry, including eclipse
    /// and ring shadows from the body's neighbors.
    fn object_lighting(
        &self,
        universe: &dyn Universe,
        entry: &RenderListEntry,
        lights: &[LightSource],
        t: f64,
    ) -> LightingState {
        let (system_id, key) = match entry.kind {
            RenderableKind::Body { system, key }
            | RenderableKind::CometTail { system, key }
            | RenderableKind::ReferenceMark { system, key, .. } => (system, key),
            // Stars are emissive.
            RenderableKind::Star { .. } => return LightingState::default(),
        };
        let Some(system) = universe.system(system_id) else {
            return LightingState::default();
        };
        let body = &system.bodies[key];
        let orientation = system
            .active_phase(key, t)
            .map(|phase| phase.frame.orientation_at(t))
            .unwrap_or(DQuat::IDENTITY);

        let mut lighting = setup_object_lighting(
            lights,
            &self.lists.secondary_illuminators,
            entry.position,
            orientation,
            body.radius,
            self.settings.photometry.ambient,
        );

        let want_eclipses = self.flags.contains(RenderFlags::ECLIPSE_SHADOWS);
        let want_ring_shadows = self.flags.contains(RenderFlags::RING_SHADOWS);
        if (!want_eclipses && !want_ring_shadows) || entry.disc_size <= 1.0 {
            return lighting;
        }

        let receiver = ReceiverSnapshot {
            position: entry.position,
            radius: body.radius,
        };
        // entry.position is the body's observer-relative position, so the
        // observer's astrocentric position falls out of the difference.
        let observer_astro = astrocentric_position(system, key, t) - entry.position;
        let casters = shadow_casters(system, key, t, observer_astro);

        for light_index in 0..lighting.lights.len() {
            let direction = lighting.lights[light_index].direction;
            // Map the (sorted, culled) per-object light back to its source.
            let Some(source) = lights.iter().max_by(|a, b| {
                let dir = |l: &LightSource| {
                    (l.position - entry.position).normalize_or_zero().as_vec3()
                };
                dir(a).dot(direction).total_cmp(&dir(b).dot(direction))
            }) else {
                continue;
            };
            let snapshot = LightSnapshot {
                position: source.position,
                radius: source.radius,
            };
            let mut eclipse_shadows = Vec::new();
            let mut ring_shadow = None;
            for caster in &casters {
                if want_eclipses
                    && let Some(shadow) = test_eclipse(&receiver, caster, &snapshot)
                {
                    eclipse_shadows.push(shadow);
                }
                if want_ring_shadows
                    && ring_shadow.is_none()
                    && caster.rings.is_some()
                {
                    ring_shadow = test_ring_shadow(&receiver, caster, &snapshot);
                }
            }
            for shadow in eclipse_shadows {
                lighting.add_shadow(light_index, shadow);
            }
            if let Some(shadow) = ring_shadow {
                lighting.set_ring_shadow(light_index, shadow);
            }
        }
        lighting
    }
}

/// Snapshot the ellipsoidal bodies that can cast shadows on `key`: its
/// siblings, its own satellites, and its parent.
fn shadow_casters(
    system: &StarSystem,
    key: BodyKey,
    t: f64,
    observer_astro: DVec3,
) -> Vec<CasterSnapshot> {
    let parent = system.active_phase(key, t).and_then(|phase| phase.center);
    let sibling_keys = match parent {
        Some(parent_key) => system.bodies[parent_key]
            .subtree
            .as_ref()
            .map(|tree| tree.children.as_slice())
            .unwrap_or(&[]),
        None => system.tree.children.as_slice(),
    };
    let child_keys = system.bodies[key]
        .subtree
        .as_ref()
        .map(|tree| tree.children.as_slice())
        .unwrap_or(&[]);

    sibling_keys
        .iter()
        .chain(child_keys.iter())
        .copied()
        .filter(|&k| k != key)
        .chain(parent)
        .filter_map(|k| {
            let body = &system.bodies[k];
            // Mesh bodies are not ellipsoidal; the capped-cylinder model
            // does not apply to them.
            if !body.visible || body.geometry.is_some() {
                return None;
            }
            let orientation = system
                .active_phase(k, t)
                .map(|phase| phase.frame.orientation_at(t))?;
            Some(CasterSnapshot {
                position: astrocentric_position(system, k, t) - observer_astro,
                radius: body.radius,
                orientation,
                rings: body.rings.map(|r| (r.inner_radius, r.outer_radius)),
            })
        })
        .collect()
}

/// Fill an entry's depth extents for the partitioner.
///
/// The near extent allows for the object sitting in a screen corner
/// (the perpendicular depth of its closest point shrinks by the cosine
/// of the half-diagonal view angle). For convex ringless bodies the far
/// extent tightens to the ellipsoid silhouette, widened again by any
/// cloud shell.
fn assign_depth_extents(entry: &mut RenderListEntry, universe: &dyn Universe, cos_view_angle: f64) {
    if entry.disc_size <= 1.0 {
        entry.near_depth = entry.center_depth - entry.radius;
        entry.far_depth = entry.center_depth + entry.radius;
        return;
    }

    let mut near = (entry.distance - entry.radius) * cos_view_angle;
    let min_near = MIN_NEAR_PLANE_DISTANCE.max(entry.radius * 5.0e-4);
    if near < min_near {
        near = min_near;
    }
    let mut far = entry.center_depth + entry.radius;

    if let RenderableKind::Body { system, key } = entry.kind
        && let Some(body) = universe.system(system).map(|s| &s.bodies[key])
        && body.rings.is_none()
        && body.geometry.map(|g| g.normalized).unwrap_or(true)
    {
        let eradius = body.radius * body.min_semi_axis_fraction();
        if entry.distance > eradius {
            far = entry.center_depth + eradius;
        } else {
            // Observer under the surface radius; the whole visible
            // surface is close.
            far = near * 2.0;
        }
        if let Some(atmosphere) = &body.atmosphere
            && atmosphere.cloud_height > 0.0
        {
            let shell = eradius + atmosphere.cloud_height;
            far += (shell * shell - eradius * eradius).sqrt();
        }
    }

    // Overflowing spans raise the near bound rather than pulling the far
    // bound in, so the silhouette is never truncated.
    let far = far.max(near);
    entry.near_depth = near.max(far / (MAX_FAR_NEAR_RATIO * 0.5));
    entry.far_depth = far;
}
