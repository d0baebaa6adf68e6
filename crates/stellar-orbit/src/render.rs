//! Orbit path polyline generation: camera-space transform, frustum
//! clipping, adaptive subdivision, and trail fading.
//!
//! Output goes through [`PolylineSink`] so the same generator feeds a
//! GPU line batch, a test collector, or a debug dump.

use glam::{DMat4, DVec3};

use crate::plot::{OrbitPlot, PlotSample};

/// Segments are recursively split at most this many times.
const MAX_SUBDIVISION_DEPTH: u32 = 6;

/// Receives the generated polyline. `break_line` separates disjoint
/// visible runs so clipped-out spans do not get bridged by a segment.
pub trait PolylineSink {
    /// Emit a vertex in camera space. `opacity` is in `[0, 1]`.
    fn vertex(&mut self, position: DVec3, opacity: f32);
    fn break_line(&mut self);
}

/// Camera-space clipping and subdivision parameters for one orbit path.
#[derive(Clone, Debug)]
pub struct OrbitRenderParams {
    /// Transform from the orbit's frame to camera space, f64 end to end;
    /// orbit coordinates are too large for single precision.
    pub modelview: DMat4,
    /// Near clip depth, positive.
    pub near: f64,
    /// Far clip depth, positive.
    pub far: f64,
    /// Inward-facing side plane normals of the view frustum, camera space.
    pub side_normals: [DVec3; 4],
    /// Camera-space chord length per unit depth above which a segment is
    /// subdivided. Derived from pixel size at the current field of view.
    pub subdivision_threshold: f64,
    /// Fade the oldest part of the trail: opacity ramps 0 to 1 over
    /// `(start, end)` sample times. `None` draws at full opacity.
    pub fade: Option<(f64, f64)>,
    /// Drop samples newer than this time, for trajectories drawn only up
    /// to the present.
    pub clamp_end: Option<f64>,
}

impl OrbitRenderParams {
    fn opacity(&self, t: f64) -> f32 {
        match self.fade {
            Some((start, end)) if end > start => {
                (((t - start) / (end - start)).clamp(0.0, 1.0)) as f32
            }
            _ => 1.0,
        }
    }

    /// Depth of a camera-space point, positive in front of the camera.
    fn depth(p: DVec3) -> f64 {
        -p.z
    }
}

/// Generate the clipped polyline for a cached orbit plot.
pub fn render_orbit_plot(plot: &OrbitPlot, params: &OrbitRenderParams, sink: &mut dyn PolylineSink) {
    let samples = plot.samples();
    if samples.len() < 2 {
        return;
    }

    let mut pen_down = false;
    for pair in samples.windows(2) {
        let (s0, s1) = (&pair[0], &pair[1]);
        if let Some(clamp) = params.clamp_end {
            if s0.t >= clamp {
                break;
            }
        }

        let p0 = params.modelview.transform_point3(s0.position);
        let p1 = params.modelview.transform_point3(s1.position);

        // Cheap reject: both endpoints outside the same plane.
        if rejected_by_common_plane(p0, p1, params) {
            if pen_down {
                sink.break_line();
                pen_down = false;
            }
            continue;
        }

        if !pen_down {
            sink.vertex(p0, params.opacity(s0.t));
            pen_down = true;
        }
        subdivide(s0, s1, p0, p1, params, sink, 0);
        sink.vertex(p1, params.opacity(s1.t));
    }
}

/// True when the whole segment is provably outside the view volume.
fn rejected_by_common_plane(p0: DVec3, p1: DVec3, params: &OrbitRenderParams) -> bool {
    let (d0, d1) = (OrbitRenderParams::depth(p0), OrbitRenderParams::depth(p1));
    if d0 < params.near && d1 < params.near {
        return true;
    }
    if d0 > params.far && d1 > params.far {
        return true;
    }
    params
        .side_normals
        .iter()
        .any(|n| n.dot(p0) < 0.0 && n.dot(p1) < 0.0)
}

/// Recursively emit interior vertices where the chord is long relative
/// to its depth. Interpolation is cubic Hermite using the cached
/// velocities, so subdivision recovers curvature between samples.
fn subdivide(
    s0: &PlotSample,
    s1: &PlotSample,
    p0: DVec3,
    p1: DVec3,
    params: &OrbitRenderParams,
    sink: &mut dyn PolylineSink,
    depth: u32,
) {
    if depth >= MAX_SUBDIVISION_DEPTH {
        return;
    }
    let chord = (p1 - p0).length();
    let min_depth = OrbitRenderParams::depth(p0)
        .min(OrbitRenderParams::depth(p1))
        .max(params.near);
    if chord <= params.subdivision_threshold * min_depth {
        return;
    }

    let dt = s1.t - s0.t;
    let mid = hermite_midpoint(s0, s1, dt);
    let pm = params.modelview.transform_point3(mid.position);
    subdivide(s0, &mid, p0, pm, params, sink, depth + 1);
    sink.vertex(pm, params.opacity(mid.t));
    subdivide(&mid, s1, pm, p1, params, sink, depth + 1);
}

fn hermite_midpoint(s0: &PlotSample, s1: &PlotSample, dt: f64) -> PlotSample {
    // Hermite basis at u = 0.5.
    let position = 0.5 * (s0.position + s1.position) + 0.125 * dt * (s0.velocity - s1.velocity);
    let velocity = 1.5 * (s1.position - s0.position) / dt - 0.25 * (s0.velocity + s1.velocity);
    PlotSample {
        t: 0.5 * (s0.t + s1.t),
        position,
        velocity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::AppendSink;
    use std::sync::Arc;
    use stellar_scene::{CircularOrbit, Orbit, SharedOrbit};

    struct Collector {
        vertices: Vec<(DVec3, f32)>,
        breaks: usize,
    }

    impl Collector {
        fn new() -> Self {
            Self {
                vertices: Vec::new(),
                breaks: 0,
            }
        }
    }

    impl PolylineSink for Collector {
        fn vertex(&mut self, position: DVec3, opacity: f32) {
            self.vertices.push((position, opacity));
        }
        fn break_line(&mut self) {
            self.breaks += 1;
        }
    }

    fn sampled_circle(n: usize) -> OrbitPlot {
        let orbit: SharedOrbit = Arc::new(CircularOrbit::new(1000.0, 100.0));
        let mut plot = OrbitPlot::default();
        orbit.sample(0.0, 100.0, n, &mut AppendSink::new(&mut plot, false));
        plot
    }

    fn wide_open_params() -> OrbitRenderParams {
        OrbitRenderParams {
            // Camera 5000 km above the orbit plane looking down -z.
            modelview: DMat4::from_translation(DVec3::new(0.0, 0.0, -5000.0)),
            near: 1.0,
            far: 1.0e9,
            side_normals: [
                DVec3::new(0.0, 0.7, -0.7),
                DVec3::new(0.0, -0.7, -0.7),
                DVec3::new(0.7, 0.0, -0.7),
                DVec3::new(-0.7, 0.0, -0.7),
            ],
            subdivision_threshold: 1.0e9,
            fade: None,
            clamp_end: None,
        }
    }

    #[test]
    fn test_visible_orbit_emits_continuous_line() {
        let plot = sampled_circle(32);
        let mut out = Collector::new();
        render_orbit_plot(&plot, &wide_open_params(), &mut out);
        assert_eq!(out.breaks, 0);
        assert_eq!(out.vertices.len(), 33, "one vertex per sample, no splits");
        assert!(out.vertices.iter().all(|(_, a)| *a == 1.0));
    }

    #[test]
    fn test_orbit_behind_camera_clipped() {
        let plot = sampled_circle(32);
        let mut params = wide_open_params();
        // Push the whole orbit behind the near plane.
        params.modelview = DMat4::from_translation(DVec3::new(0.0, 0.0, 5000.0));
        let mut out = Collector::new();
        render_orbit_plot(&plot, &params, &mut out);
        assert!(out.vertices.is_empty());
    }

    #[test]
    fn test_partially_visible_orbit_breaks_line() {
        let plot = sampled_circle(64);
        let mut params = wide_open_params();
        // Camera inside the orbit plane, so half the ring is behind it.
        params.modelview = DMat4::from_translation(DVec3::ZERO);
        params.side_normals = [
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.0, -1.0, 0.0),
            DVec3::new(1.0, 0.0, -1.0).normalize(),
            DVec3::new(-1.0, 0.0, -1.0).normalize(),
        ];
        let mut out = Collector::new();
        render_orbit_plot(&plot, &params, &mut out);
        assert!(!out.vertices.is_empty(), "front arc is visible");
        assert!(out.breaks >= 1, "rear arc forces at least one break");
    }

    #[test]
    fn test_subdivision_adds_vertices_on_coarse_plots() {
        let coarse = sampled_circle(8);
        let mut params = wide_open_params();
        params.subdivision_threshold = 0.001;
        let mut out = Collector::new();
        render_orbit_plot(&coarse, &params, &mut out);
        assert!(
            out.vertices.len() > 9,
            "coarse segments must be subdivided, got {}",
            out.vertices.len()
        );
        // Subdivided points stay near the true circle.
        for (v, _) in &out.vertices {
            let on_plane = DVec3::new(v.x, v.y, v.z + 5000.0);
            let r = on_plane.length();
            assert!((r - 1000.0).abs() < 20.0, "vertex radius {r} strays off the circle");
        }
    }

    #[test]
    fn test_fade_ramps_opacity_along_trail() {
        let plot = sampled_circle(16);
        let mut params = wide_open_params();
        params.fade = Some((0.0, 100.0));
        let mut out = Collector::new();
        render_orbit_plot(&plot, &params, &mut out);
        let first = out.vertices.first().unwrap().1;
        let last = out.vertices.last().unwrap().1;
        assert_eq!(first, 0.0);
        assert_eq!(last, 1.0);
        assert!(out.vertices.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn test_clamp_end_stops_at_present() {
        let plot = sampled_circle(10);
        let mut params = wide_open_params();
        params.clamp_end = Some(50.0);
        let mut out = Collector::new();
        render_orbit_plot(&plot, &params, &mut out);
        // Samples at t = 0,10,..,100; segments starting at t >= 50 dropped.
        assert_eq!(out.vertices.len(), 6);
    }
}
