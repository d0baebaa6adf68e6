//! Backend interface the frame driver draws through.
//!
//! The driver owns frame assembly and depth partitioning; everything
//! device-specific sits behind [`RenderBackend`]. A backend receives
//! draw calls in a fixed order per frame: star points and background
//! annotations first, then one pass per depth interval (farthest first,
//! opaque before transparent), then foreground annotations.

use glam::DVec3;

use stellar_lighting::LightingState;
use stellar_orbit::PolylineSink;

use crate::annotation::Annotation;
use crate::list::{OrbitPathListEntry, RenderListEntry};
use crate::stars::PointStarList;

/// Output surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }
}

/// Projection for one depth interval.
#[derive(Clone, Copy, Debug)]
pub struct ProjectionParams {
    /// Vertical field of view in radians.
    pub fov_y: f64,
    pub aspect_ratio: f64,
    /// Near plane depth in kilometers.
    pub near: f64,
    /// Far plane depth in kilometers.
    pub far: f64,
}

/// A camera-space vertex of an orbit polyline.
#[derive(Clone, Copy, Debug)]
pub struct PolylineVertex {
    pub position: DVec3,
    pub opacity: f32,
}

/// Reusable polyline sink: vertices plus the boundaries of disjoint
/// visible runs.
#[derive(Clone, Debug, Default)]
pub struct PolylineBuffer {
    vertices: Vec<PolylineVertex>,
    breaks: Vec<usize>,
}

impl PolylineBuffer {
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.breaks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[PolylineVertex] {
        &self.vertices
    }

    /// Iterate the disjoint runs as vertex slices.
    pub fn runs(&self) -> impl Iterator<Item = &[PolylineVertex]> {
        let ends = self
            .breaks
            .iter()
            .copied()
            .chain(std::iter::once(self.vertices.len()));
        let mut start = 0;
        ends.filter_map(move |end| {
            let run = &self.vertices[start..end];
            start = end;
            (!run.is_empty()).then_some(run)
        })
    }
}

impl PolylineSink for PolylineBuffer {
    fn vertex(&mut self, position: DVec3, opacity: f32) {
        self.vertices.push(PolylineVertex { position, opacity });
    }

    fn break_line(&mut self) {
        if self.breaks.last() != Some(&self.vertices.len()) {
            self.breaks.push(self.vertices.len());
        }
    }
}

/// Device-facing side of the renderer.
pub trait RenderBackend {
    fn begin_frame(&mut self, viewport: Viewport);

    /// Switch to a depth interval: reprojects with the interval's
    /// near/far planes and maps depth output to `depth_range`.
    fn set_depth_interval(&mut self, projection: &ProjectionParams, depth_range: (f32, f32));

    /// Draw one render-list entry with its lighting environment.
    fn draw_entry(&mut self, entry: &RenderListEntry, lighting: &LightingState);

    /// Draw an orbit path from its clipped camera-space polyline.
    fn draw_orbit_path(&mut self, path: &OrbitPathListEntry, polyline: &PolylineBuffer);

    fn draw_annotation(&mut self, annotation: &Annotation);

    fn draw_star_points(&mut self, stars: &PointStarList);

    fn end_frame(&mut self);
}

/// Summary of one backend call, for tests and frame dumps.
#[derive(Clone, Debug, PartialEq)]
pub enum BackendCall {
    BeginFrame { width: u32, height: u32 },
    SetDepthInterval { near: f64, far: f64, depth_range: (f32, f32) },
    DrawEntry { opaque: bool, distance: f64, shadows: usize },
    DrawOrbitPath { vertices: usize },
    DrawAnnotation,
    DrawStarPoints { points: usize, glares: usize },
    EndFrame,
}

/// Backend that records the call sequence instead of drawing. Used by
/// the driver tests and by headless frame analysis.
#[derive(Default)]
pub struct RecordingBackend {
    pub calls: Vec<BackendCall>,
}

impl RenderBackend for RecordingBackend {
    fn begin_frame(&mut self, viewport: Viewport) {
        self.calls.push(BackendCall::BeginFrame {
            width: viewport.width,
            height: viewport.height,
        });
    }

    fn set_depth_interval(&mut self, projection: &ProjectionParams, depth_range: (f32, f32)) {
        self.calls.push(BackendCall::SetDepthInterval {
            near: projection.near,
            far: projection.far,
            depth_range,
        });
    }

    fn draw_entry(&mut self, entry: &RenderListEntry, lighting: &LightingState) {
        self.calls.push(BackendCall::DrawEntry {
            opaque: entry.opaque,
            distance: entry.distance,
            shadows: lighting.shadows.iter().map(Vec::len).sum(),
        });
    }

    fn draw_orbit_path(&mut self, _path: &OrbitPathListEntry, polyline: &PolylineBuffer) {
        self.calls.push(BackendCall::DrawOrbitPath {
            vertices: polyline.vertices().len(),
        });
    }

    fn draw_annotation(&mut self, _annotation: &Annotation) {
        self.calls.push(BackendCall::DrawAnnotation);
    }

    fn draw_star_points(&mut self, stars: &PointStarList) {
        self.calls.push(BackendCall::DrawStarPoints {
            points: stars.points.len(),
            glares: stars.glares.len(),
        });
    }

    fn end_frame(&mut self) {
        self.calls.push(BackendCall::EndFrame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polyline_runs_split_at_breaks() {
        let mut buf = PolylineBuffer::default();
        buf.vertex(DVec3::ZERO, 1.0);
        buf.vertex(DVec3::X, 1.0);
        buf.break_line();
        buf.vertex(DVec3::Y, 0.5);
        let runs: Vec<usize> = buf.runs().map(|r| r.len()).collect();
        assert_eq!(runs, vec![2, 1]);
    }

    #[test]
    fn test_leading_and_double_breaks_produce_no_empty_runs() {
        let mut buf = PolylineBuffer::default();
        buf.break_line();
        buf.vertex(DVec3::ZERO, 1.0);
        buf.break_line();
        buf.break_line();
        let runs: Vec<usize> = buf.runs().map(|r| r.len()).collect();
        assert_eq!(runs, vec![1]);
    }
}
