//! Per-frame render lists.
//!
//! Scene traversal fills these lists; the depth partitioner then slices
//! them into intervals. All depths are positive distances in front of
//! the camera, measured along the view axis in kilometers.

use glam::{DQuat, DVec3};

use stellar_scene::{BodyKey, SharedOrbit, StarId};

/// What a render list entry draws. Bodies are referenced by their
/// owning system and arena key, never owned by the list.
#[derive(Clone, Debug)]
pub enum RenderableKind {
    /// A solar-system body with a resolvable disc or point.
    Body { system: StarId, key: BodyKey },
    /// A star close enough to have a measurable disc and parallax.
    Star { id: StarId },
    /// A comet's dust tail, anchored at the comet's position.
    CometTail { system: StarId, key: BodyKey },
    /// A reference mark attached to a body.
    ReferenceMark {
        system: StarId,
        key: BodyKey,
        index: usize,
    },
}

/// One renderable item, camera-relative.
#[derive(Clone, Debug)]
pub struct RenderListEntry {
    pub kind: RenderableKind,
    /// Position relative to the observer, world orientation, kilometers.
    pub position: DVec3,
    /// Distance from the observer to the object center.
    pub distance: f64,
    /// Depth of the object center along the view axis.
    pub center_depth: f64,
    /// Bounding radius in kilometers.
    pub radius: f64,
    pub app_mag: f64,
    /// Projected disc diameter in pixels.
    pub disc_size: f64,
    pub opaque: bool,
    /// Near edge of the object's depth extent, filled by the cull pass.
    pub near_depth: f64,
    /// Far edge of the object's depth extent, filled by the cull pass.
    pub far_depth: f64,
}

impl RenderListEntry {
    /// Depth of the entry's nearest edge, the front-to-back sort key.
    pub fn near_edge(&self) -> f64 {
        self.center_depth - self.radius
    }
}

/// An orbit path scheduled for drawing.
#[derive(Clone)]
pub struct OrbitPathListEntry {
    pub orbit: SharedOrbit,
    /// Orientation of the orbit's reference frame at the frame time.
    pub frame_orientation: DQuat,
    /// Position of the orbit's center relative to the observer, km.
    pub origin: DVec3,
    /// Depth of the orbit center along the view axis.
    pub center_depth: f64,
    /// Bounding radius of the trajectory in kilometers.
    pub radius: f64,
    pub opacity: f32,
    pub color: [f32; 3],
    /// Draw only up to the current time.
    pub clamp_to_now: bool,
}

impl OrbitPathListEntry {
    pub fn near_edge(&self) -> f64 {
        self.center_depth - self.radius
    }

    pub fn far_edge(&self) -> f64 {
        self.center_depth + self.radius
    }
}

/// Sort entries nearest first by the depth of their near edge.
pub fn sort_render_list(entries: &mut [RenderListEntry]) {
    entries.sort_by(|a, b| a.near_edge().total_cmp(&b.near_edge()));
}

/// Sort orbit paths nearest first by the depth of their near edge.
pub fn sort_orbit_paths(paths: &mut [OrbitPathListEntry]) {
    paths.sort_by(|a, b| a.near_edge().total_cmp(&b.near_edge()));
}
