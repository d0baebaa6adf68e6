//! Rendering core: per-frame scene assembly and depth partitioning.
//!
//! The pipeline runs once per frame, driven by [`Renderer::draw`]:
//! magnitude limits, light sources, scene-graph traversal into render
//! and orbit-path lists, point-star processing, a cull pass that fills
//! per-entry depth extents, depth partitioning, and finally one backend
//! pass per depth interval from farthest to nearest. Everything
//! device-specific sits behind the [`RenderBackend`] trait; this crate
//! computes what to draw and in which order, never how.

mod annotation;
mod backend;
mod driver;
mod flags;
mod list;
mod partition;
mod photometry;
mod stars;
mod traversal;

pub use annotation::{Annotation, AnnotationContent, AnnotationLists, MarkerShape};
pub use backend::{
    BackendCall, PolylineBuffer, PolylineVertex, ProjectionParams, RecordingBackend,
    RenderBackend, Viewport,
};
pub use driver::{Marker, Observer, Renderer, Selection};
pub use flags::{ClassFilters, RenderFlags};
pub use list::{
    OrbitPathListEntry, RenderListEntry, RenderableKind, sort_orbit_paths, sort_render_list,
};
pub use partition::{DepthInterval, MAX_FAR_NEAR_RATIO, MIN_NEAR_PLANE_DISTANCE, partition_depth};
pub use photometry::{
    BASELINE_FOV_DEG, BrightnessScale, MagnitudeLimits, auto_magnitude_limits, size_fade,
    sky_brightness_attenuation,
};
pub use stars::{
    PointStarList, PointStarProcessor, SOLAR_SYSTEM_MAX_DISTANCE_LY, StarGlare, StarPoint,
};
pub use traversal::{
    TraversalLists, ViewContext, add_star_orbit, build_label_lists, build_orbit_lists,
    build_render_lists, label_class_color, orbit_class_color,
};
