//! Scene-graph data model for the render core: frame trees of orbiting
//! bodies rooted at stars, orbit models, and the catalog query interfaces
//! the renderer consumes.
//!
//! The hierarchy is an arena of bodies with stable keys ([`slotmap`]);
//! parent and orbit-center relations are keys, never owning references, so
//! the deep frame-tree nesting of a real planetary system cannot form
//! ownership cycles.

mod body;
mod catalog;
mod frame;
mod orbit;
mod star;

pub use body::{
    Atmosphere, Body, BodyClass, BodyClassMask, GeometryDesc, OrbitVisibility, ReferenceMark,
    RingSystem, Surface,
};
pub use catalog::{DeepSkyObject, DsoVisitor, SimpleUniverse, StarVisitor, Universe};
pub use frame::{
    BodyKey, FrameTree, J2000EclipticFrame, ReferenceFrame, RotatedFrame, StarSystem,
    TimelinePhase, astrocentric_position,
};
pub use orbit::{
    CircularOrbit, Orbit, OrbitId, OrbitSampleSink, SampledTrajectory, SharedOrbit, orbit_id,
};
pub use star::{Star, StarId};
