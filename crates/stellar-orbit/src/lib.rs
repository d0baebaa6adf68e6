//! Orbit path plotting: cached trajectory samples and the polyline
//! renderer that turns them into clipped, subdivided line vertices.
//!
//! Sampling an orbit model is far more expensive than drawing it, so
//! plots are cached across frames keyed by orbit identity. Periodic
//! orbits keep a sliding one-period window that follows simulation time;
//! aperiodic trajectories are sampled once over their valid range.

pub mod cache;
pub mod plot;
pub mod render;

pub use cache::{OrbitCache, PlotWindow, CULL_THRESHOLD, RETIRE_AGE, WINDOW_SLACK};
pub use plot::{OrbitPlot, PlotSample};
pub use render::{render_orbit_plot, OrbitRenderParams, PolylineSink};
