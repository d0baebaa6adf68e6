//! Catalog access: the renderer's view of the universe.
//!
//! The frame driver does not own star or deep-sky catalogs; it queries
//! them through [`Universe`] and receives visible objects through visitor
//! callbacks, which keeps catalog storage and spatial indexing out of the
//! rendering crates.

use glam::DVec3;

use crate::frame::StarSystem;
use crate::star::{Star, StarId};

/// A nebula, galaxy, or star cluster.
pub struct DeepSkyObject {
    pub name: String,
    /// Position in light-years.
    pub position_ly: DVec3,
    /// Bounding radius in light-years.
    pub radius_ly: f64,
    pub absolute_magnitude: f64,
    pub visible: bool,
}

/// Receives stars that pass the catalog's visibility filter.
pub trait StarVisitor {
    fn process(&mut self, star: &Star, distance_ly: f64, app_mag: f64);
}

/// Receives deep-sky objects that pass the catalog's visibility filter.
pub trait DsoVisitor {
    fn process(&mut self, dso: &DeepSkyObject, distance_ly: f64, app_mag: f64);
}

/// Catalog interface the frame driver renders from.
pub trait Universe {
    /// Stars within `radius_ly` of `observer_ly`, nearest first. These
    /// are candidates for planetary-system traversal.
    fn near_stars(&self, observer_ly: DVec3, radius_ly: f64) -> Vec<StarId>;

    fn star(&self, id: StarId) -> Option<&Star>;

    /// Planetary system of a star, if it has one.
    fn system(&self, id: StarId) -> Option<&StarSystem>;

    /// Visit every visible star no fainter than `faintest_mag` from
    /// `observer_ly`.
    fn visit_visible_stars(
        &self,
        observer_ly: DVec3,
        faintest_mag: f64,
        t: f64,
        visitor: &mut dyn StarVisitor,
    );

    /// Visit every visible deep-sky object no fainter than `faintest_mag`.
    fn visit_visible_dsos(
        &self,
        observer_ly: DVec3,
        faintest_mag: f64,
        visitor: &mut dyn DsoVisitor,
    );
}

/// Flat in-memory catalog. Linear scans are fine for the catalog sizes
/// tests and demos use; a production catalog would sit behind an octree.
#[derive(Default)]
pub struct SimpleUniverse {
    pub systems: Vec<StarSystem>,
    pub dsos: Vec<DeepSkyObject>,
}

impl SimpleUniverse {
    pub fn add_system(&mut self, system: StarSystem) -> StarId {
        let id = system.star.id;
        debug_assert!(
            self.systems.iter().all(|s| s.star.id != id),
            "duplicate star id {id:?}"
        );
        self.systems.push(system);
        id
    }
}

impl Universe for SimpleUniverse {
    fn near_stars(&self, observer_ly: DVec3, radius_ly: f64) -> Vec<StarId> {
        let mut near: Vec<(f64, StarId)> = self
            .systems
            .iter()
            .filter_map(|s| {
                let d = (s.star.position_ly - observer_ly).length();
                (d <= radius_ly).then_some((d, s.star.id))
            })
            .collect();
        near.sort_by(|a, b| a.0.total_cmp(&b.0));
        near.into_iter().map(|(_, id)| id).collect()
    }

    fn star(&self, id: StarId) -> Option<&Star> {
        self.system(id).map(|s| &s.star)
    }

    fn system(&self, id: StarId) -> Option<&StarSystem> {
        self.systems.iter().find(|s| s.star.id == id)
    }

    fn visit_visible_stars(
        &self,
        observer_ly: DVec3,
        faintest_mag: f64,
        t: f64,
        visitor: &mut dyn StarVisitor,
    ) {
        for system in &self.systems {
            let star = &system.star;
            if !star.visible {
                continue;
            }
            let distance_ly = (star.position_at(t) - observer_ly).length();
            let app_mag = star.apparent_magnitude(distance_ly.max(1e-12));
            if app_mag <= faintest_mag {
                visitor.process(star, distance_ly, app_mag);
            }
        }
    }

    fn visit_visible_dsos(
        &self,
        observer_ly: DVec3,
        faintest_mag: f64,
        visitor: &mut dyn DsoVisitor,
    ) {
        for dso in &self.dsos {
            if !dso.visible {
                continue;
            }
            let distance_ly = (dso.position_ly - observer_ly).length();
            let app_mag = stellar_math::abs_to_app_mag(
                dso.absolute_magnitude,
                distance_ly.max(1e-12),
            );
            if app_mag <= faintest_mag {
                visitor.process(dso, distance_ly, app_mag);
            }
        }
    }
}
