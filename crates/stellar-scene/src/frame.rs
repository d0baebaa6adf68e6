//! Reference frames, timelines, and the per-system frame tree.
//!
//! Bodies are stored in an arena keyed by [`BodyKey`]; parent/child
//! structure lives in [`FrameTree`] nodes so that traversal can walk the
//! hierarchy with shared borrows of the arena.

use glam::{DQuat, DVec3};
use slotmap::{SlotMap, new_key_type};

use crate::body::Body;
use crate::orbit::SharedOrbit;
use crate::star::Star;

new_key_type! {
    /// Arena key for a body within a [`StarSystem`].
    pub struct BodyKey;
}

/// Orientation of a reference frame as a function of time.
///
/// The returned rotation maps frame coordinates into the parent (system)
/// coordinate space.
pub trait ReferenceFrame: Send + Sync {
    fn orientation_at(&self, t: f64) -> DQuat;
}

/// The fixed J2000 ecliptic frame; the identity orientation in system space.
#[derive(Clone, Copy, Debug, Default)]
pub struct J2000EclipticFrame;

impl ReferenceFrame for J2000EclipticFrame {
    fn orientation_at(&self, _t: f64) -> DQuat {
        DQuat::IDENTITY
    }
}

/// A frame rotated by a fixed quaternion from the ecliptic, e.g. a body's
/// equatorial frame.
#[derive(Clone, Copy, Debug)]
pub struct RotatedFrame {
    pub rotation: DQuat,
}

impl ReferenceFrame for RotatedFrame {
    fn orientation_at(&self, _t: f64) -> DQuat {
        self.rotation
    }
}

/// One segment of a body's timeline: which orbit it follows, in which
/// frame, around which center, over `[start_time, end_time)`.
pub struct TimelinePhase {
    pub orbit: SharedOrbit,
    pub frame: std::sync::Arc<dyn ReferenceFrame>,
    /// Center body the orbit is relative to; `None` means the system star.
    pub center: Option<BodyKey>,
    pub start_time: f64,
    pub end_time: f64,
}

impl TimelinePhase {
    pub fn includes(&self, t: f64) -> bool {
        t >= self.start_time && t < self.end_time
    }
}

/// Children of a body (or of the star) plus the aggregate bounds the
/// traversal uses to cull whole subtrees at once.
#[derive(Default)]
pub struct FrameTree {
    pub children: Vec<BodyKey>,
    /// Radius of a sphere around the tree's center containing every child
    /// orbit and body.
    pub bounding_sphere_radius: f64,
    /// Largest body radius anywhere in the subtree.
    pub max_child_radius: f64,
    /// True if any body in the subtree reflects enough light to
    /// illuminate its neighbors.
    pub contains_secondary_illuminators: bool,
}

impl FrameTree {
    /// Recompute aggregate bounds from the children's current timelines
    /// and their own subtrees. Call after mutating the hierarchy.
    pub fn recompute_bounds(bodies: &mut SlotMap<BodyKey, Body>, keys: &[BodyKey]) -> FrameTree {
        let mut tree = FrameTree {
            children: keys.to_vec(),
            ..FrameTree::default()
        };
        for &key in keys {
            // Recurse before reading the child's aggregates.
            let child_tree = {
                let child_keys = match &bodies[key].subtree {
                    Some(sub) if !sub.children.is_empty() => sub.children.clone(),
                    _ => Vec::new(),
                };
                if child_keys.is_empty() {
                    None
                } else {
                    Some(FrameTree::recompute_bounds(bodies, &child_keys))
                }
            };
            if let Some(sub) = child_tree {
                bodies[key].subtree = Some(sub);
            }

            let body = &bodies[key];
            let orbit_extent = body
                .timeline
                .iter()
                .map(|phase| phase.orbit.bounding_radius())
                .fold(0.0, f64::max);
            let subtree_extent = body
                .subtree
                .as_ref()
                .map(|s| s.bounding_sphere_radius)
                .unwrap_or(0.0);
            tree.bounding_sphere_radius = tree
                .bounding_sphere_radius
                .max(orbit_extent + subtree_extent.max(body.radius));
            tree.max_child_radius = tree.max_child_radius.max(
                body.radius.max(
                    body.subtree
                        .as_ref()
                        .map(|s| s.max_child_radius)
                        .unwrap_or(0.0),
                ),
            );
            tree.contains_secondary_illuminators |= body.secondary_illuminator
                || body
                    .subtree
                    .as_ref()
                    .map(|s| s.contains_secondary_illuminators)
                    .unwrap_or(false);
        }
        tree
    }
}

/// A star and its planetary system.
pub struct StarSystem {
    pub star: Star,
    pub bodies: SlotMap<BodyKey, Body>,
    /// Top-level tree: bodies orbiting the star directly.
    pub tree: FrameTree,
}

impl StarSystem {
    pub fn new(star: Star) -> Self {
        Self {
            star,
            bodies: SlotMap::with_key(),
            tree: FrameTree::default(),
        }
    }

    /// Insert a body as a child of `parent` (or of the star when `None`)
    /// and record it in the corresponding tree node. Bounds are not
    /// updated; call [`StarSystem::recompute_bounds`] when done building.
    pub fn add_body(&mut self, body: Body, parent: Option<BodyKey>) -> BodyKey {
        let key = self.bodies.insert(body);
        match parent {
            None => self.tree.children.push(key),
            Some(p) => self
                .bodies[p]
                .subtree
                .get_or_insert_with(FrameTree::default)
                .children
                .push(key),
        }
        key
    }

    pub fn recompute_bounds(&mut self) {
        let keys = self.tree.children.clone();
        self.tree = FrameTree::recompute_bounds(&mut self.bodies, &keys);
    }

    /// Active timeline phase of `body` at time `t`, if any.
    pub fn active_phase(&self, body: BodyKey, t: f64) -> Option<&TimelinePhase> {
        self.bodies[body].timeline.iter().find(|p| p.includes(t))
    }
}

/// Position of a body relative to the system star at time `t`, in
/// kilometers, accumulated up the center chain.
pub fn astrocentric_position(system: &StarSystem, body: BodyKey, t: f64) -> DVec3 {
    let mut pos = DVec3::ZERO;
    let mut current = Some(body);
    while let Some(key) = current {
        match system.active_phase(key, t) {
            Some(phase) => {
                pos += phase.frame.orientation_at(t).conjugate() * phase.orbit.position_at_time(t);
                current = phase.center;
            }
            None => break,
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Body, BodyClass};
    use crate::orbit::CircularOrbit;
    use std::sync::Arc;

    fn phase(radius: f64, center: Option<BodyKey>) -> TimelinePhase {
        TimelinePhase {
            orbit: Arc::new(CircularOrbit::new(radius, 100.0)),
            frame: Arc::new(J2000EclipticFrame),
            center,
            start_time: f64::NEG_INFINITY,
            end_time: f64::INFINITY,
        }
    }

    #[test]
    fn test_astrocentric_position_chains_through_center() {
        let mut system = StarSystem::new(Star::test_star());
        let planet_key = system.add_body(Body::new("planet", 6000.0, BodyClass::Planet), None);
        system.bodies[planet_key].timeline.push(phase(1.0e8, None));

        let moon = Body::new("moon", 1700.0, BodyClass::Moon);
        let moon_key = system.add_body(moon, Some(planet_key));
        system.bodies[moon_key]
            .timeline
            .push(phase(4.0e5, Some(planet_key)));

        let planet_pos = astrocentric_position(&system, planet_key, 0.0);
        let moon_pos = astrocentric_position(&system, moon_key, 0.0);
        assert!((planet_pos.length() - 1.0e8).abs() < 1.0);
        assert!(((moon_pos - planet_pos).length() - 4.0e5).abs() < 1.0);
    }

    #[test]
    fn test_recompute_bounds_covers_moon_orbit() {
        let mut system = StarSystem::new(Star::test_star());
        let planet_key = system.add_body(Body::new("planet", 6000.0, BodyClass::Planet), None);
        system.bodies[planet_key].timeline.push(phase(1.0e8, None));
        let moon_key = system.add_body(Body::new("moon", 1700.0, BodyClass::Moon), Some(planet_key));
        system.bodies[moon_key]
            .timeline
            .push(phase(4.0e5, Some(planet_key)));
        system.recompute_bounds();

        assert!(
            system.tree.bounding_sphere_radius >= 1.0e8 + 4.0e5,
            "bounding sphere {} must contain planet orbit plus moon orbit",
            system.tree.bounding_sphere_radius
        );
        assert_eq!(system.tree.max_child_radius, 6000.0);
    }

    #[test]
    fn test_secondary_illuminator_flag_propagates() {
        let mut system = StarSystem::new(Star::test_star());
        let planet_key = system.add_body(Body::new("planet", 6000.0, BodyClass::Planet), None);
        system.bodies[planet_key].timeline.push(phase(1.0e8, None));
        let mut moon = Body::new("moon", 1700.0, BodyClass::Moon);
        moon.secondary_illuminator = true;
        let moon_key = system.add_body(moon, Some(planet_key));
        system.bodies[moon_key]
            .timeline
            .push(phase(4.0e5, Some(planet_key)));
        system.recompute_bounds();
        assert!(system.tree.contains_secondary_illuminators);
    }

    #[test]
    fn test_timeline_phase_selection() {
        let mut system = StarSystem::new(Star::test_star());
        let key = system.add_body(Body::new("probe", 2.0, BodyClass::Spacecraft), None);
        let mut early = phase(1.0e6, None);
        early.start_time = 0.0;
        early.end_time = 10.0;
        let mut late = phase(2.0e6, None);
        late.start_time = 10.0;
        late.end_time = 20.0;
        system.bodies[key].timeline.push(early);
        system.bodies[key].timeline.push(late);

        assert!((astrocentric_position(&system, key, 5.0).length() - 1.0e6).abs() < 1.0);
        assert!((astrocentric_position(&system, key, 15.0).length() - 2.0e6).abs() < 1.0);
        assert_eq!(astrocentric_position(&system, key, 25.0), DVec3::ZERO);
    }
}
