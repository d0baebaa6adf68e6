//! Orbit models: the trait the renderer samples trajectories through, plus
//! two simple concrete models used by tests and demos.
//!
//! Positions are in kilometers, expressed in the orbit's reference frame.
//! Sampling and position evaluation are f64 throughout; single precision
//! is insufficient at solar-system scale once the observer is far from the
//! frame origin.

use std::sync::Arc;

use glam::DVec3;

/// Identity of an orbit instance, used as the orbit-cache key.
///
/// Identity is handle equality, not value equality: two distinct orbit
/// objects are never the same cache entry even if numerically identical.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OrbitId(u64);

/// Shared handle to an orbit model.
pub type SharedOrbit = Arc<dyn Orbit + Send + Sync>;

/// Derive the cache identity of a shared orbit from its allocation.
pub fn orbit_id(orbit: &SharedOrbit) -> OrbitId {
    OrbitId(Arc::as_ptr(orbit) as *const () as usize as u64)
}

/// Receives time-ordered trajectory samples from [`Orbit::sample`].
pub trait OrbitSampleSink {
    fn sample(&mut self, t: f64, position: DVec3, velocity: DVec3);
}

impl<F: FnMut(f64, DVec3, DVec3)> OrbitSampleSink for F {
    fn sample(&mut self, t: f64, position: DVec3, velocity: DVec3) {
        self(t, position, velocity)
    }
}

/// A trajectory through space as a function of time.
pub trait Orbit {
    /// Position at time `t` (Julian days), in kilometers.
    fn position_at_time(&self, t: f64) -> DVec3;

    /// Velocity at time `t`, in kilometers per day. The default central
    /// difference is adequate for orbit-path plotting.
    fn velocity_at_time(&self, t: f64) -> DVec3 {
        let dt = 1.0 / 1440.0; // one minute
        (self.position_at_time(t + dt) - self.position_at_time(t - dt)) / (2.0 * dt)
    }

    fn is_periodic(&self) -> bool;

    /// Orbital period in days. For aperiodic trajectories this is a rough
    /// duration estimate used only to scale sample counts.
    fn period(&self) -> f64;

    /// Radius of a sphere, centered at the frame origin, guaranteed to
    /// contain the entire trajectory.
    fn bounding_radius(&self) -> f64;

    /// Time span over which the trajectory is defined, or `None` when it
    /// has no finite valid range. Periodic orbits are valid for all time.
    fn valid_range(&self) -> Option<(f64, f64)> {
        None
    }

    /// Emit `n_samples + 1` time-ordered samples covering `[start, end]`,
    /// endpoints included.
    fn sample(&self, start: f64, end: f64, n_samples: usize, sink: &mut dyn OrbitSampleSink) {
        let n = n_samples.max(1);
        for i in 0..=n {
            let t = start + (end - start) * (i as f64 / n as f64);
            sink.sample(t, self.position_at_time(t), self.velocity_at_time(t));
        }
    }
}

/// Circular orbit in the frame's XZ plane, the simplest periodic model.
#[derive(Clone, Debug)]
pub struct CircularOrbit {
    pub radius: f64,
    pub period: f64,
    /// Phase angle at t = 0, in radians.
    pub phase: f64,
}

impl CircularOrbit {
    pub fn new(radius: f64, period: f64) -> Self {
        Self {
            radius,
            period,
            phase: 0.0,
        }
    }
}

impl Orbit for CircularOrbit {
    fn position_at_time(&self, t: f64) -> DVec3 {
        let theta = self.phase + std::f64::consts::TAU * t / self.period;
        DVec3::new(self.radius * theta.cos(), 0.0, self.radius * theta.sin())
    }

    fn velocity_at_time(&self, t: f64) -> DVec3 {
        let theta = self.phase + std::f64::consts::TAU * t / self.period;
        let omega = std::f64::consts::TAU / self.period;
        DVec3::new(
            -self.radius * omega * theta.sin(),
            0.0,
            self.radius * omega * theta.cos(),
        )
    }

    fn is_periodic(&self) -> bool {
        true
    }

    fn period(&self) -> f64 {
        self.period
    }

    fn bounding_radius(&self) -> f64 {
        self.radius
    }
}

/// An aperiodic trajectory defined by a table of time-stamped positions,
/// linearly interpolated. Typical for spacecraft.
#[derive(Clone, Debug)]
pub struct SampledTrajectory {
    /// Strictly time-ordered (time, position) pairs.
    points: Vec<(f64, DVec3)>,
    bounding_radius: f64,
}

impl SampledTrajectory {
    /// Build from time-ordered points. Returns `None` for fewer than two
    /// points (no finite span to interpolate).
    pub fn new(points: Vec<(f64, DVec3)>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        debug_assert!(points.windows(2).all(|w| w[0].0 < w[1].0));
        let bounding_radius = points
            .iter()
            .map(|(_, p)| p.length())
            .fold(0.0, f64::max);
        Some(Self {
            points,
            bounding_radius,
        })
    }
}

impl Orbit for SampledTrajectory {
    fn position_at_time(&self, t: f64) -> DVec3 {
        let (first, last) = (self.points[0], self.points[self.points.len() - 1]);
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        let i = self.points.partition_point(|(pt, _)| *pt <= t);
        let (t0, p0) = self.points[i - 1];
        let (t1, p1) = self.points[i];
        let u = (t - t0) / (t1 - t0);
        p0.lerp(p1, u)
    }

    fn is_periodic(&self) -> bool {
        false
    }

    fn period(&self) -> f64 {
        let (a, b) = self.valid_range().unwrap_or((0.0, 0.0));
        b - a
    }

    fn bounding_radius(&self) -> f64 {
        self.bounding_radius
    }

    fn valid_range(&self) -> Option<(f64, f64)> {
        Some((self.points[0].0, self.points[self.points.len() - 1].0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_orbit_stays_on_circle() {
        let orbit = CircularOrbit::new(1000.0, 10.0);
        for i in 0..20 {
            let p = orbit.position_at_time(i as f64 * 0.7);
            assert!((p.length() - 1000.0).abs() < 1e-9);
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn test_circular_orbit_period_closes() {
        let orbit = CircularOrbit::new(1000.0, 10.0);
        let p0 = orbit.position_at_time(3.0);
        let p1 = orbit.position_at_time(13.0);
        assert!((p0 - p1).length() < 1e-6);
    }

    #[test]
    fn test_default_velocity_matches_analytic() {
        let orbit = CircularOrbit::new(1000.0, 10.0);
        let analytic = orbit.velocity_at_time(2.5);
        // Route through the default central difference.
        struct Wrap<'a>(&'a CircularOrbit);
        impl Orbit for Wrap<'_> {
            fn position_at_time(&self, t: f64) -> DVec3 {
                self.0.position_at_time(t)
            }
            fn is_periodic(&self) -> bool {
                true
            }
            fn period(&self) -> f64 {
                self.0.period
            }
            fn bounding_radius(&self) -> f64 {
                self.0.radius
            }
        }
        let numeric = Wrap(&orbit).velocity_at_time(2.5);
        assert!((analytic - numeric).length() / analytic.length() < 1e-6);
    }

    #[test]
    fn test_sample_covers_endpoints_in_order() {
        let orbit = CircularOrbit::new(1.0, 100.0);
        let mut times = Vec::new();
        orbit.sample(-50.0, 50.0, 10, &mut |t: f64, _p: DVec3, _v: DVec3| {
            times.push(t)
        });
        assert_eq!(times.len(), 11);
        assert_eq!(times[0], -50.0);
        assert_eq!(*times.last().unwrap(), 50.0);
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_trajectory_interpolates_and_clamps() {
        let traj = SampledTrajectory::new(vec![
            (0.0, DVec3::ZERO),
            (1.0, DVec3::new(10.0, 0.0, 0.0)),
        ])
        .unwrap();
        assert_eq!(traj.position_at_time(0.5), DVec3::new(5.0, 0.0, 0.0));
        assert_eq!(traj.position_at_time(-1.0), DVec3::ZERO);
        assert_eq!(traj.position_at_time(2.0), DVec3::new(10.0, 0.0, 0.0));
        assert_eq!(traj.valid_range(), Some((0.0, 1.0)));
    }

    #[test]
    fn test_trajectory_requires_two_points() {
        assert!(SampledTrajectory::new(vec![(0.0, DVec3::ZERO)]).is_none());
    }

    #[test]
    fn test_orbit_identity_is_per_allocation() {
        let a: SharedOrbit = Arc::new(CircularOrbit::new(1.0, 1.0));
        let b: SharedOrbit = Arc::new(CircularOrbit::new(1.0, 1.0));
        assert_ne!(orbit_id(&a), orbit_id(&b), "identical values, distinct identity");
        assert_eq!(orbit_id(&a), orbit_id(&a.clone()));
    }
}
