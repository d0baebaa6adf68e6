//! Depth buffer partitioning.
//!
//! A single depth buffer cannot represent far/near ratios much past
//! 10^6 without precision collapse, and a scene can hold objects from
//! meters to light-years away. The partitioner slices the frame into
//! disjoint [near, far] intervals, each rendered with its own projection
//! and its own slice of the hardware depth range.
//!
//! Depths here are positive distances along the view axis, in
//! kilometers. Intervals are produced in construction order, farthest
//! first; consecutive intervals touch or overlap, never leave gaps.

use log::trace;

use crate::annotation::AnnotationLists;
use crate::list::{OrbitPathListEntry, RenderListEntry};

/// Near plane never drops below this, in kilometers (0.1 m).
pub const MIN_NEAR_PLANE_DISTANCE: f64 = 1.0e-4;

/// Largest far/near ratio a single interval may span.
pub const MAX_FAR_NEAR_RATIO: f64 = 2.0e6;

/// Far bound used when nothing at all passed culling, in kilometers.
const DEFAULT_FAR_DISTANCE: f64 = 1.0e9;

/// Entries below this disc size do not shape intervals; they are
/// assigned to whichever interval contains them.
const MIN_PARTITION_DISC_SIZE: f64 = 1.0;

/// One depth interval, with its slice of the normalized depth range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthInterval {
    /// Near clip distance, positive kilometers.
    pub near: f64,
    /// Far clip distance, positive kilometers.
    pub far: f64,
    /// Normalized depth-buffer slice `(lower, upper)` for this interval.
    pub depth_range: (f32, f32),
}

impl DepthInterval {
    /// Whether an entry's whole depth extent lies in this interval.
    /// After the merge rule, true for exactly one interval per entry
    /// that shaped the partition.
    pub fn contains_entry(&self, entry: &RenderListEntry) -> bool {
        entry.near_depth >= self.near && entry.far_depth <= self.far
    }

    /// Whether any part of the entry's depth extent overlaps this
    /// interval. Used for sub-pixel entries that did not shape it.
    pub fn overlaps_entry(&self, entry: &RenderListEntry) -> bool {
        entry.near_depth < self.far && entry.far_depth > self.near
    }

    /// Whether an orbit path overlaps this interval.
    pub fn overlaps_orbit(&self, path: &OrbitPathListEntry) -> bool {
        path.near_edge() < self.far && path.far_edge() > self.near
    }

    /// Whether a depth-sorted annotation belongs to this interval.
    pub fn contains_depth(&self, depth: f64) -> bool {
        depth > self.near && depth <= self.far
    }
}

/// Build the frame's depth intervals.
///
/// `entries` must already be sorted nearest first by near edge, with
/// near/far extents filled in by the cull pass. Orbit paths and
/// depth-sorted annotations widen the result so they are never clipped.
pub fn partition_depth(
    entries: &[RenderListEntry],
    orbit_paths: &[OrbitPathListEntry],
    annotations: &AnnotationLists,
) -> Vec<DepthInterval> {
    let mut intervals: Vec<DepthInterval> = Vec::new();
    // Near bound of the nearest interval built so far.
    let mut frontier = f64::INFINITY;

    // Farthest to nearest over entries large enough to need their own
    // depth precision.
    for entry in entries
        .iter()
        .rev()
        .filter(|e| e.disc_size > MIN_PARTITION_DISC_SIZE)
    {
        let near = entry.near_depth.max(MIN_NEAR_PLANE_DISTANCE);
        // The cull pass can produce inverted spans for objects
        // surrounding the camera; correct them here.
        let far = entry.far_depth.max(near);

        match intervals.last_mut() {
            None => {
                intervals.push(DepthInterval {
                    near,
                    far,
                    depth_range: (0.0, 1.0),
                });
                frontier = near;
            }
            Some(last) => {
                if far <= last.near {
                    // Disjoint: bridge the gap so nothing in it is lost,
                    // then open the new interval.
                    if far < frontier {
                        intervals.push(DepthInterval {
                            near: far,
                            far: frontier,
                            depth_range: (0.0, 1.0),
                        });
                    }
                    intervals.push(DepthInterval {
                        near,
                        far,
                        depth_range: (0.0, 1.0),
                    });
                    frontier = near;
                } else {
                    // Overlap: grow the current interval, never split an
                    // object across two intervals.
                    last.near = last.near.min(near);
                    last.far = last.far.max(far);
                    frontier = last.near;
                }
            }
        }
    }

    // Nearest depth any orbit path or annotation needs.
    let mut z_nearest = frontier;
    for path in orbit_paths {
        z_nearest = z_nearest.min(path.near_edge().max(MIN_NEAR_PLANE_DISTANCE));
    }
    if let Some(depth) = annotations.nearest_depth() {
        z_nearest = z_nearest.min(depth * 0.999);
    }

    if intervals.is_empty() {
        // Nothing with a disc passed culling. Orbits or annotations may
        // still need a usable interval; otherwise fall back to a
        // default span so point-like content has somewhere to draw.
        let far = orbit_paths
            .iter()
            .map(OrbitPathListEntry::far_edge)
            .fold(DEFAULT_FAR_DISTANCE, f64::max);
        let near = if z_nearest.is_finite() {
            z_nearest.max(MIN_NEAR_PLANE_DISTANCE)
        } else {
            MIN_NEAR_PLANE_DISTANCE
        };
        return vec![DepthInterval {
            near,
            far,
            depth_range: (0.0, 1.0),
        }];
    }

    // Frontmost fill: everything closer than the first real object.
    if z_nearest >= frontier {
        z_nearest = 0.0;
    }
    let mut closest = z_nearest.min(frontier);
    if closest <= 0.0 {
        closest = frontier * 0.01;
    }
    closest = closest.max(MIN_NEAR_PLANE_DISTANCE);
    if closest < frontier {
        intervals.push(DepthInterval {
            near: closest,
            far: frontier,
            depth_range: (0.0, 1.0),
        });
    }

    // The farthest interval also holds orbits beyond the farthest body.
    if let Some(orbit_far) = orbit_paths
        .iter()
        .map(OrbitPathListEntry::far_edge)
        .max_by(f64::total_cmp)
    {
        let farthest = &mut intervals[0];
        farthest.far = farthest.far.max(orbit_far);
    }

    let n = intervals.len();
    for (i, interval) in intervals.iter_mut().enumerate() {
        interval.depth_range = (
            1.0 - (i as f32 + 1.0) / n as f32,
            1.0 - i as f32 / n as f32,
        );
    }
    trace!("depth partition: {n} intervals, frontier {frontier:.3}");
    intervals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::{sort_render_list, RenderableKind};
    use glam::DVec3;
    use stellar_scene::StarId;

    fn entry(center_depth: f64, radius: f64, disc_size: f64) -> RenderListEntry {
        RenderListEntry {
            kind: RenderableKind::Star { id: StarId(0) },
            position: DVec3::new(0.0, 0.0, -center_depth),
            distance: center_depth,
            center_depth,
            radius,
            app_mag: 0.0,
            disc_size,
            opaque: true,
            near_depth: (center_depth - radius).max(MIN_NEAR_PLANE_DISTANCE),
            far_depth: center_depth + radius,
        }
    }

    fn sorted(mut entries: Vec<RenderListEntry>) -> Vec<RenderListEntry> {
        sort_render_list(&mut entries);
        entries
    }

    #[test]
    fn test_three_distant_entries_make_real_and_fill_intervals() {
        let entries = sorted(vec![
            entry(1000.0, 1.0, 5.0),
            entry(10.0, 0.5, 5.0),
            entry(1.0, 0.05, 5.0),
        ]);
        let intervals = partition_depth(&entries, &[], &AnnotationLists::default());

        // Each entry fits wholly inside exactly one interval.
        for e in &entries {
            let holders = intervals.iter().filter(|i| i.contains_entry(e)).count();
            assert_eq!(holders, 1, "entry at {} held by {holders} intervals", e.center_depth);
        }
        // The three real intervals are disjoint.
        let real: Vec<&DepthInterval> = intervals
            .iter()
            .filter(|i| entries.iter().any(|e| i.contains_entry(e)))
            .collect();
        assert_eq!(real.len(), 3);
        // The frontmost interval reaches closer than the nearest entry.
        let front = intervals.last().unwrap();
        assert!(front.near < entries[0].near_depth);
        assert!((front.far - entries[0].near_depth).abs() < 1e-12);
    }

    #[test]
    fn test_no_gaps_between_consecutive_intervals() {
        let entries = sorted(vec![
            entry(2.0e6, 6000.0, 30.0),
            entry(5.0e4, 2000.0, 80.0),
            entry(300.0, 10.0, 400.0),
        ]);
        let intervals = partition_depth(&entries, &[], &AnnotationLists::default());
        for pair in intervals.windows(2) {
            assert!(
                pair[0].near >= pair[1].far - 1e-9,
                "gap between intervals {pair:?}"
            );
        }
    }

    #[test]
    fn test_overlapping_entries_merge() {
        // A moon close to its planet shares the planet's interval.
        let entries = sorted(vec![entry(1.0e5, 6000.0, 50.0), entry(9.6e4, 1700.0, 12.0)]);
        let intervals = partition_depth(&entries, &[], &AnnotationLists::default());
        let real: Vec<&DepthInterval> = intervals
            .iter()
            .filter(|i| entries.iter().any(|e| i.contains_entry(e)))
            .collect();
        assert_eq!(real.len(), 1, "overlapping bodies must share one interval");
        assert!(real[0].contains_entry(&entries[0]));
        assert!(real[0].contains_entry(&entries[1]));
    }

    #[test]
    fn test_subpixel_entries_do_not_shape_intervals() {
        let entries = sorted(vec![entry(1.0e6, 100.0, 20.0), entry(5.0, 0.001, 0.2)]);
        let intervals = partition_depth(&entries, &[], &AnnotationLists::default());
        // Only the resolvable body and the frontmost fill.
        assert_eq!(intervals.len(), 2);
        assert!(intervals[0].contains_entry(&entries[1]));
    }

    #[test]
    fn test_orbit_paths_extend_partition_both_ways() {
        let entries = sorted(vec![entry(1.0e5, 6000.0, 50.0)]);
        let paths = vec![
            orbit_path(5.0e5, 3.0e5),
            orbit_path(2.0e4, 1.9e4),
        ];
        let intervals = partition_depth(&entries, &paths, &AnnotationLists::default());
        let farthest = intervals.first().unwrap();
        assert!(
            farthest.far >= 8.0e5,
            "farthest interval must reach the farthest orbit, got {}",
            farthest.far
        );
        let front = intervals.last().unwrap();
        assert!(
            front.near <= 1.0e3,
            "front interval must reach the nearest orbit, got {}",
            front.near
        );
        assert!(intervals.iter().any(|i| i.overlaps_orbit(&paths[0])));
        assert!(intervals.iter().any(|i| i.overlaps_orbit(&paths[1])));
    }

    #[test]
    fn test_empty_scene_gets_default_interval() {
        let intervals = partition_depth(&[], &[], &AnnotationLists::default());
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].near, MIN_NEAR_PLANE_DISTANCE);
        assert_eq!(intervals[0].far, 1.0e9);
        assert_eq!(intervals[0].depth_range, (0.0, 1.0));
    }

    #[test]
    fn test_depth_ranges_tile_far_to_near() {
        let entries = sorted(vec![
            entry(1000.0, 1.0, 5.0),
            entry(10.0, 0.5, 5.0),
        ]);
        let intervals = partition_depth(&entries, &[], &AnnotationLists::default());
        let n = intervals.len() as f32;
        assert_eq!(intervals[0].depth_range, (1.0 - 1.0 / n, 1.0));
        assert_eq!(
            intervals.last().unwrap().depth_range.0,
            0.0,
            "nearest interval starts at depth 0"
        );
        for pair in intervals.windows(2) {
            assert_eq!(pair[0].depth_range.0, pair[1].depth_range.1);
        }
    }

    #[test]
    fn test_merged_interval_holds_every_shaping_entry() {
        // One entry spanning [1e3, 1e9] absorbs a nearby [1, 1100] span;
        // the merged interval must keep containing both, and the
        // partition must stay gap-free in front of it.
        let entries = sorted(vec![
            entry(5.000005e8, 4.999995e8, 40.0),
            entry(550.5, 549.5, 8.0),
        ]);
        let intervals = partition_depth(&entries, &[], &AnnotationLists::default());
        for e in &entries {
            let holders = intervals.iter().filter(|i| i.contains_entry(e)).count();
            assert_eq!(
                holders, 1,
                "entry [{}, {}] held by {holders} intervals",
                e.near_depth, e.far_depth
            );
        }
        for pair in intervals.windows(2) {
            assert!(
                pair[0].near <= pair[1].far,
                "gap between intervals {pair:?}"
            );
        }
    }

    fn orbit_path(center_depth: f64, radius: f64) -> OrbitPathListEntry {
        use std::sync::Arc;
        use stellar_scene::CircularOrbit;
        OrbitPathListEntry {
            orbit: Arc::new(CircularOrbit::new(radius, 100.0)),
            frame_orientation: glam::DQuat::IDENTITY,
            origin: DVec3::new(0.0, 0.0, -center_depth),
            center_depth,
            radius,
            opacity: 1.0,
            color: [0.5, 0.5, 0.8],
            clamp_to_now: false,
        }
    }
}
