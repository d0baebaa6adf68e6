//! Frame-to-frame cache of orbit plots.

use log::{debug, trace};
use rustc_hash::FxHashMap;

use stellar_scene::{orbit_id, OrbitId, SharedOrbit};

use crate::plot::{AppendSink, OrbitPlot};

/// Eviction is considered only once the cache holds this many plots.
pub const CULL_THRESHOLD: usize = 200;

/// Plots unused for this many frames are evicted.
pub const RETIRE_AGE: u64 = 16;

/// Extra span sampled past the display window when it slides, as a
/// fraction of the period. Small subsequent slides then land inside the
/// cached span and need no resampling at all.
pub const WINDOW_SLACK: f64 = 0.2;

/// Sliding-window parameters for periodic orbit plots.
#[derive(Clone, Copy, Debug)]
pub struct PlotWindow {
    /// Samples per full period.
    pub base_sample_count: usize,
    /// How far past the current time the window extends, as a fraction
    /// of the period.
    pub window_end: f64,
    /// Window length in periods.
    pub periods_shown: f64,
}

impl Default for PlotWindow {
    fn default() -> Self {
        Self {
            base_sample_count: 100,
            window_end: 0.5,
            periods_shown: 1.0,
        }
    }
}

struct CachedPlot {
    plot: OrbitPlot,
    last_used: u64,
}

/// Cache of orbit plots keyed by orbit identity.
///
/// Plots for periodic orbits are updated incrementally as their window
/// slides; samples leaving the window are dropped and only the newly
/// exposed span is resampled.
#[derive(Default)]
pub struct OrbitCache {
    entries: FxHashMap<OrbitId, CachedPlot>,
    last_cull_frame: u64,
}

impl OrbitCache {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop the cached plot of an orbit whose definition changed.
    pub fn invalidate(&mut self, id: OrbitId) {
        self.entries.remove(&id);
    }

    /// Get the plot for `orbit` at time `t`, sampling or updating as
    /// needed. Returns `None` for an aperiodic orbit with an empty valid
    /// range.
    ///
    /// `frame_number` stamps the entry for eviction; pass the frame
    /// driver's running frame count.
    pub fn get_or_update(
        &mut self,
        orbit: &SharedOrbit,
        t: f64,
        window: &PlotWindow,
        frame_number: u64,
    ) -> Option<&OrbitPlot> {
        self.cull(frame_number);

        let id = orbit_id(orbit);
        let entry = match self.entries.entry(id) {
            std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::hash_map::Entry::Vacant(v) => {
                let plot = Self::sample_fresh(orbit, t, window)?;
                trace!(
                    "orbit cache: new plot {:?}, {} samples",
                    id,
                    plot.samples().len()
                );
                v.insert(CachedPlot {
                    plot,
                    last_used: frame_number,
                })
            }
        };
        entry.last_used = frame_number;
        if orbit.is_periodic() {
            Self::slide_window(&mut entry.plot, orbit, t, window);
        }
        Some(&entry.plot)
    }

    fn sample_fresh(orbit: &SharedOrbit, t: f64, window: &PlotWindow) -> Option<OrbitPlot> {
        let mut plot = OrbitPlot::default();
        if orbit.is_periodic() {
            let period = orbit.period();
            let end = t + period * window.window_end;
            let start = end - period * window.periods_shown;
            orbit.sample(
                start,
                end,
                window.base_sample_count,
                &mut AppendSink::new(&mut plot, false),
            );
        } else {
            let (start, end) = orbit.valid_range()?;
            if end <= start {
                return None;
            }
            let span = end - start;
            let n_samples = ((span * 100.0) as usize).clamp(100, 1000);
            orbit.sample(start, end, n_samples, &mut AppendSink::new(&mut plot, false));
        }
        Some(plot)
    }

    /// Move a periodic plot's window to track the current time.
    ///
    /// The refreshed side overshoots the display window by
    /// [`WINDOW_SLACK`] of a period, so a plot whose cached span still
    /// covers the display window is left untouched.
    fn slide_window(plot: &mut OrbitPlot, orbit: &SharedOrbit, t: f64, window: &PlotWindow) {
        let period = orbit.period();
        let window_end = t + period * window.window_end;
        let window_start = window_end - period * window.periods_shown;
        let slack = period * WINDOW_SLACK;
        let (Some(cur_start), Some(cur_end)) = (plot.start_time(), plot.end_time()) else {
            return;
        };

        // A jump larger than the window itself makes incremental update
        // pointless; resample outright.
        if window_start >= cur_end || window_end <= cur_start {
            if let Some(fresh) = Self::sample_fresh(orbit, t, window) {
                *plot = fresh;
            }
            return;
        }

        if window_end > cur_end {
            plot.remove_samples_before(window_start);
            let target_end = window_end + slack;
            let span = target_end - cur_end;
            let n = Self::extension_samples(span, period, window.base_sample_count);
            orbit.sample(cur_end, target_end, n, &mut AppendSink::new(plot, true));
        } else if window_start < cur_start {
            plot.remove_samples_after(window_end);
            let target_start = window_start - slack;
            let span = cur_start - target_start;
            let n = Self::extension_samples(span, period, window.base_sample_count);
            let mut older = OrbitPlot::default();
            orbit.sample(
                target_start,
                cur_start,
                n,
                &mut AppendSink::new(&mut older, false),
            );
            // The final backward sample duplicates the current start.
            let mut samples = older.samples().to_vec();
            samples.pop();
            plot.prepend(samples);
        }
    }

    fn extension_samples(span: f64, period: f64, base: usize) -> usize {
        ((base as f64 * span / period).ceil() as usize).max(1)
    }

    /// Evict plots unused for [`RETIRE_AGE`] frames. Scans at most once
    /// per frame, and only when the cache exceeds [`CULL_THRESHOLD`].
    fn cull(&mut self, frame_number: u64) {
        if self.entries.len() <= CULL_THRESHOLD || self.last_cull_frame == frame_number {
            return;
        }
        self.last_cull_frame = frame_number;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| frame_number.saturating_sub(entry.last_used) < RETIRE_AGE);
        debug!(
            "orbit cache: evicted {} of {before} plots",
            before - self.entries.len()
        );
    }
}
