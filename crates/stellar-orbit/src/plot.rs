//! A time-ordered list of trajectory samples for one orbit.

use glam::DVec3;

use stellar_scene::OrbitSampleSink;

/// One trajectory sample. Velocity is kept for cubic interpolation when
/// the renderer subdivides long segments.
#[derive(Clone, Copy, Debug)]
pub struct PlotSample {
    pub t: f64,
    pub position: DVec3,
    pub velocity: DVec3,
}

/// Cached samples covering a contiguous time span, oldest first.
#[derive(Clone, Debug, Default)]
pub struct OrbitPlot {
    samples: Vec<PlotSample>,
}

impl OrbitPlot {
    pub fn samples(&self) -> &[PlotSample] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time of the oldest sample.
    pub fn start_time(&self) -> Option<f64> {
        self.samples.first().map(|s| s.t)
    }

    /// Time of the newest sample.
    pub fn end_time(&self) -> Option<f64> {
        self.samples.last().map(|s| s.t)
    }

    /// Append a sample; `t` must be newer than the current end.
    pub fn push(&mut self, sample: PlotSample) {
        debug_assert!(
            self.end_time().map(|end| sample.t > end).unwrap_or(true),
            "samples must be appended in time order"
        );
        self.samples.push(sample);
    }

    /// Prepend time-ordered samples older than the current start.
    pub fn prepend(&mut self, mut older: Vec<PlotSample>) {
        debug_assert!(older.windows(2).all(|w| w[0].t < w[1].t));
        debug_assert!(
            match (older.last(), self.start_time()) {
                (Some(newest), Some(start)) => newest.t < start,
                _ => true,
            },
            "prepended samples must all predate the current start"
        );
        older.append(&mut self.samples);
        self.samples = older;
    }

    /// Drop samples with `t < cutoff`.
    pub fn remove_samples_before(&mut self, cutoff: f64) {
        let keep_from = self.samples.partition_point(|s| s.t < cutoff);
        self.samples.drain(..keep_from);
    }

    /// Drop samples with `t > cutoff`.
    pub fn remove_samples_after(&mut self, cutoff: f64) {
        let keep_to = self.samples.partition_point(|s| s.t <= cutoff);
        self.samples.truncate(keep_to);
    }
}

/// Sink adapter that appends orbit samples to a plot, optionally
/// skipping the first emitted sample when it duplicates an existing one.
pub struct AppendSink<'a> {
    plot: &'a mut OrbitPlot,
    skip_first: bool,
}

impl<'a> AppendSink<'a> {
    pub fn new(plot: &'a mut OrbitPlot, skip_first: bool) -> Self {
        Self { plot, skip_first }
    }
}

impl OrbitSampleSink for AppendSink<'_> {
    fn sample(&mut self, t: f64, position: DVec3, velocity: DVec3) {
        if self.skip_first {
            self.skip_first = false;
            return;
        }
        self.plot.push(PlotSample {
            t,
            position,
            velocity,
        });
    }
}
