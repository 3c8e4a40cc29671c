//! Smoothed throughput estimation from polled byte counts

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tokio::time::Instant;

/// Number of instantaneous samples averaged by default
pub const DEFAULT_SPEED_WINDOW: usize = 5;

/// Sliding-window speed estimator
///
/// Each call to [`sample`](Self::sample) compares the cumulative byte count with the
/// previous sample. When the sampled path changes between two samples, the new count is
/// taken as the delta as a whole, which overstates the speed at file boundaries.
#[derive(Debug, Clone)]
pub struct SpeedMeter {
    window: usize,
    history: VecDeque<f64>,
    average: u64,
    last_transferred: u64,
    last_sample_time: Option<Instant>,
    last_sample_path: Option<PathBuf>,
}

impl SpeedMeter {
    /// Create a meter averaging the last `window` samples (at least one)
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            history: VecDeque::with_capacity(window),
            average: 0,
            last_transferred: 0,
            last_sample_time: None,
            last_sample_path: None,
        }
    }

    /// Record the cumulative byte count of `path` at `now`
    ///
    /// Returns the published average, or `None` for the first sample of a session,
    /// which only sets the baseline. A sample taken with no elapsed time publishes the
    /// current average without recording a new speed.
    pub fn sample(&mut self, path: &Path, transferred: u64, now: Instant) -> Option<u64> {
        if self.last_sample_path.is_none() {
            self.last_sample_path = Some(path.to_path_buf());
        }

        let published = self.last_sample_time.map(|last_time| {
            let delta = if self.last_sample_path.as_deref() == Some(path) {
                transferred.saturating_sub(self.last_transferred)
            } else {
                self.last_sample_path = Some(path.to_path_buf());
                transferred
            };

            let elapsed = now.saturating_duration_since(last_time).as_secs_f64();
            if elapsed > 0.0 {
                self.record(delta as f64 / elapsed);
            }
            self.average
        });

        self.last_sample_time = Some(now);
        self.last_transferred = transferred;
        published
    }

    fn record(&mut self, speed: f64) {
        if self.history.len() == self.window {
            self.history.pop_front();
        }
        self.history.push_back(speed);

        let sum: f64 = self.history.iter().sum();
        self.average = (sum / self.history.len() as f64).round() as u64;
    }

    /// Smoothed speed in bytes per second
    pub fn average(&self) -> u64 {
        self.average
    }

    /// Recorded instantaneous speeds, oldest first
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    /// Time of the last sample
    pub fn last_sample_time(&self) -> Option<Instant> {
        self.last_sample_time
    }

    /// Whether no sample was taken since creation or the last reset
    pub fn is_idle(&self) -> bool {
        self.last_sample_time.is_none()
            && self.last_sample_path.is_none()
            && self.history.is_empty()
            && self.last_transferred == 0
            && self.average == 0
    }

    /// Forget all samples
    pub fn reset(&mut self) {
        self.history.clear();
        self.average = 0;
        self.last_transferred = 0;
        self.last_sample_time = None;
        self.last_sample_path = None;
    }
}

impl Default for SpeedMeter {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED_WINDOW)
    }
}
