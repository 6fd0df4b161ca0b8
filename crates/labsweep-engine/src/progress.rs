use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

/// One progress report.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    /// Points done so far.
    pub done: u64,
    /// Expected points, when every axis has a known shape.
    pub total: Option<u64>,
    /// Projected completion time; needs `total`.
    pub eta: Option<DateTime<Local>>,
}

/// Advisory completion estimate for a running sweep.
///
/// Reports at most once per interval and never before the first point is
/// done. The estimate assumes every point takes the same time.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    started: Instant,
    started_at: DateTime<Local>,
    last_report: Instant,
    interval: Duration,
    total: Option<u64>,
    done: u64,
}

impl ProgressTracker {
    /// Starts tracking now.
    pub fn new(total: Option<u64>, interval: Duration) -> Self {
        Self::started(total, interval, Instant::now(), Local::now())
    }

    /// Starts tracking from a given monotonic and wall-clock start.
    pub fn started(
        total: Option<u64>,
        interval: Duration,
        started: Instant,
        started_at: DateTime<Local>,
    ) -> Self {
        Self {
            started,
            started_at,
            last_report: started,
            interval,
            total,
            done: 0,
        }
    }

    /// Points counted so far.
    pub fn done(&self) -> u64 {
        self.done
    }

    /// Expected points, if known.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Wall-clock completion for `total` points, `None` when it does not fit
    /// in a `Duration` or past chrono's date range.
    fn project(&self, total: u64, elapsed: Duration) -> Option<DateTime<Local>> {
        let scale = total as f64 / self.done as f64;
        let projected = Duration::try_from_secs_f64(elapsed.as_secs_f64() * scale).ok()?;
        let offset = chrono::Duration::from_std(projected).ok()?;
        self.started_at.checked_add_signed(offset)
    }

    /// Counts `delta` more points at the current instant.
    pub fn advance(&mut self, delta: u64) -> Option<ProgressReport> {
        self.advance_at(delta, Instant::now())
    }

    /// Counts `delta` more points at `now` and reports when the interval has
    /// passed since the last report.
    pub fn advance_at(&mut self, delta: u64, now: Instant) -> Option<ProgressReport> {
        self.done = self.done.saturating_add(delta);
        if self.done == 0 || now.saturating_duration_since(self.last_report) <= self.interval {
            return None;
        }
        self.last_report = now;
        let elapsed = now.saturating_duration_since(self.started);
        let eta = self.total.and_then(|total| self.project(total, elapsed));
        match eta {
            Some(eta) => tracing::info!(
                done = self.done,
                total = ?self.total,
                eta = %eta.format("%a %b %e %H:%M:%S %Y"),
                "sweep progress"
            ),
            None => tracing::info!(done = self.done, total = ?self.total, "sweep progress"),
        }
        Some(ProgressReport {
            done: self.done,
            total: self.total,
            eta,
        })
    }
}
