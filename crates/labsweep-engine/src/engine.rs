use std::time::{Duration, Instant};

use labsweep_backends::{DataBackend, ScopeExit};
use labsweep_core::{
    ColumnLayout, ErrorInfo, Measurement, PointSet, Status, SweepError, Value, WaterfallContext,
};
use serde::Serialize;

use crate::axis::SweepAxis;
use crate::config::SweepConfig;
use crate::progress::ProgressTracker;
use crate::request::{Hook, SweepRequest};

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepSummary {
    /// Rows handed to the backend.
    pub rows: usize,
    /// Completed innermost passes.
    pub blocks: usize,
    /// Point count derived from the axis shapes, `None` when any axis has no
    /// static shape. Saturates at `u64::MAX`.
    pub total: Option<u64>,
    /// Fingerprint of the column layout, see [`ColumnLayout::fingerprint`].
    pub fingerprint: String,
    /// Column names in row order.
    pub columns: Vec<String>,
    /// Wall time from request to exit.
    pub elapsed: Duration,
}

/// Runs nested sweeps against a backend.
#[derive(Debug, Clone, Default)]
pub struct SweepEngine {
    config: SweepConfig,
}

/// Calls `exit(Panicked)` if the body unwinds before the engine disarms it.
struct ExitGuard<'a> {
    backend: &'a mut dyn DataBackend,
    armed: bool,
}

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(err) = self.backend.exit(ScopeExit::Panicked) {
            tracing::error!(backend = self.backend.name(), error = %err, "backend exit failed while unwinding");
        }
    }
}

#[derive(Debug, Default)]
struct Counts {
    rows: usize,
    blocks: usize,
}

impl SweepEngine {
    /// Engine running with `config`.
    pub fn new(config: SweepConfig) -> Self {
        Self { config }
    }

    /// Settings in use.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Executes `request`, streaming every row to `backend`.
    ///
    /// Nothing reaches the backend before `init` has run, the station check
    /// has passed and the column layout has validated. Once `enter`
    /// succeeded, `exit` is called exactly once, including when the body
    /// fails or panics. A body error wins over an exit error; the latter is
    /// only logged in that case.
    pub fn run(
        &self,
        backend: &mut dyn DataBackend,
        request: SweepRequest,
    ) -> Result<SweepSummary, SweepError> {
        let started = Instant::now();
        let SweepRequest {
            init,
            finalize,
            mut measure,
            axes,
        } = request;
        let [mut axis1, mut axis2, mut axis3] = axes;

        let mut ctx = WaterfallContext::new();
        if let Some(init) = init {
            init(&mut ctx)?;
        }
        if self.config.require_station && ctx.station().is_none() {
            return Err(SweepError::Config(
                ErrorInfo::new("station-missing", "init did not register a station")
                    .with_hint("call WaterfallContext::set_station in init"),
            ));
        }

        let mut columns = Vec::new();
        let mut total = Some(1u64);
        for axis in [&mut axis3, &mut axis2, &mut axis1] {
            let descriptor = axis.descriptor()?;
            total = match (total, &descriptor.fixed_sweep) {
                (Some(acc), Some(fixed)) => Some(acc.saturating_mul(fixed.npoints as u64)),
                _ => None,
            };
            columns.extend(axis.point_columns().iter().cloned());
            columns.push(descriptor);
            columns.extend(axis.setter_columns().iter().cloned());
        }
        columns.extend(measure.columns().iter().cloned());
        let layout = ColumnLayout::new(columns)?;
        let fingerprint = layout.fingerprint()?;
        tracing::debug!(
            columns = ?layout.columns().iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            fingerprint = %fingerprint,
            "column layout"
        );

        backend.setup(&layout, &ctx)?;
        backend.enter(&ctx)?;
        tracing::info!(
            backend = backend.name(),
            columns = layout.len(),
            total = ?total,
            "sweep started"
        );

        let mut tracker = self
            .config
            .progress
            .enabled
            .then(|| ProgressTracker::new(total, self.config.progress.report_interval()));
        let mut guard = ExitGuard {
            backend,
            armed: true,
        };
        let mut body = Body {
            backend: &mut *guard.backend,
            layout: &layout,
            ctx: &mut ctx,
            tracker: tracker.as_mut(),
            counts: Counts::default(),
        };
        let result = body.run([&mut axis1, &mut axis2, &mut axis3], &mut measure, finalize);
        let counts = body.counts;
        guard.armed = false;

        match result {
            Ok(()) => guard.backend.exit(ScopeExit::Completed)?,
            Err(err) => {
                if let Err(exit_err) = guard.backend.exit(ScopeExit::Failed(&err)) {
                    tracing::error!(
                        backend = guard.backend.name(),
                        error = %exit_err,
                        masked_by = %err,
                        "backend exit failed after an earlier error"
                    );
                }
                return Err(err);
            }
        }

        let summary = SweepSummary {
            rows: counts.rows,
            blocks: counts.blocks,
            total,
            fingerprint,
            columns: layout.columns().iter().map(|c| c.name.clone()).collect(),
            elapsed: started.elapsed(),
        };
        tracing::info!(
            rows = summary.rows,
            blocks = summary.blocks,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "sweep finished"
        );
        Ok(summary)
    }
}

struct Body<'a> {
    backend: &'a mut dyn DataBackend,
    layout: &'a ColumnLayout,
    ctx: &'a mut WaterfallContext,
    tracker: Option<&'a mut ProgressTracker>,
    counts: Counts,
}

impl Body<'_> {
    fn run(
        &mut self,
        axes: [&mut SweepAxis; 3],
        measure: &mut Measurement,
        finalize: Option<Hook>,
    ) -> Result<(), SweepError> {
        let [axis1, axis2, axis3] = axes;
        self.ctx.set_status(Status::Run);
        let set3 = axis3.points(self.ctx)?;
        for s3 in &set3.points {
            let s3_extra = axis3.set(s3, self.ctx)?;
            let set2 = axis2.points(self.ctx)?;
            for s2 in &set2.points {
                let s2_extra = axis2.set(s2, self.ctx)?;
                let set1 = axis1.points(self.ctx)?;
                for s1 in &set1.points {
                    let s1_extra = axis1.set(s1, self.ctx)?;
                    let measured = measure.call(self.ctx)?;
                    let mut values = Vec::with_capacity(self.layout.len());
                    append_axis(&mut values, &set3, s3, &s3_extra);
                    append_axis(&mut values, &set2, s2, &s2_extra);
                    append_axis(&mut values, &set1, s1, &s1_extra);
                    values.extend(measured);
                    self.submit(values)?;
                }
                self.backend.commit_block()?;
                self.counts.blocks += 1;
            }
        }
        self.ctx.set_status(Status::Stop);
        if let Some(finalize) = finalize {
            finalize(self.ctx)?;
        }
        Ok(())
    }

    fn submit(&mut self, values: Vec<Value>) -> Result<(), SweepError> {
        let row = self.layout.row(values)?;
        self.backend.submit_row(self.layout, &row)?;
        self.counts.rows += 1;
        tracing::trace!(row = self.counts.rows, "row committed");
        if let Some(tracker) = self.tracker.as_deref_mut() {
            tracker.advance(1);
        }
        Ok(())
    }
}

fn append_axis(values: &mut Vec<Value>, set: &PointSet, point: &Value, setter_values: &[Value]) {
    values.extend(set.extra.iter().cloned());
    values.push(point.clone());
    values.extend(setter_values.iter().cloned());
}
