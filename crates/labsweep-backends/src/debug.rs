use labsweep_core::{ColumnLayout, SweepError, Value, WaterfallContext};

use crate::backend::{DataBackend, ScopeExit};

/// Backend that only logs what it receives, at `debug` level.
#[derive(Debug, Default)]
pub struct DebugBackend {
    fields: Vec<String>,
    rows: usize,
}

impl DebugBackend {
    /// Creates the backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows committed so far.
    pub fn rows(&self) -> usize {
        self.rows
    }
}

impl DataBackend for DebugBackend {
    fn name(&self) -> &str {
        "debug"
    }

    fn setup(&mut self, layout: &ColumnLayout, _ctx: &WaterfallContext) -> Result<(), SweepError> {
        for (idx, column) in layout.columns().iter().enumerate() {
            tracing::debug!(
                index = idx,
                name = %column.name,
                unit = %column.unit,
                independent = column.independent.is_independent(),
                duplicate = column.duplicate,
                setpoints = ?layout.setpoints_for(idx),
                "column"
            );
        }
        Ok(())
    }

    fn enter(&mut self, ctx: &WaterfallContext) -> Result<(), SweepError> {
        tracing::debug!(station = ?ctx.station().map(|s| s.name().to_string()), "enter");
        self.rows = 0;
        Ok(())
    }

    fn add_field(&mut self, name: &str, value: &Value) -> Result<(), SweepError> {
        self.fields.push(format!("{name}={value}"));
        Ok(())
    }

    fn commit_row(&mut self) -> Result<(), SweepError> {
        self.rows += 1;
        tracing::debug!(row = self.rows, fields = %self.fields.join(" "), "row");
        self.fields.clear();
        Ok(())
    }

    fn commit_block(&mut self) -> Result<(), SweepError> {
        tracing::debug!(rows = self.rows, "block");
        Ok(())
    }

    fn exit(&mut self, outcome: ScopeExit<'_>) -> Result<(), SweepError> {
        tracing::debug!(rows = self.rows, failed = outcome.is_failure(), "exit");
        Ok(())
    }
}
