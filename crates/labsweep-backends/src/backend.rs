use labsweep_core::{ColumnLayout, Row, SweepError, Value, WaterfallContext};

/// How the measurement body left the backend scope.
#[derive(Debug, Clone, Copy)]
pub enum ScopeExit<'a> {
    /// Every row was submitted and finalize returned.
    Completed,
    /// The body stopped on an error, which is returned to the caller after
    /// the scope closes.
    Failed(&'a SweepError),
    /// The body unwound from a panic.
    Panicked,
}

impl ScopeExit<'_> {
    /// Returns `true` unless the body completed.
    pub fn is_failure(&self) -> bool {
        !matches!(self, ScopeExit::Completed)
    }
}

/// Consumer of sweep rows: storage, plotting, or anything else.
///
/// Per run the engine calls `setup` once, `enter` once, then for every point
/// zero or more `add_field` calls closed by one `commit_row`, `commit_block`
/// after each innermost pass, and finally `exit` exactly once on every path.
/// Resources opened in `enter` must be released in `exit`.
pub trait DataBackend {
    /// Name used in diagnostics.
    fn name(&self) -> &str {
        "backend"
    }

    /// Registers the column layout. Must reject duplicate names it cannot
    /// store rather than overwrite them.
    fn setup(&mut self, layout: &ColumnLayout, ctx: &WaterfallContext) -> Result<(), SweepError>;

    /// Opens the scope in which rows are submitted.
    fn enter(&mut self, ctx: &WaterfallContext) -> Result<(), SweepError>;

    /// Stores one field of the current row.
    fn add_field(&mut self, name: &str, value: &Value) -> Result<(), SweepError>;

    /// Marks the current row final.
    fn commit_row(&mut self) -> Result<(), SweepError>;

    /// Marks the end of one innermost-axis pass.
    fn commit_block(&mut self) -> Result<(), SweepError> {
        Ok(())
    }

    /// Closes the scope. Called even when the body failed.
    fn exit(&mut self, outcome: ScopeExit<'_>) -> Result<(), SweepError>;

    /// Submits every field of `row` in column order, then commits it.
    fn submit_row(&mut self, layout: &ColumnLayout, row: &Row) -> Result<(), SweepError> {
        for (column, value) in row.fields(layout) {
            self.add_field(&column.name, value)?;
        }
        self.commit_row()
    }
}

impl<B: DataBackend + ?Sized> DataBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn setup(&mut self, layout: &ColumnLayout, ctx: &WaterfallContext) -> Result<(), SweepError> {
        (**self).setup(layout, ctx)
    }

    fn enter(&mut self, ctx: &WaterfallContext) -> Result<(), SweepError> {
        (**self).enter(ctx)
    }

    fn add_field(&mut self, name: &str, value: &Value) -> Result<(), SweepError> {
        (**self).add_field(name, value)
    }

    fn commit_row(&mut self) -> Result<(), SweepError> {
        (**self).commit_row()
    }

    fn commit_block(&mut self) -> Result<(), SweepError> {
        (**self).commit_block()
    }

    fn exit(&mut self, outcome: ScopeExit<'_>) -> Result<(), SweepError> {
        (**self).exit(outcome)
    }

    fn submit_row(&mut self, layout: &ColumnLayout, row: &Row) -> Result<(), SweepError> {
        (**self).submit_row(layout, row)
    }
}
