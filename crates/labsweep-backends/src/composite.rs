use labsweep_core::{ColumnLayout, Row, SweepError, Value, WaterfallContext};

use crate::backend::{DataBackend, ScopeExit};

/// Fans every call out to an ordered list of child backends.
///
/// Setup, enter, fields, rows and blocks stop at the first failing child.
/// Exit is attempted on every child that was entered; the first exit error is
/// returned with the indices of all failing children in its context.
pub struct CompositeBackend {
    children: Vec<Box<dyn DataBackend>>,
    entered: usize,
}

impl CompositeBackend {
    /// Creates a composite over `children`, called in order.
    pub fn new(children: Vec<Box<dyn DataBackend>>) -> Self {
        Self {
            children,
            entered: 0,
        }
    }

    /// Appends another child.
    pub fn push(&mut self, child: impl DataBackend + 'static) {
        self.children.push(Box::new(child));
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` when there are no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn each(
        &mut self,
        mut call: impl FnMut(&mut dyn DataBackend) -> Result<(), SweepError>,
    ) -> Result<(), SweepError> {
        for child in &mut self.children {
            call(child.as_mut())?;
        }
        Ok(())
    }

    fn exit_entered(&mut self, outcome: ScopeExit<'_>) -> Result<(), SweepError> {
        let mut failures = Vec::new();
        for (idx, child) in self.children.iter_mut().take(self.entered).enumerate() {
            if let Err(err) = child.exit(outcome) {
                tracing::warn!(child = idx, backend = child.name(), error = %err, "backend exit failed");
                failures.push((idx, err));
            }
        }
        self.entered = 0;
        let failed_children = failures
            .iter()
            .map(|(idx, _)| idx.to_string())
            .collect::<Vec<_>>()
            .join(",");
        match failures.into_iter().next() {
            None => Ok(()),
            Some((_, first)) => Err(first.with_context("failed_children", failed_children)),
        }
    }
}

impl DataBackend for CompositeBackend {
    fn name(&self) -> &str {
        "composite"
    }

    fn setup(&mut self, layout: &ColumnLayout, ctx: &WaterfallContext) -> Result<(), SweepError> {
        self.each(|child| child.setup(layout, ctx))
    }

    fn enter(&mut self, ctx: &WaterfallContext) -> Result<(), SweepError> {
        self.entered = 0;
        for idx in 0..self.children.len() {
            if let Err(err) = self.children[idx].enter(ctx) {
                if let Err(exit_err) = self.exit_entered(ScopeExit::Failed(&err)) {
                    tracing::error!(error = %exit_err, "backend exit failed after a failed enter");
                }
                return Err(err);
            }
            self.entered = idx + 1;
        }
        Ok(())
    }

    fn add_field(&mut self, name: &str, value: &Value) -> Result<(), SweepError> {
        self.each(|child| child.add_field(name, value))
    }

    fn commit_row(&mut self) -> Result<(), SweepError> {
        self.each(|child| child.commit_row())
    }

    fn commit_block(&mut self) -> Result<(), SweepError> {
        self.each(|child| child.commit_block())
    }

    fn exit(&mut self, outcome: ScopeExit<'_>) -> Result<(), SweepError> {
        self.exit_entered(outcome)
    }

    fn submit_row(&mut self, layout: &ColumnLayout, row: &Row) -> Result<(), SweepError> {
        self.each(|child| child.submit_row(layout, row))
    }
}
