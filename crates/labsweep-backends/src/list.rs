use indexmap::IndexMap;
use labsweep_core::{ColumnDescriptor, ColumnLayout, SweepError, Value, WaterfallContext};

use crate::backend::{DataBackend, ScopeExit};

/// How the last scope of a [`ListBackend`] closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitRecord {
    /// Body completed.
    Completed,
    /// Body failed with the given error code.
    Failed(String),
    /// Body panicked.
    Panicked,
}

/// In-memory backend keeping every committed row.
///
/// Rows keep the `(name, value)` pairs exactly as they were submitted, so
/// duplicate columns appear twice. Meant for tests and quick inspection.
#[derive(Debug, Default)]
pub struct ListBackend {
    columns: Vec<ColumnDescriptor>,
    pending: Vec<(String, Value)>,
    rows: Vec<Vec<(String, Value)>>,
    block_ends: Vec<usize>,
    setups: usize,
    enters: usize,
    last_exit: Option<ExitRecord>,
}

impl ListBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns received by the last `setup`, duplicates included.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Committed rows in submission order.
    pub fn rows(&self) -> &[Vec<(String, Value)>] {
        &self.rows
    }

    /// Rows keyed by column name; a repeated name keeps its first value.
    pub fn keyed_rows(&self) -> Vec<IndexMap<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                let mut keyed = IndexMap::with_capacity(row.len());
                for (name, value) in row {
                    keyed.entry(name.clone()).or_insert_with(|| value.clone());
                }
                keyed
            })
            .collect()
    }

    /// Row counts at which each block closed.
    pub fn block_ends(&self) -> &[usize] {
        &self.block_ends
    }

    /// Number of `setup` calls seen.
    pub fn setups(&self) -> usize {
        self.setups
    }

    /// Number of `enter` calls seen.
    pub fn enters(&self) -> usize {
        self.enters
    }

    /// Outcome passed to the most recent `exit`.
    pub fn last_exit(&self) -> Option<&ExitRecord> {
        self.last_exit.as_ref()
    }
}

impl DataBackend for ListBackend {
    fn name(&self) -> &str {
        "list"
    }

    fn setup(&mut self, layout: &ColumnLayout, _ctx: &WaterfallContext) -> Result<(), SweepError> {
        self.columns = layout.columns().to_vec();
        self.setups += 1;
        Ok(())
    }

    fn enter(&mut self, _ctx: &WaterfallContext) -> Result<(), SweepError> {
        self.enters += 1;
        self.last_exit = None;
        Ok(())
    }

    fn add_field(&mut self, name: &str, value: &Value) -> Result<(), SweepError> {
        self.pending.push((name.to_string(), value.clone()));
        Ok(())
    }

    fn commit_row(&mut self) -> Result<(), SweepError> {
        self.rows.push(std::mem::take(&mut self.pending));
        Ok(())
    }

    fn commit_block(&mut self) -> Result<(), SweepError> {
        self.block_ends.push(self.rows.len());
        Ok(())
    }

    fn exit(&mut self, outcome: ScopeExit<'_>) -> Result<(), SweepError> {
        self.pending.clear();
        self.last_exit = Some(match outcome {
            ScopeExit::Completed => ExitRecord::Completed,
            ScopeExit::Failed(err) => ExitRecord::Failed(err.code().to_string()),
            ScopeExit::Panicked => ExitRecord::Panicked,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_rows_keep_first_of_repeated_names() {
        let layout = ColumnLayout::new(vec![
            ColumnDescriptor::new("gate", "V").independent(),
            ColumnDescriptor::new("gate", "V").duplicate(),
        ])
        .expect("layout");
        let mut backend = ListBackend::new();
        let ctx = WaterfallContext::new();
        backend.setup(&layout, &ctx).expect("setup");
        backend.enter(&ctx).expect("enter");
        let row = layout
            .row(vec![Value::from(1.0), Value::from(2.0)])
            .expect("row");
        backend.submit_row(&layout, &row).expect("row");
        backend.commit_block().expect("block");
        backend.exit(ScopeExit::Completed).expect("exit");

        assert_eq!(backend.rows()[0].len(), 2);
        assert_eq!(backend.keyed_rows()[0].get("gate"), Some(&Value::from(1.0)));
        assert_eq!(backend.block_ends(), &[1]);
        assert_eq!(backend.last_exit(), Some(&ExitRecord::Completed));
    }
}
