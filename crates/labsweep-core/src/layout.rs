//! Validated, ordered column lists and the rows built against them.

use indexmap::{IndexMap, IndexSet};

use crate::column::{ColumnDescriptor, Independence};
use crate::errors::{ErrorInfo, SweepError};
use crate::serde::stable_hash_string;
use crate::value::Value;

/// Ordered column list of one sweep with a name index.
///
/// Position in `columns` is the position of the value in every row; backends
/// index fields both ways, so the order here is part of the data format.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    columns: Vec<ColumnDescriptor>,
    index: IndexMap<String, usize>,
}

impl ColumnLayout {
    /// Validates `columns` and builds the name index.
    ///
    /// Fails on a repeated non-`duplicate` name, on a `duplicate` column whose
    /// name was never registered, and on an extra dependency naming a column
    /// that does not exist.
    pub fn new(columns: Vec<ColumnDescriptor>) -> Result<Self, SweepError> {
        let mut index = IndexMap::with_capacity(columns.len());
        for (position, column) in columns.iter().enumerate() {
            if column.duplicate {
                continue;
            }
            if let Some(previous) = index.insert(column.name.clone(), position) {
                return Err(SweepError::Config(
                    ErrorInfo::new("column-duplicate", "multiple columns share one name")
                        .with_context("name", column.name.clone())
                        .with_context("first", previous.to_string())
                        .with_context("second", position.to_string())
                        .with_hint("mark re-emitted columns as duplicate"),
                ));
            }
        }
        for column in &columns {
            if column.duplicate && !index.contains_key(&column.name) {
                return Err(SweepError::Config(
                    ErrorInfo::new(
                        "column-duplicate-orphan",
                        "duplicate column refers to a name that is never registered",
                    )
                    .with_context("name", column.name.clone()),
                ));
            }
            for dependency in &column.extra_dependencies {
                if !index.contains_key(dependency) {
                    return Err(SweepError::Config(
                        ErrorInfo::new(
                            "column-unknown-dependency",
                            "extra dependency names an unknown column",
                        )
                        .with_context("column", column.name.clone())
                        .with_context("dependency", dependency.clone()),
                    ));
                }
            }
        }
        Ok(Self { columns, index })
    }

    /// All columns in row order, duplicates included.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Number of fields in every row.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` when the layout holds no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of the registered column called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Registered descriptor called `name`.
    pub fn get(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.index_of(name).map(|idx| &self.columns[idx])
    }

    /// Descriptors a backend should register (non-`duplicate` ones).
    pub fn registered(&self) -> impl Iterator<Item = &ColumnDescriptor> + '_ {
        self.columns.iter().filter(|column| !column.duplicate)
    }

    /// Setpoint names a dependent column at `position` is stored against.
    ///
    /// Every linked independent column before it comes first, then its extra
    /// dependencies. Independent columns have no setpoints.
    pub fn setpoints_for(&self, position: usize) -> Vec<String> {
        let Some(column) = self.columns.get(position) else {
            return Vec::new();
        };
        if column.independent.is_independent() {
            return Vec::new();
        }
        let mut setpoints: IndexSet<String> = self.columns[..position]
            .iter()
            .filter(|c| !c.duplicate && c.independent == Independence::Independent)
            .map(|c| c.name.clone())
            .collect();
        setpoints.extend(column.extra_dependencies.iter().cloned());
        setpoints.into_iter().collect()
    }

    /// Independent columns carrying a static grid shape, in row order.
    pub fn coordinates(&self) -> impl Iterator<Item = &ColumnDescriptor> + '_ {
        self.registered()
            .filter(|c| c.independent.is_independent() && c.fixed_sweep.is_some())
    }

    /// Coordinates to plot, innermost axis first.
    ///
    /// Rows list the outermost axis first while plots put the innermost axis
    /// on x, hence the reversal. Single-point axes carry no extent and are
    /// dropped.
    pub fn plot_axes(&self) -> Vec<&ColumnDescriptor> {
        let mut axes: Vec<_> = self
            .coordinates()
            .filter(|c| c.fixed_sweep.as_ref().is_some_and(|f| f.npoints > 1))
            .collect();
        axes.reverse();
        axes
    }

    /// Stable digest of the column list.
    pub fn fingerprint(&self) -> Result<String, SweepError> {
        stable_hash_string(&self.columns)
    }

    /// Pairs `values` with the columns in order.
    ///
    /// The only check is the count: a mismatch means some measurement
    /// function broke its declared column contract.
    pub fn row(&self, values: Vec<Value>) -> Result<Row, SweepError> {
        if values.len() != self.columns.len() {
            return Err(SweepError::Contract(
                ErrorInfo::new("contract-arity", "row length does not match the column list")
                    .with_context("expected", self.columns.len().to_string())
                    .with_context("actual", values.len().to_string()),
            ));
        }
        Ok(Row { values })
    }
}

/// One assembled row; field `i` belongs to column `i` of its layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Values in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// `(descriptor, value)` pairs in column order.
    pub fn fields<'a>(
        &'a self,
        layout: &'a ColumnLayout,
    ) -> impl Iterator<Item = (&'a ColumnDescriptor, &'a Value)> + 'a {
        layout.columns().iter().zip(self.values.iter())
    }

    /// Value of the registered column called `name`.
    pub fn get<'a>(&'a self, layout: &ColumnLayout, name: &str) -> Option<&'a Value> {
        layout.index_of(name).and_then(|idx| self.values.get(idx))
    }
}
