//! Column descriptors describing every field a sweep row can carry.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Kind of value stored in a column. Passed through to backends untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Scalar numeric value.
    #[default]
    Numeric,
    /// Array-valued reading.
    Array,
    /// Free-form text.
    Text,
}

/// Role of a column within the dependency structure of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Independence {
    /// Measured quantity depending on the axes in scope.
    #[default]
    Dependent,
    /// Setpoint automatically linked to every later dependent column.
    Independent,
    /// Setpoint that only dependents naming it in `extra_dependencies` use.
    IndependentUnlinked,
}

impl Independence {
    /// Returns `true` for both independent flavours.
    pub fn is_independent(self) -> bool {
        !matches!(self, Independence::Dependent)
    }
}

impl From<bool> for Independence {
    fn from(independent: bool) -> Self {
        if independent {
            Independence::Independent
        } else {
            Independence::Dependent
        }
    }
}

/// Static grid shape of a sweep axis, known before the run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedSweep {
    /// First setpoint.
    pub start: Value,
    /// Last setpoint.
    pub stop: Value,
    /// Number of setpoints.
    pub npoints: usize,
}

/// Metadata describing one scalar or array-valued output slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name, unique per sweep unless `duplicate` is set.
    pub name: String,
    /// Display unit.
    pub unit: String,
    /// Value kind.
    #[serde(default)]
    pub paramtype: ParamType,
    /// Dependency role.
    #[serde(default)]
    pub independent: Independence,
    /// Columns this one depends on beyond the axes in scope.
    #[serde(default)]
    pub extra_dependencies: IndexSet<String>,
    /// The name is already registered under another role.
    #[serde(default)]
    pub duplicate: bool,
    /// Precomputed grid shape for axis columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_sweep: Option<FixedSweep>,
}

impl ColumnDescriptor {
    /// Creates a dependent numeric column.
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            paramtype: ParamType::Numeric,
            independent: Independence::Dependent,
            extra_dependencies: IndexSet::new(),
            duplicate: false,
            fixed_sweep: None,
        }
    }

    /// Marks the column as an automatically linked setpoint.
    pub fn independent(mut self) -> Self {
        self.independent = Independence::Independent;
        self
    }

    /// Marks the column as a setpoint that is not linked automatically.
    pub fn unlinked(mut self) -> Self {
        self.independent = Independence::IndependentUnlinked;
        self
    }

    /// Adds an explicit dependency on another column.
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.extra_dependencies.insert(name.into());
        self
    }

    /// Flags the column as a re-emission of an already registered name.
    pub fn duplicate(mut self) -> Self {
        self.duplicate = true;
        self
    }

    /// Sets the value kind.
    pub fn with_paramtype(mut self, paramtype: ParamType) -> Self {
        self.paramtype = paramtype;
        self
    }

    /// Attaches a static grid shape.
    pub fn with_fixed_sweep(mut self, fixed: FixedSweep) -> Self {
        self.fixed_sweep = Some(fixed);
        self
    }

    /// Name formatted as `name (unit)` for text headers.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.unit)
    }
}

impl<N: Into<String>, U: Into<String>> From<(N, U)> for ColumnDescriptor {
    fn from((name, unit): (N, U)) -> Self {
        ColumnDescriptor::new(name, unit)
    }
}

impl<N: Into<String>, U: Into<String>> From<(N, U, ParamType)> for ColumnDescriptor {
    fn from((name, unit, paramtype): (N, U, ParamType)) -> Self {
        ColumnDescriptor::new(name, unit).with_paramtype(paramtype)
    }
}

impl<N, U, I> From<(N, U, ParamType, I)> for ColumnDescriptor
where
    N: Into<String>,
    U: Into<String>,
    I: Into<Independence>,
{
    fn from((name, unit, paramtype, independent): (N, U, ParamType, I)) -> Self {
        let mut column = ColumnDescriptor::new(name, unit).with_paramtype(paramtype);
        column.independent = independent.into();
        column
    }
}

/// Normalizes a mixed list of descriptors and positional tuples.
pub fn normalize_columns<C, I>(columns: I) -> Vec<ColumnDescriptor>
where
    I: IntoIterator<Item = C>,
    C: Into<ColumnDescriptor>,
{
    columns.into_iter().map(Into::into).collect()
}
