//! Callables tagged with the columns they produce.

use std::fmt;

use crate::column::{normalize_columns, ColumnDescriptor};
use crate::context::WaterfallContext;
use crate::errors::{ErrorInfo, SweepError};
use crate::value::Value;

/// Reads instruments at the current point.
pub type MeasureFn = dyn FnMut(&mut WaterfallContext) -> Result<Vec<Value>, SweepError>;
/// Applies one setpoint and returns any values it reads back.
pub type SetFn = dyn FnMut(&Value, &mut WaterfallContext) -> Result<Vec<Value>, SweepError>;
/// Produces the setpoints of an axis.
pub type PointFn = dyn FnMut(&mut WaterfallContext) -> Result<PointSet, SweepError>;

/// Setpoints yielded by a point source plus the values of its own columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointSet {
    /// Ordered setpoints.
    pub points: Vec<Value>,
    /// One value per declared point-source column.
    pub extra: Vec<Value>,
}

impl PointSet {
    /// Setpoints without extra columns.
    pub fn new(points: Vec<Value>) -> Self {
        Self {
            points,
            extra: Vec::new(),
        }
    }

    /// Attaches values for the point source's declared columns.
    pub fn with_extra(mut self, extra: Vec<Value>) -> Self {
        self.extra = extra;
        self
    }
}

impl<T: Into<Value>> FromIterator<T> for PointSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        PointSet::new(iter.into_iter().map(Into::into).collect())
    }
}

/// A callable paired with the ordered columns of the values it returns.
pub struct MeasurementFunction<F: ?Sized> {
    name: String,
    columns: Vec<ColumnDescriptor>,
    function: Box<F>,
    pure: bool,
}

/// Dependent measurement invoked once per point.
pub type Measurement = MeasurementFunction<MeasureFn>;
/// Axis setter.
pub type Setter = MeasurementFunction<SetFn>;
/// Axis point source.
pub type PointSource = MeasurementFunction<PointFn>;

impl<F: ?Sized> MeasurementFunction<F> {
    /// Name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared columns, in return order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    fn check_arity(&self, values: &[Value]) -> Result<(), SweepError> {
        if values.len() == self.columns.len() {
            return Ok(());
        }
        Err(SweepError::Contract(
            ErrorInfo::new(
                "contract-arity",
                "measurement function returned a different number of values than it declares",
            )
            .with_context("function", self.name.clone())
            .with_context("expected", self.columns.len().to_string())
            .with_context("actual", values.len().to_string()),
        ))
    }
}

impl<F: ?Sized> fmt::Debug for MeasurementFunction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasurementFunction")
            .field("name", &self.name)
            .field("columns", &self.columns)
            .field("pure", &self.pure)
            .finish_non_exhaustive()
    }
}

impl MeasurementFunction<MeasureFn> {
    /// Wraps a measurement callable. Tuples in `columns` are normalized.
    pub fn new<C, I, F>(name: impl Into<String>, columns: I, function: F) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnDescriptor>,
        F: FnMut(&mut WaterfallContext) -> Result<Vec<Value>, SweepError> + 'static,
    {
        Self {
            name: name.into(),
            columns: normalize_columns(columns),
            function: Box::new(function),
            pure: false,
        }
    }

    /// Invokes the callable and checks its value count.
    pub fn call(&mut self, ctx: &mut WaterfallContext) -> Result<Vec<Value>, SweepError> {
        let values = (self.function)(ctx)?;
        self.check_arity(&values)?;
        Ok(values)
    }
}

impl MeasurementFunction<SetFn> {
    /// Wraps a setter callable. Tuples in `columns` are normalized.
    pub fn new<C, I, F>(name: impl Into<String>, columns: I, function: F) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnDescriptor>,
        F: FnMut(&Value, &mut WaterfallContext) -> Result<Vec<Value>, SweepError> + 'static,
    {
        Self {
            name: name.into(),
            columns: normalize_columns(columns),
            function: Box::new(function),
            pure: false,
        }
    }

    /// Setter that only records the setpoint and emits no columns.
    pub fn noop(name: impl Into<String>) -> Self {
        Setter::new(name, Vec::<ColumnDescriptor>::new(), |_, _| Ok(Vec::new()))
    }

    /// Applies `value` and checks the count of values read back.
    pub fn call(
        &mut self,
        value: &Value,
        ctx: &mut WaterfallContext,
    ) -> Result<Vec<Value>, SweepError> {
        let values = (self.function)(value, ctx)?;
        self.check_arity(&values)?;
        Ok(values)
    }
}

impl MeasurementFunction<PointFn> {
    /// Wraps a point-source callable. Sources built here are never probed for
    /// shape discovery; see [`PointSource::mark_pure`].
    pub fn new<C, I, F>(name: impl Into<String>, columns: I, function: F) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnDescriptor>,
        F: FnMut(&mut WaterfallContext) -> Result<PointSet, SweepError> + 'static,
    {
        Self {
            name: name.into(),
            columns: normalize_columns(columns),
            function: Box::new(function),
            pure: false,
        }
    }

    /// Pure source yielding a fixed sequence.
    pub fn fixed<T: Into<Value>>(
        name: impl Into<String>,
        points: impl IntoIterator<Item = T>,
    ) -> Self {
        let points: Vec<Value> = points.into_iter().map(Into::into).collect();
        PointSource::new(name, Vec::<ColumnDescriptor>::new(), move |_| {
            Ok(PointSet::new(points.clone()))
        })
        .mark_pure()
    }

    /// Declares the callable free of side effects, allowing one extra call
    /// before the run to discover the axis shape.
    pub fn mark_pure(mut self) -> Self {
        self.pure = true;
        self
    }

    /// Whether the source may be probed.
    pub fn is_pure(&self) -> bool {
        self.pure
    }

    /// Evaluates the source and checks the count of its extra values.
    pub fn call(&mut self, ctx: &mut WaterfallContext) -> Result<PointSet, SweepError> {
        let set = (self.function)(ctx)?;
        self.check_arity(&set.extra)?;
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measurement_arity_mismatch_is_a_contract_error() {
        let mut measure = Measurement::new("iv", vec![("I", "A"), ("V", "V")], |_| {
            Ok(vec![Value::from(1.0)])
        });
        let mut ctx = WaterfallContext::new();
        let err = measure.call(&mut ctx).expect_err("arity");
        assert!(matches!(err, SweepError::Contract(_)));
        assert_eq!(err.info().context.get("function").map(String::as_str), Some("iv"));
    }

    #[test]
    fn fixed_source_is_pure_and_repeatable() {
        let mut source = PointSource::fixed("gate", [0.0, 0.5, 1.0]);
        let mut ctx = WaterfallContext::new();
        assert!(source.is_pure());
        let first = source.call(&mut ctx).expect("points");
        let second = source.call(&mut ctx).expect("points");
        assert_eq!(first, second);
        assert_eq!(first.points.len(), 3);
    }

    #[test]
    fn setter_sees_the_context() {
        let mut setter = Setter::new("gate", Vec::<ColumnDescriptor>::new(), |value, ctx| {
            ctx.set("gate", value.clone());
            Ok(Vec::new())
        });
        let mut ctx = WaterfallContext::new();
        setter.call(&Value::from(0.3), &mut ctx).expect("set");
        assert_eq!(ctx.get_f64("gate"), Some(0.3));
    }
}
