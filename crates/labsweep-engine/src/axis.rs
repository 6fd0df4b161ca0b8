//! Sweep axes: what to set, where to set it, and the column it produces.

use std::fmt;

use labsweep_core::{
    ColumnDescriptor, FixedSweep, Measurement, PointSet, PointSource, Setter, SweepError, Value,
    WaterfallContext,
};

/// Writable instrument setting driven by a direct-parameter axis.
pub trait Parameter {
    /// Column name of the axis.
    fn name(&self) -> &str;

    /// Display unit.
    fn unit(&self) -> &str;

    /// Writes `value` to the instrument.
    fn set(&mut self, value: &Value) -> Result<(), SweepError>;
}

/// One independent dimension of a sweep.
///
/// The axis column sits between the point-source columns and the setter
/// columns in every row. Its descriptor carries a static grid shape when one
/// is known: from [`SweepAxis::with_shape_hint`], or from probing the point
/// source once when it is marked pure.
pub struct SweepAxis {
    name: String,
    unit: String,
    setter: Setter,
    points: PointSource,
    shape: Option<FixedSweep>,
    trivial: bool,
}

impl SweepAxis {
    /// Generic axis from a setter and a point source.
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        setter: Setter,
        points: PointSource,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            setter,
            points,
            shape: None,
            trivial: false,
        }
    }

    /// Axis writing each of `points` to `param`.
    pub fn parameter<P, T>(param: P, points: impl IntoIterator<Item = T>) -> Self
    where
        P: Parameter + 'static,
        T: Into<Value>,
    {
        let name = param.name().to_string();
        let unit = param.unit().to_string();
        let mut param = param;
        let setter = Setter::new(
            name.clone(),
            Vec::<ColumnDescriptor>::new(),
            move |value, _ctx| {
                param.set(value)?;
                Ok(Vec::new())
            },
        );
        let points = PointSource::fixed(name.clone(), points);
        Self::new(name, unit, setter, points)
    }

    /// Placeholder for unused slot `slot`: one point, no side effects.
    pub fn none(slot: usize) -> Self {
        let name = format!("None{slot}");
        let mut axis = Self::new(
            name.clone(),
            "",
            Setter::noop(name.clone()),
            PointSource::fixed(name, [1.0]),
        );
        axis.trivial = true;
        axis
    }

    /// Declares the grid shape instead of probing the point source.
    pub fn with_shape_hint(
        mut self,
        start: impl Into<Value>,
        stop: impl Into<Value>,
        npoints: usize,
    ) -> Self {
        self.shape = Some(FixedSweep {
            start: start.into(),
            stop: stop.into(),
            npoints,
        });
        self
    }

    /// Runs `measure` right after every set; its columns follow the setter's.
    ///
    /// The result is never trivial, even when built from [`SweepAxis::none`].
    pub fn with_measurement(self, measure: Measurement) -> Self {
        let Self {
            name,
            unit,
            setter,
            points,
            shape,
            trivial: _,
        } = self;
        let mut columns = setter.columns().to_vec();
        columns.extend(measure.columns().iter().cloned());
        let setter_name = setter.name().to_string();
        let mut setter = setter;
        let mut measure = measure;
        let combined = Setter::new(setter_name, columns, move |value, ctx| {
            let mut values = setter.call(value, ctx)?;
            values.extend(measure.call(ctx)?);
            Ok(values)
        });
        Self {
            name,
            unit,
            setter: combined,
            points,
            shape,
            trivial: false,
        }
    }

    /// Column name of the axis.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display unit of the axis column.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Placeholder axis created by [`SweepAxis::none`].
    pub fn is_trivial(&self) -> bool {
        self.trivial
    }

    /// Shape given through [`SweepAxis::with_shape_hint`].
    pub fn shape_hint(&self) -> Option<&FixedSweep> {
        self.shape.as_ref()
    }

    /// Columns returned by the point source.
    pub fn point_columns(&self) -> &[ColumnDescriptor] {
        self.points.columns()
    }

    /// Columns returned by the setter.
    pub fn setter_columns(&self) -> &[ColumnDescriptor] {
        self.setter.columns()
    }

    /// Descriptor of the axis column.
    ///
    /// A pure point source without a shape hint is evaluated once against an
    /// empty context. Impure sources are never evaluated here.
    pub fn descriptor(&mut self) -> Result<ColumnDescriptor, SweepError> {
        let column = ColumnDescriptor::new(self.name.clone(), self.unit.clone()).independent();
        if let Some(shape) = &self.shape {
            return Ok(column.with_fixed_sweep(shape.clone()));
        }
        if !self.points.is_pure() {
            return Ok(column);
        }
        let probe = self.points.call(&mut WaterfallContext::new())?;
        match (probe.points.first(), probe.points.last()) {
            (Some(start), Some(stop)) => Ok(column.with_fixed_sweep(FixedSweep {
                start: start.clone(),
                stop: stop.clone(),
                npoints: probe.points.len(),
            })),
            _ => Ok(column),
        }
    }

    /// Evaluates the point source in the run context.
    pub fn points(&mut self, ctx: &mut WaterfallContext) -> Result<PointSet, SweepError> {
        self.points.call(ctx)
    }

    /// Applies one setpoint and returns the setter's values.
    pub fn set(&mut self, value: &Value, ctx: &mut WaterfallContext) -> Result<Vec<Value>, SweepError> {
        self.setter.call(value, ctx)
    }
}

impl fmt::Debug for SweepAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SweepAxis")
            .field("name", &self.name)
            .field("unit", &self.unit)
            .field("setter", &self.setter)
            .field("points", &self.points)
            .field("shape", &self.shape)
            .field("trivial", &self.trivial)
            .finish()
    }
}
