#![deny(missing_docs)]
#![doc = "Column metadata, values, run context and measurement functions shared by the labsweep engine and its backends."]

pub mod column;
pub mod context;
pub mod errors;
pub mod layout;
pub mod measurement;
mod serde;
pub mod value;

pub use column::{normalize_columns, ColumnDescriptor, FixedSweep, Independence, ParamType};
pub use context::{Station, Status, WaterfallContext};
pub use errors::{ErrorInfo, SweepError};
pub use layout::{ColumnLayout, Row};
pub use measurement::{
    Measurement, MeasurementFunction, MeasureFn, PointFn, PointSet, PointSource, SetFn, Setter,
};
pub use crate::serde::{from_yaml_slice, stable_hash_string, to_canonical_json_bytes};
pub use value::Value;
