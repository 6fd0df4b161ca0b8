//! Run-scoped state threaded through every callable of a sweep.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Lifecycle stage of a sweep, observable by callables and backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Before and during the init callable.
    #[default]
    Init,
    /// Inside the nested loops.
    Run,
    /// Loops finished, finalize running.
    Stop,
}

/// Session handle populated by the init callable.
///
/// Stands for whatever owns the instruments of a run. Backends may read it,
/// e.g. to store a snapshot of instrument settings next to the data.
pub trait Station {
    /// Identifier of the session, used in logs.
    fn name(&self) -> &str;

    /// Settings of every instrument, as JSON.
    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

/// Mutable mapping shared by init, setters, point sources, measurements and
/// finalize within one run.
#[derive(Default)]
pub struct WaterfallContext {
    status: Status,
    station: Option<Box<dyn Station>>,
    values: BTreeMap<String, Value>,
}

impl WaterfallContext {
    /// Creates an empty context in [`Status::Init`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle stage.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Moves the run to `status`. Reserved for the engine in practice.
    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Registers the session handle.
    pub fn set_station(&mut self, station: impl Station + 'static) {
        self.station = Some(Box::new(station));
    }

    /// Session handle, if init registered one.
    pub fn station(&self) -> Option<&dyn Station> {
        self.station.as_deref()
    }

    /// Stores a user value, returning the previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Looks up a user value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Looks up a numeric user value.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Removes a user value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Returns `true` if `key` holds a user value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// All user values, ordered by key.
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}

impl fmt::Debug for WaterfallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaterfallContext")
            .field("status", &self.status)
            .field("station", &self.station.as_ref().map(|s| s.name().to_string()))
            .field("values", &self.values)
            .finish()
    }
}
