#![deny(missing_docs)]
//! Nested parameter sweeps for measurement automation.
//!
//! Up to three axes are iterated with `axis3` outermost and `axis1`
//! innermost. Each point produces one row, assembled from the axis
//! setpoints, whatever the setters and point sources return, and the values
//! of the measurement, and streamed to a [`labsweep_backends::DataBackend`].

mod axis;
mod config;
mod engine;
mod progress;
mod request;

pub use axis::{Parameter, SweepAxis};
pub use config::{ProgressConfig, SweepConfig};
pub use engine::{SweepEngine, SweepSummary};
pub use progress::{ProgressReport, ProgressTracker};
pub use request::{Hook, SweepRequest};
