//! Backend contract between the labsweep engine and row consumers, with
//! in-memory, logging, spyview and CSV backends.

pub mod backend;
pub mod composite;
pub mod csv_file;
pub mod debug;
pub mod list;
pub mod location;
pub mod spyview;

pub use backend::{DataBackend, ScopeExit};
pub use composite::CompositeBackend;
pub use csv_file::CsvBackend;
pub use debug::DebugBackend;
pub use list::{ExitRecord, ListBackend};
pub use location::DataLocation;
pub use spyview::SpyviewBackend;
