use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use indexmap::IndexMap;
use labsweep_core::{ColumnLayout, ErrorInfo, SweepError, Value, WaterfallContext};

use crate::backend::{DataBackend, ScopeExit};
use crate::location::DataLocation;

#[derive(Debug)]
enum Target {
    Location(DataLocation),
    Path(PathBuf),
}

/// Flat CSV file with a `name (unit)` header and one record per row.
///
/// Only registered columns get a cell; a duplicate column overwrites the
/// cell of its registered namesake. Cells not set in a row stay empty.
#[derive(Debug)]
pub struct CsvBackend {
    target: Target,
    path: Option<PathBuf>,
    header: Vec<String>,
    lookup: IndexMap<String, usize>,
    record: Vec<String>,
    writer: Option<csv::Writer<BufWriter<File>>>,
}

impl CsvBackend {
    /// Writes to `<stem>.csv` with a fresh stem from `location` per run.
    pub fn new(location: DataLocation) -> Self {
        Self::with_target(Target::Location(location))
    }

    /// Writes to `path`, replacing any existing file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self::with_target(Target::Path(path.into()))
    }

    fn with_target(target: Target) -> Self {
        Self {
            target,
            path: None,
            header: Vec::new(),
            lookup: IndexMap::new(),
            record: Vec::new(),
            writer: None,
        }
    }

    /// File of the current or most recent run.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn resolve_path(&self) -> Result<PathBuf, SweepError> {
        match &self.target {
            Target::Location(location) => {
                let mut path = location.next_stem()?.into_os_string();
                path.push(".csv");
                Ok(PathBuf::from(path))
            }
            Target::Path(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(|err| {
                        SweepError::Backend(
                            ErrorInfo::new("csv-create", "failed to create output directory")
                                .with_context("path", parent.display().to_string())
                                .with_hint(err.to_string()),
                        )
                    })?;
                }
                Ok(path.clone())
            }
        }
    }

    fn writer(&mut self) -> Result<&mut csv::Writer<BufWriter<File>>, SweepError> {
        self.writer.as_mut().ok_or_else(|| {
            SweepError::backend("csv-not-entered", "rows submitted outside the backend scope")
        })
    }
}

impl DataBackend for CsvBackend {
    fn name(&self) -> &str {
        "csv"
    }

    fn setup(&mut self, layout: &ColumnLayout, _ctx: &WaterfallContext) -> Result<(), SweepError> {
        self.header = layout.registered().map(|c| c.label()).collect();
        self.lookup = layout
            .registered()
            .enumerate()
            .map(|(idx, c)| (c.name.clone(), idx))
            .collect();
        self.record = vec![String::new(); self.header.len()];
        Ok(())
    }

    fn enter(&mut self, _ctx: &WaterfallContext) -> Result<(), SweepError> {
        let path = self.resolve_path()?;
        let file = File::create(&path).map_err(|err| {
            SweepError::Backend(
                ErrorInfo::new("csv-open", "failed to open CSV output")
                    .with_context("path", path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));
        writer
            .write_record(&self.header)
            .map_err(|err| wrap_csv("csv-write-header", err))?;
        tracing::info!(path = %path.display(), "csv file opened");
        self.writer = Some(writer);
        self.path = Some(path);
        Ok(())
    }

    fn add_field(&mut self, name: &str, value: &Value) -> Result<(), SweepError> {
        let Some(&idx) = self.lookup.get(name) else {
            return Err(SweepError::Backend(
                ErrorInfo::new("csv-unknown-column", "field does not match a registered column")
                    .with_context("column", name.to_string()),
            ));
        };
        self.record[idx] = value.to_string();
        Ok(())
    }

    fn commit_row(&mut self) -> Result<(), SweepError> {
        let record = std::mem::replace(&mut self.record, vec![String::new(); self.header.len()]);
        self.writer()?
            .write_record(&record)
            .map_err(|err| wrap_csv("csv-write-row", err))
    }

    fn commit_block(&mut self) -> Result<(), SweepError> {
        self.writer()?
            .flush()
            .map_err(|err| wrap_csv("csv-flush", err.into()))
    }

    fn exit(&mut self, _outcome: ScopeExit<'_>) -> Result<(), SweepError> {
        match self.writer.take() {
            Some(mut writer) => writer
                .flush()
                .map_err(|err| wrap_csv("csv-flush", err.into())),
            None => Ok(()),
        }
    }
}

fn wrap_csv(code: &str, err: csv::Error) -> SweepError {
    SweepError::Backend(ErrorInfo::new(code, "CSV output failure").with_hint(err.to_string()))
}
