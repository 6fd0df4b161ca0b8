//! Spyview-compatible text output.
//!
//! A run produces up to three files next to each other:
//!
//! * `<stem>.dat`: header comments followed by tab separated rows, one blank
//!   line after every innermost pass;
//! * `<stem>.meta.txt`: axis extents and value column indices for spyview;
//! * `<stem>.json`: the station snapshot, when a station is registered.
//!
//! Lines end in CRLF, which is what spyview expects.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use indexmap::IndexMap;
use labsweep_core::{
    ColumnLayout, ErrorInfo, FixedSweep, ParamType, SweepError, Value, WaterfallContext,
};

use crate::backend::{DataBackend, ScopeExit};
use crate::location::DataLocation;

const EOL: &str = "\r\n";

#[derive(Debug, Clone)]
struct SpyColumn {
    label: String,
    fixed: Option<FixedSweep>,
}

#[derive(Debug)]
enum Target {
    Location(DataLocation),
    Stem(PathBuf),
}

/// Writes rows as spyview `.dat` plus `.meta.txt`.
///
/// Only numeric columns are supported. Fields are placed into a positional
/// line buffer by name; a slot keeps its last value across rows and is
/// written as `nan` until it is first set.
#[derive(Debug)]
pub struct SpyviewBackend {
    target: Target,
    stem: Option<PathBuf>,
    columns: Vec<SpyColumn>,
    lookup: IndexMap<String, usize>,
    line: Vec<Option<f64>>,
    writer: Option<BufWriter<File>>,
}

impl SpyviewBackend {
    /// Picks a fresh stem from `location` on every `enter`.
    pub fn new(location: DataLocation) -> Self {
        Self::with_target(Target::Location(location))
    }

    /// Writes to a fixed stem; existing files are overwritten.
    pub fn at(stem: impl Into<PathBuf>) -> Self {
        Self::with_target(Target::Stem(stem.into()))
    }

    fn with_target(target: Target) -> Self {
        Self {
            target,
            stem: None,
            columns: Vec::new(),
            lookup: IndexMap::new(),
            line: Vec::new(),
            writer: None,
        }
    }

    /// Stem of the current or most recent run.
    pub fn stem(&self) -> Option<&Path> {
        self.stem.as_deref()
    }

    fn resolve_stem(&self) -> Result<PathBuf, SweepError> {
        match &self.target {
            Target::Location(location) => location.next_stem(),
            Target::Stem(stem) => {
                if let Some(parent) = stem.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)
                        .map_err(|err| io_error("spyview-create", parent, err))?;
                }
                Ok(stem.clone())
            }
        }
    }

    fn header(&self, file_name: &str) -> (String, String) {
        let mut dat = String::new();
        let mut meta = String::new();
        dat.push_str(&format!("# Filename: {file_name}.dat{EOL}"));
        dat.push_str(&format!(
            "# Timestamp: {}{EOL}",
            Local::now().format("%a %b %e %H:%M:%S %Y")
        ));
        dat.push_str(EOL);
        for (idx, column) in self.columns.iter().enumerate() {
            dat.push_str(&format!("# Column {}:{EOL}", idx + 1));
            dat.push_str(&format!("#\tname: {}{EOL}", column.label));
            match &column.fixed {
                Some(fixed) => {
                    dat.push_str(&format!("#\ttype: coordinate{EOL}"));
                    dat.push_str(&format!("#\tstart: {}{EOL}", fixed.start));
                    dat.push_str(&format!("#\tend: {}{EOL}", fixed.stop));
                    dat.push_str(&format!("#\tsize: {}{EOL}", fixed.npoints));
                    // spyview flips the y axis of the second column
                    let (first, second) = if idx == 1 {
                        (&fixed.stop, &fixed.start)
                    } else {
                        (&fixed.start, &fixed.stop)
                    };
                    meta.push_str(&format!("{}{EOL}", fixed.npoints));
                    meta.push_str(&format!("{first}{EOL}{second}{EOL}"));
                    meta.push_str(&format!("{}{EOL}", column.label));
                }
                None => {
                    dat.push_str(&format!("#\ttype: value{EOL}"));
                    meta.push_str(&format!("{}{EOL}{}{EOL}", idx + 1, column.label));
                }
            }
        }
        dat.push_str(EOL);
        (dat, meta)
    }

    fn write_line(&mut self, line: &str, code: &str) -> Result<(), SweepError> {
        let Some(out) = self.writer.as_mut() else {
            return Err(SweepError::backend(
                "spyview-not-entered",
                "rows submitted outside the backend scope",
            ));
        };
        out.write_all(line.as_bytes())
            .and_then(|_| out.write_all(EOL.as_bytes()))
            .and_then(|_| out.flush())
            .map_err(|err| write_error(code, err))
    }
}

impl DataBackend for SpyviewBackend {
    fn name(&self) -> &str {
        "spyview"
    }

    fn setup(&mut self, layout: &ColumnLayout, _ctx: &WaterfallContext) -> Result<(), SweepError> {
        self.columns.clear();
        self.lookup.clear();
        for column in layout.registered() {
            if column.paramtype != ParamType::Numeric {
                return Err(SweepError::Config(
                    ErrorInfo::new("spyview-paramtype", "spyview only stores numeric columns")
                        .with_context("column", column.name.clone()),
                ));
            }
            let idx = self.columns.len();
            if self.lookup.insert(column.name.clone(), idx).is_some() {
                return Err(SweepError::Config(
                    ErrorInfo::new("spyview-duplicate-column", "multiple columns share one name")
                        .with_context("column", column.name.clone()),
                ));
            }
            self.columns.push(SpyColumn {
                label: column.label(),
                fixed: column
                    .fixed_sweep
                    .clone()
                    .filter(|_| column.independent.is_independent()),
            });
        }
        self.line = vec![None; self.columns.len()];
        tracing::debug!(columns = self.columns.len(), "spyview layout registered");
        Ok(())
    }

    fn enter(&mut self, ctx: &WaterfallContext) -> Result<(), SweepError> {
        let stem = self.resolve_stem()?;
        let file_name = stem
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (dat_header, meta) = self.header(&file_name);

        let meta_path = with_suffix(&stem, ".meta.txt");
        fs::write(&meta_path, meta).map_err(|err| io_error("spyview-meta", &meta_path, err))?;

        if let Some(station) = ctx.station() {
            let json_path = with_suffix(&stem, ".json");
            let bytes = serde_json::to_vec_pretty(&station.snapshot()).map_err(|err| {
                SweepError::Serde(
                    ErrorInfo::new("spyview-snapshot", "failed to encode station snapshot")
                        .with_context("station", station.name().to_string())
                        .with_hint(err.to_string()),
                )
            })?;
            fs::write(&json_path, bytes)
                .map_err(|err| io_error("spyview-snapshot", &json_path, err))?;
        }

        let dat_path = with_suffix(&stem, ".dat");
        let file = File::create(&dat_path).map_err(|err| io_error("spyview-open", &dat_path, err))?;
        let mut out = BufWriter::new(file);
        out.write_all(dat_header.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|err| io_error("spyview-header", &dat_path, err))?;

        tracing::info!(path = %dat_path.display(), "spyview file opened");
        self.line = vec![None; self.columns.len()];
        self.writer = Some(out);
        self.stem = Some(stem);
        Ok(())
    }

    fn add_field(&mut self, name: &str, value: &Value) -> Result<(), SweepError> {
        let Some(&idx) = self.lookup.get(name) else {
            return Err(SweepError::Backend(
                ErrorInfo::new("spyview-unknown-column", "field does not match a registered column")
                    .with_context("column", name.to_string()),
            ));
        };
        let Some(number) = value.as_f64() else {
            return Err(SweepError::Backend(
                ErrorInfo::new("spyview-paramtype", "spyview only stores numeric values")
                    .with_context("column", name.to_string())
                    .with_context("value", value.to_string()),
            ));
        };
        self.line[idx] = Some(number);
        Ok(())
    }

    fn commit_row(&mut self) -> Result<(), SweepError> {
        let record = self
            .line
            .iter()
            .map(|slot| slot.map_or_else(|| "nan".to_string(), |v| v.to_string()))
            .collect::<Vec<_>>()
            .join("\t");
        self.write_line(&record, "spyview-write-row")
    }

    fn commit_block(&mut self) -> Result<(), SweepError> {
        self.write_line("", "spyview-write-block")
    }

    fn exit(&mut self, outcome: ScopeExit<'_>) -> Result<(), SweepError> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        tracing::debug!(failed = outcome.is_failure(), "spyview file closed");
        writer
            .flush()
            .map_err(|err| write_error("spyview-flush", err))
    }
}

fn with_suffix(stem: &Path, suffix: &str) -> PathBuf {
    let mut path = stem.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}

fn io_error(code: &str, path: &Path, err: std::io::Error) -> SweepError {
    SweepError::Backend(
        ErrorInfo::new(code, "spyview file operation failed")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

fn write_error(code: &str, err: std::io::Error) -> SweepError {
    SweepError::Backend(ErrorInfo::new(code, "spyview data write failed").with_hint(err.to_string()))
}
