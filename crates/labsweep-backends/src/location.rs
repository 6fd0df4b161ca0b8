use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use labsweep_core::{ErrorInfo, SweepError};

/// Picks file stems of the form `{root}/{date}/{date}_{counter:03}`.
///
/// The counter is one past the highest counter already present in the date
/// directory, starting at `001`. Stems carry no extension; each file backend
/// appends its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLocation {
    root: PathBuf,
}

impl DataLocation {
    /// Places data under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Next free stem for today, local time.
    pub fn next_stem(&self) -> Result<PathBuf, SweepError> {
        self.next_stem_on(Local::now().date_naive())
    }

    /// Next free stem for `date`. Creates the date directory.
    pub fn next_stem_on(&self, date: NaiveDate) -> Result<PathBuf, SweepError> {
        let date = date.format("%Y-%m-%d").to_string();
        let dir = self.root.join(&date);
        fs::create_dir_all(&dir).map_err(|err| {
            SweepError::Backend(
                ErrorInfo::new("location-create", "failed to create data directory")
                    .with_context("path", dir.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
        let prefix = format!("{date}_");
        let entries = fs::read_dir(&dir).map_err(|err| {
            SweepError::Backend(
                ErrorInfo::new("location-scan", "failed to list data directory")
                    .with_context("path", dir.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
        let highest = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let rest = name.strip_prefix(&prefix)?;
                let digits = rest.split('.').next()?;
                digits.parse::<u32>().ok()
            })
            .max()
            .unwrap_or(0);
        Ok(dir.join(format!("{date}_{:03}", highest + 1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_skips_past_existing_runs() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let location = DataLocation::new(tmp.path());
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).expect("date");

        let first = location.next_stem_on(date).expect("stem");
        assert_eq!(first, tmp.path().join("2024-03-07").join("2024-03-07_001"));

        fs::write(first.with_extension("dat"), b"").expect("write");
        fs::write(
            tmp.path().join("2024-03-07").join("2024-03-07_004.meta.txt"),
            b"",
        )
        .expect("write");
        let next = location.next_stem_on(date).expect("stem");
        assert_eq!(
            next.file_name().and_then(|n| n.to_str()),
            Some("2024-03-07_005")
        );
    }
}
