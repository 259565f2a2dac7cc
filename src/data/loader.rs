// ============================================================
// Layer 4 — Channel Reader
// ============================================================
// A channel is a named input ("train", "test") that the
// hosting environment mounts as a directory holding one CSV.
//
// Resolution rules:
//   - explicit filename given → load exactly <dir>/<file>
//   - otherwise               → the lexicographically smallest
//                               *.csv in <dir>
//   - nothing matches         → MissingChannelData naming the dir
//
// The csv crate parses the file; every record must have the
// header's width. Column types are inferred by Dataset.

use std::{fs, path::{Path, PathBuf}};

use crate::domain::dataset::Dataset;
use crate::domain::error::{PipelineError, Result};
use crate::domain::traits::DatasetSource;

const DATA_EXTENSION: &str = "csv";

/// Loads the single CSV behind one channel directory.
pub struct ChannelReader {
    /// Channel name, only used in log lines
    name: String,
    /// Directory the channel is mounted at
    dir:  PathBuf,
    /// Optional explicit filename inside `dir`
    file: Option<String>,
}

impl ChannelReader {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), dir: dir.into(), file: None }
    }

    /// Pin the channel to an explicit filename instead of discovery
    pub fn with_file(mut self, file: Option<String>) -> Self {
        self.file = file;
        self
    }

    /// The file this channel resolves to.
    pub fn resolve(&self) -> Result<PathBuf> {
        if let Some(file) = &self.file {
            let path = self.dir.join(file);
            if !path.is_file() {
                return Err(PipelineError::MissingChannelData { dir: path });
            }
            return Ok(path);
        }
        discover_csv(&self.dir)
    }
}

impl DatasetSource for ChannelReader {
    fn load(&self) -> Result<Dataset> {
        let path = self.resolve()?;
        tracing::info!(channel = %self.name, "Reading '{}'", path.display());

        let dataset = read_csv(&path)?;
        tracing::debug!(
            channel = %self.name,
            "Loaded {} rows x {} columns",
            dataset.n_rows(),
            dataset.n_cols()
        );
        Ok(dataset)
    }
}

/// Smallest *.csv filename in `dir`. A missing or unreadable
/// directory counts as "no data" for the channel.
fn discover_csv(dir: &Path) -> Result<PathBuf> {
    let missing = || PipelineError::MissingChannelData { dir: dir.to_path_buf() };

    let entries = fs::read_dir(dir).map_err(|e| {
        tracing::warn!("Cannot list channel directory '{}': {}", dir.display(), e);
        missing()
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(DATA_EXTENSION))
        .collect();

    candidates.sort();
    if candidates.len() > 1 {
        tracing::warn!(
            "{} CSV files in '{}', using the first by name",
            candidates.len(),
            dir.display()
        );
    }
    candidates.into_iter().next().ok_or_else(missing)
}

fn read_csv(path: &Path) -> Result<Dataset> {
    let read_err = |source: csv::Error| PipelineError::ChannelRead {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(read_err)?;

    let header: Vec<String> = reader
        .headers()
        .map_err(read_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(read_err)?;
        records.push(record.iter().map(str::to_string).collect());
    }

    Ok(Dataset::from_records(header, records))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::ColumnValues;

    #[test]
    fn test_loads_single_csv() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("train.csv"), "f1,f2,label\n1,2,0\n3,4,1\n").unwrap();

        let ds = ChannelReader::new("train", dir.path()).load().unwrap();
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.column_names(), vec!["f1", "f2", "label"]);
        assert_eq!(ds.columns()[1].values, ColumnValues::Numeric(vec![2.0, 4.0]));
    }

    #[test]
    fn test_empty_directory_is_missing_channel_data() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "not a table").unwrap();

        let err = ChannelReader::new("train", dir.path()).load().unwrap_err();
        match err {
            PipelineError::MissingChannelData { dir: d } => assert_eq!(d, dir.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nonexistent_directory_is_missing_channel_data() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");
        let err = ChannelReader::new("test", &gone).load().unwrap_err();
        assert!(matches!(err, PipelineError::MissingChannelData { .. }));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_discovery_picks_smallest_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "x,y\n1,1\n").unwrap();
        fs::write(dir.path().join("a.csv"), "x,y\n1,1\n2,2\n").unwrap();

        let reader = ChannelReader::new("train", dir.path());
        assert_eq!(reader.resolve().unwrap(), dir.path().join("a.csv"));
        assert_eq!(reader.load().unwrap().n_rows(), 2);
    }

    #[test]
    fn test_explicit_file_overrides_discovery() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "x,y\n1,1\n").unwrap();
        fs::write(dir.path().join("trainv1.csv"), "x,y\n1,1\n2,2\n3,3\n").unwrap();

        let reader = ChannelReader::new("train", dir.path()).with_file(Some("trainv1.csv".into()));
        assert_eq!(reader.load().unwrap().n_rows(), 3);

        let missing = ChannelReader::new("train", dir.path()).with_file(Some("testv1.csv".into()));
        assert!(matches!(missing.load(), Err(PipelineError::MissingChannelData { .. })));
    }

    #[test]
    fn test_ragged_rows_fail_to_read() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.csv"), "x,y\n1,1\n2\n").unwrap();
        let err = ChannelReader::new("train", dir.path()).load().unwrap_err();
        assert!(matches!(err, PipelineError::ChannelRead { .. }));
    }
}
