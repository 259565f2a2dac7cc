// ============================================================
// Layer 3 — Pipeline Error Taxonomy
// ============================================================
// Every component below the CLI returns one of these.
// The CLI and application layers wrap them in anyhow with
// extra context, so a failure always reaches main() and the
// process exits non-zero with the failing stage in the message.
//
//   MissingChannelData → no CSV in a channel directory
//   ChannelRead        → CSV exists but could not be parsed
//   Split              → too few columns / non-numeric features
//   Training           → degenerate labels, shape mismatch, bad params
//   Evaluation         → feature order/count mismatch at predict time
//   ArtifactWrite      → model or metrics could not be persisted
//   ArtifactRead       → model could not be reloaded

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("MissingChannelDataError: no .csv file found in '{}'", dir.display())]
    MissingChannelData { dir: PathBuf },

    #[error("failed to read channel file '{}': {source}", path.display())]
    ChannelRead {
        path:   PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("SplitError: {0}")]
    Split(String),

    #[error("TrainingError: {0}")]
    Training(String),

    #[error("EvaluationError: {0}")]
    Evaluation(String),

    #[error("ArtifactWriteError: cannot write '{}': {source}", path.display())]
    ArtifactWrite {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot load artifact '{}': {source}", path.display())]
    ArtifactRead {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Short stage name, used as a structured field in log lines
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::MissingChannelData { .. } | PipelineError::ChannelRead { .. } => "read",
            PipelineError::Split(_)                 => "split",
            PipelineError::Training(_)              => "train",
            PipelineError::Evaluation(_)            => "evaluate",
            PipelineError::ArtifactWrite { .. }     => "persist",
            PipelineError::ArtifactRead { .. }      => "load",
        }
    }

    /// Wrap a serde_json failure as an IO-style write error for `path`
    pub fn write_json(path: impl Into<PathBuf>, err: serde_json::Error) -> Self {
        PipelineError::ArtifactWrite {
            path:   path.into(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
        }
    }

    /// Wrap a serde_json failure as an IO-style read error for `path`
    pub fn read_json(path: impl Into<PathBuf>, err: serde_json::Error) -> Self {
        PipelineError::ArtifactRead {
            path:   path.into(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
