// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `predict`, and all
// their flags. Directory flags fall back to the environment
// variables the hosting container sets, then to the container's
// standard paths:
//
//   flag            env                  fallback
//   --model-dir     SM_MODEL_DIR         /opt/ml/model
//   --train         SM_CHANNEL_TRAIN     /opt/ml/input/data/train
//   --test          SM_CHANNEL_TEST      /opt/ml/input/data/test
//   --output-dir    SM_OUTPUT_DATA_DIR   /opt/ml/output

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a random forest on the train channel and evaluate it on the test channel
    Train(TrainArgs),

    /// Predict headerless CSV rows with a persisted model
    Predict(PredictArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Number of trees in the forest
    #[arg(long, alias = "n_estimators", default_value_t = 300)]
    pub n_estimators: usize,

    /// Maximum tree depth, or `none` for unbounded
    #[arg(long, alias = "max_depth", default_value = "10", value_parser = parse_max_depth)]
    pub max_depth: MaxDepth,

    /// Seed for bootstrap and feature sampling
    #[arg(long, alias = "random_state", default_value_t = 42)]
    pub random_state: u64,

    /// Label column; the last column is used when the table lacks it
    #[arg(long, default_value = "price_range")]
    pub target: String,

    /// Where model.joblib is written
    #[arg(long, alias = "model_dir", env = "SM_MODEL_DIR", default_value = "/opt/ml/model")]
    pub model_dir: PathBuf,

    /// Train channel directory
    #[arg(long, env = "SM_CHANNEL_TRAIN", default_value = "/opt/ml/input/data/train")]
    pub train: PathBuf,

    /// Test channel directory
    #[arg(long, env = "SM_CHANNEL_TEST", default_value = "/opt/ml/input/data/test")]
    pub test: PathBuf,

    /// Output root; metrics land in <output-dir>/metrics/evaluation.json
    #[arg(long, alias = "output_dir", env = "SM_OUTPUT_DATA_DIR", default_value = "/opt/ml/output")]
    pub output_dir: PathBuf,

    /// Explicit training file inside the train channel (default: first *.csv by name)
    #[arg(long, alias = "train_file")]
    pub train_file: Option<String>,

    /// Explicit test file inside the test channel (default: first *.csv by name)
    #[arg(long, alias = "test_file")]
    pub test_file: Option<String>,

    /// Give up on the fit after this many seconds
    #[arg(long)]
    pub fit_timeout_secs: Option<u64>,
}

/// Tree depth cap as parsed from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxDepth(pub Option<usize>);

fn parse_max_depth(s: &str) -> Result<MaxDepth, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "none" | "unbounded" => Ok(MaxDepth(None)),
        n => match n.parse::<usize>() {
            Ok(0)  => Err("max depth must be at least 1 (use `none` for unbounded)".to_string()),
            Ok(d)  => Ok(MaxDepth(Some(d))),
            Err(_) => Err(format!("expected a positive integer or `none`, got '{s}'")),
        },
    }
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types or env vars.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            n_estimators:     a.n_estimators,
            max_depth:        a.max_depth.0,
            random_state:     a.random_state,
            target:           Some(a.target).filter(|t| !t.is_empty()),
            model_dir:        a.model_dir,
            train_dir:        a.train,
            test_dir:         a.test,
            output_dir:       a.output_dir,
            train_file:       a.train_file,
            test_file:        a.test_file,
            fit_timeout_secs: a.fit_timeout_secs,
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Directory holding model.joblib
    #[arg(long, env = "SM_MODEL_DIR", default_value = "/opt/ml/model")]
    pub model_dir: PathBuf,

    /// Headerless CSV file with one row per observation
    #[arg(long)]
    pub input: PathBuf,

    /// Write predictions here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}
