// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// Business logic is delegated to Layer 2 (application).
//
//   1. `train`   — read channels, fit, evaluate, persist
//   2. `predict` — load model.joblib and label headerless rows

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, PredictArgs, TrainArgs};

use crate::domain::error::PipelineError;

/// Top-level CLI; all work happens in a subcommand
#[derive(Parser, Debug)]
#[command(
    name = "forest-pipeline",
    version,
    about = "Train and evaluate a random forest classifier from CSV channels, then persist model and metrics."
)]
pub struct Cli {
    /// The subcommand to run (train or predict)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case. A failure is logged here,
    /// tagged with its pipeline stage, and then returned.
    pub fn run(self) -> Result<()> {
        let result = match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
        };

        if let Err(err) = &result {
            tracing::error!(stage = failure_stage(err), "Run failed: {err:#}");
        }
        result
    }
}

/// Pipeline stage that produced `err`; "cli" for anything else
fn failure_stage(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<PipelineError>().map_or("cli", PipelineError::stage)
}

/// Convert TrainArgs into a TrainConfig and run the pipeline.
fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::{TrainConfig, TrainUseCase};

    let config = TrainConfig::from(args);
    tracing::info!(
        train = %config.train_dir.display(),
        test  = %config.test_dir.display(),
        "Starting training run"
    );

    let summary = TrainUseCase::new(config).execute()?;
    println!(
        "Run complete. accuracy={:.4} model={} config={} metrics={}",
        summary.metrics.accuracy,
        summary.model_path.display(),
        summary.config_path.display(),
        summary.metrics_path.display()
    );
    Ok(())
}

/// Load the model and print (or write) one label per input row.
fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::{format_predictions, PredictUseCase};

    let use_case = PredictUseCase::new(&args.model_dir)?;
    let labels   = use_case.predict_file(&args.input)?;
    let body     = format_predictions(&labels);

    match &args.output {
        Some(path) => {
            std::fs::write(path, body)
                .with_context(|| format!("Cannot write predictions to '{}'", path.display()))?;
            tracing::info!("Wrote {} predictions to '{}'", labels.len(), path.display());
        }
        None => print!("{body}"),
    }
    Ok(())
}
