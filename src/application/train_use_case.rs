// ============================================================
// Layer 2 — TrainUseCase (Pipeline Driver)
// ============================================================
// Runs the whole batch pipeline, strictly in order:
//
//   Step 1: Read train channel        (Layer 4 - data)
//   Step 2: Read test channel         (Layer 4 - data)
//   Step 3: Split both into X / y     (Layer 4 - data)
//   Step 4: Fit the forest on train   (Layer 5 - ml)
//   Step 5: Evaluate on test          (Layer 5 - ml)
//   Step 6: Write metrics             (Layer 6 - infra)
//   Step 7: Write model + run config  (Layer 6 - infra)
//
// Any failure aborts the run. Metrics are written before the
// model, so model.joblib only appears after evaluation and the
// metrics write both succeeded. If the model write itself
// fails, evaluation.json for the unpublished model remains.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

use crate::data::{loader::ChannelReader, splitter::split_features_label};
use crate::domain::dataset::{FeatureMatrix, LabelVector};
use crate::domain::traits::DatasetSource;
use crate::infra::{
    metrics::{EvaluationMetrics, MetricsWriter},
    model_store::ModelStore,
};
use crate::ml::{
    evaluator::evaluate,
    trainer::{ForestParams, Trainer},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Built once by the CLI from flags > environment > fallbacks
// and handed to the use case by value. Saved next to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub n_estimators:     usize,
    pub max_depth:        Option<usize>,
    pub random_state:     u64,
    pub target:           Option<String>,
    pub model_dir:        PathBuf,
    pub train_dir:        PathBuf,
    pub test_dir:         PathBuf,
    pub output_dir:       PathBuf,
    pub train_file:       Option<String>,
    pub test_file:        Option<String>,
    pub fit_timeout_secs: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            n_estimators:     300,
            max_depth:        Some(10),
            random_state:     42,
            target:           Some("price_range".to_string()),
            model_dir:        PathBuf::from("/opt/ml/model"),
            train_dir:        PathBuf::from("/opt/ml/input/data/train"),
            test_dir:         PathBuf::from("/opt/ml/input/data/test"),
            output_dir:       PathBuf::from("/opt/ml/output"),
            train_file:       None,
            test_file:        None,
            fit_timeout_secs: None,
        }
    }
}

impl TrainConfig {
    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_estimators: self.n_estimators,
            max_depth:    self.max_depth,
            random_state: self.random_state,
        }
    }
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub model_path:   PathBuf,
    pub config_path:  PathBuf,
    pub metrics_path: PathBuf,
    pub metrics:      EvaluationMetrics,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full pipeline end to end
    pub fn execute(&self) -> Result<RunSummary> {
        let cfg = &self.config;

        // ── Step 1 + 2: Read both channels ────────────────────────────────────
        let train_df = ChannelReader::new("train", &cfg.train_dir)
            .with_file(cfg.train_file.clone())
            .load()
            .context("read stage failed for the train channel")?;
        let test_df = ChannelReader::new("test", &cfg.test_dir)
            .with_file(cfg.test_file.clone())
            .load()
            .context("read stage failed for the test channel")?;
        println!("Read {} training rows and {} test rows", train_df.n_rows(), test_df.n_rows());

        // ── Step 3: Split into features / label ───────────────────────────────
        let target = cfg.target.as_deref();
        let (x_train, y_train) = split_features_label(&train_df, target)
            .context("split stage failed for the train channel")?;
        let (x_test, y_test) = split_features_label(&test_df, target)
            .context("split stage failed for the test channel")?;
        report_split(&x_train, &y_train, &x_test, &y_test);

        // ── Step 4: Fit ───────────────────────────────────────────────────────
        println!("Training RandomForest model ({} trees)...", cfg.n_estimators);
        let budget = cfg.fit_timeout_secs.map(Duration::from_secs);
        let model  = Trainer::new(cfg.forest_params())
            .fit_with_budget(&x_train, &y_train, budget)
            .context("train stage failed")?;
        println!("Fitted {} trees over classes {:?}", model.n_trees(), model.classes());

        // ── Step 5: Evaluate ──────────────────────────────────────────────────
        let (_, metrics) = evaluate(&model, &x_test, &y_test).with_context(|| {
            format!("evaluate stage failed on test shape {:?}", x_test.shape())
        })?;
        println!();
        println!("---- METRICS ON TEST DATA ----");
        println!("Total rows:  {}", metrics.n_rows());
        println!("Accuracy:    {:.4}", metrics.accuracy);
        println!("{}", metrics.classification_report.to_table());

        // ── Step 6: Metrics first ─────────────────────────────────────────────
        let metrics_path = MetricsWriter::new(&cfg.output_dir)
            .write(&metrics)
            .context("persist stage failed writing metrics")?;
        println!("Metrics written to: {}", metrics_path.display());

        // ── Step 7: Model + config ────────────────────────────────────────────
        let store      = ModelStore::new(&cfg.model_dir);
        let model_path = store.save_model(&model).context("persist stage failed writing model")?;
        let config_path = store.save_config(cfg).context("persist stage failed writing config")?;
        println!("Model persisted at: {}", model_path.display());

        tracing::info!(accuracy = metrics.accuracy, "Pipeline finished");
        Ok(RunSummary { model_path, config_path, metrics_path, metrics })
    }
}

fn report_split(x_train: &FeatureMatrix, y_train: &LabelVector, x_test: &FeatureMatrix, y_test: &LabelVector) {
    println!("Column order: {:?}", x_train.feature_names);
    println!("Label column is: {}", y_train.name);
    println!("Train shape: X={:?} y=({},)", x_train.shape(), y_train.len());
    println!("Test shape:  X={:?} y=({},)", x_test.shape(), y_test.len());
    if y_test.name != y_train.name {
        tracing::warn!(
            "Label column differs between channels: train='{}' test='{}'",
            y_train.name,
            y_test.name
        );
    }
}
