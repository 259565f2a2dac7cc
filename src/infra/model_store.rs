// ============================================================
// Layer 6 — Model Store
// ============================================================
// Persists the fitted forest for the serving side to pick up.
//
// Files written into the model directory:
//   model.joblib       ← the ForestModel as JSON (trees, classes,
//                        feature order, hyperparameters). The
//                        filename is what the deployment side
//                        looks for; do not rename it.
//   train_config.json  ← the TrainConfig of the run
//
// The feature column order is stored inside model.joblib and
// checked again on every predict call after reloading.

use serde::Serialize;
use std::{fs, path::{Path, PathBuf}};

use crate::domain::error::{PipelineError, Result};
use crate::ml::forest::ForestModel;

pub const MODEL_FILE:  &str = "model.joblib";
pub const CONFIG_FILE: &str = "train_config.json";

/// Saves and loads the model artifact in one directory.
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    /// Write the model as one whole file. Creates the directory.
    pub fn save_model(&self, model: &ForestModel) -> Result<PathBuf> {
        let path = self.model_path();
        self.write_json(&path, model, false)?;
        tracing::debug!("Saved {} trees to '{}'", model.n_trees(), path.display());
        Ok(path)
    }

    /// Reload a model written by `save_model`.
    pub fn load_model(&self) -> Result<ForestModel> {
        let path = self.model_path();
        let json = fs::read_to_string(&path).map_err(|source| PipelineError::ArtifactRead {
            path: path.clone(),
            source,
        })?;
        let model: ForestModel =
            serde_json::from_str(&json).map_err(|e| PipelineError::read_json(&path, e))?;

        tracing::info!(
            "Loaded model from '{}' ({} trees, features {:?})",
            path.display(),
            model.n_trees(),
            model.feature_names
        );
        Ok(model)
    }

    /// Save the run configuration next to the model.
    pub fn save_config<C: Serialize>(&self, cfg: &C) -> Result<PathBuf> {
        let path = self.dir.join(CONFIG_FILE);
        self.write_json(&path, cfg, true)?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(path)
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T, pretty: bool) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| PipelineError::ArtifactWrite {
            path: self.dir.clone(),
            source,
        })?;

        let json = if pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .map_err(|e| PipelineError::write_json(path, e))?;

        fs::write(path, json).map_err(|source| PipelineError::ArtifactWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::{FeatureMatrix, LabelVector};
    use crate::domain::label::ClassLabel;
    use crate::domain::traits::Classifier;
    use crate::ml::trainer::{ForestParams, Trainer};
    use ndarray::Array2;

    fn small_model() -> (ForestModel, FeatureMatrix) {
        let rows = Array2::from_shape_fn((40, 2), |(i, j)| if j == 0 { i as f64 } else { (i % 7) as f64 });
        let labels = (0..40).map(|i| ClassLabel::new(if i < 20 { "low" } else { "high" })).collect();
        let x = FeatureMatrix::new(vec!["a".into(), "b".into()], rows);
        let y = LabelVector::new("band", labels);
        let params = ForestParams { n_estimators: 8, max_depth: Some(4), random_state: 42 };
        (Trainer::new(params).fit(&x, &y).unwrap(), x)
    }

    #[test]
    fn test_round_trip_predicts_identically() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("model"));
        let (model, x) = small_model();

        let path = store.save_model(&model).unwrap();
        assert_eq!(path.file_name().unwrap(), "model.joblib");

        let reloaded = store.load_model().unwrap();
        assert_eq!(reloaded.feature_names(), model.feature_names());
        assert_eq!(reloaded.predict(&x).unwrap(), model.predict(&x).unwrap());
    }

    #[test]
    fn test_missing_model_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelStore::new(dir.path()).load_model().unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactRead { .. }));
    }

    #[test]
    fn test_config_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        let path = store.save_config(&ForestParams::default()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(v["n_estimators"], 300);
    }
}
