// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Local stand-in for the serving side:
//   1. load model.joblib from the model directory
//   2. read headerless comma-delimited rows
//   3. predict one label per row
//   4. write labels as delimited text, one per line
//
// Rows carry no column names, so only the row width can be
// checked against the model's training feature list.

use anyhow::{Context, Result};
use ndarray::Array2;
use std::{fs, io::Read, path::{Path, PathBuf}};

use crate::domain::error::PipelineError;
use crate::domain::label::ClassLabel;
use crate::domain::traits::Classifier;
use crate::infra::model_store::ModelStore;
use crate::ml::forest::ForestModel;

pub struct PredictUseCase {
    model: ForestModel,
}

impl PredictUseCase {
    /// Load the model once; predictions reuse it.
    pub fn new(model_dir: impl Into<PathBuf>) -> Result<Self> {
        let model_dir = model_dir.into();
        let model = ModelStore::new(&model_dir)
            .load_model()
            .with_context(|| format!("load stage failed for '{}'", model_dir.display()))?;
        tracing::debug!(
            params   = ?model.params(),
            features = ?model.feature_names(),
            "Model ready for prediction"
        );
        Ok(Self { model })
    }

    #[cfg(test)]
    pub fn from_model(model: ForestModel) -> Self {
        Self { model }
    }

    /// Predict every row of a headerless CSV file
    pub fn predict_file(&self, input: &Path) -> Result<Vec<ClassLabel>> {
        let text = fs::read_to_string(input)
            .with_context(|| format!("Cannot read '{}'", input.display()))?;
        self.predict_csv(text.as_bytes())
    }

    /// Predict every row of headerless CSV read from `reader`
    pub fn predict_csv<R: Read>(&self, reader: R) -> Result<Vec<ClassLabel>> {
        let rows = parse_rows(reader, self.model.feature_names().len())?;
        tracing::info!("Predicting {} rows", rows.nrows());
        let labels = self.model.predict_rows(rows.view()).context("predict stage failed")?;
        Ok(labels)
    }
}

/// Labels as response text, one per line
pub fn format_predictions(labels: &[ClassLabel]) -> String {
    let mut out = String::with_capacity(labels.len() * 2);
    for l in labels {
        out.push_str(l.as_str());
        out.push('\n');
    }
    out
}

/// Parse rows into a (rows × width) matrix; every row must have
/// exactly `width` numeric cells.
fn parse_rows<R: Read>(reader: R, width: usize) -> Result<Array2<f64>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut flat   = Vec::new();
    let mut n_rows = 0;
    for (i, record) in csv.records().enumerate() {
        let record = record.context("malformed request row")?;
        if record.len() != width {
            return Err(PipelineError::Evaluation(format!(
                "row {i} has {} values, model expects {width} features",
                record.len()
            ))
            .into());
        }
        for (j, cell) in record.iter().enumerate() {
            let value = cell.parse::<f64>().map_err(|_| {
                PipelineError::Evaluation(format!("row {i} column {j}: '{cell}' is not numeric"))
            })?;
            flat.push(value);
        }
        n_rows += 1;
    }
    let rows = Array2::from_shape_vec((n_rows, width), flat).context("request rows do not form a matrix")?;
    Ok(rows)
}
