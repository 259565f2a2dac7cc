// ============================================================
// Layer 4 — Feature / Label Splitter
// ============================================================
// Turns a Dataset into (FeatureMatrix, LabelVector):
//   - label column = `target` if the table has it,
//                    otherwise the last column
//   - features     = every other column, original order
//
// Feature columns must be numeric. A table with fewer than
// two columns has nothing left for features and is rejected.

use ndarray::Array2;

use crate::domain::dataset::{ColumnValues, Dataset, FeatureMatrix, LabelVector};
use crate::domain::error::{PipelineError, Result};

/// Split `dataset` into features and labels.
///
/// # Arguments
/// * `dataset` - The loaded table
/// * `target`  - Preferred label column; ignored when absent
pub fn split_features_label(
    dataset: &Dataset,
    target:  Option<&str>,
) -> Result<(FeatureMatrix, LabelVector)> {
    if dataset.n_cols() < 2 {
        return Err(PipelineError::Split(format!(
            "dataset has {} column(s) {:?}; need a label column plus at least one feature",
            dataset.n_cols(),
            dataset.column_names(),
        )));
    }

    let label_idx = match target.and_then(|t| dataset.position(t)) {
        Some(idx) => idx,
        None => {
            if let Some(t) = target {
                tracing::debug!("Target column '{}' not present, using last column", t);
            }
            dataset.n_cols() - 1
        }
    };

    let label_col = &dataset.columns()[label_idx];
    let labels    = LabelVector::new(label_col.name.clone(), label_col.values.to_labels());

    let mut feature_names = Vec::with_capacity(dataset.n_cols() - 1);
    let mut feature_cols: Vec<&[f64]> = Vec::with_capacity(dataset.n_cols() - 1);

    for (idx, col) in dataset.columns().iter().enumerate() {
        if idx == label_idx {
            continue;
        }
        match &col.values {
            ColumnValues::Numeric(v) => {
                if let Some(row) = v.iter().position(|x| !x.is_finite()) {
                    return Err(PipelineError::Split(format!(
                        "feature column '{}' has a non-finite value at row {}",
                        col.name, row
                    )));
                }
                feature_cols.push(v);
            }
            ColumnValues::Text(v) => {
                let bad = v.iter().find(|c| c.parse::<f64>().is_err()).cloned().unwrap_or_default();
                return Err(PipelineError::Split(format!(
                    "feature column '{}' is not numeric (found '{}')",
                    col.name, bad
                )));
            }
        }
        feature_names.push(col.name.clone());
    }

    let values = Array2::from_shape_fn((dataset.n_rows(), feature_cols.len()), |(r, c)| feature_cols[c][r]);

    Ok((FeatureMatrix::new(feature_names, values), labels))
}
