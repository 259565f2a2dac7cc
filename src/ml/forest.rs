// ============================================================
// Layer 5 — Fitted Forest Model
// ============================================================
// The immutable result of training: a bag of CART trees plus
// everything needed to use them later without the training
// data:
//   - feature_names  the training column order (checked on
//                    every predict call)
//   - classes        sorted class labels; tree leaf
//                    distributions index into this list
//   - params         hyperparameters the model was fitted with
//
// Prediction averages the trees' leaf distributions and picks
// the most probable class (first in sorted order on ties).

use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::dataset::FeatureMatrix;
use crate::domain::error::{PipelineError, Result};
use crate::domain::label::ClassLabel;
use crate::domain::traits::Classifier;
use crate::ml::trainer::ForestParams;
use crate::ml::tree::DecisionTree;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub(crate) feature_names: Vec<String>,
    pub(crate) classes:       Vec<ClassLabel>,
    pub(crate) params:        ForestParams,
    pub(crate) trees:         Vec<DecisionTree>,
}

impl ForestModel {
    pub fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean class distribution for one row
    pub fn predict_proba_row(&self, row: ArrayView1<'_, f64>) -> Vec<f64> {
        let mut acc = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (a, p) in acc.iter_mut().zip(tree.predict_proba(row.view())) {
                *a += p;
            }
        }
        let n = self.trees.len().max(1) as f64;
        acc.iter_mut().for_each(|a| *a /= n);
        acc
    }

    /// Predict rows that carry no column names (headerless input).
    /// Only the row width can be checked here.
    pub fn predict_rows(&self, rows: ArrayView2<'_, f64>) -> Result<Vec<ClassLabel>> {
        let expected = self.feature_names.len();
        if rows.ncols() != expected {
            return Err(PipelineError::Evaluation(format!(
                "rows have {} values, model expects {} features {:?}",
                rows.ncols(),
                expected,
                self.feature_names,
            )));
        }

        Ok((0..rows.nrows())
            .into_par_iter()
            .map(|i| self.classes[argmax(&self.predict_proba_row(rows.row(i)))].clone())
            .collect())
    }
}

impl Classifier for ForestModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<ClassLabel>> {
        if features.feature_names != self.feature_names {
            return Err(PipelineError::Evaluation(format!(
                "feature columns do not match the model: expected {} {:?}, found {} {:?}",
                self.feature_names.len(),
                self.feature_names,
                features.n_features(),
                features.feature_names,
            )));
        }
        self.predict_rows(features.view())
    }
}

/// Index of the largest value; earliest index wins ties
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
