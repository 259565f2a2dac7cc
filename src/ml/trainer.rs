// ============================================================
// Layer 5 — Forest Trainer
// ============================================================
// Fits a bootstrap-aggregated ensemble of CART trees.
//
// Per tree:
//   1. draw n row indices with replacement (bootstrap sample)
//   2. grow a tree, considering sqrt(n_features) random
//      features at every split
//
// Determinism: one u64 seed per tree is drawn up front from a
// ChaCha8Rng seeded with `random_state`. Trees are then grown
// in parallel on rayon's pool (one worker per core); each tree
// only touches its own RNG, so the result does not depend on
// scheduling.
//
// Optional wall-clock budget: `fit_with_budget` runs the fit
// on a worker thread and gives up waiting after the budget.
// The worker cannot be cancelled, it is simply abandoned.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::dataset::{FeatureMatrix, LabelVector};
use crate::domain::error::{PipelineError, Result};
use crate::domain::label::{encode_labels, sorted_labels};
use crate::ml::forest::ForestModel;
use crate::ml::tree::{DecisionTree, TreeParams};

// ─── Hyperparameters ──────────────────────────────────────────────────────────
/// Fixed before fitting and stored inside the fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees in the ensemble
    pub n_estimators: usize,
    /// Depth cap per tree; None grows until leaves are pure
    pub max_depth:    Option<usize>,
    /// Seed for bootstrap sampling and feature sampling
    pub random_state: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 300,
            max_depth:    Some(10),
            random_state: 42,
        }
    }
}

// ─── Trainer ──────────────────────────────────────────────────────────────────
pub struct Trainer {
    params: ForestParams,
}

impl Trainer {
    pub fn new(params: ForestParams) -> Self {
        Self { params }
    }

    /// Fit a forest on `x` / `y`.
    pub fn fit(&self, x: &FeatureMatrix, y: &LabelVector) -> Result<ForestModel> {
        self.validate(x, y)?;

        let classes = sorted_labels([y.values.as_slice()]);
        let targets = encode_labels(&classes, &y.values).ok_or_else(|| {
            PipelineError::Training(format!("label column '{}' does not match its own class set", y.name))
        })?;

        let n_rows     = x.n_rows();
        let n_features = x.n_features();
        let tree_params = TreeParams {
            max_depth:         self.params.max_depth,
            max_features:      ((n_features as f64).sqrt() as usize).max(1),
            min_samples_split: 2,
            min_samples_leaf:  1,
        };

        tracing::info!(
            n_estimators = self.params.n_estimators,
            max_depth    = ?self.params.max_depth,
            random_state = self.params.random_state,
            threads      = rayon::current_num_threads(),
            "Fitting forest on {} rows x {} features, {} classes",
            n_rows,
            n_features,
            classes.len()
        );

        let mut master = ChaCha8Rng::seed_from_u64(self.params.random_state);
        let seeds: Vec<u64> = (0..self.params.n_estimators).map(|_| master.gen()).collect();

        let trees: Vec<DecisionTree> = seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let bootstrap: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
                DecisionTree::fit(x.view(), &targets, &bootstrap, classes.len(), tree_params, &mut rng)
            })
            .collect();

        let deepest = trees.iter().map(DecisionTree::depth).max().unwrap_or(0);
        let nodes: usize = trees.iter().map(DecisionTree::n_nodes).sum();
        tracing::debug!(
            "Forest fitted: {} trees, {} nodes, deepest tree {} levels",
            trees.len(),
            nodes,
            deepest
        );

        Ok(ForestModel {
            feature_names: x.feature_names.clone(),
            classes,
            params: self.params,
            trees,
        })
    }

    /// Like `fit`, but stop waiting after `budget`.
    /// With no budget this is a plain synchronous `fit`.
    pub fn fit_with_budget(
        &self,
        x:      &FeatureMatrix,
        y:      &LabelVector,
        budget: Option<Duration>,
    ) -> Result<ForestModel> {
        let Some(budget) = budget else {
            return self.fit(x, y);
        };

        let (tx, rx) = mpsc::channel();
        let trainer  = Trainer::new(self.params);
        let (x, y)   = (x.clone(), y.clone());
        thread::spawn(move || {
            // receiver may be gone after a timeout
            let _ = tx.send(trainer.fit(&x, &y));
        });

        match rx.recv_timeout(budget) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(PipelineError::Training(format!(
                "fit did not finish within {:.1}s",
                budget.as_secs_f64()
            ))),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(PipelineError::Training(
                "training worker exited without a result".to_string(),
            )),
        }
    }

    fn validate(&self, x: &FeatureMatrix, y: &LabelVector) -> Result<()> {
        if self.params.n_estimators == 0 {
            return Err(PipelineError::Training("n_estimators must be at least 1".into()));
        }
        if self.params.max_depth == Some(0) {
            return Err(PipelineError::Training("max_depth must be at least 1".into()));
        }
        if x.n_rows() != y.len() {
            return Err(PipelineError::Training(format!(
                "feature matrix has {} rows but label vector has {}",
                x.n_rows(),
                y.len()
            )));
        }
        if x.values.ncols() != x.n_features() {
            return Err(PipelineError::Training(format!(
                "{} feature names for {} feature columns",
                x.n_features(),
                x.values.ncols()
            )));
        }
        if x.n_features() == 0 {
            return Err(PipelineError::Training("feature matrix has no columns".into()));
        }
        let distinct = sorted_labels([y.values.as_slice()]);
        if distinct.len() < 2 {
            return Err(PipelineError::Training(format!(
                "label column '{}' has {} distinct class(es) {:?}; need at least 2",
                y.name,
                distinct.len(),
                distinct.iter().map(|l| l.as_str()).collect::<Vec<_>>(),
            )));
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::label::ClassLabel;
    use crate::domain::traits::Classifier;
    use ndarray::{array, Array2};

    /// Two gaussian-ish blobs, deterministic, label = which blob
    fn blobs(n: usize, seed: u64) -> (FeatureMatrix, LabelVector) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut values = Array2::<f64>::zeros((n, 2));
        let mut labels = Vec::with_capacity(n);
        for i in 0..n {
            let class  = i % 2;
            let centre = if class == 0 { -2.0 } else { 2.0 };
            values[[i, 0]] = centre + rng.gen_range(-1.5..1.5);
            values[[i, 1]] = rng.gen_range(-1.0..1.0);
            labels.push(ClassLabel::new(class.to_string()));
        }
        (
            FeatureMatrix::new(vec!["f1".into(), "f2".into()], values),
            LabelVector::new("label", labels),
        )
    }

    fn params(n: usize) -> ForestParams {
        ForestParams { n_estimators: n, max_depth: Some(10), random_state: 42 }
    }

    #[test]
    fn test_fit_learns_separable_blobs() {
        let (x, y)   = blobs(100, 1);
        let model    = Trainer::new(params(10)).fit(&x, &y).unwrap();
        let (xt, yt) = blobs(40, 2);
        let pred     = model.predict(&xt).unwrap();

        let correct = pred.iter().zip(&yt.values).filter(|(p, t)| p == t).count();
        assert!(correct >= 36, "only {correct}/40 correct");
        assert_eq!(model.n_trees(), 10);
        assert_eq!(model.classes(), &[ClassLabel::from("0"), ClassLabel::from("1")]);
    }

    #[test]
    fn test_same_seed_same_predictions() {
        let (x, y)  = blobs(80, 3);
        let (xt, _) = blobs(30, 4);
        let a = Trainer::new(params(15)).fit(&x, &y).unwrap();
        let b = Trainer::new(params(15)).fit(&x, &y).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.predict(&xt).unwrap(), b.predict(&xt).unwrap());
    }

    #[test]
    fn test_single_class_is_training_error() {
        let x = FeatureMatrix::new(vec!["f".into()], array![[1.0], [2.0]]);
        let y = LabelVector::new("y", vec![ClassLabel::from("a"), ClassLabel::from("a")]);
        let err = Trainer::new(params(3)).fit(&x, &y).unwrap_err();
        assert!(matches!(err, PipelineError::Training(_)));
    }

    #[test]
    fn test_row_count_mismatch_is_training_error() {
        let x = FeatureMatrix::new(vec!["f".into()], array![[1.0], [2.0], [3.0]]);
        let y = LabelVector::new("y", vec![ClassLabel::from("a"), ClassLabel::from("b")]);
        let err = Trainer::new(params(3)).fit(&x, &y).unwrap_err();
        assert!(err.to_string().contains("3 rows"));
    }

    #[test]
    fn test_zero_estimators_rejected() {
        let (x, y) = blobs(10, 5);
        assert!(Trainer::new(params(0)).fit(&x, &y).is_err());
    }

    #[test]
    fn test_unbounded_depth_fits_training_set() {
        let (x, y) = blobs(60, 6);
        let p = ForestParams { n_estimators: 25, max_depth: None, random_state: 7 };
        let model = Trainer::new(p).fit(&x, &y).unwrap();
        let pred  = model.predict(&x).unwrap();
        let correct = pred.iter().zip(&y.values).filter(|(p, t)| p == t).count();
        assert!(correct >= 57);
    }

    #[test]
    fn test_budget_path_matches_plain_fit() {
        let (x, y) = blobs(50, 8);
        let trainer = Trainer::new(params(5));
        let plain   = trainer.fit(&x, &y).unwrap();
        let budget  = trainer.fit_with_budget(&x, &y, Some(Duration::from_secs(60))).unwrap();
        assert_eq!(plain, budget);
    }

    #[test]
    fn test_budget_exceeded_is_training_error() {
        let (x, y) = blobs(2_000, 9);
        let p = ForestParams { n_estimators: 200, max_depth: None, random_state: 1 };
        let err = Trainer::new(p).fit_with_budget(&x, &y, Some(Duration::ZERO)).unwrap_err();
        assert!(matches!(err, PipelineError::Training(_)));
        assert!(err.to_string().contains("did not finish"));
    }

    #[test]
    fn test_names_must_cover_every_column() {
        let x = FeatureMatrix::new(vec!["f".into()], array![[1.0, 2.0], [3.0, 4.0]]);
        let y = LabelVector::new("y", vec![ClassLabel::from("a"), ClassLabel::from("b")]);
        let err = Trainer::new(params(3)).fit(&x, &y).unwrap_err();
        assert!(matches!(err, PipelineError::Training(_)));
    }
}
