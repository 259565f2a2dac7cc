// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Predicts the held-out rows and scores the predictions:
//
//   accuracy          = matches / rows
//   confusion matrix  = counts of (true, predicted) pairs over
//                       the sorted union of both label sets
//   per class         = precision, recall, F1, support
//   averages          = macro (unweighted) and weighted by support
//
// A class that is never predicted has precision 0, a class
// that never occurs has recall 0 (no division by zero).
// Every held-out row is scored exactly once.

use crate::domain::dataset::{FeatureMatrix, LabelVector};
use crate::domain::error::{PipelineError, Result};
use crate::domain::label::{encode_labels, sorted_labels, ClassLabel};
use crate::domain::traits::Classifier;
use crate::infra::metrics::{ClassScores, ClassificationReport, EvaluationMetrics};

/// Predict `x` with `model` and score against `y`.
pub fn evaluate<C: Classifier>(
    model: &C,
    x:     &FeatureMatrix,
    y:     &LabelVector,
) -> Result<(Vec<ClassLabel>, EvaluationMetrics)> {
    if x.n_rows() != y.len() {
        return Err(PipelineError::Evaluation(format!(
            "held-out set has {} feature rows but {} labels",
            x.n_rows(),
            y.len()
        )));
    }

    let predictions = model.predict(x)?;
    let metrics     = compute_metrics(&y.values, &predictions)?;
    Ok((predictions, metrics))
}

/// Score `y_pred` against `y_true`. Both must be the same,
/// non-zero length.
pub fn compute_metrics(y_true: &[ClassLabel], y_pred: &[ClassLabel]) -> Result<EvaluationMetrics> {
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::Evaluation(format!(
            "{} predictions for {} held-out rows",
            y_pred.len(),
            y_true.len()
        )));
    }
    if y_true.is_empty() {
        return Err(PipelineError::Evaluation("held-out set is empty".into()));
    }

    let labels = sorted_labels([y_true, y_pred]);
    let k      = labels.len();
    let (Some(true_idx), Some(pred_idx)) = (encode_labels(&labels, y_true), encode_labels(&labels, y_pred)) else {
        return Err(PipelineError::Evaluation("label outside the scored label set".into()));
    };

    let mut confusion = vec![vec![0u64; k]; k];
    for (t, p) in true_idx.into_iter().zip(pred_idx) {
        confusion[t][p] += 1;
    }

    let n        = y_true.len();
    let correct: u64 = (0..k).map(|i| confusion[i][i]).sum();
    let accuracy = correct as f64 / n as f64;

    let per_class: Vec<(ClassLabel, ClassScores)> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let tp        = confusion[i][i] as f64;
            let actual    = confusion[i].iter().sum::<u64>();
            let predicted = confusion.iter().map(|row| row[i]).sum::<u64>();

            let precision = ratio(tp, predicted as f64);
            let recall    = ratio(tp, actual as f64);
            let f1        = ratio(2.0 * precision * recall, precision + recall);
            (label.clone(), ClassScores { precision, recall, f1, support: actual as usize })
        })
        .collect();

    let macro_avg    = average(&per_class, |_| 1.0, n);
    let weighted_avg = average(&per_class, |s| s.support as f64, n);

    tracing::debug!("Scored {} rows over {} labels, accuracy={:.4}", n, k, accuracy);

    Ok(EvaluationMetrics {
        accuracy,
        labels,
        confusion_matrix: confusion,
        classification_report: ClassificationReport {
            per_class,
            accuracy,
            macro_avg,
            weighted_avg,
        },
    })
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

fn average(
    per_class: &[(ClassLabel, ClassScores)],
    weight:    impl Fn(&ClassScores) -> f64,
    support:   usize,
) -> ClassScores {
    let (mut total, mut precision, mut recall, mut f1) = (0.0, 0.0, 0.0, 0.0);
    for (_, s) in per_class {
        let w = weight(s);
        total     += w;
        precision += w * s.precision;
        recall    += w * s.recall;
        f1        += w * s.f1;
    }
    ClassScores {
        precision: ratio(precision, total),
        recall:    ratio(recall, total),
        f1:        ratio(f1, total),
        support,
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn labels(v: &[&str]) -> Vec<ClassLabel> {
        v.iter().map(|s| ClassLabel::from(*s)).collect()
    }

    /// Answers a fixed list regardless of input
    struct Fixed {
        names: Vec<String>,
        out:   Vec<ClassLabel>,
    }

    impl Classifier for Fixed {
        fn feature_names(&self) -> &[String] { &self.names }

        fn predict(&self, features: &FeatureMatrix) -> Result<Vec<ClassLabel>> {
            if features.feature_names != self.names {
                return Err(PipelineError::Evaluation("mismatch".into()));
            }
            Ok(self.out.clone())
        }
    }

    #[test]
    fn test_accuracy_is_match_fraction() {
        let m = compute_metrics(&labels(&["0", "1", "1", "0"]), &labels(&["0", "1", "0", "0"])).unwrap();
        assert_eq!(m.accuracy, 0.75);
    }

    #[test]
    fn test_confusion_sums_match_label_counts() {
        let t = labels(&["a", "b", "c", "a", "b", "a"]);
        let p = labels(&["a", "c", "c", "b", "b", "a"]);
        let m = compute_metrics(&t, &p).unwrap();

        assert_eq!(m.labels, labels(&["a", "b", "c"]));
        let row_sums: Vec<u64> = m.confusion_matrix.iter().map(|r| r.iter().sum()).collect();
        let col_sums: Vec<u64> = (0..3).map(|j| m.confusion_matrix.iter().map(|r| r[j]).sum()).collect();
        assert_eq!(row_sums, vec![3, 2, 1]);
        assert_eq!(col_sums, vec![2, 2, 2]);
        assert_eq!(m.n_rows(), 6);
    }

    #[test]
    fn test_never_predicted_class_scores_zero_precision() {
        let m = compute_metrics(&labels(&["0", "1"]), &labels(&["0", "0"])).unwrap();
        let (label, s) = &m.classification_report.per_class[1];
        assert_eq!(label.as_str(), "1");
        assert_eq!(s.precision, 0.0);
        assert_eq!(s.recall, 0.0);
        assert_eq!(s.f1, 0.0);
        assert_eq!(s.support, 1);
    }

    #[test]
    fn test_predicted_only_label_appears_in_matrix() {
        let m = compute_metrics(&labels(&["0", "0"]), &labels(&["0", "2"])).unwrap();
        assert_eq!(m.labels, labels(&["0", "2"]));
        assert_eq!(m.confusion_matrix, vec![vec![1, 1], vec![0, 0]]);
        assert_eq!(m.classification_report.per_class[1].1.support, 0);
    }

    #[test]
    fn test_macro_and_weighted_averages() {
        // class 0: p=1, r=1/3 ; class 1: p=0.5, r=1
        let m = compute_metrics(&labels(&["0", "0", "0", "1"]), &labels(&["0", "1", "1", "1"])).unwrap();
        let r = &m.classification_report;
        assert!((r.macro_avg.recall - (1.0 / 3.0 + 1.0) / 2.0).abs() < 1e-12);
        assert!((r.weighted_avg.recall - (3.0 * (1.0 / 3.0) + 1.0) / 4.0).abs() < 1e-12);
        assert_eq!(r.macro_avg.support, 4);
    }

    #[test]
    fn test_evaluate_propagates_feature_mismatch() {
        let model = Fixed { names: vec!["f1".into(), "f2".into()], out: labels(&["0"]) };
        let x = FeatureMatrix::new(vec!["f1".into()], ndarray::array![[1.0]]);
        let y = LabelVector::new("y", labels(&["0"]));
        assert!(matches!(evaluate(&model, &x, &y), Err(PipelineError::Evaluation(_))));
    }

    #[test]
    fn test_empty_holdout_rejected() {
        assert!(compute_metrics(&[], &[]).is_err());
    }
}
