// ============================================================
// Layer 6 — Evaluation Metrics Record + Writer
// ============================================================
// The metrics document written once per run, after evaluation:
//
//   <output_dir>/metrics/evaluation.json
//   {
//     "accuracy": 0.95,
//     "labels": ["0", "1"],
//     "confusion_matrix": [[9, 1], [0, 10]],
//     "classification_report": {
//       "0": {"precision": 1.0, "recall": 0.9, "f1-score": 0.947, "support": 10},
//       "1": {...},
//       "accuracy": 0.95,
//       "macro avg": {...},
//       "weighted avg": {...}
//     }
//   }
//
// Confusion matrix rows are true labels, columns are predicted
// labels, both in `labels` order (sorted ascending).

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::{fmt::Write as _, fs, path::{Path, PathBuf}};

use crate::domain::error::{PipelineError, Result};
use crate::domain::label::ClassLabel;

pub const METRICS_SUBDIR:  &str = "metrics";
pub const METRICS_FILE:    &str = "evaluation.json";

/// Precision / recall / F1 for one class or one average
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall:    f64,
    #[serde(rename = "f1-score")]
    pub f1:        f64,
    pub support:   usize,
}

/// Per-class scores plus macro and weighted averages.
/// Serialises as one flat JSON object keyed by class label.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub per_class:    Vec<(ClassLabel, ClassScores)>,
    pub accuracy:     f64,
    pub macro_avg:    ClassScores,
    pub weighted_avg: ClassScores,
}

impl Serialize for ClassificationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.per_class.len() + 3))?;
        for (label, scores) in &self.per_class {
            map.serialize_entry(label.as_str(), scores)?;
        }
        map.serialize_entry("accuracy", &self.accuracy)?;
        map.serialize_entry("macro avg", &self.macro_avg)?;
        map.serialize_entry("weighted avg", &self.weighted_avg)?;
        map.end()
    }
}

impl ClassificationReport {
    /// Plain-text table for the console summary
    pub fn to_table(&self) -> String {
        let width = self
            .per_class
            .iter()
            .map(|(l, _)| l.as_str().len())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);

        let mut out = String::new();
        let _ = writeln!(out, "{:>width$} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support");
        let row = |out: &mut String, name: &str, s: &ClassScores| {
            let _ = writeln!(
                out,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, s.precision, s.recall, s.f1, s.support
            );
        };
        for (label, scores) in &self.per_class {
            row(&mut out, label.as_str(), scores);
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        );
        row(&mut out, "macro avg", &self.macro_avg);
        row(&mut out, "weighted avg", &self.weighted_avg);
        out
    }
}

/// Everything the evaluator measured on the held-out set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationMetrics {
    pub accuracy:              f64,
    pub labels:                Vec<ClassLabel>,
    pub confusion_matrix:      Vec<Vec<u64>>,
    pub classification_report: ClassificationReport,
}

impl EvaluationMetrics {
    /// Number of held-out rows the metrics were computed over
    pub fn n_rows(&self) -> u64 {
        self.confusion_matrix.iter().flatten().sum()
    }
}

// ─── MetricsWriter ────────────────────────────────────────────────────────────
/// Writes the metrics document under `<output_dir>/metrics/`.
pub struct MetricsWriter {
    dir: PathBuf,
}

impl MetricsWriter {
    /// `output_dir` is the run's output root; the writer adds
    /// the `metrics/` subdirectory itself.
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self { dir: output_dir.as_ref().join(METRICS_SUBDIR) }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(METRICS_FILE)
    }

    /// Serialise `metrics` as pretty JSON. Creates the directory.
    pub fn write(&self, metrics: &EvaluationMetrics) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|source| PipelineError::ArtifactWrite {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path();
        let json = serde_json::to_string_pretty(metrics)
            .map_err(|e| PipelineError::write_json(&path, e))?;

        fs::write(&path, json).map_err(|source| PipelineError::ArtifactWrite {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("Wrote metrics to '{}'", path.display());
        Ok(path)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn scores(p: f64, r: f64, f: f64, s: usize) -> ClassScores {
        ClassScores { precision: p, recall: r, f1: f, support: s }
    }

    fn sample() -> EvaluationMetrics {
        EvaluationMetrics {
            accuracy: 0.75,
            labels:   vec![ClassLabel::from("0"), ClassLabel::from("1")],
            confusion_matrix: vec![vec![1, 1], vec![0, 2]],
            classification_report: ClassificationReport {
                per_class: vec![
                    (ClassLabel::from("0"), scores(1.0, 0.5, 2.0 / 3.0, 2)),
                    (ClassLabel::from("1"), scores(2.0 / 3.0, 1.0, 0.8, 2)),
                ],
                accuracy:     0.75,
                macro_avg:    scores(5.0 / 6.0, 0.75, 0.7333, 4),
                weighted_avg: scores(5.0 / 6.0, 0.75, 0.7333, 4),
            },
        }
    }

    #[test]
    fn test_report_json_layout() {
        let v = serde_json::to_value(sample()).unwrap();
        assert_eq!(v["accuracy"], 0.75);
        assert_eq!(v["confusion_matrix"][0][1], 1);
        assert_eq!(v["classification_report"]["1"]["support"], 2);
        assert_eq!(v["classification_report"]["0"]["recall"], 0.5);
        assert!(v["classification_report"]["macro avg"]["f1-score"].is_number());
        assert_eq!(v["classification_report"]["accuracy"], 0.75);
    }

    #[test]
    fn test_writer_creates_metrics_subdir() {
        let dir    = tempfile::tempdir().unwrap();
        let writer = MetricsWriter::new(dir.path());
        let path   = writer.write(&sample()).unwrap();

        assert_eq!(path, dir.path().join("metrics").join("evaluation.json"));
        let text: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(text["labels"][1], "1");
    }

    #[test]
    fn test_write_failure_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        // a regular file where the output directory should be
        let blocker = dir.path().join("out");
        fs::write(&blocker, "x").unwrap();

        let err = MetricsWriter::new(&blocker).write(&sample()).unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactWrite { .. }));
    }

    #[test]
    fn test_table_has_every_class() {
        let table = sample().classification_report.to_table();
        assert!(table.contains("weighted avg"));
        assert!(table.lines().count() >= 6);
    }
}
