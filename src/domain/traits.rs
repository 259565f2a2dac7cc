// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer talks to data sources and fitted
// models only through these traits:
//   - ChannelReader  implements DatasetSource
//   - ForestModel    implements Classifier
//
// The Evaluator is generic over Classifier, so tests can feed
// it a fixed-answer stub instead of a trained forest.

use crate::domain::dataset::{Dataset, FeatureMatrix};
use crate::domain::error::Result;
use crate::domain::label::ClassLabel;

// ─── DatasetSource ────────────────────────────────────────────────────────────
/// Any component that can produce one Dataset.
pub trait DatasetSource {
    fn load(&self) -> Result<Dataset>;
}

// ─── Classifier ───────────────────────────────────────────────────────────────
/// A fitted, immutable classifier.
pub trait Classifier {
    /// Feature column order the classifier was trained on.
    fn feature_names(&self) -> &[String];

    /// One predicted label per row of `features`.
    /// Fails with an evaluation error if the columns don't match
    /// `feature_names()` exactly.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<ClassLabel>>;
}
