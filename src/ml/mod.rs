// ============================================================
// Layer 5 — ML / Model Layer
// ============================================================
// Everything that knows how a random forest works lives here.
//
//   tree.rs      — a single CART classification tree
//                  (Gini impurity, flat node arena)
//
//   forest.rs    — the fitted, immutable ForestModel:
//                  trees + classes + training feature order,
//                  soft-vote prediction
//
//   trainer.rs   — bootstrap aggregation, seeded per tree,
//                  trees grown in parallel with rayon
//
//   evaluator.rs — predictions on held-out data and the
//                  accuracy / confusion matrix / report

/// Single CART decision tree
pub mod tree;

/// Fitted forest model and prediction
pub mod forest;

/// Forest fitting with seeded bootstrap sampling
pub mod trainer;

/// Held-out evaluation metrics
pub mod evaluator;
