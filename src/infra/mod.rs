// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Durable outputs of a run:
//
//   model_store.rs — model.joblib + train_config.json in the
//                    model directory; also reloads the model
//                    for the predict command.
//
//   metrics.rs     — the evaluation metrics record and its
//                    writer (<output_dir>/metrics/evaluation.json)

/// Model artifact saving and loading
pub mod model_store;

/// Evaluation metrics record and JSON writer
pub mod metrics;
