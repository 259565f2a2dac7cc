// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal each:
//   - TrainUseCase   read → split → fit → evaluate → persist
//   - PredictUseCase load model → predict headerless rows
//
// No model math and no file formats here, only the order in
// which the other layers are called and the progress lines
// printed between them.

// The training + evaluation pipeline
pub mod train_use_case;

// Local inference against a persisted model
pub mod predict_use_case;
