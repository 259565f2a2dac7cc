// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Takes a channel directory all the way to model-ready
// feature rows and labels:
//
//   channel dir
//       │
//       ▼
//   ChannelReader     → finds the CSV, parses it into a Dataset
//       │
//       ▼
//   splitter          → label column out, numeric features in order
//       │
//       ▼
//   (FeatureMatrix, LabelVector)

/// Resolves a channel directory to one CSV and loads it
pub mod loader;

/// Separates a Dataset into features and labels
pub mod splitter;
