// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing the core
// concepts: tables, labels, errors and the seams between
// layers. No file I/O and no model code lives here.

// Dataset, FeatureMatrix and LabelVector
pub mod dataset;

// Class labels and their stable ordering
pub mod label;

// The pipeline error taxonomy
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
