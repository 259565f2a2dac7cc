// ============================================================
// Layer 3 — Tabular Domain Types
// ============================================================
// Dataset        → named columns, one row per observation
// FeatureMatrix  → (rows × features) Array2<f64> + the column
//                  names in the order they were captured
// LabelVector    → one ClassLabel per row
//
// Column types are inferred once when the Dataset is built:
// a column is Numeric when every cell parses as f64,
// otherwise it is kept as Text.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::domain::label::ClassLabel;

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnValues {
    /// Raw text of every cell, used when the column becomes the label
    pub fn to_labels(&self) -> Vec<ClassLabel> {
        match self {
            ColumnValues::Numeric(v) => v.iter().map(|x| ClassLabel::new(format_number(*x))).collect(),
            ColumnValues::Text(v)    => v.iter().map(|s| ClassLabel::new(s.as_str())).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name:   String,
    pub values: ColumnValues,
}

/// An in-memory table. All columns have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    n_rows:  usize,
}

impl Dataset {
    /// Build a Dataset from a header and string records, inferring
    /// each column's type. Records must all be header-width.
    pub fn from_records(header: Vec<String>, records: Vec<Vec<String>>) -> Self {
        let n_rows = records.len();
        let columns = header
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let cells: Vec<String> = records.iter().map(|r| r[idx].trim().to_string()).collect();
                Column { name: name.trim().to_string(), values: infer_column(cells) }
            })
            .collect();
        Self { columns, n_rows }
    }

    pub fn n_rows(&self) -> usize { self.n_rows }

    pub fn n_cols(&self) -> usize { self.columns.len() }

    pub fn columns(&self) -> &[Column] { &self.columns }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

fn infer_column(cells: Vec<String>) -> ColumnValues {
    let parsed: Option<Vec<f64>> = cells.iter().map(|c| c.parse::<f64>().ok()).collect();
    match parsed {
        Some(values) => ColumnValues::Numeric(values),
        None         => ColumnValues::Text(cells),
    }
}

/// Integral floats print without a fractional part so a label
/// column holding "0"/"1" keeps those names after inference.
fn format_number(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{x}")
    }
}

// ─── FeatureMatrix ────────────────────────────────────────────────────────────
/// Feature values, one row per observation. `feature_names` is the
/// column order captured at split time and is part of the model
/// contract; it always has `values.ncols()` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    pub feature_names: Vec<String>,
    pub values:        Array2<f64>,
}

impl FeatureMatrix {
    pub fn new(feature_names: Vec<String>, values: Array2<f64>) -> Self {
        Self { feature_names, values }
    }

    pub fn view(&self) -> ArrayView2<'_, f64> { self.values.view() }

    pub fn n_rows(&self) -> usize { self.values.nrows() }

    pub fn n_features(&self) -> usize { self.feature_names.len() }

    /// (rows, columns), for progress output
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_features())
    }
}

// ─── LabelVector ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelVector {
    pub name:   String,
    pub values: Vec<ClassLabel>,
}

impl LabelVector {
    pub fn new(name: impl Into<String>, values: Vec<ClassLabel>) -> Self {
        Self { name: name.into(), values }
    }

    pub fn len(&self) -> usize { self.values.len() }
}
