// ============================================================
// Layer 3 — Class Label Domain Type
// ============================================================
// A class label is the raw text of a cell in the label column.
// Labels need a stable ascending order for the confusion matrix
// and the classification report:
//   - both labels numeric → compare by value ("2" < "10")
//   - both labels text    → compare as strings
//   - numeric vs text     → numeric sorts first
// Ties in value ("1" vs "1.0") fall back to string order so
// Ord stays consistent with Eq.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassLabel(String);

impl ClassLabel {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|v| !v.is_nan())
    }
}

impl Ord for ClassLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.total_cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None)    => Ordering::Less,
            (None, Some(_))    => Ordering::Greater,
            (None, None)       => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for ClassLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassLabel {
    fn from(s: &str) -> Self {
        ClassLabel::new(s)
    }
}

/// Sorted, de-duplicated label set over one or more label slices.
pub fn sorted_labels<'a>(sets: impl IntoIterator<Item = &'a [ClassLabel]>) -> Vec<ClassLabel> {
    let mut labels: Vec<ClassLabel> = sets.into_iter().flatten().cloned().collect();
    labels.sort();
    labels.dedup();
    labels
}

/// Position of every value in `classes`. None when a value is not
/// one of the classes.
pub fn encode_labels(classes: &[ClassLabel], values: &[ClassLabel]) -> Option<Vec<usize>> {
    let index: HashMap<&ClassLabel, usize> = classes.iter().enumerate().map(|(i, l)| (l, i)).collect();
    values.iter().map(|l| index.get(l).copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_labels_sort_by_value() {
        let mut v: Vec<ClassLabel> = ["10", "2", "1"].iter().map(|s| ClassLabel::from(*s)).collect();
        v.sort();
        let got: Vec<&str> = v.iter().map(|l| l.as_str()).collect();
        assert_eq!(got, vec!["1", "2", "10"]);
    }

    #[test]
    fn test_text_labels_after_numeric() {
        let mut v: Vec<ClassLabel> = ["cat", "3", "ant"].iter().map(|s| ClassLabel::from(*s)).collect();
        v.sort();
        let got: Vec<&str> = v.iter().map(|l| l.as_str()).collect();
        assert_eq!(got, vec!["3", "ant", "cat"]);
    }

    #[test]
    fn test_sorted_labels_dedups_union() {
        let a = vec![ClassLabel::from("1"), ClassLabel::from("0")];
        let b = vec![ClassLabel::from("2"), ClassLabel::from("0")];
        let all = sorted_labels([a.as_slice(), b.as_slice()]);
        assert_eq!(all, vec![ClassLabel::from("0"), ClassLabel::from("1"), ClassLabel::from("2")]);
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(ClassLabel::new(" 1 "), ClassLabel::from("1"));
    }

    #[test]
    fn test_encode_labels_by_position() {
        let classes = vec![ClassLabel::from("0"), ClassLabel::from("1"), ClassLabel::from("10")];
        let values  = vec![ClassLabel::from("10"), ClassLabel::from("0"), ClassLabel::from("10")];
        assert_eq!(encode_labels(&classes, &values), Some(vec![2, 0, 2]));
    }

    #[test]
    fn test_encode_unknown_label_is_none() {
        let classes = vec![ClassLabel::from("0"), ClassLabel::from("1")];
        assert_eq!(encode_labels(&classes, &[ClassLabel::from("2")]), None);
    }
}
