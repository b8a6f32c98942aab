use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Point / DataShape
// ---------------------------------------------------------------------------

/// One observation: ordered attribute values, `field_length` of them once a
/// dataset is loaded.
pub type Point = Vec<f32>;

/// Shape parameters shared by every routine operating on a loaded dataset.
///
/// Produced by the loader and threaded explicitly through normalization and
/// flattening calls, so there is no ordering dependency on hidden state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataShape {
    /// Attribute count per point.
    pub field_length: usize,
    /// Number of distinct class labels.
    pub num_classes: usize,
}

// ---------------------------------------------------------------------------
// ClassMap – label ↔ positional index
// ---------------------------------------------------------------------------

/// Bidirectional mapping between class labels and their positional indices.
///
/// Indices are assigned in first-seen order: the first label interned gets 0,
/// the next new label 1, and so on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMap {
    by_label: BTreeMap<String, usize>,
    labels: Vec<String>,
}

impl ClassMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index for `label`, assigning the next sequential index if
    /// the label has not been seen before.
    pub fn intern(&mut self, label: &str) -> usize {
        if let Some(&idx) = self.by_label.get(label) {
            return idx;
        }
        let idx = self.labels.len();
        self.by_label.insert(label.to_string(), idx);
        self.labels.push(label.to_string());
        idx
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.by_label.get(label).copied()
    }

    pub fn label_of(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Iterate `(label, index)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels.iter().enumerate().map(|(i, l)| (l.as_str(), i))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Dataset – class-partitioned point collection
// ---------------------------------------------------------------------------

/// Points partitioned by class: `classes[c]` holds every point of class `c`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub classes: Vec<Vec<Point>>,
}

impl Dataset {
    /// An empty dataset with `num_classes` empty class buckets.
    pub fn with_num_classes(num_classes: usize) -> Self {
        Dataset {
            classes: vec![Vec::new(); num_classes],
        }
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Total point count across all classes.
    pub fn num_points(&self) -> usize {
        self.classes.iter().map(Vec::len).sum()
    }

    /// True when no class holds any point.
    pub fn is_empty(&self) -> bool {
        self.classes.iter().all(Vec::is_empty)
    }

    /// Shape derived from the first point of the first class (attribute count
    /// is process-wide uniform once loaded; an empty dataset has length 0).
    pub fn shape(&self) -> DataShape {
        DataShape {
            field_length: self
                .classes
                .first()
                .and_then(|c| c.first())
                .map(Vec::len)
                .unwrap_or(0),
            num_classes: self.classes.len(),
        }
    }

    /// Iterate every point of every class.
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.classes.iter().flatten()
    }
}

// ---------------------------------------------------------------------------
// HyperBlock – a geometric classification region
// ---------------------------------------------------------------------------

/// A classification region bounded per attribute by one or more disjoint
/// closed intervals.
///
/// `minimums[i]` and `maximums[i]` are parallel: entry `j` of each is the
/// lower/upper bound of the `j`-th interval of attribute `i`. A simple
/// attribute has exactly one interval; a disjunctive attribute has several.
#[derive(Debug, Clone, PartialEq)]
pub struct HyperBlock {
    pub minimums: Vec<Vec<f32>>,
    pub maximums: Vec<Vec<f32>>,
    /// The class this block votes for.
    pub class_num: usize,
}

impl HyperBlock {
    pub fn new(minimums: Vec<Vec<f32>>, maximums: Vec<Vec<f32>>, class_num: usize) -> Self {
        debug_assert_eq!(minimums.len(), maximums.len());
        debug_assert!(minimums
            .iter()
            .zip(&maximums)
            .all(|(lo, hi)| lo.len() == hi.len()));
        HyperBlock {
            minimums,
            maximums,
            class_num,
        }
    }

    /// Build a block with exactly one interval per attribute.
    pub fn simple(mins: Vec<f32>, maxes: Vec<f32>, class_num: usize) -> Self {
        debug_assert_eq!(mins.len(), maxes.len());
        HyperBlock {
            minimums: mins.into_iter().map(|v| vec![v]).collect(),
            maximums: maxes.into_iter().map(|v| vec![v]).collect(),
            class_num,
        }
    }

    pub fn num_attributes(&self) -> usize {
        self.minimums.len()
    }

    /// True when every attribute carries exactly one interval, i.e. the block
    /// fits the fixed-width wire formats.
    pub fn is_simple(&self) -> bool {
        self.minimums.iter().all(|intervals| intervals.len() == 1)
    }
}

// ---------------------------------------------------------------------------
// PairBlockSet – a one-vs-one ensemble member
// ---------------------------------------------------------------------------

/// A set of hyperblocks restricted to two class labels, used for one-vs-one
/// multi-class decomposition. `class_a < class_b` by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PairBlockSet {
    pub class_a: usize,
    pub class_b: usize,
    pub blocks: Vec<HyperBlock>,
}
