//! Hyperblock serialization: four wire formats and one grouping transform.
//!
//! ```text
//!                      ┌──────────────┐
//!   Vec<HyperBlock> ──▶│  text codec  │──▶ min_0,…,max_{F-1},class rows
//!                      └──────────────┘
//!                      ┌──────────────┐
//!   Vec<HyperBlock> ──▶│ binary codec │──▶ [num][F] + fixed-width records
//!                      └──────────────┘
//! ```
//!
//! The one-to-one variants of both codecs serialize *sets* of blocks, one
//! set per class pair, for one-vs-one multi-class ensembles.
//!
//! The text and binary basic/one-to-one formats store exactly one interval
//! per attribute. Saving a disjunctive block through them is a checked
//! error ([`FormatError::DisjunctiveBlock`]), never a silent truncation.

pub mod binary;
pub mod text;

use std::collections::BTreeSet;

use thiserror::Error;

use crate::model::HyperBlock;

// ---------------------------------------------------------------------------
// Wire-contract violations
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The fixed-width formats hold one interval per attribute; writing a
    /// disjunctive block through them would drop data.
    #[error(
        "block {block}, attribute {attribute} has {intervals} intervals; \
         this format stores exactly one interval per attribute"
    )]
    DisjunctiveBlock {
        block: usize,
        attribute: usize,
        intervals: usize,
    },

    /// A block row must hold F mins, F maxes and a class label.
    #[error("hyperblock row {row} has {fields} fields; expected an odd count of at least 3")]
    MalformedRow { row: usize, fields: usize },
}

/// Check that every block fits the one-interval-per-attribute wire formats.
pub(crate) fn ensure_simple(blocks: &[HyperBlock]) -> Result<(), FormatError> {
    for (b, block) in blocks.iter().enumerate() {
        for (a, intervals) in block.minimums.iter().enumerate() {
            if intervals.len() != 1 {
                return Err(FormatError::DisjunctiveBlock {
                    block: b,
                    attribute: a,
                    intervals: intervals.len(),
                });
            }
        }
    }
    Ok(())
}

/// Derive the ordered `(class_a, class_b)` pair of a one-to-one set from its
/// member blocks. Warns when the set does not span exactly two labels and
/// continues with whatever was found (a single-class set degenerates to
/// `(a, a)`).
pub(crate) fn class_pair_of(blocks: &[HyperBlock]) -> (usize, usize) {
    let labels: BTreeSet<usize> = blocks.iter().map(|b| b.class_num).collect();
    if labels.len() != 2 {
        log::warn!(
            "Expected 2 classes in block set but found {}",
            labels.len()
        );
    }
    let mut iter = labels.into_iter();
    let a = iter.next().unwrap_or(0);
    let b = iter.next().unwrap_or(a);
    (a, b)
}

/// Build a single-interval block from one parsed row:
/// `min_0,…,min_{F-1},max_0,…,max_{F-1},class`.
pub(crate) fn block_from_row(mut values: Vec<f32>, row: usize) -> Result<HyperBlock, FormatError> {
    if values.len() < 3 || values.len() % 2 == 0 {
        return Err(FormatError::MalformedRow {
            row,
            fields: values.len(),
        });
    }

    let class_num = values[values.len() - 1] as usize;
    values.truncate(values.len() - 1);

    let num_attributes = values.len() / 2;
    let maxes = values.split_off(num_attributes);
    Ok(HyperBlock::simple(values, maxes, class_num))
}
