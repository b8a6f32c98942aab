//! Flattening encoders: parallel flat arrays for bulk numeric kernels.
//!
//! The two block encodings are independent, non-interchangeable formats.
//! [`flatten_interleaved`] embeds interval counts in the value streams and
//! pads the block edges; [`flatten_with_counts`] keeps the counts in a
//! separate array and leaves the edges unpadded. The differences are
//! load-bearing for the consuming kernels; do not unify them.

use crate::model::{Dataset, HyperBlock};

// ---------------------------------------------------------------------------
// Result layouts
// ---------------------------------------------------------------------------

/// Block collection flattened with interval counts interleaved into the
/// value streams.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatBlocks {
    pub flat_mins: Vec<f32>,
    pub flat_maxes: Vec<f32>,
    /// Cumulative block offsets, length `num_blocks + 1`.
    pub block_edges: Vec<f32>,
    /// Class label per block, length `num_blocks`.
    pub block_classes: Vec<f32>,
}

/// Block collection flattened with interval counts in a parallel array.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatBlocksWithCounts {
    pub flat_mins: Vec<f32>,
    pub flat_maxes: Vec<f32>,
    /// Cumulative block offsets, length `num_blocks + 1`.
    pub block_edges: Vec<f32>,
    /// Class label per block, length `num_blocks`.
    pub block_classes: Vec<f32>,
    /// Intervals per attribute, length `num_blocks * field_length`.
    pub interval_counts: Vec<f32>,
}

/// A whole dataset flattened into one value stream with class boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatDataset {
    pub values: Vec<f32>,
    /// Cumulative point counts per class, length `num_classes + 1`.
    pub class_border: Vec<f32>,
}

// ---------------------------------------------------------------------------
// Encoders
// ---------------------------------------------------------------------------

/// Flatten blocks with self-describing interval counts.
///
/// Per attribute the streams hold `[count, v_0, …, v_{count-1}]`; the count
/// is pushed identically into both the mins and maxes streams. Each edge
/// advances by the block's interval total *plus* `field_length`: the
/// consuming kernel reserves one extra slot per attribute, so the padding
/// term must stay.
pub fn flatten_interleaved(blocks: &[HyperBlock], field_length: usize) -> FlatBlocks {
    let mut flat_mins = Vec::new();
    let mut flat_maxes = Vec::new();
    let mut block_edges = vec![0.0];
    let mut block_classes = Vec::with_capacity(blocks.len());

    for block in blocks {
        block_classes.push(block.class_num as f32);

        let mut block_length = 0;
        for (mins, maxes) in block.minimums.iter().zip(&block.maximums) {
            block_length += mins.len();

            flat_mins.push(mins.len() as f32);
            flat_maxes.push(mins.len() as f32);
            flat_mins.extend_from_slice(mins);
            flat_maxes.extend_from_slice(maxes);
        }

        let last = *block_edges.last().unwrap_or(&0.0);
        block_edges.push(last + (block_length + field_length) as f32);
    }

    FlatBlocks {
        flat_mins,
        flat_maxes,
        block_edges,
        block_classes,
    }
}

/// Flatten blocks with interval counts carried in a separate array.
///
/// The value streams hold only interval bounds; `interval_counts[b * F + m]`
/// is the interval count of attribute `m` of block `b`, so consumers that
/// address counts directly (attribute-removal passes) need not re-walk the
/// streams. Edges advance by the bare interval total, no padding.
pub fn flatten_with_counts(blocks: &[HyperBlock], field_length: usize) -> FlatBlocksWithCounts {
    let mut flat_mins = Vec::new();
    let mut flat_maxes = Vec::new();
    let mut block_edges = vec![0.0; blocks.len() + 1];
    let mut block_classes = vec![0.0; blocks.len()];
    let mut interval_counts = vec![0.0; blocks.len() * field_length];

    let mut idx = 0;
    for (hb, block) in blocks.iter().enumerate() {
        block_classes[hb] = block.class_num as f32;

        let mut length = 0;
        for (mins, maxes) in block.minimums.iter().zip(&block.maximums) {
            length += mins.len();
            interval_counts[idx] = mins.len() as f32;
            idx += 1;

            flat_mins.extend_from_slice(mins);
            flat_maxes.extend_from_slice(maxes);
        }

        block_edges[hb + 1] = block_edges[hb] + length as f32;
    }

    FlatBlocksWithCounts {
        flat_mins,
        flat_maxes,
        block_edges,
        block_classes,
        interval_counts,
    }
}

/// Flatten a class-partitioned dataset into one value stream.
///
/// `class_border[c + 1] - class_border[c]` is the point count of class `c`;
/// the stream holds every attribute of every point, class by class.
pub fn flatten_dataset(dataset: &Dataset) -> FlatDataset {
    let mut values = Vec::new();
    let mut class_border = vec![0.0; dataset.num_classes() + 1];

    for (class_idx, points) in dataset.classes.iter().enumerate() {
        class_border[class_idx + 1] = class_border[class_idx] + points.len() as f32;

        for point in points {
            values.extend_from_slice(point);
        }
    }

    FlatDataset {
        values,
        class_border,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The worked example: F = 2, one simple and one disjunctive attribute.
    fn disjunctive_block() -> HyperBlock {
        HyperBlock::new(
            vec![vec![0.0], vec![1.0, 3.0]],
            vec![vec![0.5], vec![1.5, 3.5]],
            2,
        )
    }

    #[test]
    fn interleaved_streams_embed_counts() {
        let blocks = vec![disjunctive_block()];
        let flat = flatten_interleaved(&blocks, 2);

        assert_eq!(flat.flat_mins, vec![1.0, 0.0, 2.0, 1.0, 3.0]);
        assert_eq!(flat.flat_maxes, vec![1.0, 0.5, 2.0, 1.5, 3.5]);
        // 3 intervals + field_length padding of 2.
        assert_eq!(flat.block_edges, vec![0.0, 5.0]);
        assert_eq!(flat.block_classes, vec![2.0]);
    }

    #[test]
    fn interleaved_edges_are_cumulative_and_padded() {
        let blocks = vec![
            HyperBlock::simple(vec![0.0, 0.0], vec![1.0, 1.0], 0),
            disjunctive_block(),
        ];
        let flat = flatten_interleaved(&blocks, 2);

        assert_eq!(flat.block_edges.len(), blocks.len() + 1);
        assert!(flat
            .block_edges
            .windows(2)
            .all(|pair| pair[0] <= pair[1]));
        // Simple block: 2 intervals + 2 padding; disjunctive: 3 + 2.
        assert_eq!(flat.block_edges, vec![0.0, 4.0, 9.0]);
        // The padding slots are exactly the interleaved counts, so the last
        // edge is the total stream length.
        assert_eq!(
            *flat.block_edges.last().unwrap(),
            flat.flat_mins.len() as f32
        );
    }

    #[test]
    fn split_counts_match_worked_example() {
        let blocks = vec![disjunctive_block()];
        let flat = flatten_with_counts(&blocks, 2);

        assert_eq!(flat.flat_mins, vec![0.0, 1.0, 3.0]);
        assert_eq!(flat.flat_maxes, vec![0.5, 1.5, 3.5]);
        assert_eq!(flat.interval_counts, vec![1.0, 2.0]);
        assert_eq!(flat.block_edges, vec![0.0, 3.0]);
        assert_eq!(flat.block_classes, vec![2.0]);
    }

    #[test]
    fn split_count_sums_equal_edge_deltas() {
        let field_length = 2;
        let blocks = vec![
            HyperBlock::simple(vec![0.0, 0.0], vec![1.0, 1.0], 0),
            disjunctive_block(),
            HyperBlock::new(
                vec![vec![0.0, 0.4, 0.8], vec![0.1]],
                vec![vec![0.2, 0.6, 1.0], vec![0.9]],
                1,
            ),
        ];
        let flat = flatten_with_counts(&blocks, field_length);

        assert_eq!(flat.interval_counts.len(), blocks.len() * field_length);
        for b in 0..blocks.len() {
            let count_sum: f32 = flat.interval_counts[b * field_length..(b + 1) * field_length]
                .iter()
                .sum();
            assert_eq!(count_sum, flat.block_edges[b + 1] - flat.block_edges[b]);
        }
        assert_eq!(
            *flat.block_edges.last().unwrap(),
            flat.flat_mins.len() as f32
        );
    }

    #[test]
    fn dataset_flattening_tracks_class_borders() {
        let dataset = Dataset {
            classes: vec![
                vec![vec![1.0, 2.0], vec![3.0, 4.0]],
                vec![vec![5.0, 6.0]],
            ],
        };
        let flat = flatten_dataset(&dataset);

        assert_eq!(flat.values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(flat.class_border, vec![0.0, 2.0, 3.0]);
    }

    #[test]
    fn encoders_do_not_touch_their_input() {
        let blocks = vec![disjunctive_block()];
        let before = blocks.clone();
        let _ = flatten_interleaved(&blocks, 2);
        let _ = flatten_with_counts(&blocks, 2);
        assert_eq!(blocks, before);
    }
}
