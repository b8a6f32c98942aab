use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{DataShape, Dataset};

// ---------------------------------------------------------------------------
// NormalizationFrame – per-attribute min/max fitted on training data
// ---------------------------------------------------------------------------

/// Per-attribute extremes of a training dataset.
///
/// Rescaling a test set into the *training* frame requires exactly this
/// state, so the frame is serializable and can be persisted beside the model
/// artifacts for later sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationFrame {
    pub min_values: Vec<f32>,
    pub max_values: Vec<f32>,
}

impl NormalizationFrame {
    /// Single pass over every point of every class, tracking the running
    /// min/max of each attribute.
    pub fn fit(dataset: &Dataset, shape: DataShape) -> Self {
        let mut min_values = vec![f32::INFINITY; shape.field_length];
        let mut max_values = vec![f32::NEG_INFINITY; shape.field_length];

        for point in dataset.points() {
            for k in 0..shape.field_length {
                min_values[k] = min_values[k].min(point[k]);
                max_values[k] = max_values[k].max(point[k]);
            }
        }

        NormalizationFrame {
            min_values,
            max_values,
        }
    }

    /// Attribute count this frame was fitted on.
    pub fn field_length(&self) -> usize {
        self.min_values.len()
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating frame file {}", path.display()))?;
        serde_json::to_writer_pretty(file, self).context("serializing normalization frame")?;
        log::info!("Normalization frame saved to {}", path.display());
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening frame file {}", path.display()))?;
        serde_json::from_reader(file).context("parsing normalization frame")
    }
}

// ---------------------------------------------------------------------------
// Min-max rescaling
// ---------------------------------------------------------------------------

/// Rescale every attribute of every point into `[0,1]` via
/// `(v - min) / (max - min)`.
///
/// A degenerate column (`max == min`) carries no information and every value
/// in it becomes exactly `0.5`, which also avoids the division by zero.
pub fn normalize_dataset(dataset: &mut Dataset, frame: &NormalizationFrame) {
    log::info!("Normalizing the dataset");
    if dataset.is_empty() {
        return;
    }

    rescale(dataset, frame);
}

/// Rescale a test set into a frame fitted on *training* data, then clamp to
/// `[0,1]`.
///
/// Test values can fall outside the training extremes, so raw rescaling can
/// leave the unit range; every clamped value is logged.
pub fn normalize_test_set(dataset: &mut Dataset, frame: &NormalizationFrame) {
    if dataset.is_empty() {
        log::info!("Test set was empty when trying to normalize");
        return;
    }

    rescale(dataset, frame);

    for points in &mut dataset.classes {
        for point in points {
            for value in point.iter_mut().take(frame.field_length()) {
                if *value > 1.0 {
                    log::warn!("Test value {value} above training range, clamping to 1.0");
                    *value = 1.0;
                } else if *value < 0.0 {
                    log::warn!("Test value {value} below training range, clamping to 0.0");
                    *value = 0.0;
                }
            }
        }
    }
}

fn rescale(dataset: &mut Dataset, frame: &NormalizationFrame) {
    for points in &mut dataset.classes {
        for point in points {
            for k in 0..frame.field_length() {
                if frame.max_values[k] != frame.min_values[k] {
                    point[k] =
                        (point[k] - frame.min_values[k]) / (frame.max_values[k] - frame.min_values[k]);
                } else {
                    point[k] = 0.5;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Uniform-column detection
// ---------------------------------------------------------------------------

/// Mark attributes whose value is identical across every point of every
/// class, using the very first point as the reference. The returned mask can
/// drive downstream column pruning. An empty dataset yields an empty mask.
pub fn mark_uniform_columns(dataset: &Dataset) -> Vec<bool> {
    let first = match dataset.classes.first().and_then(|c| c.first()) {
        Some(point) => point,
        None => return Vec::new(),
    };

    let mut uniform = vec![true; first.len()];
    for (col, flag) in uniform.iter_mut().enumerate() {
        let reference = first[col];
        'scan: for points in &dataset.classes {
            for point in points {
                if point[col] != reference {
                    *flag = false;
                    break 'scan;
                }
            }
        }
    }

    uniform
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Dataset {
        Dataset {
            classes: vec![
                vec![vec![0.0, 10.0, 7.0], vec![2.0, 20.0, 7.0]],
                vec![vec![4.0, 30.0, 7.0]],
            ],
        }
    }

    #[test]
    fn fit_finds_per_attribute_extremes() {
        let ds = sample();
        let frame = NormalizationFrame::fit(&ds, ds.shape());
        assert_eq!(frame.min_values, vec![0.0, 10.0, 7.0]);
        assert_eq!(frame.max_values, vec![4.0, 30.0, 7.0]);
    }

    #[test]
    fn normalized_values_in_unit_range_and_degenerate_columns_half() {
        let mut ds = sample();
        let frame = NormalizationFrame::fit(&ds, ds.shape());
        normalize_dataset(&mut ds, &frame);

        for point in ds.points() {
            assert!((0.0..=1.0).contains(&point[0]));
            assert!((0.0..=1.0).contains(&point[1]));
            // Constant column: exactly 0.5.
            assert_eq!(point[2], 0.5);
        }
        assert_eq!(ds.classes[0][0][0], 0.0);
        assert_eq!(ds.classes[1][0][0], 1.0);
    }

    #[test]
    fn test_set_is_clamped_into_unit_range() {
        let train = sample();
        let frame = NormalizationFrame::fit(&train, train.shape());

        // Values well outside the training extremes in both directions.
        let mut test = Dataset {
            classes: vec![vec![vec![-5.0, 100.0, 7.0], vec![2.0, 15.0, 7.0]]],
        };
        normalize_test_set(&mut test, &frame);

        for point in test.points() {
            for &v in point {
                assert!((0.0..=1.0).contains(&v), "value {v} escaped [0,1]");
            }
        }
        assert_eq!(test.classes[0][0][0], 0.0);
        assert_eq!(test.classes[0][0][1], 1.0);
    }

    #[test]
    fn empty_test_set_is_left_untouched() {
        let train = sample();
        let frame = NormalizationFrame::fit(&train, train.shape());
        let mut empty = Dataset::default();
        normalize_test_set(&mut empty, &frame);
        assert!(empty.is_empty());
    }

    #[test]
    fn uniform_column_mask() {
        let ds = sample();
        assert_eq!(mark_uniform_columns(&ds), vec![false, false, true]);
        assert!(mark_uniform_columns(&Dataset::default()).is_empty());
    }

    #[test]
    fn frame_json_round_trip() {
        let ds = sample();
        let frame = NormalizationFrame::fit(&ds, ds.shape());

        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.json");
        frame.save_json(&path).unwrap();
        let reloaded = NormalizationFrame::load_json(&path).unwrap();
        assert_eq!(reloaded, frame);
    }
}
