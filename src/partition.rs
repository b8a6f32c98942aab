use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::model::Dataset;

/// Fixed seed for the percent and k-fold splits: runs over the same input
/// always produce the same partition.
const SPLIT_SEED: u64 = 42;

// ---------------------------------------------------------------------------
// Validation split
// ---------------------------------------------------------------------------

/// Stratified in-place validation split: per class, move a shuffled
/// `floor(n * fraction)` of the points out of `training` into the returned
/// validation dataset.
///
/// The caller supplies the seed, so repeated runs with the same seed carve
/// out the same validation set. Points are moved, not copied: `training`
/// shrinks to a strict subset of its former self.
pub fn validation_split(training: &mut Dataset, fraction: f32, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut validation = Dataset::with_num_classes(training.num_classes());

    for (class_idx, points) in training.classes.iter_mut().enumerate() {
        let mut indices: Vec<usize> = (0..points.len()).collect();
        indices.shuffle(&mut rng);

        let val_count = ((points.len() as f32 * fraction) as usize).min(points.len());

        // Remove in descending index order so earlier removals do not shift
        // the indices still pending.
        let mut chosen = indices[..val_count].to_vec();
        chosen.sort_unstable_by(|a, b| b.cmp(a));
        for idx in chosen {
            validation.classes[class_idx].push(points.remove(idx));
        }
    }

    validation
}

// ---------------------------------------------------------------------------
// Percent train/test split
// ---------------------------------------------------------------------------

/// Stratified train/test split: per class, shuffle and then move points off
/// the tail until `floor(n * percent_train)` remain in `training`. The moved
/// points form the returned testing dataset.
///
/// Seeded with [`SPLIT_SEED`], so the partition is deterministic across runs.
pub fn train_test_split(training: &mut Dataset, percent_train: f32) -> Dataset {
    let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
    let mut testing = Dataset::with_num_classes(training.num_classes());

    for (class_idx, points) in training.classes.iter_mut().enumerate() {
        points.shuffle(&mut rng);

        let keep = ((points.len() as f32 * percent_train) as usize).min(points.len());
        testing.classes[class_idx] = points.split_off(keep);
    }

    testing
}

// ---------------------------------------------------------------------------
// K-fold split
// ---------------------------------------------------------------------------

/// Stratified k-fold partition: per class, shuffle a copy of the points and
/// deal them round-robin (`point i → fold i % k`), so every fold receives
/// either `floor(n/k)` or `ceil(n/k)` points of each class.
///
/// Seeded with [`SPLIT_SEED`]; the input dataset is not modified.
pub fn k_fold_split(dataset: &Dataset, k: usize) -> Vec<Dataset> {
    let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
    let mut folds = vec![Dataset::with_num_classes(dataset.num_classes()); k];

    for (class_idx, class_points) in dataset.classes.iter().enumerate() {
        let mut points = class_points.clone();
        points.shuffle(&mut rng);

        for (i, point) in points.into_iter().enumerate() {
            folds[i % k].classes[class_idx].push(point);
        }
    }

    folds
}
