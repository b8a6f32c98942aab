use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{ClassMap, DataShape, Dataset, Point};

// ---------------------------------------------------------------------------
// Labeled CSV loading
// ---------------------------------------------------------------------------

/// Load a labeled dataset from a CSV file.
///
/// Expected layout: one header row (skipped), then one row per point. The
/// last column is the class label (any string); every other column is a
/// float attribute. A numeric cell that fails to parse is logged and
/// defaults to `0.0`; a bad cell never aborts the load.
///
/// Class indices are assigned in first-seen order, and the returned
/// [`ClassMap`] records the label ↔ index correspondence. The returned
/// [`DataShape`] carries the attribute count and class count for downstream
/// normalization and flattening calls.
pub fn load_dataset(path: &Path) -> Result<(Dataset, ClassMap, DataShape)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening dataset CSV {}", path.display()))?;

    let mut dataset = Dataset::default();
    let mut class_map = ClassMap::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading dataset CSV row {row_no}"))?;

        // Skip blank rows.
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let label = record
            .get(record.len() - 1)
            .unwrap_or("")
            .trim()
            .to_string();

        let class_idx = class_map.intern(&label);
        if class_idx == dataset.classes.len() {
            dataset.classes.push(Vec::new());
        }

        let point: Point = record
            .iter()
            .take(record.len() - 1)
            .map(|cell| parse_cell(cell, row_no))
            .collect();

        dataset.classes[class_idx].push(point);
    }

    let shape = dataset.shape();
    log::info!(
        "Loaded {} points in {} classes ({} attributes) from {}",
        dataset.num_points(),
        shape.num_classes,
        shape.field_length,
        path.display()
    );

    Ok((dataset, class_map, shape))
}

/// Parse one numeric cell, defaulting to 0.0 on malformed input.
fn parse_cell(cell: &str, row_no: usize) -> f32 {
    match cell.trim().parse::<f32>() {
        Ok(v) => v,
        Err(_) => {
            log::warn!("Invalid value '{cell}' in CSV row {row_no}, defaulting to 0.0");
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// Normalized CSV export
// ---------------------------------------------------------------------------

/// Write a dataset back out as CSV with header `x0,…,x{F-1},label`.
///
/// The label column holds the positional class index, not the original
/// string label, so the same normalized file can be shared with downstream
/// visualization tools.
pub fn save_normalized_csv(path: &Path, dataset: &Dataset, shape: DataShape) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating normalized CSV {}", path.display()))?;

    let header: Vec<String> = (0..shape.field_length)
        .map(|i| format!("x{i}"))
        .chain(std::iter::once("label".to_string()))
        .collect();
    writer.write_record(&header).context("writing CSV header")?;

    for (class_idx, points) in dataset.classes.iter().enumerate() {
        for point in points {
            let row: Vec<String> = point
                .iter()
                .map(|v| v.to_string())
                .chain(std::iter::once(class_idx.to_string()))
                .collect();
            writer.write_record(&row).context("writing CSV row")?;
        }
    }

    writer.flush().context("flushing normalized CSV")?;
    log::info!("Normalized dataset saved to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Testing-set reordering
// ---------------------------------------------------------------------------

/// Reorder a separately-loaded testing dataset so its class buckets line up
/// with the training class indices.
///
/// Both datasets assign indices in first-seen order, so the same label can
/// sit at different positions; this matches labels across the two maps and
/// permutes the testing buckets into training order. Classes the training
/// map has never seen are dropped (logged).
pub fn reorder_testing_dataset(
    testing: &Dataset,
    train_map: &ClassMap,
    test_map: &ClassMap,
) -> Dataset {
    let mut reordered = Dataset::with_num_classes(train_map.len());

    for (label, test_idx) in test_map.iter() {
        match train_map.index_of(label) {
            Some(train_idx) => {
                if let Some(points) = testing.classes.get(test_idx) {
                    reordered.classes[train_idx] = points.clone();
                }
            }
            None => {
                log::warn!("Testing class '{label}' not present in training data, dropping");
            }
        }
    }

    reordered
}
