use std::path::Path;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Per-class cluster centers for the synthetic dataset.
const CENTERS: [[f32; 4]; 3] = [
    [0.2, 0.8, 0.3, 5.0],
    [0.7, 0.2, 0.6, 5.0],
    [0.5, 0.5, 0.9, 5.0],
];

const LABELS: [&str; 3] = ["alpha", "beta", "gamma"];
const POINTS_PER_CLASS: usize = 50;
const SPREAD: f32 = 0.15;

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(42);
    let output_path = Path::new("sample_data.csv");

    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;

    let header: Vec<String> = (0..CENTERS[0].len())
        .map(|i| format!("x{i}"))
        .chain(std::iter::once("label".to_string()))
        .collect();
    writer.write_record(&header)?;

    let mut rows = 0usize;
    for (center, label) in CENTERS.iter().zip(LABELS) {
        for _ in 0..POINTS_PER_CLASS {
            // The last attribute is constant across every class, so the
            // uniform-column detector has something to find.
            let row: Vec<String> = center
                .iter()
                .enumerate()
                .map(|(i, &c)| {
                    if i == center.len() - 1 {
                        c.to_string()
                    } else {
                        (c + rng.random_range(-SPREAD..SPREAD)).to_string()
                    }
                })
                .chain(std::iter::once(label.to_string()))
                .collect();
            writer.write_record(&row)?;
            rows += 1;
        }
    }

    writer.flush().context("flushing sample CSV")?;
    println!(
        "Wrote {rows} points ({} classes, {} attributes) to {}",
        LABELS.len(),
        CENTERS[0].len(),
        output_path.display()
    );
    Ok(())
}
