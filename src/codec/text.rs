use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use super::{block_from_row, class_pair_of, ensure_simple};
use crate::model::{HyperBlock, PairBlockSet};

// ---------------------------------------------------------------------------
// Basic format: one CSV row per block
// ---------------------------------------------------------------------------

/// Write a flat block collection as CSV, one row per block:
/// `min_0,…,min_{F-1},max_0,…,max_{F-1},class`.
pub fn save_basic(blocks: &[HyperBlock], path: &Path) -> Result<()> {
    ensure_simple(blocks)?;

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating hyperblock CSV {}", path.display()))?;

    for block in blocks {
        let row: Vec<String> = block
            .minimums
            .iter()
            .map(|intervals| intervals[0].to_string())
            .chain(block.maximums.iter().map(|intervals| intervals[0].to_string()))
            .chain(std::iter::once(block.class_num.to_string()))
            .collect();
        writer.write_record(&row).context("writing hyperblock row")?;
    }

    writer.flush().context("flushing hyperblock CSV")?;
    log::info!("Hyperblocks saved to {}", path.display());
    Ok(())
}

/// Read a basic-format CSV back into blocks. The attribute count is inferred
/// per row as `(fields - 1) / 2`; every attribute comes back with a single
/// interval, which is all this format can carry.
pub fn load_basic(path: &Path) -> Result<Vec<HyperBlock>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening hyperblock CSV {}", path.display()))?;

    let mut blocks = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading hyperblock CSV row {row_no}"))?;
        let values = parse_row(record.iter(), row_no)?;
        if values.is_empty() {
            continue;
        }
        blocks.push(block_from_row(values, row_no)?);
    }

    Ok(blocks)
}

/// Parse the non-empty cells of a row as floats. Empty cells (from a
/// trailing comma) are skipped; a non-empty cell that fails to parse is a
/// hard error.
fn parse_row<'a>(cells: impl Iterator<Item = &'a str>, row_no: usize) -> Result<Vec<f32>> {
    cells
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(|cell| {
            cell.parse::<f32>()
                .with_context(|| format!("row {row_no}: '{cell}' is not a number"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// One-to-one format: groups of rows, one group per class pair
// ---------------------------------------------------------------------------

/// Write one-to-one block sets. Each set is introduced by a `# classA,classB`
/// header, followed by basic-format rows, and terminated by a blank line.
pub fn save_one_to_one(block_sets: &[Vec<HyperBlock>], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating one-to-one CSV {}", path.display()))?;
    let mut out = BufWriter::new(file);

    for blocks in block_sets {
        if blocks.is_empty() {
            continue;
        }
        ensure_simple(blocks)?;

        let (class_a, class_b) = class_pair_of(blocks);
        writeln!(out, "# {class_a},{class_b}")?;

        for block in blocks {
            for intervals in &block.minimums {
                write!(out, "{},", intervals[0])?;
            }
            for intervals in &block.maximums {
                write!(out, "{},", intervals[0])?;
            }
            writeln!(out, "{}", block.class_num)?;
        }

        // Blank line terminates the group.
        writeln!(out)?;
    }

    out.flush().context("flushing one-to-one CSV")?;
    log::info!("One-to-one hyperblocks saved to {}", path.display());
    Ok(())
}

/// Read one-to-one block sets back. A file that does not end with a trailing
/// blank line still yields its final group.
pub fn load_one_to_one(path: &Path) -> Result<Vec<PairBlockSet>> {
    let file = File::open(path)
        .with_context(|| format!("opening one-to-one CSV {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut sets: Vec<PairBlockSet> = Vec::new();
    let mut current: Vec<HyperBlock> = Vec::new();
    let mut current_pair: Option<(usize, usize)> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading one-to-one CSV line {line_no}"))?;
        let line = line.trim();

        if line.is_empty() {
            flush_group(&mut sets, &mut current, current_pair);
            continue;
        }

        if let Some(header) = line.strip_prefix('#') {
            current_pair = Some(parse_pair(header, line_no)?);
            continue;
        }

        let values = parse_row(line.split(','), line_no)?;
        if values.is_empty() {
            continue;
        }
        current.push(block_from_row(values, line_no)?);
    }

    // Flush the last open group when the trailing blank line is missing.
    flush_group(&mut sets, &mut current, current_pair);

    Ok(sets)
}

fn flush_group(
    sets: &mut Vec<PairBlockSet>,
    current: &mut Vec<HyperBlock>,
    pair: Option<(usize, usize)>,
) {
    if current.is_empty() {
        return;
    }
    let blocks = std::mem::take(current);
    // A group without a header falls back to the labels actually present.
    let (class_a, class_b) = pair.unwrap_or_else(|| class_pair_of(&blocks));
    sets.push(PairBlockSet {
        class_a,
        class_b,
        blocks,
    });
}

/// Parse `classA,classB` from a `#` header line.
fn parse_pair(header: &str, line_no: usize) -> Result<(usize, usize)> {
    let mut parts = header.split(',');
    let class_a = parse_class(parts.next(), line_no)?;
    let class_b = parse_class(parts.next(), line_no)?;
    Ok((class_a, class_b))
}

fn parse_class(part: Option<&str>, line_no: usize) -> Result<usize> {
    part.map(str::trim)
        .filter(|s| !s.is_empty())
        .with_context(|| format!("line {line_no}: group header is missing a class label"))?
        .parse::<usize>()
        .with_context(|| format!("line {line_no}: malformed class label in group header"))
}

// ---------------------------------------------------------------------------
// Class-run grouping of a flat basic file
// ---------------------------------------------------------------------------

/// Load a basic-format CSV and split the flat sequence into groups at every
/// `class_num` transition.
///
/// Relies on the file being pre-sorted by class: blocks of the same class
/// that are not contiguous end up in separate groups. No re-sorting happens.
pub fn group_by_class_runs(path: &Path) -> Result<Vec<Vec<HyperBlock>>> {
    let all_blocks = load_basic(path)?;
    let mut groups: Vec<Vec<HyperBlock>> = Vec::new();

    for block in all_blocks {
        match groups.last_mut() {
            Some(group) if group[0].class_num == block.class_num => group.push(block),
            _ => groups.push(vec![block]),
        }
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::tempdir;

    fn sample_blocks() -> Vec<HyperBlock> {
        vec![
            HyperBlock::simple(vec![0.0, 0.25], vec![0.5, 0.75], 0),
            HyperBlock::simple(vec![0.1, 0.2], vec![0.9, 1.0], 1),
        ]
    }

    #[test]
    fn basic_csv_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blocks.csv");

        let blocks = sample_blocks();
        save_basic(&blocks, &path).unwrap();
        let reloaded = load_basic(&path).unwrap();
        assert_eq!(reloaded, blocks);
    }

    #[test]
    fn basic_save_rejects_disjunctive_blocks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blocks.csv");

        let blocks = vec![HyperBlock::new(
            vec![vec![0.0], vec![1.0, 3.0]],
            vec![vec![0.5], vec![1.5, 3.5]],
            2,
        )];
        assert!(save_basic(&blocks, &path).is_err());
    }

    #[test]
    fn one_to_one_round_trip_preserves_pairs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pairs.csv");

        let set_a = vec![
            HyperBlock::simple(vec![0.0], vec![0.5], 0),
            HyperBlock::simple(vec![0.5], vec![1.0], 1),
        ];
        let set_b = vec![
            HyperBlock::simple(vec![0.2], vec![0.4], 0),
            HyperBlock::simple(vec![0.6], vec![0.8], 2),
        ];
        save_one_to_one(&[set_a.clone(), set_b.clone()], &path).unwrap();

        let sets = load_one_to_one(&path).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!((sets[0].class_a, sets[0].class_b), (0, 1));
        assert_eq!((sets[1].class_a, sets[1].class_b), (0, 2));
        assert_eq!(sets[0].blocks, set_a);
        assert_eq!(sets[1].blocks, set_b);
    }

    #[test]
    fn final_group_without_trailing_blank_line_is_flushed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pairs.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, "# 0,1\n0,1,0\n\n# 1,2\n0.5,1,2").unwrap();
        drop(f);

        let sets = load_one_to_one(&path).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!((sets[1].class_a, sets[1].class_b), (1, 2));
        assert_eq!(sets[1].blocks[0].class_num, 2);
    }

    #[test]
    fn class_runs_split_on_transitions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("runs.csv");

        let blocks = vec![
            HyperBlock::simple(vec![0.0], vec![0.1], 0),
            HyperBlock::simple(vec![0.2], vec![0.3], 0),
            HyperBlock::simple(vec![0.4], vec![0.5], 1),
            HyperBlock::simple(vec![0.6], vec![0.7], 0),
        ];
        save_basic(&blocks, &path).unwrap();

        let groups = group_by_class_runs(&path).unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 1);
        assert_eq!(groups[2].len(), 1);
        assert_eq!(groups[2][0].class_num, 0);
    }

    #[test]
    fn empty_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::File::create(&path).unwrap();

        assert!(load_basic(&path).unwrap().is_empty());
        assert!(load_one_to_one(&path).unwrap().is_empty());
    }
}
