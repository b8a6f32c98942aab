use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

use super::{class_pair_of, ensure_simple};
use crate::model::{HyperBlock, PairBlockSet};

// All integers and floats on the wire are 4 bytes, little-endian.

fn write_i32<W: Write>(out: &mut W, value: i32) -> io::Result<()> {
    out.write_all(&value.to_le_bytes())
}

fn write_f32<W: Write>(out: &mut W, value: f32) -> io::Result<()> {
    out.write_all(&value.to_le_bytes())
}

fn read_i32<R: Read>(input: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f32<R: Read>(input: &mut R) -> io::Result<f32> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

/// Counts come off the wire as `i32`; a negative one means a corrupt file.
fn read_count<R: Read>(input: &mut R, what: &str) -> Result<usize> {
    let raw = read_i32(input).with_context(|| format!("reading {what}"))?;
    usize::try_from(raw).map_err(|_| anyhow::anyhow!("negative {what} ({raw}) in binary file"))
}

// ---------------------------------------------------------------------------
// Basic format: fixed-width records
// ---------------------------------------------------------------------------

/// Write a flat block collection in the fixed-width binary layout:
///
/// ```text
/// [i32 num_blocks][i32 field_length]
/// then per block: F mins, F maxes, [i32 class]
/// ```
///
/// The field length in the header is redundant with the block records and
/// serves as a sanity check during read.
pub fn save_basic(blocks: &[HyperBlock], field_length: usize, path: &Path) -> Result<()> {
    ensure_simple(blocks)?;

    let file = File::create(path)
        .with_context(|| format!("creating binary hyperblock file {}", path.display()))?;
    let mut out = BufWriter::new(file);

    write_i32(&mut out, blocks.len() as i32)?;
    write_i32(&mut out, field_length as i32)?;

    for block in blocks {
        for intervals in &block.minimums {
            write_f32(&mut out, intervals[0])?;
        }
        for intervals in &block.maximums {
            write_f32(&mut out, intervals[0])?;
        }
        write_i32(&mut out, block.class_num as i32)?;
    }

    out.flush().context("flushing binary hyperblock file")?;
    log::info!("Hyperblocks saved to {}", path.display());
    Ok(())
}

/// Read a basic-format binary file back into blocks.
pub fn load_basic(path: &Path) -> Result<Vec<HyperBlock>> {
    let file = File::open(path)
        .with_context(|| format!("opening binary hyperblock file {}", path.display()))?;
    let mut input = BufReader::new(file);

    let num_blocks = read_count(&mut input, "block count")?;
    let field_length = read_count(&mut input, "field length")?;

    let mut blocks = Vec::with_capacity(num_blocks);
    for b in 0..num_blocks {
        let mut mins = Vec::with_capacity(field_length);
        for _ in 0..field_length {
            mins.push(read_f32(&mut input).with_context(|| format!("reading block {b} mins"))?);
        }
        let mut maxes = Vec::with_capacity(field_length);
        for _ in 0..field_length {
            maxes.push(read_f32(&mut input).with_context(|| format!("reading block {b} maxes"))?);
        }
        let class_num =
            read_i32(&mut input).with_context(|| format!("reading block {b} class"))? as usize;

        blocks.push(HyperBlock::simple(mins, maxes, class_num));
    }

    Ok(blocks)
}

// ---------------------------------------------------------------------------
// One-to-one format: per-pair block sets, attribute count per block
// ---------------------------------------------------------------------------

/// Write one-to-one block sets in the self-describing binary layout:
///
/// ```text
/// [i32 num_block_sets]
/// per set:   [i32 class_a][i32 class_b][i32 num_blocks]
/// per block: [i32 attr_count], attr_count mins, attr_count maxes, [i32 class]
/// ```
pub fn save_one_to_one(block_sets: &[Vec<HyperBlock>], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating one-to-one binary file {}", path.display()))?;
    let mut out = BufWriter::new(file);

    write_i32(&mut out, block_sets.len() as i32)?;

    for blocks in block_sets {
        ensure_simple(blocks)?;

        let (class_a, class_b) = class_pair_of(blocks);
        write_i32(&mut out, class_a as i32)?;
        write_i32(&mut out, class_b as i32)?;
        write_i32(&mut out, blocks.len() as i32)?;

        for block in blocks {
            write_i32(&mut out, block.num_attributes() as i32)?;
            for intervals in &block.minimums {
                write_f32(&mut out, intervals[0])?;
            }
            for intervals in &block.maximums {
                write_f32(&mut out, intervals[0])?;
            }
            write_i32(&mut out, block.class_num as i32)?;
        }
    }

    out.flush().context("flushing one-to-one binary file")?;
    log::info!("One-to-one hyperblocks saved to {}", path.display());
    Ok(())
}

/// Read one-to-one block sets back, pairs included.
pub fn load_one_to_one(path: &Path) -> Result<Vec<PairBlockSet>> {
    let file = File::open(path)
        .with_context(|| format!("opening one-to-one binary file {}", path.display()))?;
    let mut input = BufReader::new(file);

    let num_block_sets = read_count(&mut input, "block set count")?;
    let mut sets = Vec::with_capacity(num_block_sets);

    for _ in 0..num_block_sets {
        let class_a = read_count(&mut input, "class pair")?;
        let class_b = read_count(&mut input, "class pair")?;
        let num_blocks = read_count(&mut input, "block count")?;

        let mut blocks = Vec::with_capacity(num_blocks);
        for b in 0..num_blocks {
            let attr_count = read_count(&mut input, "attribute count")?;

            let mut mins = Vec::with_capacity(attr_count);
            for _ in 0..attr_count {
                mins.push(
                    read_f32(&mut input).with_context(|| format!("reading block {b} mins"))?,
                );
            }
            let mut maxes = Vec::with_capacity(attr_count);
            for _ in 0..attr_count {
                maxes.push(
                    read_f32(&mut input).with_context(|| format!("reading block {b} maxes"))?,
                );
            }
            let class_num =
                read_i32(&mut input).with_context(|| format!("reading block {b} class"))? as usize;

            blocks.push(HyperBlock::simple(mins, maxes, class_num));
        }

        sets.push(PairBlockSet {
            class_a,
            class_b,
            blocks,
        });
    }

    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn basic_binary_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blocks.bin");

        let blocks = vec![
            HyperBlock::simple(vec![0.0, 0.25, 0.5], vec![0.5, 0.75, 1.0], 0),
            HyperBlock::simple(vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6], 1),
        ];
        save_basic(&blocks, 3, &path).unwrap();
        let reloaded = load_basic(&path).unwrap();
        assert_eq!(reloaded, blocks);
    }

    #[test]
    fn basic_binary_rejects_disjunctive_blocks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blocks.bin");

        let blocks = vec![HyperBlock::new(
            vec![vec![0.0, 2.0]],
            vec![vec![1.0, 3.0]],
            0,
        )];
        assert!(save_basic(&blocks, 1, &path).is_err());
        // Nothing useful was written.
        assert!(load_basic(&path).is_err() || load_basic(&path).unwrap().is_empty());
    }

    #[test]
    fn one_to_one_binary_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pairs.bin");

        let sets = vec![
            vec![
                HyperBlock::simple(vec![0.0, 0.1], vec![0.5, 0.6], 0),
                HyperBlock::simple(vec![0.4, 0.5], vec![0.9, 1.0], 1),
            ],
            vec![
                HyperBlock::simple(vec![0.2, 0.3], vec![0.7, 0.8], 1),
                HyperBlock::simple(vec![0.0, 0.0], vec![0.3, 0.3], 2),
            ],
        ];
        save_one_to_one(&sets, &path).unwrap();

        let reloaded = load_one_to_one(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!((reloaded[0].class_a, reloaded[0].class_b), (0, 1));
        assert_eq!((reloaded[1].class_a, reloaded[1].class_b), (1, 2));
        assert_eq!(reloaded[0].blocks, sets[0]);
        assert_eq!(reloaded[1].blocks, sets[1]);
    }

    #[test]
    fn truncated_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("truncated.bin");

        let blocks = vec![HyperBlock::simple(vec![0.0, 0.5], vec![0.5, 1.0], 0)];
        save_basic(&blocks, 2, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 2]).unwrap();

        assert!(load_basic(&path).is_err());
    }

    #[test]
    fn empty_collection_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("none.bin");

        save_basic(&[], 4, &path).unwrap();
        assert!(load_basic(&path).unwrap().is_empty());

        save_one_to_one(&[], &path).unwrap();
        assert!(load_one_to_one(&path).unwrap().is_empty());
    }
}
