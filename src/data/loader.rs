// ============================================================
// Layer 4 — Shard Loader
// ============================================================
// Reads and writes numbered shard pairs:
//
//   <features_base><i>.npy   →  [rows, 54]         sticker codes
//   <labels_base><i>.npy     →  [rows, max_moves]  move codes
//
// With the default bases that is data/features/X0.npy and
// data/labels/Y0.npy for shard 0.
//
// Missing files, wrong column counts, mismatched row counts and
// out-of-vocabulary codes are all errors.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use crate::data::npy::{read_npy, write_npy, IntMatrix};
use crate::domain::cube::{STICKER_COUNT, STICKER_VOCAB};
use crate::domain::example::SolveExample;
use crate::domain::moves::MOVE_VOCAB;
use crate::domain::traits::ExampleSource;

pub const FILE_EXT: &str = ".npy";

/// Loads shards from numbered .npy files.
/// Implements the ExampleSource trait from Layer 3.
pub struct NpyShardLoader {
    features_base: String,
    labels_base:   String,
    max_moves:     usize,
}

impl NpyShardLoader {
    pub fn new(
        features_base: impl Into<String>,
        labels_base:   impl Into<String>,
        max_moves:     usize,
    ) -> Self {
        Self {
            features_base: features_base.into(),
            labels_base:   labels_base.into(),
            max_moves,
        }
    }

    /// (features path, labels path) for shard `index`
    pub fn shard_paths(&self, index: usize) -> (PathBuf, PathBuf) {
        (
            PathBuf::from(format!("{}{index}{FILE_EXT}", self.features_base)),
            PathBuf::from(format!("{}{index}{FILE_EXT}", self.labels_base)),
        )
    }

    /// Write examples as shard `index`, creating directories as needed
    pub fn save_shard(&self, index: usize, examples: &[SolveExample]) -> Result<()> {
        let (x_path, y_path) = self.shard_paths(index);

        let stickers: Vec<Vec<u8>> = examples.iter().map(|e| e.stickers.clone()).collect();
        let moves:    Vec<Vec<u8>> = examples.iter().map(|e| e.moves.clone()).collect();

        let x = IntMatrix::from_rows(&stickers, STICKER_COUNT)
            .context("Sticker rows have the wrong length")?;
        let y = IntMatrix::from_rows(&moves, self.max_moves)
            .context("Move rows have the wrong length")?;

        write_npy(&x_path, &x)
            .with_context(|| format!("Cannot write '{}'", x_path.display()))?;
        write_npy(&y_path, &y)
            .with_context(|| format!("Cannot write '{}'", y_path.display()))?;

        tracing::debug!(
            "Wrote shard {} ({} examples) to '{}' / '{}'",
            index,
            examples.len(),
            x_path.display(),
            y_path.display()
        );
        Ok(())
    }
}

impl ExampleSource for NpyShardLoader {
    fn load_shard(&self, index: usize) -> Result<Vec<SolveExample>> {
        let (x_path, y_path) = self.shard_paths(index);

        let x = read_npy(&x_path)
            .with_context(|| format!("Cannot load features '{}'", x_path.display()))?;
        let y = read_npy(&y_path)
            .with_context(|| format!("Cannot load labels '{}'", y_path.display()))?;

        if x.cols() != STICKER_COUNT {
            bail!(
                "'{}' has {} columns, expected {STICKER_COUNT} stickers",
                x_path.display(),
                x.cols()
            );
        }
        if y.cols() != self.max_moves {
            bail!(
                "'{}' has {} columns, expected {} moves",
                y_path.display(),
                y.cols(),
                self.max_moves
            );
        }
        if x.rows() != y.rows() {
            bail!(
                "Shard {index}: {} feature rows but {} label rows",
                x.rows(),
                y.rows()
            );
        }

        let examples = x
            .iter_rows()
            .zip(y.iter_rows())
            .enumerate()
            .map(|(row, (stickers, moves))| -> Result<SolveExample> {
                Ok(SolveExample::new(
                    to_codes(stickers, STICKER_VOCAB)
                        .with_context(|| format!("'{}' row {row}", x_path.display()))?,
                    to_codes(moves, MOVE_VOCAB)
                        .with_context(|| format!("'{}' row {row}", y_path.display()))?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("Loaded shard {} ({} examples)", index, examples.len());
        Ok(examples)
    }
}

/// Narrow a row of i64 values to u8 codes in `0..vocab`
fn to_codes(row: &[i64], vocab: usize) -> Result<Vec<u8>> {
    row.iter()
        .map(|&v| {
            if v < 0 || v as usize >= vocab {
                bail!("code {v} is outside 0..{vocab}");
            }
            Ok(v as u8)
        })
        .collect()
}
