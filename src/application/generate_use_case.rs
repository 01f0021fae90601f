// ============================================================
// Layer 2 — GenerateUseCase
// ============================================================
// Produces the training corpus:
//
//   for each shard i in 0..num_files:
//       examples / num_files × (scramble → solution) pairs
//       → <features_base>i.npy, <labels_base>i.npy
//
// One seeded Scrambler runs across all shards, so a given seed
// always yields the same corpus and no two shards repeat.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::loader::NpyShardLoader;
use crate::domain::moves::MAX_MOVES;
use crate::domain::scrambler::Scrambler;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    pub features_base: String,
    pub labels_base:   String,
    /// Total across all shards
    pub examples:      usize,
    pub num_files:     usize,
    pub max_moves:     usize,
    pub seed:          u64,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            features_base: "data/features/X".to_string(),
            labels_base:   "data/labels/Y".to_string(),
            examples:      10_000_000,
            num_files:     5,
            max_moves:     MAX_MOVES,
            seed:          42,
        }
    }
}

pub struct GenerateUseCase {
    config: GenerateConfig,
}

impl GenerateUseCase {
    pub fn new(config: GenerateConfig) -> Self {
        Self { config }
    }

    /// Returns the number of examples written.
    pub fn execute(&self) -> Result<usize> {
        let cfg = &self.config;
        if cfg.num_files == 0 {
            bail!("num_files must be at least 1");
        }
        if cfg.max_moves == 0 {
            bail!("max_moves must be at least 1");
        }

        let per_shard = cfg.examples / cfg.num_files;
        if per_shard < cfg.examples.div_ceil(cfg.num_files) {
            tracing::warn!(
                "{} examples don't split evenly over {} shards; writing {} per shard",
                cfg.examples,
                cfg.num_files,
                per_shard
            );
        }

        let loader        = NpyShardLoader::new(&cfg.features_base, &cfg.labels_base, cfg.max_moves);
        let mut scrambler = Scrambler::new(cfg.seed, cfg.max_moves);

        for shard in 0..cfg.num_files {
            let examples: Vec<_> = (0..per_shard).map(|_| scrambler.example()).collect();
            loader.save_shard(shard, &examples)?;
            tracing::info!("Shard {}/{}: {} examples", shard + 1, cfg.num_files, examples.len());
        }

        Ok(per_shard * cfg.num_files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::traits::ExampleSource;

    fn config(dir: &std::path::Path, examples: usize, num_files: usize) -> GenerateConfig {
        GenerateConfig {
            features_base: dir.join("features/X").to_string_lossy().into_owned(),
            labels_base:   dir.join("labels/Y").to_string_lossy().into_owned(),
            examples,
            num_files,
            max_moves: 6,
            seed: 11,
        }
    }

    #[test]
    fn test_writes_every_shard_and_labels_solve() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), 30, 3);

        let written = GenerateUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(written, 30);

        let loader = NpyShardLoader::new(&cfg.features_base, &cfg.labels_base, cfg.max_moves);
        for shard in 0..3 {
            let examples = loader.load_shard(shard).unwrap();
            assert_eq!(examples.len(), 10);
            for ex in examples {
                let mut cube = ex.cube().unwrap();
                cube.apply_all(ex.solution());
                assert!(cube.is_solved());
            }
        }
    }

    #[test]
    fn test_remainder_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let written = GenerateUseCase::new(config(dir.path(), 10, 3)).execute().unwrap();
        assert_eq!(written, 9);
    }

    #[test]
    fn test_zero_files_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(GenerateUseCase::new(config(dir.path(), 10, 0)).execute().is_err());
    }
}
