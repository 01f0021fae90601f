// ============================================================
// Layer 2 — Solve Use Case
// ============================================================
// Runs the trained encoder / decoder over scrambled cubes:
//   1. Pick the inputs: one explicit 54-digit configuration, or
//      the first `count` rows of a shard (with their labels)
//   2. Greedy-decode a move sequence for each
//   3. Replay the prediction on the simulator to see whether
//      it actually solves the cube

use anyhow::{bail, Result};
use burn::backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice};
use serde::{Deserialize, Serialize};

use crate::data::loader::NpyShardLoader;
use crate::domain::cube::Cube;
use crate::domain::moves::{decode_moves, Move, MAX_MOVES};
use crate::domain::traits::{ExampleSource, MoveSolver};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::backend::{CpuBackend, DeviceKind, GpuBackend};
use crate::ml::inferencer::Inferencer;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveConfig {
    pub checkpoint_dir: String,
    pub model_dir:      String,
    pub features_base:  String,
    pub labels_base:    String,
    pub max_moves:      usize,
    pub shard:          usize,
    pub count:          usize,
    /// 54 sticker digits; overrides shard / count
    pub stickers:       Option<String>,
    pub device:         DeviceKind,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: "logs/checkpoints".to_string(),
            model_dir:      "data/models".to_string(),
            features_base:  "data/features/X".to_string(),
            labels_base:    "data/labels/Y".to_string(),
            max_moves:      MAX_MOVES,
            shard:          0,
            count:          20,
            stickers:       None,
            device:         DeviceKind::Cpu,
        }
    }
}

/// Prediction for one cube
#[derive(Debug, Clone)]
pub struct SolveRow {
    pub cube:      Cube,
    pub predicted: Vec<Move>,
    /// Label moves, when the cube came from a shard
    pub actual:    Option<Vec<Move>>,
    /// Replaying `predicted` reaches the solved state
    pub solves:    bool,
}

#[derive(Debug, Clone)]
pub struct SolveReport {
    pub rows: Vec<SolveRow>,
}

impl SolveReport {
    pub fn solved(&self) -> usize {
        self.rows.iter().filter(|r| r.solves).count()
    }

    /// Rows whose prediction equals the label exactly
    pub fn exact(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.actual.as_ref() == Some(&r.predicted))
            .count()
    }
}

pub struct SolveUseCase {
    config: SolveConfig,
    solver: Box<dyn MoveSolver>,
}

impl SolveUseCase {
    /// Loads the saved encoder and decoder onto the configured device.
    pub fn new(config: SolveConfig) -> Result<Self> {
        let ckpt = CheckpointManager::new(&config.checkpoint_dir, &config.model_dir);
        let solver: Box<dyn MoveSolver> = match config.device {
            DeviceKind::Cpu => Box::new(Inferencer::<CpuBackend>::from_checkpoint(&ckpt, NdArrayDevice::default())?),
            DeviceKind::Gpu => Box::new(Inferencer::<GpuBackend>::from_checkpoint(&ckpt, WgpuDevice::default())?),
        };
        Ok(Self::with_solver(config, solver))
    }

    pub fn with_solver(config: SolveConfig, solver: Box<dyn MoveSolver>) -> Self {
        Self { config, solver }
    }

    pub fn execute(&self) -> Result<SolveReport> {
        let (cubes, actual) = self.inputs()?;
        if cubes.is_empty() {
            bail!("Nothing to solve");
        }

        let predictions = self.solver.solve(&cubes)?;
        if predictions.len() != cubes.len() {
            bail!(
                "Solver returned {} predictions for {} cubes",
                predictions.len(),
                cubes.len()
            );
        }

        let rows: Vec<SolveRow> = cubes
            .into_iter()
            .zip(predictions)
            .zip(actual)
            .map(|((cube, codes), actual)| {
                let predicted = decode_moves(&codes);
                let mut replay = cube.clone();
                replay.apply_all(predicted.iter().copied());
                SolveRow { cube, predicted, actual, solves: replay.is_solved() }
            })
            .collect();

        let report = SolveReport { rows };
        tracing::info!("Solved {}/{} cubes", report.solved(), report.rows.len());
        Ok(report)
    }

    fn inputs(&self) -> Result<(Vec<Cube>, Vec<Option<Vec<Move>>>)> {
        let cfg = &self.config;

        if let Some(digits) = &cfg.stickers {
            let cube: Cube = digits.parse()?;
            return Ok((vec![cube], vec![None]));
        }

        let loader   = NpyShardLoader::new(&cfg.features_base, &cfg.labels_base, cfg.max_moves);
        let examples = loader.load_shard(cfg.shard)?;

        let mut cubes  = Vec::new();
        let mut labels = Vec::new();
        for ex in examples.iter().take(cfg.count) {
            cubes.push(ex.cube()?);
            labels.push(Some(ex.solution()));
        }
        Ok((cubes, labels))
    }
}
