// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the training pipeline in order:
//
//   Step 1: Point the shard loader at the .npy bases  (Layer 4 - data)
//   Step 2: Prepare checkpoint + metrics directories  (Layer 6 - infra)
//   Step 3: Save config for inference                 (Layer 6 - infra)
//   Step 4: Run the shard loop on the chosen backend  (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use burn::backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{loader::NpyShardLoader, splitter::PartitionWeights};
use crate::domain::{
    cube::STICKER_VOCAB,
    moves::{MAX_MOVES, MOVE_VOCAB},
};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{run_name, MetricsLogger},
};
use crate::ml::{
    backend::{CpuTrainBackend, DeviceKind, GpuTrainBackend},
    model::CubeSolverConfig,
    trainer::run_training,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Serialised next to the model so `solve` can rebuild the
// encoder and decoder with the same shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub features_base:  String,
    pub labels_base:    String,
    pub checkpoint_dir: String,
    pub model_dir:      String,
    pub log_dir:        String,
    pub num_files:      usize,
    pub epochs:         usize,
    pub batch_size:     usize,
    pub lr:             f64,
    pub embed_dim:      usize,
    pub hidden_dim:     usize,
    pub max_moves:      usize,
    pub train_weight:   usize,
    pub dev_weight:     usize,
    pub test_weight:    usize,
    pub patience:       usize,
    pub load_prev:      bool,
    pub seed:           u64,
    pub device:         DeviceKind,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            features_base:  "data/features/X".to_string(),
            labels_base:    "data/labels/Y".to_string(),
            checkpoint_dir: "logs/checkpoints".to_string(),
            model_dir:      "data/models".to_string(),
            log_dir:        "logs".to_string(),
            num_files:      5,
            epochs:         10,
            batch_size:     512,
            lr:             1e-3,
            embed_dim:      128,
            hidden_dim:     512,
            max_moves:      MAX_MOVES,
            train_weight:   98,
            dev_weight:     1,
            test_weight:    1,
            patience:       3,
            load_prev:      false,
            seed:           42,
            device:         DeviceKind::Cpu,
        }
    }
}

impl TrainConfig {
    pub fn model_config(&self) -> CubeSolverConfig {
        CubeSolverConfig::new(STICKER_VOCAB, MOVE_VOCAB)
            .with_embed_dim(self.embed_dim)
            .with_hidden_dim(self.hidden_dim)
    }

    pub fn partition_weights(&self) -> PartitionWeights {
        PartitionWeights::new(self.train_weight, self.dev_weight, self.test_weight)
    }
}

pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Shard source ──────────────────────────────────────────────
        let loader = NpyShardLoader::new(&cfg.features_base, &cfg.labels_base, cfg.max_moves);
        tracing::info!(
            "Training on {} shard(s) from '{}*' / '{}*'",
            cfg.num_files,
            cfg.features_base,
            cfg.labels_base
        );

        // ── Step 2: Output locations ──────────────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir, &cfg.model_dir);
        let run_dir      = Path::new(&cfg.log_dir).join(run_name());
        let metrics      = MetricsLogger::new(run_dir.to_string_lossy())?;
        tracing::info!("Metrics: '{}'", metrics.csv_path().display());

        // ── Step 3: Save config for inference ─────────────────────────────────
        ckpt_manager.save_config(cfg)?;

        // ── Step 4: Run training on the selected backend ──────────────────────
        match cfg.device {
            DeviceKind::Cpu => {
                tracing::info!("Backend: NdArray (CPU)");
                run_training::<CpuTrainBackend>(
                    cfg, &loader, &ckpt_manager, &metrics, NdArrayDevice::default(),
                )?;
            }
            DeviceKind::Gpu => {
                tracing::info!("Backend: Wgpu (GPU)");
                run_training::<GpuTrainBackend>(
                    cfg, &loader, &ckpt_manager, &metrics, WgpuDevice::default(),
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_shape() {
        let m = TrainConfig::default().model_config();
        assert_eq!(m.sticker_vocab, 6);
        assert_eq!(m.move_vocab, 13);
        assert_eq!(m.embed_dim, 128);
        assert_eq!(m.hidden_dim, 512);
    }

    #[test]
    fn test_default_weights_leave_small_dev_and_test() {
        let (train_end, dev_end) = TrainConfig::default()
            .partition_weights()
            .bounds(1000)
            .unwrap();
        assert_eq!(train_end, 980);
        assert_eq!(dev_end, 990);
    }

    #[test]
    fn test_config_json_keeps_device() {
        let cfg  = TrainConfig { device: DeviceKind::Gpu, ..TrainConfig::default() };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: TrainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.device, DeviceKind::Gpu);
        assert_eq!(back.max_moves, MAX_MOVES);
    }

    #[test]
    fn test_missing_shard_fails_before_training() {
        let dir = tempfile::tempdir().unwrap();
        let p   = |s: &str| dir.path().join(s).to_string_lossy().into_owned();
        let cfg = TrainConfig {
            features_base:  p("features/X"),
            labels_base:    p("labels/Y"),
            checkpoint_dir: p("ckpt"),
            model_dir:      p("models"),
            log_dir:        p("logs"),
            num_files:      1,
            ..TrainConfig::default()
        };

        assert!(TrainUseCase::new(cfg).execute().is_err());
        // The config is written before any shard is read
        assert!(dir.path().join("models/train_config.json").exists());
    }
}
