// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Shard-by-shard training with Burn's DataLoader and Adam.
//
// For each shard:
//   load → partition (train / dev / test) → fit → test eval →
//   save full model + encoder + decoder
//
// Inside fit, every epoch:
//   - teacher-forced pass over the shuffled train slice
//   - dev evaluation on model.valid() (InnerBackend, no autodiff)
//   - one CSV metrics row
//   - early stopping verdict; an improvement saves the best
//     checkpoint
//
// The optimizer is created once, so Adam's moment estimates
// carry over from shard to shard.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use std::sync::Arc;

use anyhow::Result;
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{CubeBatch, CubeBatcher},
    dataset::CubeDataset,
    splitter::partition_vec,
};
use crate::domain::example::SolveExample;
use crate::domain::traits::ExampleSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::early_stopping::{EarlyStopping, Verdict};
use crate::ml::model::{token_accuracy, CubeSolverModel};

/// Mean loss and token accuracy over one pass of a data loader
#[derive(Debug, Clone, Copy)]
pub struct EvalStats {
    pub loss:     f64,
    pub accuracy: f64,
}

#[derive(Debug, Default)]
struct RunningStats {
    loss_sum: f64,
    batches:  usize,
    correct:  usize,
    total:    usize,
}

impl RunningStats {
    fn add(&mut self, loss: f64, (correct, total): (usize, usize)) {
        self.loss_sum += loss;
        self.batches  += 1;
        self.correct  += correct;
        self.total    += total;
    }

    fn finish(&self) -> EvalStats {
        EvalStats {
            loss:     if self.batches > 0 { self.loss_sum / self.batches as f64 } else { f64::NAN },
            accuracy: if self.total   > 0 { self.correct as f64 / self.total as f64 } else { 0.0 },
        }
    }
}

pub fn run_training<B: AutodiffBackend>(
    cfg:          &TrainConfig,
    source:       &dyn ExampleSource,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
    device:       B::Device,
) -> Result<CubeSolverModel<B>> {
    B::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: CubeSolverModel<B> = cfg.model_config().init(&device);
    if cfg.load_prev {
        model = ckpt_manager.load_best(model, &device)?;
        tracing::info!("Restored weights from best checkpoint");
    }
    tracing::info!(
        "Model ready: embed_dim={}, hidden_dim={}, {} parameters",
        cfg.embed_dim,
        cfg.hidden_dim,
        model.num_params()
    );

    let mut optim = AdamConfig::new().init::<B, CubeSolverModel<B>>();

    // ── Shard loop ────────────────────────────────────────────────────────────
    for shard in 0..cfg.num_files {
        let examples = source.load_shard(shard)?;
        let (train, dev, test) = partition_vec(examples, cfg.partition_weights())?;
        tracing::info!(
            "Shard {}: {} train, {} dev, {} test",
            shard,
            train.len(),
            dev.len(),
            test.len()
        );

        model = fit_shard(model, &mut optim, shard, train, dev, cfg, ckpt_manager, metrics, &device)?;

        if !test.is_empty() {
            let loader = eval_loader::<B::InnerBackend>(CubeDataset::new(test), cfg.batch_size, &device);
            let stats  = evaluate(&model.valid(), loader.as_ref());
            tracing::info!(
                "Shard {} test: loss={:.4} acc={:.1}%",
                shard,
                stats.loss,
                stats.accuracy * 100.0
            );
        }

        ckpt_manager.save_model(&model)?;
        ckpt_manager.save_encoder(&model.encoder)?;
        ckpt_manager.save_decoder(&model.decoder)?;
        tracing::info!("Saved model, encoder and decoder after shard {}", shard);
    }

    tracing::info!("Training complete! {} parameters", model.num_params());
    Ok(model)
}

#[allow(clippy::too_many_arguments)]
fn fit_shard<B, O>(
    mut model:    CubeSolverModel<B>,
    optim:        &mut O,
    shard:        usize,
    train:        Vec<SolveExample>,
    dev:          Vec<SolveExample>,
    cfg:          &TrainConfig,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
    device:       &B::Device,
) -> Result<CubeSolverModel<B>>
where
    B: AutodiffBackend,
    O: Optimizer<CubeSolverModel<B>, B>,
{
    let has_dev = !dev.is_empty();
    if !has_dev {
        tracing::warn!("Shard {} has no dev examples; monitoring training loss instead", shard);
    }

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_loader = DataLoaderBuilder::new(CubeBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed.wrapping_add(shard as u64))
        .num_workers(1)
        .build(CubeDataset::new(train));

    // ── Dev data loader (InnerBackend, no autodiff) ─────────────────
    let dev_loader = eval_loader::<B::InnerBackend>(CubeDataset::new(dev), cfg.batch_size, device);

    let mut stopper = EarlyStopping::new(cfg.patience);

    for epoch in 1..=cfg.epochs {
        let mut train_stats = RunningStats::default();

        for batch in train_loader.iter() {
            let (loss, logits) = model.forward_loss(
                batch.encoder_input,
                batch.decoder_input,
                batch.targets.clone(),
            );

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_stats.add(loss_val, token_accuracy(logits, batch.targets));

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let train_eval = train_stats.finish();
        let val_eval = if has_dev {
            evaluate(&model.valid(), dev_loader.as_ref())
        } else {
            train_eval
        };

        println!(
            "Shard {} | Epoch {:>3}/{} | loss={:.4} | acc={:.1}% | val_loss={:.4} | val_acc={:.1}%",
            shard, epoch, cfg.epochs,
            train_eval.loss, train_eval.accuracy * 100.0,
            val_eval.loss, val_eval.accuracy * 100.0,
        );

        metrics.log(&EpochMetrics::new(
            shard,
            epoch,
            train_eval.loss,
            train_eval.accuracy,
            val_eval.loss,
            val_eval.accuracy,
        ))?;

        match stopper.observe(val_eval.loss) {
            Verdict::Improved => {
                ckpt_manager.save_best(&model)?;
                tracing::info!("val_loss improved to {:.4}; checkpoint saved", val_eval.loss);
            }
            Verdict::Waiting(n) => {
                tracing::info!("val_loss did not improve from {:.4} ({} epoch(s))", stopper.best(), n);
            }
            Verdict::Stop => {
                tracing::warn!("Early stopping shard {} after epoch {}", shard, epoch);
                break;
            }
        }
    }

    Ok(model)
}

fn eval_loader<B: Backend>(
    dataset:    CubeDataset,
    batch_size: usize,
    device:     &B::Device,
) -> Arc<dyn DataLoader<CubeBatch<B>>> {
    DataLoaderBuilder::new(CubeBatcher::<B>::new(device.clone()))
        .batch_size(batch_size)
        .num_workers(1)
        .build(dataset)
}

/// One pass over `loader` without gradient tracking.
pub fn evaluate<B: Backend>(
    model:  &CubeSolverModel<B>,
    loader: &dyn DataLoader<CubeBatch<B>>,
) -> EvalStats {
    let mut stats = RunningStats::default();
    for batch in loader.iter() {
        let (loss, logits) = model.forward_loss(
            batch.encoder_input,
            batch.decoder_input,
            batch.targets.clone(),
        );
        stats.add(loss.into_scalar().elem::<f64>(), token_accuracy(logits, batch.targets));
    }
    stats.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::NpyShardLoader;
    use crate::domain::scrambler::Scrambler;
    use crate::ml::backend::{CpuBackend, CpuTrainBackend};

    fn tiny_config(root: &std::path::Path) -> TrainConfig {
        TrainConfig {
            features_base:  root.join("features/X").to_string_lossy().into_owned(),
            labels_base:    root.join("labels/Y").to_string_lossy().into_owned(),
            checkpoint_dir: root.join("checkpoints").to_string_lossy().into_owned(),
            model_dir:      root.join("models").to_string_lossy().into_owned(),
            log_dir:        root.join("logs").to_string_lossy().into_owned(),
            num_files:      1,
            epochs:         2,
            batch_size:     8,
            embed_dim:      8,
            hidden_dim:     16,
            train_weight:   3,
            dev_weight:     1,
            test_weight:    1,
            ..TrainConfig::default()
        }
    }

    fn write_shard(cfg: &TrainConfig, count: usize) -> NpyShardLoader {
        let loader = NpyShardLoader::new(&cfg.features_base, &cfg.labels_base, cfg.max_moves);
        let mut scrambler = Scrambler::new(5, cfg.max_moves);
        let examples: Vec<_> = (0..count).map(|_| scrambler.example()).collect();
        loader.save_shard(0, &examples).unwrap();
        loader
    }

    #[test]
    fn test_running_stats_empty_is_nan() {
        let stats = RunningStats::default().finish();
        assert!(stats.loss.is_nan());
        assert_eq!(stats.accuracy, 0.0);
    }

    #[test]
    fn test_running_stats_averages_per_batch() {
        let mut s = RunningStats::default();
        s.add(1.0, (5, 10));
        s.add(3.0, (10, 10));
        let e = s.finish();
        assert_eq!(e.loss, 2.0);
        assert_eq!(e.accuracy, 0.75);
    }

    #[test]
    fn test_evaluate_reports_finite_loss() {
        let dir    = tempfile::tempdir().unwrap();
        let cfg    = tiny_config(dir.path());
        let source = write_shard(&cfg, 10);
        let device = Default::default();

        let model  = cfg.model_config().init::<CpuBackend>(&device);
        let loader = eval_loader::<CpuBackend>(
            CubeDataset::new(source.load_shard(0).unwrap()),
            4,
            &device,
        );
        let stats = evaluate(&model, loader.as_ref());
        assert!(stats.loss.is_finite());
        assert!((0.0..=1.0).contains(&stats.accuracy));
    }

    #[test]
    fn test_tiny_training_run_writes_artifacts() {
        let dir     = tempfile::tempdir().unwrap();
        let cfg     = tiny_config(dir.path());
        let source  = write_shard(&cfg, 40);
        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir, &cfg.model_dir);
        let metrics = MetricsLogger::new(&cfg.log_dir).unwrap();
        let device  = Default::default();

        run_training::<CpuTrainBackend>(&cfg, &source, &ckpt, &metrics, device).unwrap();

        // Every artifact loads back into a fresh module
        let device = Default::default();
        let model_cfg = cfg.model_config();
        assert!(ckpt.load_best(model_cfg.init::<CpuBackend>(&device), &device).is_ok());
        assert!(ckpt.load_encoder(model_cfg.init_encoder::<CpuBackend>(&device), &device).is_ok());
        assert!(ckpt.load_decoder(model_cfg.init_decoder::<CpuBackend>(&device), &device).is_ok());

        // Header + one row per epoch (patience 3 > 2 epochs, so no early stop)
        let csv = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_load_prev_restores_best_checkpoint() {
        let dir     = tempfile::tempdir().unwrap();
        let cfg     = tiny_config(dir.path());
        let source  = write_shard(&cfg, 40);
        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir, &cfg.model_dir);
        let metrics = MetricsLogger::new(&cfg.log_dir).unwrap();
        let device  = Default::default();

        run_training::<CpuTrainBackend>(&cfg, &source, &ckpt, &metrics, device).unwrap();

        // Plant weights that training could not have produced, so a run
        // that ignores load_prev cannot match them by accident.
        let planted = cfg.model_config().init::<CpuBackend>(&Default::default());
        ckpt.save_best(&planted).unwrap();

        // Zero epochs: the returned weights are exactly what was loaded
        let rerun = TrainConfig { load_prev: true, epochs: 0, ..cfg.clone() };
        let restored = run_training::<CpuTrainBackend>(&rerun, &source, &ckpt, &metrics, Default::default())
            .unwrap()
            .valid();

        let from_ckpt = ckpt
            .load_best(cfg.model_config().init::<CpuBackend>(&Default::default()), &Default::default())
            .unwrap();

        let hidden = |model: &CubeSolverModel<CpuBackend>| -> Vec<f32> {
            let stickers: Vec<i32> = (0..54).map(|i| i / 9).collect();
            let input = Tensor::<CpuBackend, 2, Int>::from_data(
                TensorData::new(stickers, [1, 54]),
                &Default::default(),
            );
            model.encoder.forward(input).hidden.into_data().convert::<f32>().to_vec().unwrap()
        };

        let restored = hidden(&restored);
        for (a, b) in restored.iter().zip(hidden(&from_ckpt)) {
            assert!((a - b).abs() < 1e-5, "{a} vs {b}");
        }
        // Compact records store half precision
        for (a, b) in restored.iter().zip(hidden(&planted)) {
            assert!((a - b).abs() < 1e-2, "{a} vs {b}");
        }
    }

    #[test]
    fn test_load_prev_without_checkpoint_fails() {
        let dir     = tempfile::tempdir().unwrap();
        let cfg     = TrainConfig { load_prev: true, ..tiny_config(dir.path()) };
        let source  = write_shard(&cfg, 10);
        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir, &cfg.model_dir);
        let metrics = MetricsLogger::new(&cfg.log_dir).unwrap();

        let result = run_training::<CpuTrainBackend>(&cfg, &source, &ckpt, &metrics, Default::default());
        assert!(result.is_err());
    }
}
