// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores weights using Burn's CompactRecorder.
//
// Files written:
//   logs/checkpoints/
//     checkpoint.mpk.gz    ← best dev-loss weights, full model
//   data/models/
//     model.mpk.gz         ← full model after the latest shard
//     encoder.mpk.gz       ← encoder only (inference)
//     decoder.mpk.gz       ← decoder only (inference)
//     train_config.json    ← hyperparameters to rebuild the modules
//
// The encoder and decoder records are the same field trees as
// `model.encoder` / `model.decoder` inside the full record, so
// inference never has to build the training graph.
//
// CompactRecorder:
//   - MessagePack + gzip, half precision floats
//   - loading fails if the architecture doesn't match
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::CompactRecorder,
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{CubeSolverModel, Decoder, Encoder};

const CHECKPOINT_FILE: &str = "checkpoint";
const MODEL_FILE:      &str = "model";
const ENCODER_FILE:    &str = "encoder";
const DECODER_FILE:    &str = "decoder";
const CONFIG_FILE:     &str = "train_config.json";

pub struct CheckpointManager {
    /// Where the best-so-far checkpoint goes
    checkpoint_dir: PathBuf,
    /// Where the per-shard model, encoder, decoder and config go
    model_dir: PathBuf,
}

impl CheckpointManager {
    /// Creates both directories if they don't already exist.
    pub fn new(checkpoint_dir: impl Into<String>, model_dir: impl Into<String>) -> Self {
        let checkpoint_dir = PathBuf::from(checkpoint_dir.into());
        let model_dir      = PathBuf::from(model_dir.into());
        fs::create_dir_all(&checkpoint_dir).ok();
        fs::create_dir_all(&model_dir).ok();
        Self { checkpoint_dir, model_dir }
    }

    pub fn save_best<B: Backend>(&self, model: &CubeSolverModel<B>) -> Result<()> {
        save_module(model, self.checkpoint_dir.join(CHECKPOINT_FILE))
    }

    pub fn load_best<B: Backend>(
        &self,
        model:  CubeSolverModel<B>,
        device: &B::Device,
    ) -> Result<CubeSolverModel<B>> {
        load_module(model, self.checkpoint_dir.join(CHECKPOINT_FILE), device)
    }

    pub fn save_model<B: Backend>(&self, model: &CubeSolverModel<B>) -> Result<()> {
        save_module(model, self.model_dir.join(MODEL_FILE))
    }

    pub fn save_encoder<B: Backend>(&self, encoder: &Encoder<B>) -> Result<()> {
        save_module(encoder, self.model_dir.join(ENCODER_FILE))
    }

    pub fn save_decoder<B: Backend>(&self, decoder: &Decoder<B>) -> Result<()> {
        save_module(decoder, self.model_dir.join(DECODER_FILE))
    }

    pub fn load_encoder<B: Backend>(&self, encoder: Encoder<B>, device: &B::Device) -> Result<Encoder<B>> {
        load_module(encoder, self.model_dir.join(ENCODER_FILE), device)
    }

    pub fn load_decoder<B: Backend>(&self, decoder: Decoder<B>, device: &B::Device) -> Result<Decoder<B>> {
        load_module(decoder, self.model_dir.join(DECODER_FILE), device)
    }

    /// Must be called before training so inference can rebuild
    /// the exact architecture.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.model_dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.model_dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'solve'.",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }
}

/// The recorder appends its own extension to `path`.
fn save_module<B: Backend, M: Module<B>>(module: &M, path: PathBuf) -> Result<()> {
    module
        .clone()
        .save_file(path.clone(), &CompactRecorder::new())
        .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

    tracing::debug!("Saved '{}'", path.display());
    Ok(())
}

fn load_module<B: Backend, M: Module<B>>(module: M, path: PathBuf, device: &B::Device) -> Result<M> {
    module
        .load_file(path.clone(), &CompactRecorder::new(), device)
        .with_context(|| {
            format!(
                "Cannot load checkpoint '{}'. Have you trained the model first?",
                path.display()
            )
        })
}
