// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn specific code lives here. The domain and data
// layers only see codes and tensors going in and out.
//
//   backend.rs        — Backend aliases (NdArray / Wgpu) and the
//                       device selector carried in TrainConfig
//
//   model.rs          — The encoder / decoder LSTM pair
//                       • sticker embedding → LSTM → final state
//                       • move embedding → LSTM(init state) → Linear
//
//   early_stopping.rs — Patience counter over dev loss
//
//   trainer.rs        — Shard loop, per-shard fit, evaluation,
//                       checkpoint and metrics hooks
//
//   inferencer.rs     — Greedy decoding from the saved halves
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Sutskever et al. (2014) Sequence to Sequence Learning

/// Backend type aliases and device selection
pub mod backend;

/// Encoder / decoder LSTM architecture
pub mod model;

/// Dev-loss patience tracking
pub mod early_stopping;

/// Shard-by-shard training loop with validation and checkpointing
pub mod trainer;

/// Greedy decoder for inference
pub mod inferencer;
