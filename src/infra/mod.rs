// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence used by training and inference:
//
//   checkpoint.rs — Saving and loading weights
//                   Best checkpoint, full model, and the
//                   encoder / decoder halves as separate
//                   CompactRecorder files, plus TrainConfig
//                   as JSON so inference can rebuild them.
//
//   metrics.rs    — Training metrics logging
//                   One CSV row per epoch in a per-run
//                   directory under logs/.

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
