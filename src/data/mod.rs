// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the shard files on disk and the tensor
// batches the training loop consumes:
//
//   X<i>.npy / Y<i>.npy
//       │
//       ▼
//   npy               → decodes the raw arrays
//       │
//       ▼
//   NpyShardLoader    → validates shapes and vocabularies
//       │
//       ▼
//   partition_vec     → train / dev / test slices
//       │
//       ▼
//   CubeDataset       → implements Burn's Dataset trait
//       │
//       ▼
//   CubeBatcher       → stacks examples, builds teacher-forcing input
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// .npy array reader / writer
pub mod npy;

/// Numbered shard loading and saving
pub mod loader;

/// Weighted contiguous train/dev/test partitioning
pub mod splitter;

/// Implements Burn's Dataset trait for solve examples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
