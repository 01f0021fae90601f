// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands and their flags. Every default
// matches the application config's Default impl.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::{
    generate_use_case::GenerateConfig,
    solve_use_case::SolveConfig,
    train_use_case::TrainConfig,
};
use crate::ml::backend::DeviceKind;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write scrambled cubes and their solutions as .npy shards
    Generate(GenerateArgs),

    /// Train the encoder / decoder on the shards
    Train(TrainArgs),

    /// Predict solutions with a trained model
    Solve(SolveArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum DeviceArg {
    /// NdArray backend
    #[default]
    Cpu,
    /// Wgpu backend
    Gpu,
}

impl From<DeviceArg> for DeviceKind {
    fn from(d: DeviceArg) -> Self {
        match d {
            DeviceArg::Cpu => DeviceKind::Cpu,
            DeviceArg::Gpu => DeviceKind::Gpu,
        }
    }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Feature file prefix; shard i goes to <prefix>i.npy
    #[arg(long, default_value = "data/features/X")]
    pub features_base: String,

    /// Label file prefix
    #[arg(long, default_value = "data/labels/Y")]
    pub labels_base: String,

    /// Total examples across all shards
    #[arg(long, default_value_t = 10_000_000)]
    pub examples: usize,

    #[arg(long, default_value_t = 5)]
    pub num_files: usize,

    /// Longest scramble, and the label width
    #[arg(long, default_value_t = 25)]
    pub max_moves: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<GenerateArgs> for GenerateConfig {
    fn from(a: GenerateArgs) -> Self {
        GenerateConfig {
            features_base: a.features_base,
            labels_base:   a.labels_base,
            examples:      a.examples,
            num_files:     a.num_files,
            max_moves:     a.max_moves,
            seed:          a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[arg(long, default_value = "data/features/X")]
    pub features_base: String,

    #[arg(long, default_value = "data/labels/Y")]
    pub labels_base: String,

    /// Best-so-far checkpoint directory
    #[arg(long, default_value = "logs/checkpoints")]
    pub checkpoint_dir: String,

    /// Model, encoder, decoder and train_config.json
    #[arg(long, default_value = "data/models")]
    pub model_dir: String,

    /// Each run writes its metrics CSV to a new directory here
    #[arg(long, default_value = "logs")]
    pub log_dir: String,

    /// Number of shards to train on, in order
    #[arg(long, default_value_t = 5)]
    pub num_files: usize,

    /// Epochs per shard
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    #[arg(long, default_value_t = 512)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    #[arg(long, default_value_t = 128)]
    pub embed_dim: usize,

    /// LSTM hidden and cell size
    #[arg(long, default_value_t = 512)]
    pub hidden_dim: usize,

    /// Label width in the shards
    #[arg(long, default_value_t = 25)]
    pub max_moves: usize,

    #[arg(long, default_value_t = 98)]
    pub train_weight: usize,

    #[arg(long, default_value_t = 1)]
    pub dev_weight: usize,

    #[arg(long, default_value_t = 1)]
    pub test_weight: usize,

    /// Epochs without dev-loss improvement before a shard stops
    #[arg(long, default_value_t = 3)]
    pub patience: usize,

    /// Start from the best checkpoint instead of fresh weights
    #[arg(long)]
    pub load_prev: bool,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, value_enum, default_value_t = DeviceArg::Cpu)]
    pub device: DeviceArg,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            features_base:  a.features_base,
            labels_base:    a.labels_base,
            checkpoint_dir: a.checkpoint_dir,
            model_dir:      a.model_dir,
            log_dir:        a.log_dir,
            num_files:      a.num_files,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            lr:             a.lr,
            embed_dim:      a.embed_dim,
            hidden_dim:     a.hidden_dim,
            max_moves:      a.max_moves,
            train_weight:   a.train_weight,
            dev_weight:     a.dev_weight,
            test_weight:    a.test_weight,
            patience:       a.patience,
            load_prev:      a.load_prev,
            seed:           a.seed,
            device:         a.device.into(),
        }
    }
}

#[derive(Args, Debug)]
pub struct SolveArgs {
    /// One cube as 54 sticker digits (0-5, face order U R F D L B).
    /// When omitted, rows are read from a shard instead.
    #[arg(long)]
    pub stickers: Option<String>,

    #[arg(long, default_value = "logs/checkpoints")]
    pub checkpoint_dir: String,

    #[arg(long, default_value = "data/models")]
    pub model_dir: String,

    #[arg(long, default_value = "data/features/X")]
    pub features_base: String,

    #[arg(long, default_value = "data/labels/Y")]
    pub labels_base: String,

    #[arg(long, default_value_t = 25)]
    pub max_moves: usize,

    /// Which shard to take cubes from
    #[arg(long, default_value_t = 0)]
    pub shard: usize,

    /// How many leading rows of the shard to solve
    #[arg(long, default_value_t = 20)]
    pub count: usize,

    #[arg(long, value_enum, default_value_t = DeviceArg::Cpu)]
    pub device: DeviceArg,
}

impl From<SolveArgs> for SolveConfig {
    fn from(a: SolveArgs) -> Self {
        SolveConfig {
            checkpoint_dir: a.checkpoint_dir,
            model_dir:      a.model_dir,
            features_base:  a.features_base,
            labels_base:    a.labels_base,
            max_moves:      a.max_moves,
            shard:          a.shard,
            count:          a.count,
            stickers:       a.stickers,
            device:         a.device.into(),
        }
    }
}
