// ============================================================
// Layer 3 — Core Traits
// ============================================================
// The two seams the application layer programs against:
//   - where examples come from   (ExampleSource)
//   - who turns cubes into moves (MoveSolver)
//
// Implementations:
//   - NpyShardLoader → ExampleSource over numbered .npy files
//   - Inferencer     → MoveSolver using the trained LSTM pair

use anyhow::Result;

use crate::domain::cube::Cube;
use crate::domain::example::SolveExample;

/// Anything that can hand out the examples of a numbered shard.
pub trait ExampleSource {
    fn load_shard(&self, index: usize) -> Result<Vec<SolveExample>>;
}

/// Anything that can propose a fixed-length move code sequence
/// for each cube in a batch.
pub trait MoveSolver {
    fn solve(&self, cubes: &[Cube]) -> Result<Vec<Vec<u8>>>;
}
