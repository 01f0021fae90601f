// ============================================================
// Layer 3 — SolveExample Domain Type
// ============================================================
// One training example: a sticker configuration and the move
// sequence that solves it, both as raw integer codes exactly as
// they are stored in the shard arrays.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::cube::Cube;
use crate::domain::moves::{decode_moves, Move};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveExample {
    /// 54 sticker colour codes
    pub stickers: Vec<u8>,

    /// Fixed-length move codes, fill-padded
    pub moves: Vec<u8>,
}

impl SolveExample {
    pub fn new(stickers: Vec<u8>, moves: Vec<u8>) -> Self {
        Self { stickers, moves }
    }

    /// The scrambled cube this example starts from
    pub fn cube(&self) -> Result<Cube> {
        Cube::from_stickers(&self.stickers)
    }

    /// Label moves without padding
    pub fn solution(&self) -> Vec<Move> {
        decode_moves(&self.moves)
    }
}
