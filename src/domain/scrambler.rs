// ============================================================
// Layer 3 — Scrambler
// ============================================================
// Produces labelled examples by scrambling a solved cube:
//
//   1. draw a scramble length in 1..=max_moves
//   2. draw that many quarter turns, never following a move
//      with its own inverse (that pair would be a no-op)
//   3. apply them to a solved cube → the input stickers
//   4. invert and reverse the scramble → the label moves
//
// The label is therefore always a valid (not necessarily
// shortest) solution of its input.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::cube::Cube;
use crate::domain::example::SolveExample;
use crate::domain::moves::{encode_moves, Move};

pub struct Scrambler {
    rng:       StdRng,
    max_moves: usize,
}

impl Scrambler {
    /// # Panics
    /// Panics if `max_moves` is zero, since no scramble length
    /// could be drawn.
    pub fn new(seed: u64, max_moves: usize) -> Self {
        assert!(max_moves > 0, "max_moves must be at least 1");
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_moves,
        }
    }

    /// A random move sequence of length 1..=max_moves
    pub fn scramble(&mut self) -> Vec<Move> {
        let len = self.rng.gen_range(1..=self.max_moves);
        let mut moves: Vec<Move> = Vec::with_capacity(len);

        while moves.len() < len {
            let m = Move::ALL[self.rng.gen_range(0..Move::ALL.len())];
            if moves.last().is_some_and(|prev| prev.inverse() == m) {
                continue;
            }
            moves.push(m);
        }
        moves
    }

    /// One (stickers, solution) pair, solution padded to max_moves
    pub fn example(&mut self) -> SolveExample {
        let scramble = self.scramble();

        let mut cube = Cube::solved();
        cube.apply_all(scramble.iter().copied());

        let solution = solution_for(&scramble);
        SolveExample::new(
            cube.stickers().to_vec(),
            encode_moves(&solution, self.max_moves),
        )
    }
}

/// Undo a scramble: inverse moves in reverse order
pub fn solution_for(scramble: &[Move]) -> Vec<Move> {
    scramble.iter().rev().map(|m| m.inverse()).collect()
}
