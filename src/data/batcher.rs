// ============================================================
// Layer 4 — Cube Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<SolveExample>
// into the three tensors one training step needs.
//
// Teacher forcing:
//   The decoder is trained to predict move t from the true
//   moves 0..t-1, so its input is the label sequence shifted
//   right by one with the fill code as the start token:
//
//     targets        = [ R,  U', F,  0,  0 ]
//     decoder_input  = [ 0,  R,  U', F,  0 ]
//
//   At inference the same start token (0) begins the greedy
//   loop, and each prediction is fed back as the next input.
//
// All rows are fixed-length already, so stacking is a flatten
// followed by a reshape:
//   [e1_t1, ..., e1_tS, e2_t1, ..., eN_tS] → [N, S]
//
// Reference: Burn Book §4 (Batcher)
//            Sutskever et al. (2014) Sequence to Sequence Learning

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::example::SolveExample;
use crate::domain::moves::FILL_CODE;

/// A batch ready for the encoder-decoder forward pass.
#[derive(Debug, Clone)]
pub struct CubeBatch<B: Backend> {
    /// Sticker codes, shape [batch_size, 54]
    pub encoder_input: Tensor<B, 2, Int>,

    /// Shifted move codes, shape [batch_size, max_moves]
    pub decoder_input: Tensor<B, 2, Int>,

    /// Move codes to predict, shape [batch_size, max_moves]
    pub targets: Tensor<B, 2, Int>,
}

#[derive(Clone, Debug)]
pub struct CubeBatcher<B: Backend> {
    /// The device to create tensors on
    pub device: B::Device,
}

impl<B: Backend> CubeBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

/// Prepend the fill code and drop the last move
pub fn shift_right(moves: &[u8]) -> Vec<u8> {
    let mut shifted = Vec::with_capacity(moves.len());
    if !moves.is_empty() {
        shifted.push(FILL_CODE);
        shifted.extend_from_slice(&moves[..moves.len() - 1]);
    }
    shifted
}

/// Stack equal-length rows of codes into an [rows, cols] Int tensor
pub fn codes_to_tensor<B: Backend>(rows: &[&[u8]], device: &B::Device) -> Tensor<B, 2, Int> {
    let cols = rows.first().map_or(0, |r| r.len());
    let flat: Vec<i32> = rows
        .iter()
        .flat_map(|r| r.iter().map(|&c| c as i32))
        .collect();

    Tensor::<B, 2, Int>::from_data(TensorData::new(flat, [rows.len(), cols]), device)
}

impl<B: Backend> Batcher<SolveExample, CubeBatch<B>> for CubeBatcher<B> {
    fn batch(&self, items: Vec<SolveExample>) -> CubeBatch<B> {
        let stickers: Vec<&[u8]> = items.iter().map(|e| e.stickers.as_slice()).collect();
        let moves:    Vec<&[u8]> = items.iter().map(|e| e.moves.as_slice()).collect();

        let shifted: Vec<Vec<u8>> = moves.iter().map(|m| shift_right(m)).collect();
        let shifted: Vec<&[u8]>   = shifted.iter().map(Vec::as_slice).collect();

        CubeBatch {
            encoder_input: codes_to_tensor(&stickers, &self.device),
            decoder_input: codes_to_tensor(&shifted, &self.device),
            targets:       codes_to_tensor(&moves, &self.device),
        }
    }
}
