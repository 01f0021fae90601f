// ============================================================
// Layer 3 — Move Vocabulary
// ============================================================
// The decoder speaks a 13-symbol vocabulary:
//
//   code 0      → fill (padding after the last move, and the
//                 decoder's start token)
//   codes 1..12 → the twelve quarter turns, in the order
//                 U U' D D' F F' B B' L L' R R'
//
// Half turns are written as two quarter turns, so a label
// sequence of length 25 can hold any scramble the generator
// produces.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};

/// Padding / start-of-sequence move code
pub const FILL_CODE: u8 = 0;

/// Output vocabulary size: 12 quarter turns + fill
pub const MOVE_VOCAB: usize = 13;

/// Default length of a label sequence
pub const MAX_MOVES: usize = 25;

/// The six faces, in sticker storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    U,
    R,
    F,
    D,
    L,
    B,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::U, Face::R, Face::F, Face::D, Face::L, Face::B];

    /// Position of this face's nine stickers in the 54-sticker vector
    pub fn index(self) -> usize {
        match self {
            Face::U => 0,
            Face::R => 1,
            Face::F => 2,
            Face::D => 3,
            Face::L => 4,
            Face::B => 5,
        }
    }

    /// Outward unit normal, x → R, y → U, z → F
    pub fn normal(self) -> [i8; 3] {
        match self {
            Face::U => [0, 1, 0],
            Face::D => [0, -1, 0],
            Face::R => [1, 0, 0],
            Face::L => [-1, 0, 0],
            Face::F => [0, 0, 1],
            Face::B => [0, 0, -1],
        }
    }

    fn letter(self) -> char {
        match self {
            Face::U => 'U',
            Face::R => 'R',
            Face::F => 'F',
            Face::D => 'D',
            Face::L => 'L',
            Face::B => 'B',
        }
    }
}

/// A quarter turn of one face. `*Prime` is counter-clockwise.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    U,
    UPrime,
    D,
    DPrime,
    F,
    FPrime,
    B,
    BPrime,
    L,
    LPrime,
    R,
    RPrime,
}

impl Move {
    pub const ALL: [Move; 12] = [
        Move::U,
        Move::UPrime,
        Move::D,
        Move::DPrime,
        Move::F,
        Move::FPrime,
        Move::B,
        Move::BPrime,
        Move::L,
        Move::LPrime,
        Move::R,
        Move::RPrime,
    ];

    /// Integer code used in label arrays (1..=12)
    pub fn code(self) -> u8 {
        self as u8 + 1
    }

    /// Inverse of `code`. Returns None for the fill code and anything
    /// outside the vocabulary.
    pub fn from_code(code: u8) -> Option<Move> {
        code.checked_sub(1)
            .and_then(|i| Self::ALL.get(i as usize).copied())
    }

    /// Index into `Move::ALL`
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn face(self) -> Face {
        match self {
            Move::U | Move::UPrime => Face::U,
            Move::D | Move::DPrime => Face::D,
            Move::F | Move::FPrime => Face::F,
            Move::B | Move::BPrime => Face::B,
            Move::L | Move::LPrime => Face::L,
            Move::R | Move::RPrime => Face::R,
        }
    }

    pub fn is_prime(self) -> bool {
        (self as u8) % 2 == 1
    }

    pub fn inverse(self) -> Move {
        // Clockwise and prime variants sit next to each other in ALL
        Self::ALL[self.index() ^ 1]
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_prime() {
            write!(f, "{}'", self.face().letter())
        } else {
            write!(f, "{}", self.face().letter())
        }
    }
}

impl FromStr for Move {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let face = match chars.next() {
            Some('U') => Face::U,
            Some('D') => Face::D,
            Some('F') => Face::F,
            Some('B') => Face::B,
            Some('L') => Face::L,
            Some('R') => Face::R,
            _ => bail!("Unknown move '{s}'"),
        };
        let prime = match chars.as_str() {
            ""  => false,
            "'" => true,
            _   => bail!("Unknown move '{s}'"),
        };

        Self::ALL
            .iter()
            .copied()
            .find(|m| m.face() == face && m.is_prime() == prime)
            .ok_or_else(|| anyhow!("Unknown move '{s}'"))
    }
}

/// Pad a move list into a fixed-length code vector.
/// Moves beyond `len` are dropped.
pub fn encode_moves(moves: &[Move], len: usize) -> Vec<u8> {
    let mut codes: Vec<u8> = moves.iter().take(len).map(|m| m.code()).collect();
    codes.resize(len, FILL_CODE);
    codes
}

/// Turn a code vector back into moves, skipping fill codes.
pub fn decode_moves(codes: &[u8]) -> Vec<Move> {
    codes.iter().filter_map(|&c| Move::from_code(c)).collect()
}

/// "R U R' U'" style rendering
pub fn format_moves(moves: &[Move]) -> String {
    moves
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_cover_vocab_without_fill() {
        let codes: Vec<u8> = Move::ALL.iter().map(|m| m.code()).collect();
        assert_eq!(codes, (1..=12).collect::<Vec<u8>>());
        assert!(codes.iter().all(|&c| (c as usize) < MOVE_VOCAB));
        assert_eq!(Move::from_code(FILL_CODE), None);
        assert_eq!(Move::from_code(13), None);
        assert_eq!(Move::from_code(11), Some(Move::R));
    }

    #[test]
    fn test_inverse_pairs() {
        assert_eq!(Move::U.inverse(), Move::UPrime);
        assert_eq!(Move::RPrime.inverse(), Move::R);
        for m in Move::ALL {
            assert_eq!(m.inverse().inverse(), m);
            assert_eq!(m.inverse().face(), m.face());
        }
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(Move::FPrime.to_string(), "F'");
        assert_eq!(Move::L.to_string(), "L");
        for m in Move::ALL {
            assert_eq!(m.to_string().parse::<Move>().unwrap(), m);
        }
        assert!("X".parse::<Move>().is_err());
        assert!("U2".parse::<Move>().is_err());
    }

    #[test]
    fn test_encode_pads_and_decode_skips_fill() {
        let moves = vec![Move::R, Move::UPrime];
        let codes = encode_moves(&moves, 5);
        assert_eq!(codes, vec![11, 2, 0, 0, 0]);
        assert_eq!(decode_moves(&codes), moves);
        assert_eq!(format_moves(&moves), "R U'");
    }
}
