// ============================================================
// Layer 3 — Cube State
// ============================================================
// A 3x3x3 cube stored as 54 sticker colours, face by face in
// the order U R F D L B, each face row-major.
//
// Face layouts (row 0 first), as seen looking at the face:
//   U: row 0 touches B,  col 0 touches L
//   D: row 0 touches F,  col 0 touches L
//   F, R, B, L: row 0 touches U, col 0 is the left edge
//
// Instead of hand-typing twelve permutation tables, every
// sticker gets a 3D position and outward normal; a quarter
// turn rotates both about the face axis, and the sticker
// landing spot is looked up from the rotated pair.

use std::str::FromStr;
use std::sync::OnceLock;

use anyhow::{bail, Result};

use crate::domain::moves::{Face, Move};

/// Stickers per configuration
pub const STICKER_COUNT: usize = 54;

/// Input vocabulary size (one code per colour)
pub const STICKER_VOCAB: usize = 6;

type Vec3 = [i8; 3];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cube {
    stickers: [u8; STICKER_COUNT],
}

impl Cube {
    /// Every face a single colour, colour = face index
    pub fn solved() -> Self {
        let mut stickers = [0u8; STICKER_COUNT];
        for (i, s) in stickers.iter_mut().enumerate() {
            *s = (i / 9) as u8;
        }
        Self { stickers }
    }

    /// Build a cube from raw colour codes.
    /// Rejects wrong lengths, out-of-vocabulary colours, and
    /// colour counts other than nine each.
    pub fn from_stickers(codes: &[u8]) -> Result<Self> {
        if codes.len() != STICKER_COUNT {
            bail!("Expected {STICKER_COUNT} stickers, got {}", codes.len());
        }

        let mut counts = [0usize; STICKER_VOCAB];
        for &c in codes {
            if c as usize >= STICKER_VOCAB {
                bail!("Sticker colour {c} is outside 0..{STICKER_VOCAB}");
            }
            counts[c as usize] += 1;
        }
        if let Some(colour) = counts.iter().position(|&n| n != 9) {
            bail!("Colour {colour} appears {} times, expected 9", counts[colour]);
        }

        let mut stickers = [0u8; STICKER_COUNT];
        stickers.copy_from_slice(codes);
        Ok(Self { stickers })
    }

    pub fn stickers(&self) -> &[u8; STICKER_COUNT] {
        &self.stickers
    }

    pub fn apply(&mut self, m: Move) {
        let perm = &move_tables()[m.index()];
        let old = self.stickers;
        for (dst, &src) in perm.iter().enumerate() {
            self.stickers[dst] = old[src as usize];
        }
    }

    pub fn apply_all<I: IntoIterator<Item = Move>>(&mut self, moves: I) {
        for m in moves {
            self.apply(m);
        }
    }

    /// True when every face shows a single colour
    pub fn is_solved(&self) -> bool {
        self.stickers
            .chunks(9)
            .all(|face| face.iter().all(|&s| s == face[0]))
    }
}

impl Default for Cube {
    fn default() -> Self {
        Self::solved()
    }
}

/// Parses 54 digits (whitespace ignored), e.g. the solved cube is
/// "000000000111111111...555555555".
impl FromStr for Cube {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let codes = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c.to_digit(10) {
                Some(d) => Ok(d as u8),
                None    => bail!("Invalid sticker character '{c}'"),
            })
            .collect::<Result<Vec<u8>>>()?;
        Self::from_stickers(&codes)
    }
}

// ─── Geometry ─────────────────────────────────────────────────────────────────

fn facelet(face: Face, row: i8, col: i8) -> (Vec3, Vec3) {
    let pos = match face {
        Face::U => [col - 1, 1, row - 1],
        Face::D => [col - 1, -1, 1 - row],
        Face::F => [col - 1, 1 - row, 1],
        Face::B => [1 - col, 1 - row, -1],
        Face::R => [1, 1 - row, 1 - col],
        Face::L => [-1, 1 - row, col - 1],
    };
    (pos, face.normal())
}

fn dot(a: Vec3, b: Vec3) -> i8 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Clockwise quarter turn about `axis`, as seen from outside that face.
/// Rodrigues' formula at -90°: v' = -(a × v) + a (a · v)
fn rotate_cw(v: Vec3, axis: Vec3) -> Vec3 {
    let c = cross(axis, v);
    let d = dot(axis, v);
    [
        -c[0] + axis[0] * d,
        -c[1] + axis[1] * d,
        -c[2] + axis[2] * d,
    ]
}

fn geometry() -> Vec<(Vec3, Vec3)> {
    let mut g = Vec::with_capacity(STICKER_COUNT);
    for face in Face::ALL {
        for row in 0..3 {
            for col in 0..3 {
                g.push(facelet(face, row, col));
            }
        }
    }
    g
}

/// perm[dst] = src for each of the twelve moves, indexed like Move::ALL
fn move_tables() -> &'static [[u8; STICKER_COUNT]; 12] {
    static TABLES: OnceLock<[[u8; STICKER_COUNT]; 12]> = OnceLock::new();
    TABLES.get_or_init(|| {
        let geo = geometry();
        let mut tables = [[0u8; STICKER_COUNT]; 12];

        for m in Move::ALL {
            let axis  = m.face().normal();
            let turns = if m.is_prime() { 3 } else { 1 };
            let table = &mut tables[m.index()];

            for (src, &(pos, normal)) in geo.iter().enumerate() {
                let (mut p, mut n) = (pos, normal);
                if dot(pos, axis) == 1 {
                    for _ in 0..turns {
                        p = rotate_cw(p, axis);
                        n = rotate_cw(n, axis);
                    }
                }
                // Every rotated (position, normal) pair is another sticker's home
                let dst = geo
                    .iter()
                    .position(|&g| g == (p, n))
                    .unwrap_or(src);
                table[dst] = src as u8;
            }
        }
        tables
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(a: &Cube, b: &Cube) -> usize {
        a.stickers().iter().zip(b.stickers()).filter(|(x, y)| x != y).count()
    }

    #[test]
    fn test_solved_is_solved() {
        let c = Cube::solved();
        assert!(c.is_solved());
        assert_eq!(c.stickers()[0], 0);
        assert_eq!(c.stickers()[53], 5);
    }

    #[test]
    fn test_every_move_has_order_four() {
        for m in Move::ALL {
            let mut c = Cube::solved();
            c.apply(m);
            assert!(!c.is_solved(), "{m} left the cube solved");
            c.apply_all([m, m, m]);
            assert!(c.is_solved(), "{m} x4 is not the identity");
        }
    }

    #[test]
    fn test_move_then_inverse_is_identity() {
        let mut c = Cube::solved();
        c.apply_all([Move::R, Move::U, Move::FPrime, Move::L]);
        let scrambled = c.clone();
        c.apply(Move::B);
        c.apply(Move::BPrime);
        assert_eq!(c, scrambled);
    }

    #[test]
    fn test_quarter_turn_moves_twenty_stickers() {
        let solved = Cube::solved();
        for m in Move::ALL {
            let mut c = Cube::solved();
            c.apply(m);
            // 8 on the turned face are still its colour; 12 side stickers change
            assert_eq!(changed(&solved, &c), 12, "{m}");
        }
    }

    #[test]
    fn test_u_sends_front_row_to_left() {
        let mut c = Cube::solved();
        c.apply(Move::U);
        let left_top = &c.stickers()[36..39];
        assert!(left_top.iter().all(|&s| s == Face::F.index() as u8));
        // D face untouched
        assert!(c.stickers()[27..36].iter().all(|&s| s == Face::D.index() as u8));
    }

    #[test]
    fn test_sexy_move_has_order_six() {
        let mut c = Cube::solved();
        for i in 0..6 {
            c.apply_all([Move::R, Move::U, Move::RPrime, Move::UPrime]);
            if i < 5 {
                assert!(!c.is_solved());
            }
        }
        assert!(c.is_solved());
    }

    #[test]
    fn test_centers_never_move() {
        let mut c = Cube::solved();
        c.apply_all(Move::ALL);
        for face in Face::ALL {
            assert_eq!(c.stickers()[face.index() * 9 + 4], face.index() as u8);
        }
    }

    #[test]
    fn test_from_stickers_validation() {
        assert!(Cube::from_stickers(&[0; 10]).is_err());

        let mut codes = Cube::solved().stickers().to_vec();
        codes[0] = 6;
        assert!(Cube::from_stickers(&codes).is_err());

        codes[0] = 1;
        assert!(Cube::from_stickers(&codes).is_err());

        let mut c = Cube::solved();
        c.apply(Move::F);
        let back = Cube::from_stickers(c.stickers()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_parse_digits() {
        let s: String = Cube::solved()
            .stickers()
            .iter()
            .map(|d| char::from(b'0' + d))
            .collect();
        let c: Cube = s.parse().unwrap();
        assert!(c.is_solved());
        assert!("12ab".parse::<Cube>().is_err());
    }
}
