// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types for the puzzle itself: no burn, no file I/O.
//
//   moves.rs     — the 13-code move vocabulary
//   cube.rs      — 54-sticker cube state and quarter turns
//   example.rs   — a (stickers, solution) training pair
//   scrambler.rs — random labelled example generation
//   traits.rs    — seams implemented by the data and ml layers

pub mod moves;

pub mod cube;

pub mod example;

pub mod scrambler;

pub mod traits;
