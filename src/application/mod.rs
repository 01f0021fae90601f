// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: no tensor math, no printing,
// no file formats. Each use case takes a plain config struct
// that the CLI fills from its flags.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Corpus generation
pub mod generate_use_case;

// The training workflow
pub mod train_use_case;

// Greedy solving and replay
pub mod solve_use_case;
