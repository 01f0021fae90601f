// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2.
//
//   1. `generate` — scramble cubes, write .npy shards
//   2. `train`    — fit the encoder / decoder shard by shard
//   3. `solve`    — greedy-decode solutions and replay them
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use std::fmt::Write;
use clap::Parser;
use commands::{Commands, GenerateArgs, SolveArgs, TrainArgs};

use crate::application::solve_use_case::SolveReport;
use crate::domain::moves::format_moves;

#[derive(Parser, Debug)]
#[command(
    name = "rubiks-seq2seq",
    version = "0.1.0",
    about = "Train an LSTM encoder-decoder to solve scrambled Rubik's cubes."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Generate(args) => run_generate(args),
            Commands::Train(args)    => run_train(args),
            Commands::Solve(args)    => run_solve(args),
        }
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    use crate::application::generate_use_case::GenerateUseCase;

    let written = GenerateUseCase::new(args.into()).execute()?;
    println!("Wrote {} examples.", written);
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on shards '{}*'", args.features_base);
    let model_dir = args.model_dir.clone();
    TrainUseCase::new(args.into()).execute()?;

    println!("Training complete. Model saved to '{}'.", model_dir);
    Ok(())
}

fn run_solve(args: SolveArgs) -> Result<()> {
    use crate::application::solve_use_case::SolveUseCase;

    let report = SolveUseCase::new(args.into())?.execute()?;
    print!("{}", format_report(&report));
    Ok(())
}

fn format_report(report: &SolveReport) -> String {
    let mut out = String::new();
    for (i, row) in report.rows.iter().enumerate() {
        let stickers: String = row.cube.stickers().iter().map(|&d| char::from(b'0' + d)).collect();
        let _ = writeln!(out, "#{i} {stickers}");
        let _ = writeln!(out, "  predicted: {}", format_moves(&row.predicted));
        if let Some(actual) = &row.actual {
            let _ = writeln!(out, "  actual:    {}", format_moves(actual));
        }
        let _ = writeln!(out, "  solves:    {}", if row.solves { "yes" } else { "no" });
    }

    let total = report.rows.len();
    let _ = writeln!(
        out,
        "\nSolved {}/{} ({:.1}%)",
        report.solved(),
        total,
        100.0 * report.solved() as f64 / total.max(1) as f64
    );
    if report.rows.iter().any(|r| r.actual.is_some()) {
        let _ = writeln!(out, "Exact label match: {}/{}", report.exact(), total);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::solve_use_case::SolveRow;
    use crate::domain::cube::Cube;
    use crate::domain::moves::Move;

    #[test]
    fn test_report_shows_cube_and_moves() {
        let mut cube = Cube::solved();
        cube.apply(Move::U);
        let digits: String = cube.stickers().iter().map(|&d| char::from(b'0' + d)).collect();

        let report = SolveReport {
            rows: vec![SolveRow {
                cube,
                predicted: vec![Move::UPrime],
                actual:    Some(vec![Move::UPrime]),
                solves:    true,
            }],
        };

        let text = format_report(&report);
        assert!(text.contains(&format!("#0 {digits}")));
        assert!(text.contains("predicted: U'"));
        assert!(text.contains("actual:    U'"));
        assert!(text.contains("Solved 1/1 (100.0%)"));
        assert!(text.contains("Exact label match: 1/1"));
    }
}
