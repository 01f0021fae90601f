// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch,
// one directory per run:
//
//   logs/rubiks-cube-lstm-1718000000/metrics.csv
//
// Columns:
//   shard      — which data file the epoch trained on
//   epoch      — 1-based, restarts for every shard
//   train_loss — mean per-timestep cross-entropy, train slice
//   train_acc  — fraction of timesteps predicted exactly
//   val_loss   — same on the dev slice (what early stopping watches)
//   val_acc
//
// Example:
//   shard,epoch,train_loss,train_acc,val_loss,val_acc
//   0,1,1.842100,0.412000,1.790300,0.431000
//   0,2,1.503800,0.498000,1.487200,0.502000
//
// Plot val_loss against train_loss per shard: a widening gap
// is the model memorising the shard.

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};
use serde::{Deserialize, Serialize};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub shard:      usize,
    pub epoch:      usize,
    pub train_loss: f64,
    pub train_acc:  f64,
    pub val_loss:   f64,
    pub val_acc:    f64,
}

impl EpochMetrics {
    pub fn new(
        shard:      usize,
        epoch:      usize,
        train_loss: f64,
        train_acc:  f64,
        val_loss:   f64,
        val_acc:    f64,
    ) -> Self {
        Self { shard, epoch, train_loss, train_acc, val_loss, val_acc }
    }
}

/// `rubiks-cube-lstm-<unix seconds>`, unique per run
pub fn run_name() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("rubiks-cube-lstm-{secs}")
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");

        // Appending to an existing log keeps earlier rows
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "shard,epoch,train_loss,train_acc,val_loss,val_acc")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{},{:.6},{:.6},{:.6},{:.6}",
            m.shard,
            m.epoch,
            m.train_loss,
            m.train_acc,
            m.val_loss,
            m.val_acc,
        )?;

        tracing::debug!(
            "Logged shard {} epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.shard,
            m.epoch,
            m.train_loss,
            m.val_loss,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_then_rows() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path().join("run").to_string_lossy()).unwrap();

        logger.log(&EpochMetrics::new(0, 1, 2.5, 0.1, 2.4, 0.12)).unwrap();
        logger.log(&EpochMetrics::new(0, 2, 2.0, 0.2, 2.1, 0.18)).unwrap();

        let csv: Vec<String> = fs::read_to_string(logger.csv_path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        assert_eq!(csv[0], "shard,epoch,train_loss,train_acc,val_loss,val_acc");
        assert_eq!(csv[1], "0,1,2.500000,0.100000,2.400000,0.120000");
        assert_eq!(csv.len(), 3);
    }

    #[test]
    fn test_reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_string_lossy().into_owned();

        MetricsLogger::new(path.clone()).unwrap()
            .log(&EpochMetrics::new(0, 1, 1.0, 0.0, 1.0, 0.0)).unwrap();
        let logger = MetricsLogger::new(path).unwrap();
        logger.log(&EpochMetrics::new(1, 1, 1.0, 0.0, 1.0, 0.0)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_run_name_prefix() {
        assert!(run_name().starts_with("rubiks-cube-lstm-"));
    }
}
