// ============================================================
// Layer 5 — Early Stopping
// ============================================================
// Watches the validation loss after each epoch.
//
//   - lower than every loss seen so far → Improved
//     (the trainer saves the best checkpoint on this verdict)
//   - otherwise the wait counter grows; once it reaches
//     `patience` the verdict is Stop
//
// A fresh instance is created per shard, so each shard's first
// epoch always counts as an improvement.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Improved,
    /// Epochs since the last improvement
    Waiting(usize),
    Stop,
}

#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    best:     f64,
    wait:     usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self { patience, best: f64::INFINITY, wait: 0 }
    }

    /// Record one epoch's monitored loss. NaN never counts as an improvement.
    pub fn observe(&mut self, loss: f64) -> Verdict {
        if loss < self.best {
            self.best = loss;
            self.wait = 0;
            return Verdict::Improved;
        }

        self.wait += 1;
        if self.wait >= self.patience {
            Verdict::Stop
        } else {
            Verdict::Waiting(self.wait)
        }
    }

    pub fn best(&self) -> f64 {
        self.best
    }
}
