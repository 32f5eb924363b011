// ============================================================
// Layer 5 — Reduce-on-Plateau Scheduler
// ============================================================
// Multiplies the learning rate by `factor` once the monitored
// loss has failed to improve for more than `patience` epochs.
//
// "Improve" is relative: a loss counts only if it beats the best
// so far by more than `threshold` of the best's magnitude
// (loss < best · (1 − threshold)). Tiny numerical wobbles do not
// reset the patience counter.
//
//   epoch  loss   best   bad   lr
//     1    0.50   0.50    0    1e-4
//     2    0.51   0.50    1    1e-4
//    ...
//     7    0.52   0.50    6  → 5e-5, bad reset to 0
//
// The whole state is serde-serialisable so a resumed run picks
// up the same counters it was interrupted with.
//
// Reference: PyTorch ReduceLROnPlateau (mode=min, threshold_mode=rel)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReduceLrOnPlateau {
    lr:             f64,
    factor:         f64,
    patience:       usize,
    threshold:      f64,
    /// None until the first finite loss is seen
    best:           Option<f64>,
    num_bad_epochs: usize,
}

impl ReduceLrOnPlateau {
    pub const DEFAULT_THRESHOLD: f64 = 1e-4;

    pub fn new(initial_lr: f64, factor: f64, patience: usize) -> Self {
        Self {
            lr:             initial_lr,
            factor,
            patience,
            threshold:      Self::DEFAULT_THRESHOLD,
            best:           None,
            num_bad_epochs: 0,
        }
    }

    /// Learning rate to use for the next epoch.
    pub fn lr(&self) -> f64 {
        self.lr
    }

    /// Record one epoch's monitored loss; returns the (possibly
    /// reduced) learning rate for the next epoch. Non-finite losses
    /// count as non-improving.
    pub fn step(&mut self, loss: f64) -> f64 {
        let improved = loss.is_finite()
            && self.best.map_or(true, |best| loss < best * (1.0 - self.threshold));

        if improved {
            self.best           = Some(loss);
            self.num_bad_epochs = 0;
        } else {
            self.num_bad_epochs += 1;
        }

        if self.num_bad_epochs > self.patience {
            let reduced = self.lr * self.factor;
            tracing::info!("Reducing learning rate {:.3e} → {:.3e}", self.lr, reduced);
            self.lr             = reduced;
            self.num_bad_epochs = 0;
        }

        self.lr
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halves_after_patience_runs_out() {
        let mut s = ReduceLrOnPlateau::new(1e-4, 0.5, 5);
        assert_eq!(s.step(0.5), 1e-4);
        for _ in 0..5 {
            assert_eq!(s.step(0.6), 1e-4);
        }
        // sixth non-improving epoch
        assert!((s.step(0.6) - 5e-5).abs() < 1e-18);
    }

    #[test]
    fn test_improvement_resets_counter() {
        let mut s = ReduceLrOnPlateau::new(1.0, 0.5, 2);
        s.step(1.0);
        s.step(1.1);
        s.step(1.1);
        s.step(0.5); // improvement
        s.step(0.6);
        s.step(0.6);
        assert_eq!(s.lr(), 1.0);
        assert_eq!(s.step(0.6), 0.5);
    }

    #[test]
    fn test_negligible_gain_is_not_improvement() {
        let mut s = ReduceLrOnPlateau::new(1.0, 0.5, 0);
        s.step(1.0);
        // 1e-6 relative gain is below the 1e-4 threshold
        assert_eq!(s.step(0.999_999), 0.5);
    }

    #[test]
    fn test_state_survives_serde() {
        let mut s = ReduceLrOnPlateau::new(1e-3, 0.5, 3);
        s.step(0.4);
        s.step(0.5);
        let json = serde_json::to_string(&s).unwrap();
        let back: ReduceLrOnPlateau = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
