// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one CSV row per training epoch.
//
// Output file: <model_dir>/metrics.csv
//
//   epoch,train_loss,val_loss,learning_rate,improved
//   1,0.061204,0.058811,1.000000e-4,true
//   2,0.049930,0.051472,1.000000e-4,true
//   ...
//
// A fresh run starts the file over. A resumed run first drops
// every row past the epoch it resumes from, then appends, so each
// epoch appears exactly once.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

const HEADER: &str = "epoch,train_loss,val_loss,learning_rate,improved";

/// One row of metrics for a single epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Starts at 1
    pub epoch: usize,

    /// Sample-weighted mean MSE over the training batches
    pub train_loss: f64,

    /// Sample-weighted mean MSE on the validation split
    pub val_loss: f64,

    /// Learning rate the epoch was trained with
    pub learning_rate: f64,

    /// Whether this epoch produced a new best model
    pub improved: bool,
}

impl EpochMetrics {
    pub fn new(
        epoch:         usize,
        train_loss:    f64,
        val_loss:      f64,
        learning_rate: f64,
        improved:      bool,
    ) -> Self {
        Self { epoch, train_loss, val_loss, learning_rate, improved }
    }

    /// Strictly lower than the best so far. With no best yet, any
    /// finite loss counts.
    pub fn is_improvement(&self, best_val_loss: Option<f64>) -> bool {
        self.val_loss.is_finite() && best_val_loss.map_or(true, |best| self.val_loss < best)
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Start a new CSV holding only the header, replacing any
    /// history left by an earlier run.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let csv_path = Self::prepare(dir.as_ref())?;
        fs::write(&csv_path, format!("{HEADER}\n"))
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        Ok(Self { csv_path })
    }

    /// Keep the rows up to and including `last_epoch` and continue
    /// after them. A missing file starts with the header.
    pub fn resume(dir: impl AsRef<Path>, last_epoch: usize) -> Result<Self> {
        let csv_path = Self::prepare(dir.as_ref())?;
        if !csv_path.exists() {
            return Self::create(dir);
        }

        let existing = fs::read_to_string(&csv_path)
            .with_context(|| format!("Cannot read '{}'", csv_path.display()))?;
        let mut kept = format!("{HEADER}\n");
        let mut dropped = 0usize;
        for line in existing.lines().skip(1).filter(|l| !l.trim().is_empty()) {
            let epoch = line.split(',').next().and_then(|e| e.parse::<usize>().ok());
            match epoch {
                Some(e) if e <= last_epoch => {
                    kept.push_str(line);
                    kept.push('\n');
                }
                _ => dropped += 1,
            }
        }

        let partial = csv_path.with_extension("csv.partial");
        fs::write(&partial, kept)
            .with_context(|| format!("Cannot write '{}'", partial.display()))?;
        fs::rename(&partial, &csv_path)
            .with_context(|| format!("Cannot move '{}' into place", csv_path.display()))?;

        if dropped > 0 {
            tracing::info!("Dropped {dropped} metrics rows past epoch {last_epoch}");
        }
        Ok(Self { csv_path })
    }

    fn prepare(dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;
        Ok(dir.join("metrics.csv"))
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot append to '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6e},{}",
            m.epoch,
            m.train_loss,
            m.val_loss,
            m.learning_rate,
            m.improved,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
