// ============================================================
// Layer 2 — Synthesize Use Case
// ============================================================
// Writes a synthetic ground-truth map for every image in a
// directory, so a corpus without eye-tracking data can still be
// fed to `train`. Output names match what PairLoader looks for:
// <saliency_dir>/<stem>.png.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::data::{
    loader::list_images,
    synthetic::{synthesize_file, FIDELITY_WARNING},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SynthesisSummary {
    pub written: usize,
    pub failed:  usize,
}

pub struct SynthesizeUseCase {
    image_dir:    PathBuf,
    saliency_dir: PathBuf,
}

impl SynthesizeUseCase {
    pub fn new(image_dir: impl Into<PathBuf>, saliency_dir: impl Into<PathBuf>) -> Self {
        Self {
            image_dir:    image_dir.into(),
            saliency_dir: saliency_dir.into(),
        }
    }

    pub fn execute(&self) -> Result<SynthesisSummary> {
        tracing::warn!("{FIDELITY_WARNING}");

        let images = list_images(&self.image_dir)?;
        fs::create_dir_all(&self.saliency_dir)
            .with_context(|| format!("Cannot create '{}'", self.saliency_dir.display()))?;

        let mut summary = SynthesisSummary::default();
        for path in &images {
            match synthesize_file(path, &self.saliency_dir) {
                Ok(out) => {
                    tracing::debug!("Synthesised '{}'", out.display());
                    summary.written += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping '{}': {e:#}", path.display());
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            "Wrote {} synthetic maps to '{}' ({} failed)",
            summary.written,
            self.saliency_dir.display(),
            summary.failed
        );
        Ok(summary)
    }
}
