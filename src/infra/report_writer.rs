// ============================================================
// Layer 6 — Report Writer
// ============================================================
// Persists analysis artefacts next to each other:
//
//   <output_dir>/<stem>_analysis.json
//   <output_dir>/<stem>_heatmap.png
//   <output_dir>/comparison_report.json   (batch mode only)
//
// JSON is written to a sibling `.partial` file and renamed, so a
// reader never sees half a report.

use anyhow::{Context, Result};
use image::RgbImage;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("Cannot create output directory '{}'", output_dir.display()))?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn heatmap_path(&self, stem: &str) -> PathBuf {
        self.output_dir.join(format!("{stem}_heatmap.png"))
    }

    pub fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf> {
        let target  = self.output_dir.join(file_name);
        let partial = self.output_dir.join(format!("{file_name}.partial"));

        let json = serde_json::to_string_pretty(value)?;
        fs::write(&partial, json)
            .with_context(|| format!("Cannot write '{}'", partial.display()))?;
        fs::rename(&partial, &target)
            .with_context(|| format!("Cannot move '{}' into place", target.display()))?;

        tracing::debug!("Wrote '{}'", target.display());
        Ok(target)
    }

    pub fn write_heatmap(&self, stem: &str, overlay: &RgbImage) -> Result<PathBuf> {
        let path = self.heatmap_path(stem);
        overlay
            .save(&path)
            .with_context(|| format!("Cannot save heatmap '{}'", path.display()))?;
        Ok(path)
    }
}
