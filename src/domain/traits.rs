// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams between layers. Application code only sees these
// traits, so tests can plug in a stub saliency source or a stub
// analyzer without a model, a GPU or files on disk.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::{Context, Result};
use image::RgbImage;
use std::path::Path;

use crate::domain::report::AttentionReport;
use crate::domain::saliency_map::SaliencyMap;

// ─── SaliencySource ───────────────────────────────────────────────────────────
/// Anything that can predict where a viewer will look.
///
/// Implementations:
///   - SaliencyProvider::LearnedModel → U-Net inference
///   - SaliencyProvider::Heuristic    → contrast/colour/edge blend
pub trait SaliencySource {
    /// Short stable name written into reports.
    fn name(&self) -> &'static str;

    /// Predict a saliency field for `image`. The map may have any
    /// resolution; the pipeline resamples it to the image size.
    fn saliency_map(&self, image: &RgbImage) -> Result<SaliencyMap>;
}

impl<S: SaliencySource + ?Sized> SaliencySource for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn saliency_map(&self, image: &RgbImage) -> Result<SaliencyMap> {
        (**self).saliency_map(image)
    }
}

// ─── DesignAnalyzer ───────────────────────────────────────────────────────────
/// Any component that turns a design file into a report.
///
/// Implementations:
///   - AnalyzeUseCase → full pipeline with heatmap output
pub trait DesignAnalyzer {
    /// Analyse `path`, naming its artefacts after `name`.
    fn analyze_file_as(&self, path: &Path, name: &str) -> Result<AttentionReport>;

    /// Analyse `path`, naming its artefacts after the file stem.
    fn analyze_file(&self, path: &Path) -> Result<AttentionReport> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("'{}' has no usable file stem", path.display()))?;
        self.analyze_file_as(path, stem)
    }
}
