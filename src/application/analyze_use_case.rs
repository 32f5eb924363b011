// ============================================================
// Layer 2 — Analyze Use Case
// ============================================================
// One design image in, two artefacts out:
//
//   Step 1: Decode the image                  (Layer 4 - data)
//   Step 2: Predict saliency + analyse it     (Layer 8 - analysis)
//   Step 3: Render and save the heatmap       (Layer 6 - infra)
//   Step 4: Save <stem>_analysis.json         (Layer 6 - infra)
//
// The saliency source is fixed when the use case is built; see
// ml::provider for how the learned model / heuristic choice is
// made.

use anyhow::Result;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::{heatmap::heatmap_overlay, pipeline::AttentionPipeline};
use crate::data::preprocessor::load_rgb;
use crate::domain::report::AttentionReport;
use crate::domain::traits::{DesignAnalyzer, SaliencySource};
use crate::infra::report_writer::ReportWriter;
use crate::ml::{provider::SaliencyProvider, InferBackend};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeConfig {
    /// Where train_config.json and saliency_model.mpk live
    pub model_dir:      PathBuf,
    pub output_dir:     PathBuf,
    /// Skip the learned model even if weights exist
    pub heuristic_only: bool,
    pub write_heatmap:  bool,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            model_dir:      PathBuf::from("models"),
            output_dir:     PathBuf::from("reports"),
            heuristic_only: false,
            write_heatmap:  true,
        }
    }
}

pub struct AnalyzeUseCase<S: SaliencySource> {
    pipeline:      AttentionPipeline<S>,
    writer:        ReportWriter,
    write_heatmap: bool,
}

impl AnalyzeUseCase<SaliencyProvider> {
    /// Build with the learned model if trained weights exist,
    /// otherwise with the heuristic.
    pub fn from_config(cfg: &AnalyzeConfig) -> Result<Self> {
        let provider = if cfg.heuristic_only {
            SaliencyProvider::<InferBackend>::heuristic()
        } else {
            SaliencyProvider::<InferBackend>::from_model_dir(&cfg.model_dir, Default::default())?
        };
        tracing::info!("Saliency source: {}", provider.name());
        Self::new(provider, &cfg.output_dir, cfg.write_heatmap)
    }
}

impl<S: SaliencySource> AnalyzeUseCase<S> {
    pub fn new(source: S, output_dir: impl Into<PathBuf>, write_heatmap: bool) -> Result<Self> {
        Ok(Self {
            pipeline: AttentionPipeline::new(source),
            writer:   ReportWriter::new(output_dir)?,
            write_heatmap,
        })
    }

    pub fn output_dir(&self) -> &Path {
        self.writer.output_dir()
    }

    /// Analyse an already-decoded image and write its artefacts
    /// under `stem`.
    pub fn analyze_image(&self, stem: &str, image: &RgbImage) -> Result<AttentionReport> {
        let output     = self.pipeline.analyze(image)?;
        let mut report = output.report;

        if self.write_heatmap {
            let overlay = heatmap_overlay(image, &output.saliency);
            let path    = self.writer.write_heatmap(stem, &overlay)?;
            report.saliency_heatmap = Some(path.display().to_string());
        }

        let json_path = self.writer.write_json(&format!("{stem}_analysis.json"), &report)?;
        tracing::info!("Report written to '{}' (score {:.2})", json_path.display(), report.score);
        Ok(report)
    }
}

impl<S: SaliencySource> DesignAnalyzer for AnalyzeUseCase<S> {
    fn analyze_file_as(&self, path: &Path, name: &str) -> Result<AttentionReport> {
        tracing::info!("Analyzing '{}'", path.display());
        let image = load_rgb(path)?;
        self.analyze_image(name, &image)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::CritiqueError;
    use crate::vision::heuristic::HeuristicSaliency;
    use image::Rgb;
    use std::fs;
    use tempfile::tempdir;

    fn landing_page() -> RgbImage {
        RgbImage::from_fn(320, 240, |x, y| {
            let nav    = y < 30;
            let button = (120..200).contains(&x) && (150..180).contains(&y);
            if nav || button { Rgb([20, 90, 220]) } else { Rgb([245, 245, 245]) }
        })
    }

    #[test]
    fn test_writes_report_and_heatmap() {
        let dir   = tempdir().unwrap();
        let input = dir.path().join("landing.png");
        landing_page().save(&input).unwrap();

        let use_case = AnalyzeUseCase::new(HeuristicSaliency::new(), dir.path().join("out"), true).unwrap();
        let report   = use_case.analyze_file(&input).unwrap();

        assert_eq!(report.saliency_source, "heuristic");
        assert_eq!((report.image_width, report.image_height), (320, 240));

        let heatmap = dir.path().join("out/landing_heatmap.png");
        assert!(heatmap.is_file());
        assert_eq!(report.saliency_heatmap.as_deref(), Some(heatmap.display().to_string().as_str()));
        assert_eq!(image::open(&heatmap).unwrap().width(), 320);

        let json: AttentionReport = serde_json::from_str(
            &fs::read_to_string(dir.path().join("out/landing_analysis.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(json, report);
    }

    #[test]
    fn test_heatmap_can_be_skipped() {
        let dir      = tempdir().unwrap();
        let use_case = AnalyzeUseCase::new(HeuristicSaliency::new(), dir.path(), false).unwrap();
        let report   = use_case.analyze_image("x", &landing_page()).unwrap();
        assert!(report.saliency_heatmap.is_none());
        assert!(!dir.path().join("x_heatmap.png").exists());
    }

    #[test]
    fn test_unreadable_image_is_typed_error() {
        let dir  = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not a png").unwrap();

        let use_case = AnalyzeUseCase::new(HeuristicSaliency::new(), dir.path(), true).unwrap();
        let err      = use_case.analyze_file(&path).unwrap_err();
        assert!(matches!(err.downcast_ref::<CritiqueError>(), Some(CritiqueError::UnreadableImage { .. })));
    }

    #[test]
    fn test_heuristic_only_config() {
        let dir = tempdir().unwrap();
        let cfg = AnalyzeConfig {
            model_dir:      dir.path().join("no-models"),
            output_dir:     dir.path().join("out"),
            heuristic_only: true,
            write_heatmap:  false,
        };
        let use_case = AnalyzeUseCase::from_config(&cfg).unwrap();
        let report   = use_case.analyze_image("page", &landing_page()).unwrap();
        assert_eq!(report.saliency_source, "heuristic");
    }
}
