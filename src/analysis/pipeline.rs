// ============================================================
// Layer 8 — Attention Pipeline
// ============================================================
// Runs every analysis stage for one image.
//
// The saliency source is injected at construction time and
// never re-selected: the pipeline neither knows nor cares
// whether the map came from the U-Net or from the heuristic.
//
// Order of issues in the report is fixed:
//   attention priority → visual hierarchy → cognitive load
//
// Reference: Rust Book §10 (Generic Types, Traits)

use anyhow::{Context, Result};
use image::RgbImage;

use crate::analysis::{
    cognitive::estimate_cognitive_load,
    elements::detect_critical_elements,
    hierarchy::assess_visual_hierarchy,
    priority::verify_attention_priority,
    recommendations::generate_recommendations,
    scoring::{attention_distribution, composite_score},
};
use crate::domain::report::{rounded, AttentionReport, IssueSummary};
use crate::domain::saliency_map::SaliencyMap;
use crate::domain::traits::SaliencySource;
use crate::vision::features::{edge_map, external_bounding_boxes, grayscale};

/// Report plus the full-resolution map it was computed from, so
/// callers can render an overlay without predicting twice.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub report:   AttentionReport,
    pub saliency: SaliencyMap,
}

pub struct AttentionPipeline<S: SaliencySource> {
    source: S,
}

impl<S: SaliencySource> AttentionPipeline<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Predict saliency for `image` and analyse it.
    pub fn analyze(&self, image: &RgbImage) -> Result<PipelineOutput> {
        let map = self
            .source
            .saliency_map(image)
            .with_context(|| format!("{} saliency prediction failed", self.source.name()))?;
        Ok(self.analyze_with_map(image, &map))
    }

    /// Analyse `image` against a precomputed map of any resolution.
    pub fn analyze_with_map(&self, image: &RgbImage, map: &SaliencyMap) -> PipelineOutput {
        let (w, h) = image.dimensions();
        let map    = map.resized(w, h);

        let gray  = grayscale(image);
        let edges = edge_map(&gray);
        let boxes = external_bounding_boxes(&edges);

        let critical_elements = detect_critical_elements(&boxes, &map);
        let priority_issues   = verify_attention_priority(&critical_elements);
        let visual_hierarchy  = assess_visual_hierarchy(&map);
        let cognitive_load    = estimate_cognitive_load(image, &gray, &edges, boxes.len(), &map);

        let issue_summary = IssueSummary {
            attention_priority: priority_issues.len(),
            visual_hierarchy:   visual_hierarchy.issues.len(),
            cognitive_load:     cognitive_load.issues.len(),
        };

        let mut issues = priority_issues;
        issues.extend(visual_hierarchy.issues.iter().cloned());
        issues.extend(cognitive_load.issues.iter().cloned());

        let score           = composite_score(cognitive_load.cognitive_load_score, &issues);
        let recommendations = generate_recommendations(&issues, cognitive_load.level);

        tracing::info!(
            source   = self.source.name(),
            score    = rounded(score, 2),
            elements = critical_elements.len(),
            issues   = issues.len(),
            "attention analysis complete"
        );

        let report = AttentionReport {
            score:                  rounded(score, 2),
            saliency_source:        self.source.name().to_string(),
            image_width:            w,
            image_height:           h,
            saliency_heatmap:       None,
            attention_distribution: attention_distribution(&map),
            critical_elements,
            visual_hierarchy,
            cognitive_load,
            issues,
            issue_summary,
            recommendations,
        };

        PipelineOutput { report, saliency: map }
    }
}
