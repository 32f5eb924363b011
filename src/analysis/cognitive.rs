// ============================================================
// Layer 8 — Cognitive Load
// ============================================================
// Four signals, each scaled to a 0–100 sub-score:
//
//   elements  contour count against a ceiling of 50     (capped)
//   colours   quantised palette size against 10         (capped)
//   density   edge-pixel fraction against 0.3           (uncapped)
//   entropy   saliency histogram entropy against 6 bits (capped)
//
// Weighted 0.3 / 0.2 / 0.3 / 0.2 and capped at 100. Every term
// has a non-negative weight and each sub-score is non-decreasing
// in its input, so the total is monotone in each signal.
//
// Reference: Miller (1956), "The Magical Number Seven"

use image::{GrayImage, RgbImage};
use imageproc::contrast::otsu_level;
use std::collections::HashSet;

use crate::domain::issue::{Issue, IssueKind};
use crate::domain::report::{rounded, CognitiveLoadAnalysis, CognitiveLoadLevel, CognitiveLoadMetrics};
use crate::domain::saliency_map::SaliencyMap;
use crate::vision::features::edge_density;

pub const ELEMENT_CEILING:      f64   = 50.0;
pub const COLOR_CEILING:        f64   = 10.0;
pub const OPTIMAL_DENSITY:      f64   = 0.3;
pub const ENTROPY_CEILING:      f64   = 6.0;

pub const MAX_ELEMENTS:         usize = 50;
pub const RECOMMENDED_ELEMENTS: usize = 30;
pub const MAX_COLORS:           usize = 5;
pub const MAX_ENTROPY:          f64   = 4.5;

/// Palette quantisation step per channel.
const COLOR_STEP: u8 = 32;

/// 0–100 load score from the four raw signals.
pub fn cognitive_load_score(element_count: usize, colors: usize, density: f64, entropy: f64) -> f64 {
    let element_score = (element_count as f64 / ELEMENT_CEILING * 100.0).min(100.0);
    let color_score   = (colors as f64 / COLOR_CEILING * 100.0).min(100.0);
    let density_score = density.max(0.0) / OPTIMAL_DENSITY * 100.0;
    let entropy_score = (entropy.max(0.0) / ENTROPY_CEILING * 100.0).min(100.0);

    let total = element_score * 0.3 + color_score * 0.2 + density_score * 0.3 + entropy_score * 0.2;
    if total.is_finite() { total.min(100.0) } else { 100.0 }
}

/// Distinct colours after snapping each channel down to a multiple of 32.
pub fn count_dominant_colors(image: &RgbImage) -> usize {
    image
        .pixels()
        .map(|p| [p[0] / COLOR_STEP, p[1] / COLOR_STEP, p[2] / COLOR_STEP])
        .collect::<HashSet<_>>()
        .len()
}

/// Share of pixels at or below the Otsu threshold (dark text on
/// light backgrounds). None for an empty image.
pub fn text_density(gray: &GrayImage) -> Option<f64> {
    let total = gray.as_raw().len();
    if total == 0 {
        return None;
    }
    let level = otsu_level(gray);
    let dark  = gray.as_raw().iter().filter(|&&p| p <= level).count();
    Some(dark as f64 / total as f64)
}

/// Full cognitive-load estimate. `element_count` is the number of
/// external contours; `edges` the Canny map they were traced from.
pub fn estimate_cognitive_load(
    image:         &RgbImage,
    gray:          &GrayImage,
    edges:         &GrayImage,
    element_count: usize,
    map:           &SaliencyMap,
) -> CognitiveLoadAnalysis {
    let colors  = count_dominant_colors(image);
    let density = edge_density(edges);
    let entropy = map.entropy();
    let text    = text_density(gray);

    let score = cognitive_load_score(element_count, colors, density, entropy);

    let mut issues = Vec::new();
    if element_count > MAX_ELEMENTS {
        issues.push(Issue::new(IssueKind::TooManyElements {
            element_count,
            recommended_max: RECOMMENDED_ELEMENTS,
        }));
    }
    if colors > MAX_COLORS {
        issues.push(Issue::new(IssueKind::ExcessiveColorPalette {
            color_count:     colors,
            recommended_max: MAX_COLORS,
        }));
    }
    if density > OPTIMAL_DENSITY {
        issues.push(Issue::new(IssueKind::HighInformationDensity {
            density:     rounded(density, 3),
            optimal_max: OPTIMAL_DENSITY,
        }));
    }
    if entropy > MAX_ENTROPY {
        issues.push(Issue::new(IssueKind::FragmentedAttention {
            entropy: rounded(entropy, 2),
        }));
    }

    tracing::debug!(
        elements = element_count,
        colors,
        density,
        entropy,
        score,
        "cognitive load estimated"
    );

    CognitiveLoadAnalysis {
        cognitive_load_score: rounded(score, 2),
        level:                CognitiveLoadLevel::from_score(score),
        metrics: CognitiveLoadMetrics {
            element_count,
            dominant_colors:   colors,
            visual_density:    rounded(density, 3),
            attention_entropy: rounded(entropy, 2),
            text_density:      text.map(|t| rounded(t, 3)),
        },
        issues,
    }
}
