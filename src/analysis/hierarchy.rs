// ============================================================
// Layer 8 — Visual Hierarchy
// ============================================================
// Splits the saliency map into horizontal and vertical thirds
// and compares their mean attention.
//
//   ┌───────────────┐
//   │      top      │   rows [0, H/3)
//   ├───────────────┤
//   │    middle     │   rows [H/3, 2H/3)
//   ├───────────────┤
//   │    bottom     │   rows [2H/3, H)
//   └───────────────┘
//   left / center / right use the same cut on columns.
//
// Three checks:
//   inverted     top < bottom
//   right-heavy  right > 1.5 · left
//   flat         population variance of {top, middle, bottom} < 0.01
//
// An empty band (images under three pixels on a side) has no
// mean. Checks that read an empty band are skipped, and the
// report shows it as 0.

use crate::domain::issue::{Issue, IssueKind};
use crate::domain::report::{rounded, BandMeans, HierarchyAnalysis};
use crate::domain::saliency_map::SaliencyMap;

pub const RIGHT_HEAVY_RATIO:  f64 = 1.5;
pub const FLAT_VARIANCE:      f64 = 0.01;

/// Per-band means; None for a band with no pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub top:    Option<f64>,
    pub middle: Option<f64>,
    pub bottom: Option<f64>,
    pub left:   Option<f64>,
    pub center: Option<f64>,
    pub right:  Option<f64>,
}

impl Bands {
    /// Population variance of top/middle/bottom, if all three exist.
    fn vertical_variance(&self) -> Option<f64> {
        let (top, middle, bottom) = (self.top?, self.middle?, self.bottom?);
        Some(population_variance(&[top, middle, bottom]))
    }

    fn to_report(self) -> BandMeans {
        let shown = |v: Option<f64>| rounded(v.unwrap_or(0.0), 3);
        BandMeans {
            top:    shown(self.top),
            middle: shown(self.middle),
            bottom: shown(self.bottom),
            left:   shown(self.left),
            center: shown(self.center),
            right:  shown(self.right),
        }
    }
}

pub fn band_means(map: &SaliencyMap) -> Bands {
    let (w, h) = (map.width(), map.height());
    let (r1, r2) = (h / 3, 2 * h / 3);
    let (c1, c2) = (w / 3, 2 * w / 3);

    Bands {
        top:    map.window_mean(0..r1, 0..w),
        middle: map.window_mean(r1..r2, 0..w),
        bottom: map.window_mean(r2..h, 0..w),
        left:   map.window_mean(0..h, 0..c1),
        center: map.window_mean(0..h, c1..c2),
        right:  map.window_mean(0..h, c2..w),
    }
}

fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n    = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Band-mean checks on an already-computed set of means.
pub fn hierarchy_issues(bands: &Bands) -> Vec<Issue> {
    let mut issues = Vec::new();

    if let (Some(top), Some(bottom)) = (bands.top, bands.bottom) {
        if top < bottom {
            issues.push(Issue::new(IssueKind::InvertedHierarchy {
                top_attention:    rounded(top, 3),
                bottom_attention: rounded(bottom, 3),
            }));
        }
    }

    if let (Some(left), Some(right)) = (bands.left, bands.right) {
        if right > left * RIGHT_HEAVY_RATIO {
            issues.push(Issue::new(IssueKind::RightHeavyLayout {
                left_attention:  rounded(left, 3),
                right_attention: rounded(right, 3),
            }));
        }
    }

    if let Some(variance) = bands.vertical_variance() {
        if variance < FLAT_VARIANCE {
            issues.push(Issue::new(IssueKind::FlatHierarchy {
                attention_variance: rounded(variance, 4),
            }));
        }
    }

    issues
}

pub fn assess_visual_hierarchy(map: &SaliencyMap) -> HierarchyAnalysis {
    let bands  = band_means(map);
    let issues = hierarchy_issues(&bands);
    let f_pattern = match (bands.top, bands.left) {
        (Some(top), Some(left)) => (top + left) / 2.0,
        _                       => 0.0,
    };

    HierarchyAnalysis {
        attention_distribution: bands.to_report(),
        f_pattern_compliance:   rounded(f_pattern, 3),
        hierarchy_clarity:      rounded(bands.vertical_variance().unwrap_or(0.0), 4),
        issues,
    }
}
