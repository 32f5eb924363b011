// ============================================================
// Layer 3 — Report Domain Types
// ============================================================
// The structured output of one design analysis.
//
// The report is what leaves the core: it is serialised to JSON
// for the (out of scope) export layer, so every float in it goes
// through `rounded`, which both rounds for readability and maps
// NaN/Inf to 0. No tensor or image type appears here.
//
// Reference: serde documentation (derive, rename)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::element::CriticalElement;
use crate::domain::issue::{Issue, Subcategory};

/// Round to `places` decimals; non-finite values become 0.
pub fn rounded(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(places);
    let r = (value * factor).round() / factor;
    if r.is_finite() { r } else { 0.0 }
}

// ─── Attention distribution ───────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionDistribution {
    /// Share of pixels above the 80th percentile, in percent
    pub high_attention_percentage: f64,
    pub average_attention:         f64,
    pub max_attention:             f64,
    /// Standard deviation of the map
    pub attention_concentration:   f64,
}

// ─── Visual hierarchy ─────────────────────────────────────────────────────────
/// Mean saliency of the horizontal and vertical thirds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BandMeans {
    pub top:    f64,
    pub middle: f64,
    pub bottom: f64,
    pub left:   f64,
    pub center: f64,
    pub right:  f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyAnalysis {
    pub attention_distribution: BandMeans,
    pub f_pattern_compliance:   f64,
    /// Variance of the top/middle/bottom means
    pub hierarchy_clarity:      f64,
    pub issues:                 Vec<Issue>,
}

// ─── Cognitive load ───────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CognitiveLoadLevel {
    #[serde(rename = "Low - Easy to process")]
    Low,
    #[serde(rename = "Moderate - Manageable complexity")]
    Moderate,
    #[serde(rename = "High - May overwhelm some users")]
    High,
    #[serde(rename = "Very High - Likely to cause cognitive overload")]
    VeryHigh,
}

impl CognitiveLoadLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 30.0 {
            Self::Low
        } else if score < 50.0 {
            Self::Moderate
        } else if score < 70.0 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Low      => "Low - Easy to process",
            Self::Moderate => "Moderate - Manageable complexity",
            Self::High     => "High - May overwhelm some users",
            Self::VeryHigh => "Very High - Likely to cause cognitive overload",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitiveLoadMetrics {
    pub element_count:     usize,
    pub dominant_colors:   usize,
    pub visual_density:    f64,
    pub attention_entropy: f64,
    /// None when the image has no pixels to threshold
    pub text_density:      Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitiveLoadAnalysis {
    pub cognitive_load_score: f64,
    pub level:                CognitiveLoadLevel,
    pub metrics:              CognitiveLoadMetrics,
    pub issues:               Vec<Issue>,
}

// ─── Recommendations ──────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category:    String,
    pub priority:    Priority,
    pub title:       String,
    pub description: String,
    pub action:      String,
    pub impact:      String,
    pub resources:   Vec<String>,
}

// ─── Report ───────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IssueSummary {
    pub attention_priority: usize,
    pub visual_hierarchy:   usize,
    pub cognitive_load:     usize,
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionReport {
    /// Composite 0–100 attention score
    pub score:                  f64,
    /// "learned_model" or "heuristic"
    pub saliency_source:        String,
    pub image_width:            u32,
    pub image_height:           u32,
    /// Path of the written heatmap overlay, when one was written
    pub saliency_heatmap:       Option<String>,
    pub attention_distribution: AttentionDistribution,
    pub critical_elements:      Vec<CriticalElement>,
    pub visual_hierarchy:       HierarchyAnalysis,
    pub cognitive_load:         CognitiveLoadAnalysis,
    /// All issues, in pipeline order: priority, hierarchy, cognitive load
    pub issues:                 Vec<Issue>,
    pub issue_summary:          IssueSummary,
    pub recommendations:        Vec<Recommendation>,
}

impl AttentionReport {
    /// Issues grouped by subcategory, in a stable order.
    pub fn issues_by_subcategory(&self) -> BTreeMap<Subcategory, Vec<&Issue>> {
        let mut groups: BTreeMap<Subcategory, Vec<&Issue>> = BTreeMap::new();
        for issue in &self.issues {
            groups.entry(issue.subcategory).or_default().push(issue);
        }
        groups
    }
}
