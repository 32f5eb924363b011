// ============================================================
// Layer 3 — Issue Domain Types
// ============================================================
// Every finding of the attention pipeline is an Issue.
//
// The measured values that triggered an issue live in IssueKind,
// a sum type with one variant per check. All the presentation
// fields (id, subcategory, severity, confidence, wording) are
// derived from the kind in one place, so a check can never emit
// an issue with a missing field or a mismatched severity.
//
// Issues are immutable once built: fields are public for
// serialisation and reading, but nothing in the pipeline mutates
// an issue after Issue::new returns it.
//
// Reference: Rust Book §6 (Enums and Pattern Matching)

use serde::{Deserialize, Serialize};

use crate::domain::element::ElementType;
use crate::domain::report::rounded;

// ─── Severity ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    /// Points subtracted from the composite attention score.
    pub fn penalty(&self) -> f64 {
        match self {
            Self::Critical => 10.0,
            Self::High     => 7.0,
            Self::Medium   => 4.0,
            Self::Low      => 2.0,
            Self::Info     => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Attention,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subcategory {
    #[serde(rename = "Priority Mismatch")]
    PriorityMismatch,
    #[serde(rename = "Over-emphasis")]
    OverEmphasis,
    #[serde(rename = "Visual Hierarchy")]
    VisualHierarchy,
    #[serde(rename = "Cognitive Load")]
    CognitiveLoad,
}

impl Subcategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::PriorityMismatch => "Priority Mismatch",
            Self::OverEmphasis     => "Over-emphasis",
            Self::VisualHierarchy  => "Visual Hierarchy",
            Self::CognitiveLoad    => "Cognitive Load",
        }
    }
}

// ─── IssueKind ────────────────────────────────────────────────────────────────
/// The check that fired, with the values it measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueKind {
    LowAttentionToCriticalElement {
        element_id:   String,
        element_type: ElementType,
        attention:    f64,
    },
    ExcessiveAttentionToSecondaryElement {
        element_id:   String,
        element_type: ElementType,
        attention:    f64,
    },
    InvertedHierarchy {
        top_attention:    f64,
        bottom_attention: f64,
    },
    RightHeavyLayout {
        left_attention:  f64,
        right_attention: f64,
    },
    FlatHierarchy {
        attention_variance: f64,
    },
    TooManyElements {
        element_count:   usize,
        recommended_max: usize,
    },
    ExcessiveColorPalette {
        color_count:     usize,
        recommended_max: usize,
    },
    HighInformationDensity {
        density:     f64,
        optimal_max: f64,
    },
    FragmentedAttention {
        entropy: f64,
    },
}

// ─── Issue ────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id:             String,
    pub category:       Category,
    pub subcategory:    Subcategory,
    pub severity:       Severity,
    /// How sure the check is, in [0, 1]
    pub confidence:     f64,
    pub title:          String,
    pub description:    String,
    pub explanation:    String,
    pub fix_suggestion: String,
    pub kind:           IssueKind,
}

impl Issue {
    /// Build the full issue record for a fired check.
    pub fn new(kind: IssueKind) -> Self {
        use IssueKind::*;

        let (id, subcategory, severity, confidence, title, description, explanation, fix) = match &kind {
            LowAttentionToCriticalElement { element_id, element_type, attention } => (
                format!("attention_priority_{element_id}"),
                Subcategory::PriorityMismatch,
                Severity::High,
                0.80,
                "Low Attention to Critical Element".to_string(),
                format!("Critical {element_type} not receiving enough visual attention"),
                format!(
                    "This {element_type} is important but only receives {:.1}% of user attention. Users may miss it.",
                    rounded(attention * 100.0, 1)
                ),
                "Increase visual prominence through size, color, contrast, or position.".to_string(),
            ),
            ExcessiveAttentionToSecondaryElement { element_id, element_type, attention } => (
                format!("attention_overemphasis_{element_id}"),
                Subcategory::OverEmphasis,
                Severity::Low,
                0.65,
                "Excessive Attention to Secondary Element".to_string(),
                format!("{element_type} may be drawing too much attention"),
                format!(
                    "This element receives {:.1}% of user attention, which might distract from more important content.",
                    rounded(attention * 100.0, 1)
                ),
                "Consider reducing visual prominence if not a primary action.".to_string(),
            ),
            InvertedHierarchy { .. } => (
                "hierarchy_inverted".to_string(),
                Subcategory::VisualHierarchy,
                Severity::Medium,
                0.75,
                "Inverted Visual Hierarchy".to_string(),
                "Bottom of design receives more attention than top".to_string(),
                "Users typically start at the top. Important content should be placed higher.".to_string(),
                "Move critical elements to the top third of the design.".to_string(),
            ),
            RightHeavyLayout { .. } => (
                "hierarchy_right_heavy".to_string(),
                Subcategory::VisualHierarchy,
                Severity::Low,
                0.70,
                "Right-Heavy Layout".to_string(),
                "Right side receives disproportionate attention".to_string(),
                "Western reading patterns favor left-to-right flow. Important content should start on the left.".to_string(),
                "Consider left-aligning primary content and CTAs.".to_string(),
            ),
            FlatHierarchy { .. } => (
                "hierarchy_flat".to_string(),
                Subcategory::VisualHierarchy,
                Severity::Medium,
                0.70,
                "Flat Visual Hierarchy".to_string(),
                "Lack of clear visual hierarchy".to_string(),
                "All areas receive similar attention, making it unclear what's most important.".to_string(),
                "Create clear hierarchy using size, color, and contrast to emphasize important elements.".to_string(),
            ),
            TooManyElements { element_count, .. } => (
                "cognitive_too_many_elements".to_string(),
                Subcategory::CognitiveLoad,
                Severity::High,
                0.75,
                "Too Many Elements".to_string(),
                format!("Design contains {element_count} distinct elements"),
                "Too many elements increase cognitive load and make it hard for users to focus.".to_string(),
                "Simplify design by grouping related elements or removing non-essential items.".to_string(),
            ),
            ExcessiveColorPalette { color_count, recommended_max } => (
                "cognitive_too_many_colors".to_string(),
                Subcategory::CognitiveLoad,
                Severity::Medium,
                0.80,
                "Excessive Color Palette".to_string(),
                format!("Design uses {color_count} dominant colors"),
                format!(
                    "Using more than {recommended_max} dominant colors can overwhelm users and reduce visual coherence."
                ),
                format!("Limit color palette to {recommended_max} or fewer dominant colors."),
            ),
            HighInformationDensity { .. } => (
                "cognitive_high_density".to_string(),
                Subcategory::CognitiveLoad,
                Severity::Medium,
                0.70,
                "High Information Density".to_string(),
                "Design is visually dense with limited white space".to_string(),
                "High density makes designs feel overwhelming and reduces comprehension.".to_string(),
                "Add more white space and reduce visual clutter.".to_string(),
            ),
            FragmentedAttention { .. } => (
                "cognitive_fragmented_attention".to_string(),
                Subcategory::CognitiveLoad,
                Severity::Medium,
                0.75,
                "Fragmented Attention".to_string(),
                "Attention is scattered across many areas".to_string(),
                "Scattered attention increases cognitive load and reduces task completion.".to_string(),
                "Create clear focal points to guide user attention.".to_string(),
            ),
        };

        Self {
            id,
            category: Category::Attention,
            subcategory,
            severity,
            confidence,
            title,
            description,
            explanation,
            fix_suggestion: fix,
            kind,
        }
    }
}
