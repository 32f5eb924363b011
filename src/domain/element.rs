// ============================================================
// Layer 3 — UI Element Domain Types
// ============================================================
// A critical element is a rectangular region of the design that
// looks like a UI control (found from edge contours), together
// with how much predicted attention it receives.
//
// Importance is decided purely from geometry:
//   - in the top 30% of the image       → is_top
//   - bounding box larger than 10 000px  → is_large
//   - horizontally centred within 20%   → is_centered
// Any of the three makes the element high importance.
//
// Reference: Rust Book §5 (Structs), §6 (Enums)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned bounding box in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x:      u32,
    pub y:      u32,
    pub width:  u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Horizontal centre line, in pixels
    pub fn center_x(&self) -> f64 {
        self.x as f64 + self.width as f64 / 2.0
    }

    /// Width over height; a zero-height box counts as square.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f64 / self.height as f64
        }
    }
}

/// Coarse classification of a detected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementType {
    #[serde(rename = "Header/Navigation")]
    HeaderNavigation,
    #[serde(rename = "Button/CTA")]
    ButtonCta,
    #[serde(rename = "Icon")]
    Icon,
    #[serde(rename = "Text Block")]
    TextBlock,
    #[serde(rename = "UI Element")]
    UiElement,
}

impl ElementType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::HeaderNavigation => "Header/Navigation",
            Self::ButtonCta        => "Button/CTA",
            Self::Icon             => "Icon",
            Self::TextBlock        => "Text Block",
            Self::UiElement        => "UI Element",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Medium,
    High,
}

/// A detected element with its attention statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalElement {
    /// `element_<contour index>`
    pub id: String,

    #[serde(rename = "type")]
    pub element_type: ElementType,

    pub location: Region,

    pub importance: Importance,

    /// Mean saliency inside the box, rounded to 3 decimals
    pub attention_score: f64,

    /// Peak saliency inside the box, rounded to 3 decimals
    pub max_attention: f64,

    pub area: u64,

    pub is_top:      bool,
    pub is_large:    bool,
    pub is_centered: bool,
}
