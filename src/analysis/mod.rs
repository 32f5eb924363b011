// ============================================================
// Layer 8 — Attention Analysis
// ============================================================
// Turns (image, saliency map) into a structured critique.
//
//   image ──► SaliencySource ──► SaliencyMap (resized to image)
//     │                              │
//     ├── external contours ─────────┤
//     │                              ▼
//     │                    elements.rs     → critical elements
//     │                    priority.rs     → under/over-attended
//     │                    hierarchy.rs    → band means, F-pattern
//     └──────────────────► cognitive.rs    → load score + issues
//                                    │
//                                    ▼
//                    scoring.rs, recommendations.rs
//                                    │
//                                    ▼
//                             AttentionReport
//
// Every stage is a plain function of its inputs, so each can be
// tested on a hand-made map without running a model. The
// pipeline in pipeline.rs only wires them together.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Contour boxes → classified, attention-scored UI elements
pub mod elements;

/// Importance vs. received attention checks
pub mod priority;

/// Thirds-based hierarchy and F-pattern assessment
pub mod hierarchy;

/// Element / colour / density / entropy load estimate
pub mod cognitive;

/// Composite score and attention distribution summary
pub mod scoring;

/// Grouped, actionable advice derived from the issues
pub mod recommendations;

/// JET-coloured saliency overlay
pub mod heatmap;

/// Orchestrates all stages for one image
pub mod pipeline;
