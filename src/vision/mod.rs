// ============================================================
// Layer 7 — Vision Primitives
// ============================================================
// Model-free image processing shared by the heuristic saliency
// estimator, the synthetic ground-truth generator and the
// attention analysis:
//
//   features.rs  — grayscale, Canny edges, external contours,
//                  blurs, centre-bias and F-pattern priors
//
//   heuristic.rs — the deterministic saliency fallback used
//                  whenever no trained weights are available
//
// All filters come from imageproc; this layer only composes
// them and keeps the numeric guards (empty images, flat fields)
// in one place.
//
// Reference: imageproc documentation (edges, contours, filter)

/// Edge, contour and prior-field helpers
pub mod features;

/// Contrast / colour / edge / position saliency blend
pub mod heuristic;
