// ============================================================
// Layer 4 — Synthetic Ground Truth
// ============================================================
// Produces a plausible saliency map from an image alone:
//
//   gray → Canny(50, 150) → Gaussian blur (21×21)
//        → 0.6 · blurred + 0.4 · centre_bias · 255 → u8
//
// This is a bootstrap for corpora without eye-tracking labels.
// The recipe overlaps with the heuristic saliency blend, so a
// model trained only on these maps learns to imitate that
// heuristic. Every call path logs a lower-fidelity warning.

use anyhow::{Context, Result};
use image::{GrayImage, Luma, RgbImage};
use std::path::{Path, PathBuf};

use crate::data::preprocessor::load_rgb;
use crate::vision::features::{center_bias, edge_map, gaussian_blur, grayscale};

const EDGE_WEIGHT:   f32 = 0.6;
const CENTER_WEIGHT: f32 = 0.4;
const BLUR_KERNEL:   u32 = 21;

pub const FIDELITY_WARNING: &str =
    "synthetic saliency maps are a heuristic proxy, not eye-tracking ground truth; \
     a model trained on them will largely reproduce the heuristic fallback";

/// Edge-plus-centre-bias map with the image's resolution.
pub fn synthesize_map(image: &RgbImage) -> GrayImage {
    let (w, h)  = image.dimensions();
    let edges   = edge_map(&grayscale(image));
    let blurred = gaussian_blur(&edges, BLUR_KERNEL);
    let center  = center_bias(w, h);

    GrayImage::from_fn(w, h, |x, y| {
        let i = (y * w + x) as usize;
        let v = EDGE_WEIGHT * blurred.get_pixel(x, y)[0] as f32 + CENTER_WEIGHT * center[i] * 255.0;
        Luma([v.clamp(0.0, 255.0) as u8])
    })
}

/// Decode `image_path`, synthesise its map and write `<out_dir>/<stem>.png`.
pub fn synthesize_file(image_path: &Path, out_dir: &Path) -> Result<PathBuf> {
    let image = load_rgb(image_path)?;
    let stem  = image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("'{}' has no usable file stem", image_path.display()))?;

    let out = out_dir.join(format!("{stem}.png"));
    synthesize_map(&image)
        .save(&out)
        .with_context(|| format!("Cannot write '{}'", out.display()))?;
    Ok(out)
}
