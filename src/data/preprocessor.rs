// ============================================================
// Layer 4 — Image Preprocessor
// ============================================================
// Turns decoded images into the flat f32 buffers the batcher
// and the inferencer stack into tensors.
//
// Input image  → RGB, resized to size×size (bilinear),
//                scaled to [0,1], normalised per channel with the
//                ImageNet mean/std, laid out channel-first (CHW).
// Saliency map → luma, resized to size×size, scaled to [0,1].
//
// The same `image_to_chw` is used for training and inference so
// the model always sees identically distributed inputs.
//
// Reference: image crate docs (imageops::resize, FilterType)

use image::{imageops, imageops::FilterType, GrayImage, RgbImage};
use std::path::Path;

use crate::domain::error::CritiqueError;

pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD:  [f32; 3] = [0.229, 0.224, 0.225];

pub fn load_rgb(path: &Path) -> Result<RgbImage, CritiqueError> {
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|source| CritiqueError::UnreadableImage {
            path: path.to_path_buf(),
            source,
        })
}

pub fn load_luma(path: &Path) -> Result<GrayImage, CritiqueError> {
    image::open(path)
        .map(|img| img.to_luma8())
        .map_err(|source| CritiqueError::UnreadableImage {
            path: path.to_path_buf(),
            source,
        })
}

/// Normalised CHW buffer of length `3 · size · size`.
pub fn image_to_chw(image: &RgbImage, size: u32) -> Vec<f32> {
    let resized = imageops::resize(image, size, size, FilterType::Triangle);
    let plane   = (size * size) as usize;

    let mut out = vec![0.0f32; 3 * plane];
    for (i, px) in resized.pixels().enumerate() {
        for c in 0..3 {
            let v = px[c] as f32 / 255.0;
            out[c * plane + i] = (v - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
        }
    }
    out
}

/// Target buffer of length `size · size`, values in [0,1].
pub fn saliency_to_plane(map: &GrayImage, size: u32) -> Vec<f32> {
    imageops::resize(map, size, size, FilterType::Triangle)
        .as_raw()
        .iter()
        .map(|&v| v as f32 / 255.0)
        .collect()
}
