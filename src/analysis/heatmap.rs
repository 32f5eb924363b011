use image::{Rgb, RgbImage};

use crate::domain::saliency_map::SaliencyMap;

const IMAGE_WEIGHT:   f32 = 0.6;
const HEATMAP_WEIGHT: f32 = 0.4;

/// JET colour for a value in [0, 1]: blue → cyan → yellow → red.
pub fn jet(value: f32) -> Rgb<u8> {
    let v = value.clamp(0.0, 1.0);
    let channel = |offset: f32| ((1.5 - (4.0 * v - offset).abs()).clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb([channel(3.0), channel(2.0), channel(1.0)])
}

/// Blend the JET-coloured map over the image (60 % image, 40 % heat).
/// The map is resampled to the image size if needed.
pub fn heatmap_overlay(image: &RgbImage, map: &SaliencyMap) -> RgbImage {
    let (w, h) = image.dimensions();
    let map    = map.resized(w, h);
    let gray   = map.to_gray_image();

    RgbImage::from_fn(w, h, |x, y| {
        let base = image.get_pixel(x, y);
        let heat = jet(gray.get_pixel(x, y)[0] as f32 / 255.0);
        let mix  = |c: usize| {
            (IMAGE_WEIGHT * base[c] as f32 + HEATMAP_WEIGHT * heat[c] as f32)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb([mix(0), mix(1), mix(2)])
    })
}
