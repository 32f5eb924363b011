use anyhow::Result;
use image::RgbImage;

use crate::domain::saliency_map::SaliencyMap;
use crate::domain::traits::SaliencySource;
use crate::vision::features::{
    center_bias, color_uniqueness, edge_map, f_pattern, grayscale, local_contrast,
    normalize_min_max,
};

// ─── Blend weights ────────────────────────────────────────────────────────────
const W_CONTRAST: f32 = 0.30;
const W_COLOR:    f32 = 0.20;
const W_EDGES:    f32 = 0.20;
const W_CENTER:   f32 = 0.15;
const W_FPATTERN: f32 = 0.15;

/// Deterministic, model-free saliency estimate.
///
/// Blends local contrast, colour uniqueness, Canny edges, a radial
/// centre bias and an F-pattern reading prior, then rescales the
/// result to [0, 1]. Output has the resolution of the input image.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicSaliency;

impl HeuristicSaliency {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(&self, image: &RgbImage) -> SaliencyMap {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return SaliencyMap::from_fn(w, h, |_, _| 0.0);
        }

        let gray = grayscale(image);

        let mut contrast = local_contrast(&gray);
        let mut color    = color_uniqueness(image);
        let mut edges: Vec<f32> = edge_map(&gray).as_raw().iter().map(|&e| e as f32).collect();
        normalize_min_max(&mut contrast);
        normalize_min_max(&mut color);
        normalize_min_max(&mut edges);

        let center = center_bias(w, h);
        let prior  = f_pattern(w, h);

        let mut blend: Vec<f32> = (0..contrast.len())
            .map(|i| {
                W_CONTRAST * contrast[i]
                    + W_COLOR * color[i]
                    + W_EDGES * edges[i]
                    + W_CENTER * center[i]
                    + W_FPATTERN * prior[i]
            })
            .collect();
        normalize_min_max(&mut blend);

        SaliencyMap::from_values(w, h, blend)
            .unwrap_or_else(|| SaliencyMap::from_fn(w, h, |_, _| 0.0))
    }
}

impl SaliencySource for HeuristicSaliency {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn saliency_map(&self, image: &RgbImage) -> Result<SaliencyMap> {
        Ok(self.compute(image))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::element::Region;
    use image::Rgb;

    fn bright_square(w: u32, h: u32, square: Region) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            let inside = x >= square.x && x < square.x + square.width
                && y >= square.y && y < square.y + square.height;
            if inside { Rgb([255, 255, 255]) } else { Rgb([40, 40, 40]) }
        })
    }

    #[test]
    fn test_output_in_unit_range_with_input_resolution() {
        let img = RgbImage::from_fn(64, 48, |x, y| Rgb([(x * 4) as u8, (y * 5) as u8, 90]));
        let map = HeuristicSaliency::new().compute(&img);
        assert_eq!((map.width(), map.height()), (64, 48));
        assert!(map.values().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_bright_square_beats_background() {
        let (w, h) = (200, 200);
        let square = Region::new(80, 80, 40, 40);
        let map    = HeuristicSaliency::new().compute(&bright_square(w, h, square));

        let (inside, _) = map.region_stats(&square);

        let mut sum   = 0.0f64;
        let mut count = 0usize;
        for y in 0..h {
            for x in 0..w {
                let outside = x < 80 || x >= 120 || y < 80 || y >= 120;
                if outside {
                    sum   += map.value(x, y) as f64;
                    count += 1;
                }
            }
        }
        let background = sum / count as f64;
        assert!(inside > background, "square {inside} <= background {background}");
    }

    #[test]
    fn test_uniform_image_is_finite() {
        let img = RgbImage::from_pixel(30, 30, Rgb([10, 200, 30]));
        let map = HeuristicSaliency::new().compute(&img);
        assert!(map.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_is_deterministic() {
        let img = bright_square(50, 40, Region::new(5, 5, 10, 10));
        let h   = HeuristicSaliency::new();
        assert_eq!(h.compute(&img), h.compute(&img));
    }

    #[test]
    fn test_empty_image_gives_empty_map() {
        let map = HeuristicSaliency::new().compute(&RgbImage::new(0, 0));
        assert!(map.is_empty());
    }
}
