// ============================================================
// Layer 3 — SaliencyMap
// ============================================================
// A single-channel attention field with every value in [0, 1].
//
// Whatever produces it (the U-Net or the heuristic), the map is
// sanitised on construction: NaN/Inf become 0 and everything is
// clamped into [0, 1]. Downstream code can therefore do plain
// arithmetic on it without re-checking.
//
// Storage is an image::ImageBuffer<Luma<f32>> so that resizing
// back to the design's resolution uses image's Triangle
// (bilinear) filter.
//
// Reference: image crate docs (imageops::resize)

use image::{imageops, imageops::FilterType, GrayImage, ImageBuffer, Luma};
use std::ops::Range;

use crate::domain::element::Region;

/// Number of histogram bins used for attention entropy.
pub const ENTROPY_BINS: usize = 256;

pub type Field = ImageBuffer<Luma<f32>, Vec<f32>>;

#[derive(Debug, Clone, PartialEq)]
pub struct SaliencyMap {
    field: Field,
}

fn sanitize(v: f32) -> f32 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

impl SaliencyMap {
    /// Wrap row-major values. Returns None when the length does not
    /// match width × height.
    pub fn from_values(width: u32, height: u32, values: Vec<f32>) -> Option<Self> {
        let values: Vec<f32> = values.into_iter().map(sanitize).collect();
        ImageBuffer::from_raw(width, height, values).map(|field| Self { field })
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f32) -> Self {
        let field = ImageBuffer::from_fn(width, height, |x, y| Luma([sanitize(f(x, y))]));
        Self { field }
    }

    pub fn width(&self) -> u32 {
        self.field.width()
    }

    pub fn height(&self) -> u32 {
        self.field.height()
    }

    pub fn is_empty(&self) -> bool {
        self.field.as_raw().is_empty()
    }

    /// Row-major values
    pub fn values(&self) -> &[f32] {
        self.field.as_raw()
    }

    pub fn value(&self, x: u32, y: u32) -> f32 {
        self.field.get_pixel(x, y)[0]
    }

    /// Bilinear resample to `width × height`.
    pub fn resized(&self, width: u32, height: u32) -> Self {
        if width == self.width() && height == self.height() {
            return self.clone();
        }
        if width == 0 || height == 0 || self.is_empty() {
            return Self::from_fn(width, height, |_, _| 0.0);
        }
        let resized = imageops::resize(&self.field, width, height, FilterType::Triangle);
        Self::from_fn(width, height, |x, y| resized.get_pixel(x, y)[0])
    }

    /// 8-bit rendering (value × 255, truncated), used for heatmaps.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            Luma([(self.value(x, y) * 255.0) as u8])
        })
    }

    // ─── Statistics ──────────────────────────────────────────────────────────

    /// Mean over a rectangular window of rows × columns, None when
    /// the window holds no pixel.
    pub fn window_mean(&self, rows: Range<u32>, cols: Range<u32>) -> Option<f64> {
        let rows = rows.start.min(self.height())..rows.end.min(self.height());
        let cols = cols.start.min(self.width())..cols.end.min(self.width());

        let mut sum   = 0.0f64;
        let mut count = 0usize;
        for y in rows {
            for x in cols.clone() {
                sum   += self.value(x, y) as f64;
                count += 1;
            }
        }
        (count > 0).then(|| sum / count as f64)
    }

    /// (mean, max) inside a region, clipped to the map. Empty → (0, 0).
    pub fn region_stats(&self, region: &Region) -> (f64, f64) {
        let x_end = region.x.saturating_add(region.width).min(self.width());
        let y_end = region.y.saturating_add(region.height).min(self.height());

        let mut sum   = 0.0f64;
        let mut max   = 0.0f64;
        let mut count = 0usize;
        for y in region.y.min(y_end)..y_end {
            for x in region.x.min(x_end)..x_end {
                let v = self.value(x, y) as f64;
                sum += v;
                max  = max.max(v);
                count += 1;
            }
        }
        if count == 0 { (0.0, 0.0) } else { (sum / count as f64, max) }
    }

    pub fn mean(&self) -> f64 {
        let n = self.values().len();
        if n == 0 {
            return 0.0;
        }
        self.values().iter().map(|&v| v as f64).sum::<f64>() / n as f64
    }

    pub fn max(&self) -> f64 {
        self.values().iter().fold(0.0f32, |m, &v| m.max(v)) as f64
    }

    /// Population standard deviation.
    pub fn std_dev(&self) -> f64 {
        let n = self.values().len();
        if n == 0 {
            return 0.0;
        }
        let mean = self.mean();
        let var  = self.values()
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>() / n as f64;
        var.sqrt()
    }

    /// Percentile with linear interpolation between closest ranks,
    /// `p` in [0, 100].
    pub fn percentile(&self, p: f64) -> f64 {
        let mut sorted: Vec<f32> = self.values().to_vec();
        if sorted.is_empty() {
            return 0.0;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let pos  = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
        let lo   = pos.floor() as usize;
        let hi   = pos.ceil() as usize;
        let frac = pos - lo as f64;
        sorted[lo] as f64 + (sorted[hi] as f64 - sorted[lo] as f64) * frac
    }

    /// Shannon entropy (bits) of the 256-bin intensity histogram over [0, 1].
    pub fn entropy(&self) -> f64 {
        let n = self.values().len();
        if n == 0 {
            return 0.0;
        }
        let mut hist = [0usize; ENTROPY_BINS];
        for &v in self.values() {
            let bin = ((v * ENTROPY_BINS as f32) as usize).min(ENTROPY_BINS - 1);
            hist[bin] += 1;
        }
        hist.iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f64 / n as f64;
                -p * p.log2()
            })
            .sum()
    }
}
