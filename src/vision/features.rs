use image::{GrayImage, Luma, RgbImage};
use imageproc::{
    contours::{find_contours, BorderType},
    edges::canny,
    filter::{box_filter, gaussian_blur_f32},
    point::Point,
};

use crate::domain::element::Region;

pub const CANNY_LOW:  f32 = 50.0;
pub const CANNY_HIGH: f32 = 150.0;

/// Guard for divisions by a (near-)zero range.
pub const EPS: f32 = 1e-8;

pub fn grayscale(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}

/// Canny edges with the fixed 50/150 hysteresis thresholds.
/// Images too small for the gradient kernels give an empty map.
pub fn edge_map(gray: &GrayImage) -> GrayImage {
    if gray.width() < 3 || gray.height() < 3 {
        return GrayImage::new(gray.width(), gray.height());
    }
    canny(gray, CANNY_LOW, CANNY_HIGH)
}

/// Fraction of non-zero pixels in an edge map.
pub fn edge_density(edges: &GrayImage) -> f64 {
    let total = edges.as_raw().len();
    if total == 0 {
        return 0.0;
    }
    let on = edges.as_raw().iter().filter(|&&p| p > 0).count();
    on as f64 / total as f64
}

/// Gaussian sigma OpenCV derives for a k×k kernel when sigma is 0.
pub fn kernel_sigma(kernel: u32) -> f32 {
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

pub fn gaussian_blur(gray: &GrayImage, kernel: u32) -> GrayImage {
    if gray.width() == 0 || gray.height() == 0 {
        return gray.clone();
    }
    gaussian_blur_f32(gray, kernel_sigma(kernel))
}

/// Bounding boxes of the outermost contours of an edge map
/// (holes and nested borders are dropped).
pub fn external_bounding_boxes(edges: &GrayImage) -> Vec<Region> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| c.parent.is_none() && matches!(c.border_type, BorderType::Outer))
        .filter_map(|c| bounding_box(&c.points))
        .collect()
}

fn bounding_box(points: &[Point<i32>]) -> Option<Region> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(Region::new(
        min_x.max(0) as u32,
        min_y.max(0) as u32,
        (max_x - min_x + 1) as u32,
        (max_y - min_y + 1) as u32,
    ))
}

/// Rescale in place to [0, 1]. A flat field becomes all zeros.
pub fn normalize_min_max(values: &mut [f32]) {
    let (min, max) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    if !range.is_finite() || range <= EPS {
        values.iter_mut().for_each(|v| *v = 0.0);
        return;
    }
    values.iter_mut().for_each(|v| *v = (*v - min) / (range + EPS));
}

/// `|gray − blur₅ₓ₅(gray)|`, row-major.
pub fn local_contrast(gray: &GrayImage) -> Vec<f32> {
    let blurred = gaussian_blur(gray, 5);
    gray.as_raw()
        .iter()
        .zip(blurred.as_raw())
        .map(|(&g, &b)| (g as f32 - b as f32).abs())
        .collect()
}

/// Euclidean RGB distance of each pixel from its 11×11 box mean.
pub fn color_uniqueness(image: &RgbImage) -> Vec<f32> {
    let (w, h) = image.dimensions();
    let means: Vec<GrayImage> = (0..3)
        .map(|c| {
            let channel = GrayImage::from_fn(w, h, |x, y| Luma([image.get_pixel(x, y)[c]]));
            box_filter(&channel, 5, 5)
        })
        .collect();

    image.enumerate_pixels()
        .map(|(x, y, px)| {
            (0..3)
                .map(|c| {
                    let d = px[c] as f32 - means[c].get_pixel(x, y)[0] as f32;
                    d * d
                })
                .sum::<f32>()
                .sqrt()
        })
        .collect()
}

/// `1 − distance_from_center / max_distance`, row-major.
pub fn center_bias(width: u32, height: u32) -> Vec<f32> {
    let cx = (width / 2) as f32;
    let cy = (height / 2) as f32;
    let max_distance = (cx * cx + cy * cy).sqrt();

    let mut field = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            let v = if max_distance <= EPS {
                1.0
            } else {
                let d = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
                (1.0 - d / max_distance).max(0.0)
            };
            field.push(v);
        }
    }
    field
}

/// Eye-tracking prior: top band 0.8, left quarter 0.9, left half of
/// the middle band 0.6, everything else 0. Later bands overwrite
/// earlier ones.
pub fn f_pattern(width: u32, height: u32) -> Vec<f32> {
    let top_end    = height / 3;
    let middle_end = 2 * height / 3;
    let left_end   = width / 4;
    let half       = width / 2;

    let mut field = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            let mut v = 0.0;
            if y < top_end {
                v = 0.8;
            }
            if x < left_end {
                v = 0.9;
            }
            if y >= top_end && y < middle_end && x < half {
                v = 0.6;
            }
            field.push(v);
        }
    }
    field
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn rectangle_image(w: u32, h: u32, rect: Region) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            let inside = x >= rect.x && x < rect.x + rect.width
                && y >= rect.y && y < rect.y + rect.height;
            if inside { Rgb([20, 20, 20]) } else { Rgb([240, 240, 240]) }
        })
    }

    #[test]
    fn test_center_bias_peaks_in_the_middle() {
        let f = center_bias(11, 11);
        assert_eq!(f[5 * 11 + 5], 1.0);
        assert!(f[0] < 0.01);
        assert!(f.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_f_pattern_bands() {
        let f = f_pattern(12, 9);
        let at = |x: usize, y: usize| f[y * 12 + x];
        assert_eq!(at(6, 0), 0.8);  // top band
        assert_eq!(at(1, 0), 0.9);  // left quarter wins over top
        assert_eq!(at(1, 4), 0.6);  // middle band left half wins over left quarter
        assert_eq!(at(10, 4), 0.0);
        assert_eq!(at(1, 8), 0.9);
        assert_eq!(at(10, 8), 0.0);
    }

    #[test]
    fn test_normalize_flat_field_is_zero() {
        let mut v = vec![3.0; 5];
        normalize_min_max(&mut v);
        assert!(v.iter().all(|&x| x == 0.0));

        let mut v = vec![1.0, 2.0, 3.0];
        normalize_min_max(&mut v);
        assert!(v[0] == 0.0 && v[2] > 0.999 && v[2] <= 1.0);
    }

    #[test]
    fn test_rectangle_contour_bounding_box() {
        let rect  = Region::new(20, 30, 100, 40);
        let img   = rectangle_image(200, 120, rect);
        let edges = edge_map(&grayscale(&img));
        let boxes = external_bounding_boxes(&edges);

        assert!(!boxes.is_empty());
        // The outline box should cover the rectangle within a couple of pixels
        let best = boxes.iter().max_by_key(|b| b.area()).unwrap();
        assert!((best.x as i64 - rect.x as i64).abs() <= 2);
        assert!((best.y as i64 - rect.y as i64).abs() <= 2);
        assert!((best.width as i64 - rect.width as i64).abs() <= 4);
        assert!((best.height as i64 - rect.height as i64).abs() <= 4);
    }

    #[test]
    fn test_uniform_image_has_no_edges() {
        let img   = RgbImage::from_pixel(50, 50, Rgb([128, 128, 128]));
        let edges = edge_map(&grayscale(&img));
        assert_eq!(edge_density(&edges), 0.0);
        assert!(external_bounding_boxes(&edges).is_empty());
    }

    #[test]
    fn test_tiny_image_does_not_panic() {
        let img = RgbImage::from_pixel(2, 1, Rgb([0, 0, 0]));
        assert_eq!(edge_map(&grayscale(&img)).dimensions(), (2, 1));
        assert_eq!(color_uniqueness(&img).len(), 2);
    }
}
