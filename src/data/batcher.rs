// ============================================================
// Layer 4 — Saliency Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<SaliencyItem>
// into image and target tensors.
//
// How batching works here:
//   Input:  Vec of N SaliencyItems (paths)
//   Output: SaliencyBatch with
//             images  [N, 3, S, S]  (ImageNet-normalised)
//             targets [N, 1, S, S]  (in [0,1])
//
//   Each item is decoded and resized to S×S, its CHW buffer is
//   appended to one flat Vec, and the Vec is turned into a
//   tensor of the final shape in one go.
//
// Decoding happens here, inside the DataLoader worker threads,
// rather than up-front, so a large corpus never sits in memory.
//
// A pair that fails to decode mid-training is logged and
// replaced by an all-zero sample; one corrupt file must not kill
// a multi-hour run.
//
// Reference: Burn Book §4 (Batcher)

use anyhow::Result;
use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::dataset::SaliencyItem;
use crate::data::preprocessor::{image_to_chw, load_luma, load_rgb, saliency_to_plane};

// ─── SaliencyBatch ────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct SaliencyBatch<B: Backend> {
    /// Normalised images, shape [batch_size, 3, size, size]
    pub images: Tensor<B, 4>,

    /// Ground-truth maps, shape [batch_size, 1, size, size]
    pub targets: Tensor<B, 4>,
}

// ─── SaliencyBatcher ──────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct SaliencyBatcher {
    /// Side length every sample is resized to
    pub image_size: u32,
}

impl SaliencyBatcher {
    pub fn new(image_size: u32) -> Self {
        Self { image_size }
    }

    /// Decode one pair into (CHW image, target plane).
    pub fn load_item(&self, item: &SaliencyItem) -> Result<(Vec<f32>, Vec<f32>)> {
        let image    = load_rgb(&item.image_path)?;
        let saliency = load_luma(&item.saliency_path)?;
        Ok((
            image_to_chw(&image, self.image_size),
            saliency_to_plane(&saliency, self.image_size),
        ))
    }
}

impl<B: Backend> Batcher<B, SaliencyItem, SaliencyBatch<B>> for SaliencyBatcher {
    fn batch(&self, items: Vec<SaliencyItem>, device: &B::Device) -> SaliencyBatch<B> {
        let n     = items.len();
        let size  = self.image_size as usize;
        let plane = size * size;

        let mut image_flat  = Vec::with_capacity(n * 3 * plane);
        let mut target_flat = Vec::with_capacity(n * plane);

        for item in &items {
            match self.load_item(item) {
                Ok((image, target)) => {
                    image_flat.extend(image);
                    target_flat.extend(target);
                }
                Err(e) => {
                    tracing::warn!("Zero-filling sample '{}': {e:#}", item.stem());
                    image_flat.extend(std::iter::repeat(0.0).take(3 * plane));
                    target_flat.extend(std::iter::repeat(0.0).take(plane));
                }
            }
        }

        let images  = Tensor::<B, 4>::from_data(TensorData::new(image_flat, [n, 3, size, size]), device);
        let targets = Tensor::<B, 4>::from_data(TensorData::new(target_flat, [n, 1, size, size]), device);

        SaliencyBatch { images, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use tempfile::tempdir;

    type TestBackend = NdArray;

    #[test]
    fn test_batch_shapes_and_zero_fill() {
        let dir = tempdir().unwrap();
        let img = dir.path().join("a.png");
        let sal = dir.path().join("a_map.png");
        RgbImage::from_pixel(20, 10, Rgb([10, 20, 30])).save(&img).unwrap();
        GrayImage::from_pixel(20, 10, Luma([255])).save(&sal).unwrap();

        let items = vec![
            SaliencyItem::new(&img, &sal),
            SaliencyItem::new(dir.path().join("missing.png"), &sal),
        ];
        let device = Default::default();
        let batch: SaliencyBatch<TestBackend> = SaliencyBatcher::new(8).batch(items, &device);

        assert_eq!(batch.images.dims(), [2, 3, 8, 8]);
        assert_eq!(batch.targets.dims(), [2, 1, 8, 8]);

        let targets = batch.targets.into_data().to_vec::<f32>().unwrap();
        assert!(targets[..64].iter().all(|&v| (v - 1.0).abs() < 1e-6));
        assert!(targets[64..].iter().all(|&v| v == 0.0));
    }
}
