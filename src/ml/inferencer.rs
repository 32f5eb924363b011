// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Rebuilds the trained architecture from train_config.json,
// loads the best weights and predicts a saliency map for one
// image at a time.
//
// The image goes through the same resize + ImageNet
// normalisation as training samples, and the predicted
// S×S field is resampled back to the image's own size.

use anyhow::{anyhow, Context, Result};
use burn::{prelude::*, tensor::TensorData};
use image::RgbImage;

use crate::application::train_use_case::TrainConfig;
use crate::data::preprocessor::image_to_chw;
use crate::domain::saliency_map::SaliencyMap;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::SaliencyModel;

pub struct SaliencyInferencer<B: Backend> {
    model:      SaliencyModel<B>,
    image_size: u32,
    device:     B::Device,
}

impl<B: Backend> SaliencyInferencer<B> {
    pub fn new(model: SaliencyModel<B>, device: B::Device) -> Self {
        let image_size = model.image_size as u32;
        Self { model, image_size, device }
    }

    /// Load the best weights from `ckpt_manager`. Missing or corrupt
    /// weights are an error.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: B::Device) -> Result<Self> {
        let cfg = if ckpt_manager.has_config() {
            ckpt_manager.load_config()?
        } else {
            tracing::warn!(
                "No {} in '{}'; assuming the default architecture",
                crate::infra::checkpoint::CONFIG_FILE,
                ckpt_manager.dir().display()
            );
            TrainConfig::default()
        };

        let model_cfg = cfg.model_config();
        model_cfg.validate()?;
        let model = ckpt_manager.load_best(model_cfg.init::<B>(&device), &device)?;
        tracing::info!(
            "Model loaded from '{}' (image_size={})",
            ckpt_manager.best_model_path().display(),
            cfg.image_size
        );
        Ok(Self::new(model, device))
    }

    pub fn image_size(&self) -> u32 {
        self.image_size
    }

    /// Predict a map with the resolution of `image`.
    pub fn predict(&self, image: &RgbImage) -> Result<SaliencyMap> {
        let size = self.image_size as usize;
        let chw  = image_to_chw(image, self.image_size);
        let input = Tensor::<B, 4>::from_data(TensorData::new(chw, [1, 3, size, size]), &self.device);

        let output = self.model.predict(input)?;
        let values = output
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read model output: {e:?}"))?;

        let map = SaliencyMap::from_values(self.image_size, self.image_size, values)
            .context("Model output has an unexpected number of values")?;

        let (w, h) = image.dimensions();
        Ok(map.resized(w, h))
    }
}
