use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig, ConvTranspose2d, ConvTranspose2dConfig},
        loss::{MseLoss, Reduction},
        pool::{MaxPool2d, MaxPool2dConfig},
        PaddingConfig2d, Relu,
    },
    prelude::*,
    tensor::activation::sigmoid,
};

use crate::domain::error::CritiqueError;

/// Number of 2×2 poolings between input and bottleneck.
const DEPTH: u32 = 3;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally; adding them again gives conflicting impls.
#[derive(Config, Debug)]
pub struct SaliencyModelConfig {
    /// Channels of the first encoder stage; doubled at every stage.
    #[config(default = 64)]
    pub base_channels: usize,
    /// Side length of the square input. Must be divisible by 8.
    #[config(default = 256)]
    pub image_size:    usize,
}

impl SaliencyModelConfig {
    pub fn validate(&self) -> Result<(), CritiqueError> {
        if self.base_channels == 0 {
            return Err(CritiqueError::config("base_channels must be positive"));
        }
        let step = 1usize << DEPTH;
        if self.image_size == 0 || self.image_size % step != 0 {
            return Err(CritiqueError::config(format!(
                "image_size {} must be a positive multiple of {step}",
                self.image_size
            )));
        }
        Ok(())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> SaliencyModel<B> {
        let c = self.base_channels;
        SaliencyModel {
            enc1:       ConvBlock::new(3, c, device),
            enc2:       ConvBlock::new(c, c * 2, device),
            enc3:       ConvBlock::new(c * 2, c * 4, device),
            bottleneck: ConvBlock::new(c * 4, c * 8, device),
            up3:        up_conv(c * 8, c * 4, device),
            dec3:       ConvBlock::new(c * 8, c * 4, device),
            up2:        up_conv(c * 4, c * 2, device),
            dec2:       ConvBlock::new(c * 4, c * 2, device),
            up1:        up_conv(c * 2, c, device),
            dec1:       ConvBlock::new(c * 2, c, device),
            head:       Conv2dConfig::new([c, 1], [1, 1]).init(device),
            pool:       MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            image_size: self.image_size,
        }
    }
}

fn up_conv<B: Backend>(input: usize, output: usize, device: &B::Device) -> ConvTranspose2d<B> {
    ConvTranspose2dConfig::new([input, output], [2, 2])
        .with_stride([2, 2])
        .init(device)
}

/// Two `3×3 conv (padding 1) + ReLU` layers.
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv1:      Conv2d<B>,
    pub conv2:      Conv2d<B>,
    pub activation: Relu,
}

impl<B: Backend> ConvBlock<B> {
    pub fn new(input: usize, output: usize, device: &B::Device) -> Self {
        let conv = |i: usize, o: usize| {
            Conv2dConfig::new([i, o], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device)
        };
        Self {
            conv1:      conv(input, output),
            conv2:      conv(output, output),
            activation: Relu::new(),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.activation.forward(self.conv1.forward(x));
        self.activation.forward(self.conv2.forward(x))
    }
}

/// U-Net saliency predictor: three encoder stages with max-pooling,
/// a bottleneck, three decoder stages fed by skip connections, and
/// a 1×1 sigmoid head.
#[derive(Module, Debug)]
pub struct SaliencyModel<B: Backend> {
    pub enc1:       ConvBlock<B>,
    pub enc2:       ConvBlock<B>,
    pub enc3:       ConvBlock<B>,
    pub bottleneck: ConvBlock<B>,
    pub up3:        ConvTranspose2d<B>,
    pub dec3:       ConvBlock<B>,
    pub up2:        ConvTranspose2d<B>,
    pub dec2:       ConvBlock<B>,
    pub up1:        ConvTranspose2d<B>,
    pub dec1:       ConvBlock<B>,
    pub head:       Conv2d<B>,
    pub pool:       MaxPool2d,
    pub image_size: usize,
}

impl<B: Backend> SaliencyModel<B> {
    /// Shape the model accepts for a batch of `batch` images.
    pub fn expected_shape(&self, batch: usize) -> [usize; 4] {
        [batch, 3, self.image_size, self.image_size]
    }

    /// The model never resizes internally; anything but
    /// `[N ≥ 1, 3, size, size]` is rejected.
    pub fn check_input(&self, images: &Tensor<B, 4>) -> Result<(), CritiqueError> {
        let actual   = images.dims();
        let expected = self.expected_shape(actual[0].max(1));
        if actual != expected {
            return Err(CritiqueError::InputShape { expected, actual });
        }
        Ok(())
    }

    /// images: [batch, 3, S, S] → saliency: [batch, 1, S, S] in [0, 1]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let e1 = self.enc1.forward(images);
        let e2 = self.enc2.forward(self.pool.forward(e1.clone()));
        let e3 = self.enc3.forward(self.pool.forward(e2.clone()));
        let b  = self.bottleneck.forward(self.pool.forward(e3.clone()));

        let d3 = self.dec3.forward(Tensor::cat(vec![self.up3.forward(b), e3], 1));
        let d2 = self.dec2.forward(Tensor::cat(vec![self.up2.forward(d3), e2], 1));
        let d1 = self.dec1.forward(Tensor::cat(vec![self.up1.forward(d2), e1], 1));

        sigmoid(self.head.forward(d1))
    }

    /// Shape-checked forward pass.
    pub fn predict(&self, images: Tensor<B, 4>) -> Result<Tensor<B, 4>, CritiqueError> {
        self.check_input(&images)?;
        Ok(self.forward(images))
    }

    /// Mean squared error against ground-truth maps of the same shape.
    pub fn forward_loss(&self, images: Tensor<B, 4>, targets: Tensor<B, 4>) -> Tensor<B, 1> {
        let predicted = self.forward(images);
        MseLoss::new().forward(predicted, targets, Reduction::Mean)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tiny_config() -> SaliencyModelConfig {
        SaliencyModelConfig::new().with_base_channels(4).with_image_size(16)
    }

    #[test]
    fn test_defaults_match_reference_architecture() {
        let cfg = SaliencyModelConfig::new();
        assert_eq!(cfg.base_channels, 64);
        assert_eq!(cfg.image_size, 256);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_output_shape_and_range() {
        let _rng = crate::ml::backend_rng_lock();
        let device = Default::default();
        let model: SaliencyModel<TestBackend> = tiny_config().init(&device);

        let images = Tensor::<TestBackend, 4>::random(
            [2, 3, 16, 16],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let out = model.predict(images).unwrap();
        assert_eq!(out.dims(), [2, 1, 16, 16]);

        let values = out.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        let _rng = crate::ml::backend_rng_lock();
        let device = Default::default();
        let model: SaliencyModel<TestBackend> = tiny_config().init(&device);

        let wrong_size = Tensor::<TestBackend, 4>::zeros([1, 3, 24, 24], &device);
        assert!(matches!(
            model.predict(wrong_size),
            Err(CritiqueError::InputShape { expected: [1, 3, 16, 16], actual: [1, 3, 24, 24] })
        ));

        let gray = Tensor::<TestBackend, 4>::zeros([1, 1, 16, 16], &device);
        assert!(model.check_input(&gray).is_err());
    }

    #[test]
    fn test_image_size_must_divide_by_eight() {
        assert!(SaliencyModelConfig::new().with_image_size(100).validate().is_err());
        assert!(SaliencyModelConfig::new().with_base_channels(0).validate().is_err());
    }

    #[test]
    fn test_loss_is_zero_for_perfect_prediction() {
        let _rng = crate::ml::backend_rng_lock();
        let device = Default::default();
        let model: SaliencyModel<TestBackend> = tiny_config().init(&device);
        let images  = Tensor::<TestBackend, 4>::zeros([1, 3, 16, 16], &device);
        let targets = model.forward(images.clone());
        let loss: f64 = model.forward_loss(images, targets).into_scalar().elem::<f64>();
        assert!(loss.abs() < 1e-10);
    }
}
