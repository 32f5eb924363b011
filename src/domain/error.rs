// ============================================================
// Layer 3 — Domain Errors
// ============================================================
// The failure modes the rest of the system needs to tell apart.
// Application code still returns anyhow::Result; these variants
// are what ends up inside it when the cause is a known one, so
// callers can downcast (e.g. batch analysis logs unreadable
// images and moves on).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CritiqueError {
    /// Bad or missing configuration: fatal to a training run.
    #[error("configuration error: {0}")]
    Config(String),

    /// A dataset resolved to zero usable samples.
    #[error("no training samples found: {0}")]
    EmptyDataset(String),

    /// An image could not be opened or decoded.
    #[error("cannot read image '{}': {source}", path.display())]
    UnreadableImage {
        path:   PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The model was handed a tensor it was not built for.
    #[error("model input shape {actual:?} does not match expected {expected:?}")]
    InputShape {
        expected: [usize; 4],
        actual:   [usize; 4],
    },
}

impl CritiqueError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
