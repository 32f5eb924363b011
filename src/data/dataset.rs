use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One training pair, by path. Decoding happens in the batcher so
/// it runs on the DataLoader's worker threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaliencyItem {
    pub image_path:    PathBuf,
    pub saliency_path: PathBuf,
}

impl SaliencyItem {
    pub fn new(image_path: impl Into<PathBuf>, saliency_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path:    image_path.into(),
            saliency_path: saliency_path.into(),
        }
    }

    /// File stem shared by the image and its map.
    pub fn stem(&self) -> String {
        self.image_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string()
    }
}

pub struct SaliencyDataset {
    items: Vec<SaliencyItem>,
}

impl SaliencyDataset {
    pub fn new(items: Vec<SaliencyItem>) -> Self { Self { items } }

    pub fn item_count(&self) -> usize { self.items.len() }
}

impl Dataset<SaliencyItem> for SaliencyDataset {
    fn get(&self, index: usize) -> Option<SaliencyItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
