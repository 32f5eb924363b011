// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from a directory of design
// screenshots all the way to tensor batches for the U-Net.
//
// The pipeline flows in this order:
//
//   images/ + saliency/
//       │
//       ▼
//   PairLoader        → finds image files with a same-named map
//       │
//       ▼
//   split_train_val   → seeded shuffle into train / validation
//       │
//       ▼
//   SaliencyDataset   → implements Burn's Dataset trait
//       │
//       ▼
//   SaliencyBatcher   → decodes, resizes, normalises, stacks
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// When no hand-labelled maps exist, synthetic.rs produces
// stand-in ground truth from the images themselves.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Enumerates image / saliency-map pairs on disk
pub mod loader;

/// Image decoding and tensor layout (resize, ImageNet normalisation)
pub mod preprocessor;

/// Implements Burn's Dataset trait for saliency pairs
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;

/// Edge + centre-bias ground truth for unlabelled images
pub mod synthetic;
