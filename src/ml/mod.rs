// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model, optimiser and backend code lives here.
//
//   model.rs      — U-Net saliency regressor
//                   • three conv-block encoder stages + max-pool
//                   • 512-channel bottleneck (at base width 64)
//                   • transpose-conv decoder with skip connections
//                   • 1×1 sigmoid head
//
//   scheduler.rs  — reduce-on-plateau learning-rate schedule
//
//   trainer.rs    — epoch loop: MSE, Adam, validation on the
//                   inner backend, best/periodic checkpoints,
//                   resume and Ctrl-C cancellation
//
//   inferencer.rs — loads the best weights and predicts a map
//                   for one image
//
//   provider.rs   — chooses learned model or heuristic once,
//                   at start-up
//
// Backends:
//   the `wgpu` feature (default) runs on the GPU through WGPU;
//   without it everything runs on the NdArray CPU backend.
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Ronneberger et al. (2015) U-Net

/// Backend used for inference and validation
#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

/// Backend used for inference and validation
#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;

/// Autodiff wrapper used for training
pub type TrainBackend = burn::backend::Autodiff<InferBackend>;

/// U-Net saliency model architecture
pub mod model;

/// Reduce-on-plateau learning-rate scheduler
pub mod scheduler;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Inference engine: loads the best weights and predicts maps
pub mod inferencer;

/// Learned-model / heuristic saliency selection
pub mod provider;

/// Serialises tests that draw weights from the backend's
/// process-wide RNG, so a seeded run sees only its own draws.
#[cfg(test)]
pub(crate) fn backend_rng_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
