// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence used by the training and analysis
// use cases:
//
//   checkpoint.rs    — best weights, full training state and
//                      train_config.json, all written atomically
//                      with Burn's named MessagePack recorder
//
//   metrics.rs       — one CSV row per training epoch
//
//   report_writer.rs — analysis JSON, heatmap PNG and the batch
//                      comparison report
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Analysis report and heatmap persistence
pub mod report_writer;
