// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: each use case wires data loading,
// the model or analysis pipeline, and persistence together for
// one CLI command.
//
//   train_use_case      — pairs → split → Trainer
//   analyze_use_case    — one image → report JSON + heatmap
//   batch_use_case      — a directory → per-image reports +
//                         comparison_report.json
//   synthesize_use_case — a directory → synthetic ground truth
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// Single-image attention analysis
pub mod analyze_use_case;

// Directory-wide analysis and ranking
pub mod batch_use_case;

// Synthetic ground-truth generation
pub mod synthesize_use_case;
