// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define the core
// concepts of a design critique.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only data types, invariants and traits
//
// The `image` crate is allowed: a saliency map is stored as an
// f32 luma buffer so the geometric analysis can reuse image's
// resampling instead of hand-rolled interpolation.
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

/// Typed errors shared by all layers
pub mod error;

/// Rectangular regions and detected UI elements
pub mod element;

/// Issue records with severity and typed payloads
pub mod issue;

/// The [0,1] attention field produced by a saliency source
pub mod saliency_map;

/// Report records handed to the serialisation layer
pub mod report;

/// Core abstractions (traits) that other layers implement
pub mod traits;
