// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles samples with a seeded RNG and splits them into two
// sets:
//   - Training set:   used to update model weights
//   - Validation set: drives LR scheduling and best-model selection
//
// Pair enumeration is sorted, and the shuffle is seeded from the
// training config, so the same corpus and seed always give the
// same split. Resuming a run therefore validates on the same
// images it validated on before the interruption.
//
// Split ratio: 80% training, 20% validation (configurable)
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation (SeedableRng, SliceRandom)

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and split into (train, validation).
///
/// ```ignore
/// let (train, val) = split_train_val(pairs, 0.8, 42);
/// ```
pub fn split_train_val<T>(mut samples: Vec<T>, train_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let split_at = ((total as f64) * train_fraction.clamp(0.0, 1.0)).round() as usize;
    let split_at = split_at.min(total);

    let val = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation ({}% / {}%)",
        samples.len(),
        val.len(),
        (samples.len() * 100) / total.max(1),
        (val.len()     * 100) / total.max(1),
    );

    (samples, val)
}
