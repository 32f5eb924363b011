use crate::domain::issue::Issue;
use crate::domain::report::{rounded, AttentionDistribution};
use crate::domain::saliency_map::SaliencyMap;

/// Share of the cognitive-load score subtracted from 100.
pub const COGNITIVE_LOAD_WEIGHT: f64 = 0.3;
/// Pixels above this percentile count as high attention.
pub const HIGH_ATTENTION_PERCENTILE: f64 = 80.0;

/// `100 − 0.3·load − Σ severity penalty`, clamped to [0, 100].
pub fn composite_score(cognitive_load_score: f64, issues: &[Issue]) -> f64 {
    let penalty: f64 = issues.iter().map(|i| i.severity.penalty()).sum();
    let score = 100.0 - cognitive_load_score * COGNITIVE_LOAD_WEIGHT - penalty;
    if score.is_finite() { score.clamp(0.0, 100.0) } else { 0.0 }
}

pub fn attention_distribution(map: &SaliencyMap) -> AttentionDistribution {
    let total = map.values().len();
    let high_share = if total == 0 {
        0.0
    } else {
        let threshold = map.percentile(HIGH_ATTENTION_PERCENTILE);
        let above     = map.values().iter().filter(|&&v| v as f64 > threshold).count();
        above as f64 / total as f64 * 100.0
    };

    AttentionDistribution {
        high_attention_percentage: rounded(high_share, 2),
        average_attention:         rounded(map.mean(), 3),
        max_attention:             rounded(map.max(), 3),
        attention_concentration:   rounded(map.std_dev(), 3),
    }
}
