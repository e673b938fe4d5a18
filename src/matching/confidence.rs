use crate::error::GradingError;
use crate::quality::WordQuality;

/// Confidence floor applied before the inverse sigmoid; `ln(100/0 - 1)` is
/// undefined, so a zero confidence is read as the weakest possible one.
pub const MIN_CONFIDENCE: i32 = 1;
pub const MAX_CONFIDENCE: i32 = 100;

/// Phone-weighted sigmoid blend of word confidences.
///
/// Each confidence `c` is mapped to `x = -scale * ln(100/c - 1)`, the mean of
/// `x` weighted by phone count is taken, and the mean is mapped back with
/// `100 / (1 + e^(-mean/scale))`, rounded half-to-even.
pub fn evaluate_confidence(words: &[WordQuality], scale: f64) -> Result<i32, GradingError> {
    let mut weighted_sum = 0.0f64;
    let mut phone_total = 0usize;

    for word in words {
        // zero weight; skipping keeps a saturated +inf from turning into NaN
        if word.phone_count == 0 {
            continue;
        }
        let confidence = saturate(word.confidence);
        weighted_sum += inverse_sigmoid(confidence, scale) * word.phone_count as f64;
        phone_total += word.phone_count;
    }

    if phone_total == 0 {
        return Err(GradingError::EmptyPhoneSpan);
    }

    let mean = weighted_sum / phone_total as f64;
    let blended = 100.0 / (1.0 + (-mean / scale).exp());
    Ok(blended.round_ties_even() as i32)
}

fn saturate(confidence: i32) -> i32 {
    let clamped = confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);
    if clamped != confidence {
        tracing::warn!(
            confidence,
            saturated = clamped,
            "confidence: word confidence outside (0, 100], saturating"
        );
    }
    clamped
}

/// `c = 100` maps to `+inf`, which the sigmoid folds back to exactly 100.
fn inverse_sigmoid(confidence: i32, scale: f64) -> f64 {
    -scale * (100.0 / f64::from(confidence) - 1.0).ln()
}
