//! Vector similarity.

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude. Sums are accumulated in
/// `f64` and the result is clamped to `[-1.0, 1.0]`, so the score is
/// symmetric, bounded, and exactly `1.0` for a non-zero vector against itself.
/// Vectors of different lengths are compared over their common prefix.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let score = dot / (norm_a * norm_b).sqrt();
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(-1.0, 1.0) as f32
}
