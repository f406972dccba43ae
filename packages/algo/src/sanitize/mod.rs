//! Data Sanitization
//!
//! Numerical stability utilities.
//!
//! Functions:
//! - Similarity matrix sanitization
//! - Positive floors for memory parameters
//! - Shape checks for externally supplied matrices

use crate::types::{DIFFICULTY_MAX, DIFFICULTY_MIN, MEMORY_FLOOR};

/// Replace NaN/Inf scores with 0 so they never win a matching
pub fn sanitize_similarity_matrix(scores: &mut [Vec<f64>]) {
    for row in scores.iter_mut() {
        for val in row.iter_mut() {
            if val.is_nan() || val.is_infinite() {
                *val = 0.0;
            }
        }
    }
}

/// Whether `scores` is exactly `rows` x `cols`
pub fn is_well_shaped(scores: &[Vec<f64>], rows: usize, cols: usize) -> bool {
    scores.len() == rows && scores.iter().all(|row| row.len() == cols)
}

/// Raise non-positive or non-finite values to `MEMORY_FLOOR`
pub fn floor_positive(value: f64) -> f64 {
    if value.is_nan() || value <= MEMORY_FLOOR {
        MEMORY_FLOOR
    } else if value.is_infinite() {
        f64::MAX
    } else {
        value
    }
}

/// Clamp difficulty into its bounded range
pub fn clamp_difficulty(value: f64) -> f64 {
    if value.is_nan() {
        return DIFFICULTY_MIN;
    }
    value.clamp(DIFFICULTY_MIN, DIFFICULTY_MAX)
}
