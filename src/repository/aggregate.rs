//! Aggregation helpers shared by every backend.
//!
//! Empty populations always produce `0.0`, never NaN or an error.

use serde::Serialize;

/// `part / total`, or `0.0` when `total` is zero.
pub fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Arithmetic mean, or `0.0` for an empty input.
pub fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = i64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0f64, 0usize), |(sum, count), v| (sum + v as f64, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

// == Assertion Statistics ==
/// Outcome counts for one assertion type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AssertionStatistics {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub pass_rate: f64,
}

impl AssertionStatistics {
    /// Builds the statistics, deriving `pass_rate` from the counts.
    pub fn new(total: usize, passed: usize, failed: usize, skipped: usize) -> Self {
        Self {
            total,
            passed,
            failed,
            skipped,
            pass_rate: ratio(passed, total),
        }
    }
}
