//! G.711 quality score matrix
//!
//! Scores were precomputed with the ITU-T G.107 E-model for G.711 and are
//! indexed by packet loss (rows, 2 % steps from 0 to 98 %) and one-way delay
//! (columns, 20 ms steps from 0 to 500 ms). Result is a MOS-like score:
//! 3 is fair, 2 is poor, with the poor threshold at 2.7.

use std::fmt;

/// Width of one packet loss row, in percent
pub const LOSS_STEP_PERCENT: f64 = 2.0;

/// Width of one delay column, in milliseconds
pub const DELAY_STEP_MS: f64 = 20.0;

/// Number of delay columns
pub const DELAY_BUCKETS: usize = 26;

/// Number of packet loss rows
pub const LOSS_BUCKETS: usize = 50;

/// Score reported when the delay is beyond the last column
pub const OUT_OF_RANGE_SCORE: f64 = 0.0;

/// Best score the matrix can produce
pub const MAX_SCORE: f64 = QUALITY_MATRIX[0][0];

/// Quality scores indexed by `[loss / 2 %][delay / 20 ms]`
pub const QUALITY_MATRIX: [[f64; DELAY_BUCKETS]; LOSS_BUCKETS] = [
    /*  0% */ [4.2, 4.2, 4.2, 4.2, 4.2, 4.2, 4.1, 4.1, 4.1, 4.1, 4.0, 3.9, 3.8, 3.7, 3.6, 3.5, 3.4, 3.3, 3.2, 3.2, 3.1, 3.0, 2.9, 2.8, 2.8, 2.7],
    /*  2% */ [4.1, 4.1, 4.1, 4.0, 4.0, 4.0, 4.0, 4.0, 3.9, 3.9, 3.8, 3.7, 3.6, 3.5, 3.4, 3.3, 3.2, 3.1, 3.0, 2.9, 2.8, 2.7, 2.6, 2.6, 2.5, 2.4],
    /*  4% */ [3.9, 3.9, 3.9, 3.9, 3.9, 3.9, 3.8, 3.8, 3.8, 3.7, 3.7, 3.5, 3.4, 3.3, 3.2, 3.1, 2.9, 2.8, 2.7, 2.7, 2.6, 2.5, 2.4, 2.3, 2.3, 2.2],
    /*  6% */ [3.8, 3.8, 3.8, 3.7, 3.7, 3.7, 3.7, 3.7, 3.6, 3.6, 3.4, 3.3, 3.2, 3.1, 3.0, 2.8, 2.7, 2.6, 2.5, 2.4, 2.4, 2.3, 2.2, 2.1, 2.0, 2.0],
    /*  8% */ [3.7, 3.6, 3.6, 3.6, 3.6, 3.6, 3.5, 3.5, 3.4, 3.4, 3.3, 3.2, 3.0, 2.9, 2.8, 2.6, 2.5, 2.4, 2.3, 2.2, 2.2, 2.1, 2.0, 1.9, 1.9, 1.8],
    /* 10% */ [3.5, 3.5, 3.4, 3.4, 3.4, 3.4, 3.4, 3.3, 3.3, 3.3, 3.1, 3.0, 2.9, 2.7, 2.6, 2.5, 2.4, 2.3, 2.2, 2.1, 2.0, 1.9, 1.8, 1.8, 1.7, 1.7],
    /* 12% */ [3.3, 3.3, 3.3, 3.3, 3.3, 3.3, 3.3, 3.2, 3.2, 3.1, 3.0, 2.8, 2.7, 2.6, 2.4, 2.3, 2.2, 2.1, 2.0, 1.9, 1.8, 1.8, 1.7, 1.6, 1.6, 1.5],
    /* 14% */ [3.2, 3.2, 3.2, 3.2, 3.1, 3.1, 3.1, 3.1, 3.0, 2.9, 2.8, 2.7, 2.6, 2.4, 2.3, 2.2, 2.0, 2.0, 1.9, 1.8, 1.7, 1.6, 1.6, 1.5, 1.5, 1.4],
    /* 16% */ [3.1, 3.1, 3.1, 3.0, 3.0, 3.0, 3.0, 3.0, 2.9, 2.8, 2.7, 2.6, 2.4, 2.3, 2.2, 2.0, 1.9, 1.8, 1.8, 1.7, 1.6, 1.5, 1.5, 1.4, 1.4, 1.3],
    /* 18% */ [3.0, 2.9, 2.9, 2.9, 2.9, 2.9, 2.8, 2.8, 2.8, 2.7, 2.6, 2.4, 2.3, 2.2, 2.0, 1.9, 1.8, 1.7, 1.6, 1.6, 1.5, 1.4, 1.4, 1.3, 1.3, 1.2],
    /* 20% */ [2.8, 2.8, 2.8, 2.8, 2.8, 2.8, 2.7, 2.7, 2.6, 2.6, 2.4, 2.3, 2.2, 2.1, 1.9, 1.8, 1.7, 1.6, 1.5, 1.5, 1.4, 1.4, 1.3, 1.3, 1.2, 1.2],
    /* 22% */ [2.7, 2.7, 2.7, 2.7, 2.7, 2.6, 2.6, 2.6, 2.5, 2.5, 2.3, 2.2, 2.1, 2.0, 1.8, 1.7, 1.6, 1.5, 1.5, 1.4, 1.3, 1.3, 1.2, 1.2, 1.2, 1.1],
    /* 24% */ [2.6, 2.6, 2.6, 2.6, 2.6, 2.5, 2.5, 2.5, 2.4, 2.4, 2.2, 2.1, 2.0, 1.9, 1.8, 1.6, 1.5, 1.5, 1.4, 1.3, 1.3, 1.2, 1.2, 1.2, 1.1, 1.1],
    /* 26% */ [2.5, 2.5, 2.5, 2.5, 2.5, 2.5, 2.4, 2.4, 2.3, 2.3, 2.1, 2.0, 1.9, 1.8, 1.7, 1.5, 1.5, 1.4, 1.3, 1.3, 1.2, 1.2, 1.1, 1.1, 1.1, 1.1],
    /* 28% */ [2.5, 2.4, 2.4, 2.4, 2.4, 2.4, 2.3, 2.3, 2.3, 2.2, 2.1, 1.9, 1.8, 1.7, 1.6, 1.5, 1.4, 1.3, 1.3, 1.2, 1.2, 1.1, 1.1, 1.1, 1.1, 1.0],
    /* 30% */ [2.4, 2.4, 2.3, 2.3, 2.3, 2.3, 2.3, 2.2, 2.2, 2.1, 2.0, 1.8, 1.8, 1.6, 1.5, 1.4, 1.4, 1.3, 1.2, 1.2, 1.1, 1.1, 1.1, 1.1, 1.0, 1.0],
    /* 32% */ [2.3, 2.3, 2.3, 2.2, 2.2, 2.2, 2.2, 2.2, 2.1, 2.0, 1.9, 1.8, 1.7, 1.6, 1.5, 1.4, 1.3, 1.2, 1.2, 1.1, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0],
    /* 34% */ [2.2, 2.2, 2.2, 2.2, 2.1, 2.1, 2.1, 2.1, 2.0, 2.0, 1.8, 1.8, 1.6, 1.5, 1.4, 1.3, 1.3, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 36% */ [2.2, 2.1, 2.1, 2.1, 2.1, 2.1, 2.0, 2.0, 2.0, 1.9, 1.8, 1.7, 1.6, 1.5, 1.4, 1.3, 1.2, 1.2, 1.1, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 38% */ [2.1, 2.1, 2.1, 2.0, 2.0, 2.0, 2.0, 2.0, 1.9, 1.8, 1.8, 1.6, 1.5, 1.4, 1.3, 1.2, 1.2, 1.1, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 40% */ [2.0, 2.0, 2.0, 2.0, 2.0, 1.9, 1.9, 1.9, 1.8, 1.8, 1.7, 1.6, 1.5, 1.4, 1.3, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 42% */ [2.0, 2.0, 1.9, 1.9, 1.9, 1.9, 1.9, 1.8, 1.8, 1.8, 1.6, 1.5, 1.4, 1.3, 1.3, 1.2, 1.1, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 44% */ [1.9, 1.9, 1.9, 1.9, 1.8, 1.8, 1.8, 1.8, 1.8, 1.7, 1.6, 1.5, 1.4, 1.3, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 46% */ [1.9, 1.9, 1.8, 1.8, 1.8, 1.8, 1.8, 1.8, 1.7, 1.7, 1.5, 1.4, 1.4, 1.3, 1.2, 1.1, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 48% */ [1.8, 1.8, 1.8, 1.8, 1.8, 1.8, 1.8, 1.7, 1.7, 1.6, 1.5, 1.4, 1.3, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 50% */ [1.8, 1.8, 1.8, 1.8, 1.7, 1.7, 1.7, 1.7, 1.6, 1.6, 1.5, 1.4, 1.3, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 52% */ [1.8, 1.8, 1.7, 1.7, 1.7, 1.7, 1.7, 1.6, 1.6, 1.5, 1.4, 1.4, 1.3, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 54% */ [1.7, 1.7, 1.7, 1.7, 1.7, 1.6, 1.6, 1.6, 1.5, 1.5, 1.4, 1.3, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 56% */ [1.7, 1.7, 1.7, 1.6, 1.6, 1.6, 1.6, 1.6, 1.5, 1.5, 1.4, 1.3, 1.2, 1.2, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 58% */ [1.7, 1.6, 1.6, 1.6, 1.6, 1.6, 1.5, 1.5, 1.5, 1.4, 1.4, 1.3, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 60% */ [1.6, 1.6, 1.6, 1.6, 1.5, 1.5, 1.5, 1.5, 1.5, 1.4, 1.3, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 62% */ [1.6, 1.6, 1.6, 1.5, 1.5, 1.5, 1.5, 1.5, 1.4, 1.4, 1.3, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 64% */ [1.6, 1.5, 1.5, 1.5, 1.5, 1.5, 1.5, 1.5, 1.4, 1.4, 1.3, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 66% */ [1.5, 1.5, 1.5, 1.5, 1.5, 1.5, 1.5, 1.4, 1.4, 1.3, 1.3, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 68% */ [1.5, 1.5, 1.5, 1.5, 1.5, 1.4, 1.4, 1.4, 1.4, 1.3, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 70% */ [1.5, 1.5, 1.5, 1.4, 1.4, 1.4, 1.4, 1.4, 1.4, 1.3, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 72% */ [1.5, 1.5, 1.4, 1.4, 1.4, 1.4, 1.4, 1.4, 1.3, 1.3, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 74% */ [1.4, 1.4, 1.4, 1.4, 1.4, 1.4, 1.4, 1.4, 1.3, 1.3, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 76% */ [1.4, 1.4, 1.4, 1.4, 1.4, 1.4, 1.4, 1.3, 1.3, 1.3, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 78% */ [1.4, 1.4, 1.4, 1.4, 1.4, 1.4, 1.3, 1.3, 1.3, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 80% */ [1.4, 1.4, 1.4, 1.4, 1.3, 1.3, 1.3, 1.3, 1.3, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 82% */ [1.4, 1.4, 1.4, 1.3, 1.3, 1.3, 1.3, 1.3, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 84% */ [1.4, 1.4, 1.3, 1.3, 1.3, 1.3, 1.3, 1.3, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 86% */ [1.3, 1.3, 1.3, 1.3, 1.3, 1.3, 1.3, 1.3, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 88% */ [1.3, 1.3, 1.3, 1.3, 1.3, 1.3, 1.3, 1.2, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 90% */ [1.3, 1.3, 1.3, 1.3, 1.3, 1.3, 1.2, 1.2, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 92% */ [1.3, 1.3, 1.3, 1.3, 1.3, 1.2, 1.2, 1.2, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 94% */ [1.3, 1.3, 1.3, 1.3, 1.2, 1.2, 1.2, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 96% */ [1.3, 1.3, 1.3, 1.2, 1.2, 1.2, 1.2, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    /* 98% */ [1.3, 1.3, 1.2, 1.2, 1.2, 1.2, 1.2, 1.2, 1.2, 1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
];

/// Result of one matrix lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixLookup {
    /// Packet loss in percent used for the lookup
    pub loss_percent: f64,
    /// One-way delay in milliseconds used for the lookup
    pub delay_ms: f64,
    /// Row used (already clamped to the last row)
    pub loss_index: usize,
    /// Column the delay falls in; may be past the last column
    pub delay_index: usize,
    /// Resulting score
    pub score: f64,
    /// Delay was beyond the matrix and `score` is [`OUT_OF_RANGE_SCORE`]
    pub out_of_range: bool,
}

/// Look up the quality score for a loss percentage and one-way delay
///
/// Loss of 98 % or more uses the last row. A delay past the last column
/// yields [`OUT_OF_RANGE_SCORE`] with `out_of_range` set; this is a regular
/// (very low) score, not an error. Negative inputs count as zero.
pub fn lookup(loss_percent: f64, delay_ms: f64) -> MatrixLookup {
    let loss_index = ((loss_percent.max(0.0) / LOSS_STEP_PERCENT).floor() as usize)
        .min(LOSS_BUCKETS - 1);
    let delay_index = (delay_ms.max(0.0) / DELAY_STEP_MS).floor() as usize;

    let (score, out_of_range) = match QUALITY_MATRIX[loss_index].get(delay_index) {
        Some(&score) => (score, false),
        None => (OUT_OF_RANGE_SCORE, true),
    };

    MatrixLookup {
        loss_percent,
        delay_ms,
        loss_index,
        delay_index,
        score,
        out_of_range,
    }
}

impl fmt::Display for MatrixLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.out_of_range {
            write!(
                f,
                "delay {} is too big (out of matrix range 0..500ms), set score={}",
                self.delay_ms, self.score
            )
        } else {
            write!(
                f,
                "qualityScore(loss={:.1}%, delay={:.1}ms) => scoreMatrix[{},{}] = {}",
                self.loss_percent, self.delay_ms, self.loss_index, self.delay_index, self.score
            )
        }
    }
}
