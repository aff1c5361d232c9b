//! Classification of quality scores into user-facing tiers

use std::fmt;

/// Quality tier, ordered from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QualityTier {
    Poor,
    Fair,
    Good,
    Excellent,
}

/// One score interval: every score below `upper_bound` and not below the
/// previous interval's bound
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInterval {
    /// Exclusive upper bound of the interval
    pub upper_bound: f64,
    /// Color tag used by the UI
    pub color: &'static str,
    /// Label shown to the user
    pub label: &'static str,
    pub tier: QualityTier,
}

/// Score intervals with strictly increasing upper bounds
pub static SCORE_INTERVALS: [ScoreInterval; 4] = [
    ScoreInterval { upper_bound: 2.7, color: "Red", label: "Poor", tier: QualityTier::Poor },
    ScoreInterval { upper_bound: 3.2, color: "Orange", label: "Fair", tier: QualityTier::Fair },
    ScoreInterval { upper_bound: 3.7, color: "Lightgreen", label: "Good", tier: QualityTier::Good },
    ScoreInterval { upper_bound: 5.0, color: "DarkGreen", label: "Excellent", tier: QualityTier::Excellent },
];

/// Find the interval a score belongs to
///
/// Bounds are exclusive, so a score equal to a bound belongs to the interval
/// above it. Returns `None` for scores at or above the last bound.
pub fn classify(score: f64) -> Option<&'static ScoreInterval> {
    SCORE_INTERVALS
        .iter()
        .find(|interval| score < interval.upper_bound)
}

/// Outcome of a quality test as shown to the user
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QualityVerdict {
    /// A score was obtained and classified
    Passed {
        score: f64,
        interval: &'static ScoreInterval,
    },
    /// A score was obtained but no interval covers it
    Unclassified { score: f64 },
    /// No usable score was obtained
    Failed,
}

impl QualityVerdict {
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            None => QualityVerdict::Failed,
            Some(score) => match classify(score) {
                Some(interval) => QualityVerdict::Passed { score, interval },
                None => QualityVerdict::Unclassified { score },
            },
        }
    }

    /// Whether the test produced a score at all
    pub fn passed(&self) -> bool {
        !matches!(self, QualityVerdict::Failed)
    }

    /// Color tag for rendering
    pub fn color(&self) -> &'static str {
        match self {
            QualityVerdict::Passed { interval, .. } => interval.color,
            _ => "red",
        }
    }

    /// Text for rendering
    pub fn text(&self) -> &'static str {
        match self {
            QualityVerdict::Passed { interval, .. } => interval.label,
            QualityVerdict::Unclassified { .. } => "Cannot calculate score interval",
            QualityVerdict::Failed => "Failed",
        }
    }
}

impl fmt::Display for QualityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Test call quality: {}", self.text())
    }
}
