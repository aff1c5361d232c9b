//! Voice quality scoring
//!
//! This module provides the G.711 quality matrix, the scorer that feeds it
//! from WebRTC statistics, and the classification of scores into tiers.

// Quality score matrix (E-model derived, G.711)
pub mod matrix;
pub use matrix::{lookup, MatrixLookup, QUALITY_MATRIX};

// Score calculation from statistics
pub mod scorer;
pub use scorer::{G711QualityScorer, SamplesSource, ScoreReport};

// Score tiers
pub mod interval;
pub use interval::{classify, QualityTier, QualityVerdict, ScoreInterval, SCORE_INTERVALS};
