//! # Voice quality engine for click-to-call test calls
//!
//! `c2c-voice-quality` estimates the voice quality of a G.711 test call from
//! the WebRTC statistics the browser reports during the call.
//!
//! This crate provides:
//!
//! - Typed `getStats()` records and per-poll grouping by report type
//! - The G.711 quality matrix (packet loss x one-way delay) and score tiers
//! - A timer-driven sampler that polls statistics during the test call and
//!   stops early once a score is available after the minimum duration
//! - Parsing of the SBC-computed `X-VoiceQuality` header
//!
//! ## Quick Start
//!
//! ```rust
//! use c2c_voice_quality::prelude::*;
//!
//! let records = vec![
//!     StatsRecord::new("IA1", StatsType::InboundRtp)
//!         .with_kind(MediaKind::Audio)
//!         .with_packets(Some(98), Some(2))
//!         .with_track_id("T1"),
//!     StatsRecord::new("RIA1", StatsType::RemoteInboundRtp)
//!         .with_kind(MediaKind::Audio)
//!         .with_packets(None, Some(2))
//!         .with_jitter(0.01)
//!         .with_round_trip_time(0.06),
//!     StatsRecord::new("T1", StatsType::Track).with_total_samples_duration(1.9),
//! ];
//!
//! let snapshot = StatsSnapshot::from_records(&records, Some(&StatsType::SCORING));
//! let report = G711QualityScorer::new().score_snapshot(&snapshot, 2.0).unwrap();
//! assert_eq!(report.score, 4.1);
//!
//! let verdict = QualityVerdict::from_score(Some(report.score));
//! assert_eq!(verdict.to_string(), "Test call quality: Excellent");
//! ```

// Error handling
pub mod error;

// getStats() records and snapshots
pub mod stats;

// Scoring
pub mod quality;

// Test call polling
pub mod sampler;

// SBC-side scoring
pub mod sbc;

pub mod config;
pub mod logging;

pub use error::{QualityError, Result};
pub use config::{browser_test_supported, QualityTestConfig, ScoreSource};
pub use quality::{G711QualityScorer, QualityVerdict, ScoreReport};
pub use sampler::{run_quality_test, QualityTestOutcome, QualityTestSampler};

/// Everything needed to score statistics and run a quality test
pub mod prelude {
    pub use crate::config::{browser_test_supported, QualityTestConfig, ScoreSource};
    pub use crate::error::{QualityError, Result};
    pub use crate::quality::{
        classify, lookup, G711QualityScorer, MatrixLookup, QualityTier, QualityVerdict,
        SamplesSource, ScoreInterval, ScoreReport,
    };
    pub use crate::sampler::{
        run_quality_test, ActiveCallHandle, CallActivity, ElapsedClock, QualityTestOutcome,
        QualityTestSampler, StatisticsSource, StopReason, TokioClock,
    };
    pub use crate::sbc::{sbc_verdict, SbcVerdict, XVoiceQuality};
    pub use crate::stats::{Direction, MediaKind, StatsRecord, StatsSnapshot, StatsType};
}
