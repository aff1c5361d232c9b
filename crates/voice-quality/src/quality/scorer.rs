//! G.711 voice quality scorer
//!
//! Derives packet loss and an estimated one-way delay from the receiving
//! side's `inbound-rtp` report and the RTCP-based `remote-inbound-rtp`
//! report, then maps both through the [quality matrix](super::matrix).
//!
//! ```text
//! lossPercent = 100 * lost / (lost + received)
//! delayMs     = (jitter + rtt / 2 + totalSamplesDuration / received) * 1000
//! ```
//!
//! `totalSamplesDuration` comes from the `track` report when the browser
//! provides one, otherwise it is estimated from the elapsed test time
//! assuming evenly spaced packets.

use tracing::{debug, trace};

use crate::error::{QualityError, Result};
use crate::stats::{MediaKind, StatsRecord, StatsSnapshot, StatsType};
use super::matrix::{self, MatrixLookup};

/// Where the rendered audio duration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplesSource {
    /// Reported by the `track` record
    Track,
    /// Estimated from elapsed time and packet counters
    Estimated,
}

/// Result of scoring one statistics snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreReport {
    /// Quality score (MOS-like, higher is better)
    pub score: f64,
    /// Inbound packet loss in percent
    pub loss_percent: f64,
    /// Estimated one-way delay in milliseconds
    pub delay_ms: f64,
    /// Seconds of received audio used for the per-packet duration
    pub total_samples_duration: f64,
    pub samples_source: SamplesSource,
    /// Matrix cell used
    pub lookup: MatrixLookup,
}

/// Scores call quality for G.711 audio from WebRTC statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct G711QualityScorer;

impl G711QualityScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score the audio streams of one snapshot
    ///
    /// `elapsed_secs` is the time since the quality test started; it is only
    /// used when the rendered duration has to be estimated.
    pub fn score_snapshot(&self, snapshot: &StatsSnapshot, elapsed_secs: f64) -> Result<ScoreReport> {
        // remote-inbound-rtp is missing until the first RTCP receiver report
        let inbound = snapshot.find_by_kind(&StatsType::InboundRtp, MediaKind::Audio)?;
        let remote = snapshot.find_by_kind(&StatsType::RemoteInboundRtp, MediaKind::Audio)?;

        let track = match inbound.track_id.as_deref() {
            Some(track_id) => match snapshot.find_track_by_id(track_id) {
                Ok(track) => Some(track),
                Err(e) => {
                    trace!("No usable track stats: {}", e);
                    None
                }
            },
            None => None,
        };

        self.score(inbound, remote, track, elapsed_secs)
    }

    /// Score from already located records
    pub fn score(
        &self,
        inbound: &StatsRecord,
        remote: &StatsRecord,
        track: Option<&StatsRecord>,
        elapsed_secs: f64,
    ) -> Result<ScoreReport> {
        let packets_received = inbound
            .packets_received
            .ok_or_else(|| QualityError::missing("packetsReceived"))?;
        let packets_lost = inbound
            .packets_lost
            .ok_or_else(|| QualityError::missing("packetsLost"))?;
        let remote_packets_lost = remote
            .packets_lost
            .ok_or_else(|| QualityError::missing("packetsLost"))?;
        let jitter = remote.jitter.ok_or_else(|| QualityError::missing("jitter"))?;
        let round_trip_time = remote
            .round_trip_time
            .ok_or_else(|| QualityError::missing("roundTripTime"))?;

        let received = packets_received as f64;
        let lost = packets_lost as f64;
        let total_packets = received + lost;

        let (total_samples_duration, samples_source) =
            match track.and_then(|track| track.total_samples_duration) {
                Some(duration) => (duration, SamplesSource::Track),
                None => {
                    if total_packets <= 0.0 {
                        return Err(QualityError::missing("totalSamplesDuration"));
                    }
                    let packet_duration = elapsed_secs / total_packets;
                    (packet_duration * received, SamplesSource::Estimated)
                }
            };

        if packets_received == 0 {
            return Err(QualityError::missing("packetsReceived"));
        }
        if total_packets <= 0.0 {
            return Err(QualityError::missing("packetsLost"));
        }

        let loss_percent = 100.0 * lost / total_packets;
        let delay_ms = (jitter + round_trip_time / 2.0 + total_samples_duration / received) * 1000.0;
        if !loss_percent.is_finite() || !delay_ms.is_finite() {
            return Err(QualityError::missing("totalSamplesDuration"));
        }

        let lookup = matrix::lookup(loss_percent, delay_ms);
        debug!(
            "time: {}s inbound-rtp: packetsReceived={} packetsLost={} remote-inbound-rtp: packetsLost={} jitter={} roundTripTime={} {} totalSamplesDuration={}\n{}",
            elapsed_secs.floor(),
            packets_received,
            packets_lost,
            remote_packets_lost,
            jitter,
            round_trip_time,
            match samples_source {
                SamplesSource::Track => "track:",
                SamplesSource::Estimated => "calculated:",
            },
            total_samples_duration,
            lookup
        );

        Ok(ScoreReport {
            score: lookup.score,
            loss_percent,
            delay_ms,
            total_samples_duration,
            samples_source,
            lookup,
        })
    }
}
