//! Statistics records as reported by `RTCPeerConnection.getStats()`
//!
//! Field names follow the W3C `webrtc-stats` dictionaries (camelCase, with a
//! kebab-case `type` discriminator). Every numeric member is optional: browsers
//! omit members they have not measured yet, and the scorer reports those as
//! missing fields instead of failing the whole report.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Type of a statistics record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatsType {
    /// Stream received by this peer connection
    InboundRtp,
    /// Remote endpoint's view of our outbound stream (from RTCP RR)
    RemoteInboundRtp,
    /// Stream sent by this peer connection
    OutboundRtp,
    /// Media track attachment (legacy, carries `totalSamplesDuration`)
    Track,
    /// Codec in use by one or more RTP streams
    Codec,
    /// Any other report type, kept as reported
    Other(String),
}

impl StatsType {
    /// Report types the quality test asks for
    pub const SCORING: [StatsType; 5] = [
        StatsType::InboundRtp,
        StatsType::RemoteInboundRtp,
        StatsType::OutboundRtp,
        StatsType::Track,
        StatsType::Codec,
    ];

    /// The `type` string used in `getStats()` reports
    pub fn as_str(&self) -> &str {
        match self {
            StatsType::InboundRtp => "inbound-rtp",
            StatsType::RemoteInboundRtp => "remote-inbound-rtp",
            StatsType::OutboundRtp => "outbound-rtp",
            StatsType::Track => "track",
            StatsType::Codec => "codec",
            StatsType::Other(name) => name,
        }
    }
}

impl From<String> for StatsType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "inbound-rtp" => StatsType::InboundRtp,
            "remote-inbound-rtp" => StatsType::RemoteInboundRtp,
            "outbound-rtp" => StatsType::OutboundRtp,
            "track" => StatsType::Track,
            "codec" => StatsType::Codec,
            _ => StatsType::Other(value),
        }
    }
}

impl From<&str> for StatsType {
    fn from(value: &str) -> Self {
        StatsType::from(value.to_string())
    }
}

impl From<StatsType> for String {
    fn from(value: StatsType) -> Self {
        match value {
            StatsType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for StatsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media kind of an RTP stream or track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "audio" => Ok(MediaKind::Audio),
            "video" => Ok(MediaKind::Video),
            other => Err(format!("unknown media kind: {}", other)),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One measurement reported by the transport layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRecord {
    /// Unique id of the monitored object
    #[serde(default)]
    pub id: String,

    /// Report type
    #[serde(rename = "type")]
    pub stats_type: StatsType,

    /// Reporting time in milliseconds since the UNIX epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,

    /// Media kind (`audio` / `video`) of rtp and track records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Legacy spelling of `kind` still reported by some browsers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    /// inbound-rtp: total packets received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packets_received: Option<u64>,

    /// inbound-rtp / remote-inbound-rtp: total packets lost
    ///
    /// Signed because RTCP cumulative loss may go negative with duplicates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packets_lost: Option<i64>,

    /// remote-inbound-rtp: interarrival jitter in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<f64>,

    /// remote-inbound-rtp: round-trip time in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_trip_time: Option<f64>,

    /// inbound-rtp: id of the associated track record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<String>,

    /// rtp records: id of the associated codec record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec_id: Option<String>,

    /// track: seconds of audio actually rendered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_samples_duration: Option<f64>,

    /// codec: mime type such as `audio/PCMU`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Members this crate does not interpret, kept for diagnostic dumps
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatsRecord {
    /// Create an empty record of the given type
    pub fn new(id: impl Into<String>, stats_type: impl Into<StatsType>) -> Self {
        Self {
            id: id.into(),
            stats_type: stats_type.into(),
            timestamp: None,
            kind: None,
            media_type: None,
            packets_received: None,
            packets_lost: None,
            jitter: None,
            round_trip_time: None,
            track_id: None,
            codec_id: None,
            total_samples_duration: None,
            mime_type: None,
            extra: Map::new(),
        }
    }

    /// Media kind of the record, read from `kind` then `mediaType`
    pub fn media_kind(&self) -> Option<MediaKind> {
        self.kind
            .as_deref()
            .or(self.media_type.as_deref())
            .and_then(|kind| kind.parse().ok())
    }

    pub fn with_kind(mut self, kind: MediaKind) -> Self {
        self.kind = Some(kind.as_str().to_string());
        self
    }

    pub fn with_packets(mut self, received: Option<u64>, lost: Option<i64>) -> Self {
        self.packets_received = received;
        self.packets_lost = lost;
        self
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(jitter);
        self
    }

    pub fn with_round_trip_time(mut self, rtt: f64) -> Self {
        self.round_trip_time = Some(rtt);
        self
    }

    pub fn with_track_id(mut self, track_id: impl Into<String>) -> Self {
        self.track_id = Some(track_id.into());
        self
    }

    pub fn with_codec_id(mut self, codec_id: impl Into<String>) -> Self {
        self.codec_id = Some(codec_id.into());
        self
    }

    pub fn with_total_samples_duration(mut self, seconds: f64) -> Self {
        self.total_samples_duration = Some(seconds);
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}
