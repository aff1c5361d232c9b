//! Grouping of one statistics poll by report type, and record lookups

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::{QualityError, Result};
use super::record::{MediaKind, StatsRecord, StatsType};

/// Direction of an RTP stream, relative to this endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    /// Report type describing streams in this direction
    pub fn stats_type(&self) -> StatsType {
        match self {
            Direction::Inbound => StatsType::InboundRtp,
            Direction::Outbound => StatsType::OutboundRtp,
        }
    }
}

/// Statistics of one poll, grouped by report type
///
/// Built fresh for every poll and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSnapshot {
    groups: BTreeMap<StatsType, Vec<StatsRecord>>,
}

/// Group a flat list of records by type
///
/// When `allowed_types` is given, records of any other type are dropped.
/// Records are copied, so the caller's list is left untouched.
pub fn group_by_type<'a, I>(records: I, allowed_types: Option<&[StatsType]>) -> StatsSnapshot
where
    I: IntoIterator<Item = &'a StatsRecord>,
{
    let mut groups: BTreeMap<StatsType, Vec<StatsRecord>> = BTreeMap::new();
    for record in records {
        if let Some(allowed) = allowed_types {
            if !allowed.contains(&record.stats_type) {
                continue;
            }
        }
        groups
            .entry(record.stats_type.clone())
            .or_default()
            .push(record.clone());
    }
    StatsSnapshot { groups }
}

impl StatsSnapshot {
    /// Group records, see [`group_by_type`]
    pub fn from_records(records: &[StatsRecord], allowed_types: Option<&[StatsType]>) -> Self {
        group_by_type(records, allowed_types)
    }

    /// Records of one type, if the type was reported at all
    pub fn records(&self, stats_type: &StatsType) -> Option<&[StatsRecord]> {
        self.groups.get(stats_type).map(Vec::as_slice)
    }

    /// Report types present in this snapshot
    pub fn types(&self) -> impl Iterator<Item = &StatsType> {
        self.groups.keys()
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn require(&self, stats_type: &StatsType) -> Result<&[StatsRecord]> {
        self.records(stats_type)
            .ok_or_else(|| QualityError::NotFound(format!("No \"{}\" stats", stats_type)))
    }

    /// First record of `stats_type` whose media kind is `kind`
    pub fn find_by_kind(&self, stats_type: &StatsType, kind: MediaKind) -> Result<&StatsRecord> {
        self.require(stats_type)?
            .iter()
            .find(|record| record.media_kind() == Some(kind))
            .ok_or_else(|| {
                QualityError::NotFound(format!("No \"{}\" with kind=={}", stats_type, kind))
            })
    }

    /// Track record with the given id
    ///
    /// A missing `track` report is a not-found error; an unknown id is a
    /// generic error. Codec lookups classify both as not-found.
    pub fn find_track_by_id(&self, track_id: &str) -> Result<&StatsRecord> {
        self.require(&StatsType::Track)?
            .iter()
            .find(|track| track.id == track_id)
            .ok_or_else(|| QualityError::Other(format!("No track with id={}", track_id)))
    }

    /// Codec record with the given id
    pub fn find_codec_by_id(&self, codec_id: &str) -> Result<&StatsRecord> {
        self.require(&StatsType::Codec)?
            .iter()
            .find(|codec| codec.id == codec_id)
            .ok_or_else(|| {
                QualityError::NotFound(format!("No \"codec\" stats with id==\"{}\"", codec_id))
            })
    }

    /// Codec used by the first rtp stream of the given direction and kind
    ///
    /// Returns `Ok(None)` when no stream of that kind exists.
    pub fn find_codec(&self, direction: Direction, kind: MediaKind) -> Result<Option<&StatsRecord>> {
        let stats_type = direction.stats_type();
        let rtp = match self
            .require(&stats_type)?
            .iter()
            .find(|rtp| rtp.media_kind() == Some(kind))
        {
            Some(rtp) => rtp,
            None => return Ok(None),
        };
        let codec_id = rtp.codec_id.as_deref().unwrap_or_default();
        self.find_codec_by_id(codec_id).map(Some)
    }

    /// Audio codec names in use, e.g. `PCMU` or `out=PCMU in=PCMA`
    ///
    /// Detection needs `codec` reports, which some browsers never send; any
    /// failure is logged and yields `None`.
    pub fn audio_codec_string(&self) -> Option<String> {
        match self.audio_codecs() {
            Ok((outbound, inbound)) if outbound == inbound => Some(outbound),
            Ok((outbound, inbound)) => Some(format!("out={} in={}", outbound, inbound)),
            Err(e) => {
                warn!("Exception during codecs detection: {}", e);
                None
            }
        }
    }

    fn audio_codecs(&self) -> Result<(String, String)> {
        let outbound = self
            .find_codec(Direction::Outbound, MediaKind::Audio)?
            .ok_or_else(|| QualityError::NotFound("Stats: no outbound-rtp for audio".into()))?;
        let inbound = self
            .find_codec(Direction::Inbound, MediaKind::Audio)?
            .ok_or_else(|| QualityError::NotFound("Stats: no inbound-rtp for audio".into()))?;
        Ok((codec_name(outbound)?, codec_name(inbound)?))
    }
}

fn codec_name(codec: &StatsRecord) -> Result<String> {
    let mime = codec
        .mime_type
        .as_deref()
        .ok_or_else(|| QualityError::missing("mimeType"))?
        .to_uppercase();
    Ok(match mime.strip_prefix("AUDIO/") {
        Some(name) => name.to_string(),
        None => mime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<StatsRecord> {
        vec![
            StatsRecord::new("IV1", StatsType::InboundRtp)
                .with_kind(MediaKind::Video)
                .with_codec_id("C-VP8"),
            StatsRecord::new("IA1", StatsType::InboundRtp)
                .with_kind(MediaKind::Audio)
                .with_packets(Some(98), Some(2))
                .with_track_id("T1")
                .with_codec_id("C-PCMA"),
            StatsRecord::new("OA1", StatsType::OutboundRtp)
                .with_kind(MediaKind::Audio)
                .with_codec_id("C-PCMU"),
            StatsRecord::new("T1", StatsType::Track).with_total_samples_duration(1.9),
            StatsRecord::new("C-PCMU", StatsType::Codec).with_mime_type("audio/PCMU"),
            StatsRecord::new("C-PCMA", StatsType::Codec).with_mime_type("audio/PCMA"),
            StatsRecord::new("CP1", "candidate-pair"),
        ]
    }

    #[test]
    fn test_group_by_type_filters() {
        let records = sample_records();
        let all = StatsSnapshot::from_records(&records, None);
        assert_eq!(all.len(), records.len());
        assert!(all.records(&StatsType::Other("candidate-pair".into())).is_some());

        let scoring = StatsSnapshot::from_records(&records, Some(&StatsType::SCORING));
        assert_eq!(scoring.len(), records.len() - 1);
        assert_eq!(scoring.records(&StatsType::InboundRtp).unwrap().len(), 2);
        assert!(scoring.records(&StatsType::Other("candidate-pair".into())).is_none());
    }

    #[test]
    fn test_grouping_copies_records() {
        let mut records = sample_records();
        let snapshot = StatsSnapshot::from_records(&records, None);
        records[1].packets_received = Some(0);

        let inbound = snapshot
            .find_by_kind(&StatsType::InboundRtp, MediaKind::Audio)
            .unwrap();
        assert_eq!(inbound.packets_received, Some(98));
    }

    #[test]
    fn test_find_by_kind() {
        let snapshot = StatsSnapshot::from_records(&sample_records(), None);
        let audio = snapshot
            .find_by_kind(&StatsType::InboundRtp, MediaKind::Audio)
            .unwrap();
        assert_eq!(audio.id, "IA1");

        let err = snapshot
            .find_by_kind(&StatsType::OutboundRtp, MediaKind::Video)
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "No \"outbound-rtp\" with kind==video");

        let err = snapshot
            .find_by_kind(&StatsType::RemoteInboundRtp, MediaKind::Audio)
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "No \"remote-inbound-rtp\" stats");
    }

    #[test]
    fn test_track_and_codec_lookup_errors_differ() {
        let snapshot = StatsSnapshot::from_records(&sample_records(), None);
        assert!(snapshot.find_track_by_id("T1").is_ok());

        // unknown track id is a generic error, unknown codec id is not-found
        let track_err = snapshot.find_track_by_id("T9").unwrap_err();
        assert!(!track_err.is_not_found());
        assert_eq!(track_err.to_string(), "No track with id=T9");

        let codec_err = snapshot.find_codec_by_id("C9").unwrap_err();
        assert!(codec_err.is_not_found());
        assert_eq!(codec_err.to_string(), "No \"codec\" stats with id==\"C9\"");

        let empty = StatsSnapshot::default();
        let err = empty.find_track_by_id("T1").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "No \"track\" stats");
        assert_eq!(
            empty.find_codec_by_id("C1").unwrap_err().to_string(),
            "No \"codec\" stats"
        );
    }

    #[test]
    fn test_find_codec() {
        let snapshot = StatsSnapshot::from_records(&sample_records(), None);
        let codec = snapshot
            .find_codec(Direction::Outbound, MediaKind::Audio)
            .unwrap()
            .unwrap();
        assert_eq!(codec.mime_type.as_deref(), Some("audio/PCMU"));

        assert!(snapshot
            .find_codec(Direction::Outbound, MediaKind::Video)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_audio_codec_string() {
        let records = sample_records();
        let snapshot = StatsSnapshot::from_records(&records, None);
        assert_eq!(
            snapshot.audio_codec_string().as_deref(),
            Some("out=PCMU in=PCMA")
        );

        let same: Vec<_> = records
            .into_iter()
            .map(|mut r| {
                if r.id == "C-PCMA" {
                    r.mime_type = Some("audio/pcmu".into());
                }
                r
            })
            .collect();
        let snapshot = StatsSnapshot::from_records(&same, None);
        assert_eq!(snapshot.audio_codec_string().as_deref(), Some("PCMU"));

        let no_codecs = StatsSnapshot::from_records(
            &sample_records()[..4],
            None,
        );
        assert_eq!(no_codecs.audio_codec_string(), None);
    }
}
