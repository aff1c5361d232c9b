//! WebRTC statistics extraction
//!
//! This module turns the flat record list returned by one
//! `RTCPeerConnection.getStats()` call into a [`StatsSnapshot`] grouped by
//! report type, and locates the records the quality scorer needs.

pub mod record;
pub mod snapshot;

pub use record::{MediaKind, StatsRecord, StatsType};
pub use snapshot::{group_by_type, Direction, StatsSnapshot};
