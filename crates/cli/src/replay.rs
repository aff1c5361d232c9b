//! Recorded statistics polls fed back through the quality test sampler
//!
//! A recording is JSON Lines: one `getStats()` result per line, either as an
//! array of records or as an object keyed by record id (what
//! `Object.fromEntries(report)` produces in a browser). A line of the form
//! `{"error": "..."}` stands for a rejected `getStats()` call.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use c2c_voice_quality::prelude::*;
use serde_json::Value;
use tokio::time::Instant;

/// Parse one `getStats()` dump
pub fn parse_stats(value: Value) -> Result<Vec<StatsRecord>> {
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(map) => map
            .into_iter()
            .map(|(id, record)| -> Result<StatsRecord> {
                let mut record: StatsRecord = serde_json::from_value(record)?;
                if record.id.is_empty() {
                    record.id = id;
                }
                Ok(record)
            })
            .collect(),
        other => Err(QualityError::Source(format!(
            "expected an array or object of stats, got {}",
            other
        ))),
    }
}

/// Parse one recorded poll, keeping recorded failures as errors
fn parse_poll(value: Value) -> Result<Vec<StatsRecord>> {
    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Err(QualityError::Source(message.to_string()));
    }
    parse_stats(value)
}

/// Statistics source answering polls from a recording, in order
pub struct ReplaySource {
    polls: Mutex<VecDeque<Result<Vec<StatsRecord>>>>,
    recorded: usize,
}

impl ReplaySource {
    pub fn from_jsonl(content: &str) -> anyhow::Result<Self> {
        let mut polls = VecDeque::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line)
                .with_context(|| format!("line {}: invalid JSON", index + 1))?;
            polls.push_back(parse_poll(value));
        }
        if polls.is_empty() {
            bail!("recording contains no polls");
        }
        let recorded = polls.len();
        Ok(Self {
            polls: Mutex::new(polls),
            recorded,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_jsonl(&content)
    }

    /// Number of polls in the recording
    pub fn recorded(&self) -> usize {
        self.recorded
    }
}

#[async_trait]
impl StatisticsSource for ReplaySource {
    async fn poll(&self) -> Result<Vec<StatsRecord>> {
        let mut polls = self
            .polls
            .lock()
            .map_err(|_| QualityError::Source("replay state poisoned".into()))?;
        polls.pop_front().unwrap_or_else(|| {
            Err(QualityError::Source(format!(
                "recording exhausted after {} polls",
                self.recorded
            )))
        })
    }
}

/// Clock that runs faster than real time
///
/// Replays pace polls at `pace` while the sampler must see the recorded
/// `step` between them.
#[derive(Debug, Clone, Copy)]
pub struct ScaledClock {
    start: Instant,
    factor: f64,
}

impl ScaledClock {
    pub fn start(step: Duration, pace: Duration) -> Self {
        Self {
            start: Instant::now(),
            factor: step.as_secs_f64() / pace.as_secs_f64(),
        }
    }
}

impl ElapsedClock for ScaledClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed().mul_f64(self.factor)
    }
}
