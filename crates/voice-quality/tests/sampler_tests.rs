//! Quality test sampler against scripted statistics sources
//!
//! All tests run on paused tokio time, so a 20 second test call takes no
//! wall-clock time and tick instants are exact.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use c2c_voice_quality::prelude::*;
use tokio::time;

/// Statistics source answering the n-th poll (1-based) from a script
struct ScriptedSource<F> {
    script: F,
    polls: AtomicU32,
}

impl<F> ScriptedSource<F>
where
    F: Fn(u32) -> Result<Vec<StatsRecord>> + Send + Sync,
{
    fn new(script: F) -> Arc<Self> {
        Arc::new(Self {
            script,
            polls: AtomicU32::new(0),
        })
    }

    fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<F> StatisticsSource for ScriptedSource<F>
where
    F: Fn(u32) -> Result<Vec<StatsRecord>> + Send + Sync,
{
    async fn poll(&self) -> Result<Vec<StatsRecord>> {
        let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        (self.script)(n)
    }
}

/// 2 % loss, ~59 ms delay: score 4.1
fn good_stats() -> Vec<StatsRecord> {
    vec![
        StatsRecord::new("IA1", StatsType::InboundRtp)
            .with_kind(MediaKind::Audio)
            .with_packets(Some(98), Some(2))
            .with_track_id("T1")
            .with_codec_id("C0"),
        StatsRecord::new("RIA1", StatsType::RemoteInboundRtp)
            .with_kind(MediaKind::Audio)
            .with_packets(None, Some(2))
            .with_jitter(0.01)
            .with_round_trip_time(0.06),
        StatsRecord::new("OA1", StatsType::OutboundRtp)
            .with_kind(MediaKind::Audio)
            .with_codec_id("C0"),
        StatsRecord::new("T1", StatsType::Track).with_total_samples_duration(1.9),
        StatsRecord::new("C0", StatsType::Codec).with_mime_type("audio/PCMU"),
        StatsRecord::new("CP1", "candidate-pair"),
    ]
}

/// Reports present but nothing received yet
fn silent_stats() -> Vec<StatsRecord> {
    vec![
        StatsRecord::new("IA1", StatsType::InboundRtp)
            .with_kind(MediaKind::Audio)
            .with_packets(Some(0), Some(0)),
        StatsRecord::new("RIA1", StatsType::RemoteInboundRtp)
            .with_kind(MediaKind::Audio)
            .with_packets(None, Some(0))
            .with_jitter(0.0)
            .with_round_trip_time(0.0),
    ]
}

/// No RTCP receiver report yet
fn no_remote_stats() -> Vec<StatsRecord> {
    good_stats()
        .into_iter()
        .filter(|record| record.stats_type != StatsType::RemoteInboundRtp)
        .collect()
}

fn sampler<F>(source: &Arc<ScriptedSource<F>>, call: &CallActivity) -> QualityTestSampler
where
    F: Fn(u32) -> Result<Vec<StatsRecord>> + Send + Sync + 'static,
{
    let source: Arc<dyn StatisticsSource> = source.clone();
    let call: Arc<dyn ActiveCallHandle> = Arc::new(call.clone());
    QualityTestSampler::new(source, call, QualityTestConfig::default())
}

#[tokio::test(start_paused = true)]
async fn stops_at_min_duration_once_scored() {
    let source = ScriptedSource::new(|_| Ok(good_stats()));
    let call = CallActivity::new();

    let outcome = sampler(&source, &call).run().await;

    assert_eq!(outcome.stop_reason, StopReason::MinDurationReached);
    assert_eq!(outcome.ticks, 10);
    assert_eq!(outcome.elapsed, Duration::from_secs(10));
    assert_eq!(outcome.score, Some(4.1));
    assert_eq!(outcome.verdict().text(), "Excellent");
    // one extra poll for codec detection
    assert_eq!(source.polls(), 11);
    assert_eq!(outcome.audio_codecs.as_deref(), Some("PCMU"));
}

#[tokio::test(start_paused = true)]
async fn zero_counters_run_to_max_duration_and_fail() {
    let source = ScriptedSource::new(|_| Ok(silent_stats()));
    let call = CallActivity::new();

    let outcome = sampler(&source, &call).run().await;

    assert_eq!(outcome.stop_reason, StopReason::MaxDurationReached);
    assert_eq!(outcome.ticks, 20);
    assert_eq!(outcome.score, None);
    assert_eq!(outcome.verdict(), QualityVerdict::Failed);
    assert!(call.is_active());
}

#[tokio::test(start_paused = true)]
async fn first_score_after_min_duration_stops_immediately() {
    let source = ScriptedSource::new(|n| if n < 13 { Ok(no_remote_stats()) } else { Ok(good_stats()) });
    let call = CallActivity::new();

    let outcome = sampler(&source, &call).run().await;

    assert_eq!(outcome.stop_reason, StopReason::MinDurationReached);
    assert_eq!(outcome.ticks, 13);
    assert_eq!(outcome.score, Some(4.1));
}

#[tokio::test(start_paused = true)]
async fn failed_polls_are_skipped() {
    let source = ScriptedSource::new(|n| {
        if n % 2 == 1 {
            Err(QualityError::Source("getStats() rejected".into()))
        } else {
            Ok(good_stats())
        }
    });
    let call = CallActivity::new();

    let outcome = sampler(&source, &call).run().await;

    assert_eq!(outcome.stop_reason, StopReason::MinDurationReached);
    assert_eq!(outcome.ticks, 10);
    assert_eq!(outcome.score, Some(4.1));
}

#[tokio::test(start_paused = true)]
async fn early_score_is_kept_when_later_polls_fail() {
    let source = ScriptedSource::new(|n| if n <= 3 { Ok(good_stats()) } else { Ok(silent_stats()) });
    let call = CallActivity::new();

    let outcome = sampler(&source, &call).run().await;

    assert_eq!(outcome.stop_reason, StopReason::MinDurationReached);
    assert_eq!(outcome.ticks, 10);
    assert_eq!(outcome.score, Some(4.1));
}

#[tokio::test(start_paused = true)]
async fn call_end_stops_polling() {
    let source = ScriptedSource::new(|_| Ok(good_stats()));
    let call = CallActivity::new();

    let hangup = call.clone();
    tokio::spawn(async move {
        time::sleep(Duration::from_millis(5500)).await;
        hangup.end();
    });

    let outcome = sampler(&source, &call).run().await;

    assert_eq!(outcome.stop_reason, StopReason::CallEnded);
    assert_eq!(outcome.ticks, 5);
    assert_eq!(outcome.elapsed, Duration::from_millis(5500));
    // the score obtained before hangup survives
    assert_eq!(outcome.score, Some(4.1));
    assert_eq!(outcome.audio_codecs, None);

    time::sleep(Duration::from_secs(30)).await;
    assert_eq!(source.polls(), 5);
}

#[tokio::test(start_paused = true)]
async fn poll_in_flight_at_hangup_is_discarded() {
    let call = CallActivity::new();
    let hangup = call.clone();
    let source = ScriptedSource::new(move |n| {
        if n == 3 {
            hangup.end();
            Ok(good_stats())
        } else {
            Ok(silent_stats())
        }
    });

    let outcome = sampler(&source, &call).run().await;

    assert_eq!(outcome.stop_reason, StopReason::CallEnded);
    assert_eq!(outcome.ticks, 3);
    assert_eq!(outcome.score, None);
}

#[tokio::test(start_paused = true)]
async fn call_already_ended_never_polls() {
    let source = ScriptedSource::new(|_| Ok(good_stats()));
    let call = CallActivity::new();
    call.end();

    let outcome = sampler(&source, &call).run().await;

    assert_eq!(outcome.stop_reason, StopReason::CallEnded);
    assert_eq!(outcome.ticks, 0);
    assert_eq!(source.polls(), 0);
}

#[tokio::test(start_paused = true)]
async fn estimates_samples_duration_without_track() {
    // 50 packets per second, 2 % lost, no track report
    let source = ScriptedSource::new(|n| {
        let n = n as u64;
        Ok(vec![
            StatsRecord::new("IA1", StatsType::InboundRtp)
                .with_kind(MediaKind::Audio)
                .with_packets(Some(49 * n), Some(n as i64)),
            StatsRecord::new("RIA1", StatsType::RemoteInboundRtp)
                .with_kind(MediaKind::Audio)
                .with_packets(None, Some(n as i64))
                .with_jitter(0.005)
                .with_round_trip_time(0.06),
        ])
    });
    let call = CallActivity::new();

    let outcome = sampler(&source, &call).run().await;

    // 5 + 30 + 20 ms = 55 ms, 2 % loss
    assert_eq!(outcome.score, Some(4.1));
    assert_eq!(outcome.ticks, 10);
    // no codec reports
    assert_eq!(outcome.audio_codecs, None);
}

#[tokio::test(start_paused = true)]
async fn custom_durations_and_interval() {
    let source = ScriptedSource::new(|_| Ok(good_stats()));
    let call = CallActivity::new();
    let config = QualityTestConfig::new()
        .with_min_duration(2)
        .with_max_duration(4)
        .with_poll_interval(Duration::from_millis(500));

    let dyn_source: Arc<dyn StatisticsSource> = source.clone();
    let outcome = QualityTestSampler::new(dyn_source, Arc::new(call), config)
        .run()
        .await;

    // min duration is measured in time, not polls
    assert_eq!(outcome.ticks, 4);
    assert_eq!(outcome.elapsed, Duration::from_secs(2));
    assert_eq!(outcome.stop_reason, StopReason::MinDurationReached);
}

#[tokio::test(start_paused = true)]
async fn run_quality_test_returns_score() {
    let source: Arc<dyn StatisticsSource> = ScriptedSource::new(|_| Ok(good_stats()));
    let call: Arc<dyn ActiveCallHandle> = Arc::new(CallActivity::new());
    let clock: Arc<dyn ElapsedClock> = Arc::new(TokioClock::start());

    let score = run_quality_test(source, call, clock, QualityTestConfig::default()).await;
    assert_eq!(score, Some(4.1));

    let source: Arc<dyn StatisticsSource> = ScriptedSource::new(|_| Ok(no_remote_stats()));
    let call: Arc<dyn ActiveCallHandle> = Arc::new(CallActivity::new());
    let clock: Arc<dyn ElapsedClock> = Arc::new(TokioClock::start());

    let score = run_quality_test(source, call, clock, QualityTestConfig::default()).await;
    assert_eq!(score, None);
}

#[tokio::test(start_paused = true)]
async fn spawned_test_is_cancelled_by_hangup() {
    let source = ScriptedSource::new(|_| Ok(silent_stats()));
    let call = CallActivity::new();

    let handle = sampler(&source, &call).spawn();
    time::sleep(Duration::from_millis(2500)).await;
    call.end();

    let outcome = handle.await.unwrap();
    assert_eq!(outcome.stop_reason, StopReason::CallEnded);
    assert_eq!(outcome.ticks, 2);
    assert_eq!(outcome.score, None);
}
