//! Timer-driven quality test sampler
//!
//! The sampler polls the statistics of an established test call once per
//! poll interval and scores every poll:
//!
//! - A poll that cannot be scored (report not there yet, counters still
//!   zero, `getStats()` failure) is logged and the test goes on.
//! - Once `min_duration_secs` have elapsed and a score was obtained, the test
//!   stops early with that score.
//! - After `max_duration_secs` polls the test stops with whatever score it
//!   has, possibly none ("test failed").
//! - When the call ends, polling stops at once and a poll that was in flight
//!   is discarded.
//!
//! ```text
//!   tick ──► poll() ──► StatsSnapshot ──► G711QualityScorer ──► last_score
//!     ▲                                                              │
//!     └──────────── not done (min duration / score / max) ◄──────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::config::QualityTestConfig;
use crate::error::Result;
use crate::quality::{G711QualityScorer, QualityVerdict};
use crate::stats::{StatsRecord, StatsSnapshot, StatsType};

/// Source of point-in-time statistics for the call under test
///
/// One `poll()` corresponds to one `RTCPeerConnection.getStats()` call.
#[async_trait]
pub trait StatisticsSource: Send + Sync {
    async fn poll(&self) -> Result<Vec<StatsRecord>>;
}

/// Liveness of the call under test
#[async_trait]
pub trait ActiveCallHandle: Send + Sync {
    /// Whether the call is still established
    fn is_active(&self) -> bool;

    /// Resolves once the call has ended, by either party
    async fn terminated(&self);
}

/// Time elapsed since the quality test began
pub trait ElapsedClock: Send + Sync {
    fn elapsed(&self) -> Duration;
}

/// Clock on the tokio timer, so paused test time drives it too
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    start: Instant,
}

impl TokioClock {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }
}

impl ElapsedClock for TokioClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Call liveness flag shared between the call layer and the sampler
#[derive(Debug, Clone)]
pub struct CallActivity {
    state_sender: Arc<watch::Sender<bool>>,
    state_watcher: watch::Receiver<bool>,
}

impl CallActivity {
    /// Create the flag for an established call
    pub fn new() -> Self {
        let (state_sender, state_watcher) = watch::channel(true);
        Self {
            state_sender: Arc::new(state_sender),
            state_watcher,
        }
    }

    /// Mark the call as ended
    pub fn end(&self) {
        self.state_sender.send_replace(false);
    }
}

impl Default for CallActivity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActiveCallHandle for CallActivity {
    fn is_active(&self) -> bool {
        *self.state_watcher.borrow()
    }

    async fn terminated(&self) {
        let mut watcher = self.state_watcher.clone();
        let _ = watcher.wait_for(|active| !*active).await;
    }
}

/// Why a quality test stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Minimum duration elapsed and a score was available
    MinDurationReached,
    /// All polls were used
    MaxDurationReached,
    /// The call ended during the test
    CallEnded,
}

/// Result of one quality test
#[derive(Debug, Clone, PartialEq)]
pub struct QualityTestOutcome {
    /// Last score obtained; `None` means the test failed
    pub score: Option<f64>,
    /// Number of polls taken
    pub ticks: u32,
    /// Time from start to stop
    pub elapsed: Duration,
    pub stop_reason: StopReason,
    /// Audio codecs detected after the test, e.g. `PCMU`
    pub audio_codecs: Option<String>,
}

impl QualityTestOutcome {
    pub fn verdict(&self) -> QualityVerdict {
        QualityVerdict::from_score(self.score)
    }
}

/// Runs a browser-side voice quality test against one call
pub struct QualityTestSampler {
    source: Arc<dyn StatisticsSource>,
    call: Arc<dyn ActiveCallHandle>,
    clock: Option<Arc<dyn ElapsedClock>>,
    config: QualityTestConfig,
    scorer: G711QualityScorer,
}

impl QualityTestSampler {
    pub fn new(
        source: Arc<dyn StatisticsSource>,
        call: Arc<dyn ActiveCallHandle>,
        config: QualityTestConfig,
    ) -> Self {
        Self {
            source,
            call,
            clock: None,
            config,
            scorer: G711QualityScorer::new(),
        }
    }

    /// Use an external clock instead of one started with the test
    pub fn with_clock(mut self, clock: Arc<dyn ElapsedClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn config(&self) -> &QualityTestConfig {
        &self.config
    }

    /// Run the test as a tokio task
    pub fn spawn(self) -> JoinHandle<QualityTestOutcome> {
        tokio::spawn(async move { self.run().await })
    }

    /// Run the test to completion
    pub async fn run(&self) -> QualityTestOutcome {
        let clock = self
            .clock
            .clone()
            .unwrap_or_else(|| Arc::new(TokioClock::start()) as Arc<dyn ElapsedClock>);
        let period = self.config.poll_interval();
        let min_duration = self.config.min_duration().as_secs_f64();

        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Checking line quality (browser test)...");

        let mut last_score: Option<f64> = None;
        let mut ticks: u32 = 0;

        let stop_reason = loop {
            if ticks >= self.config.max_duration_secs {
                break StopReason::MaxDurationReached;
            }

            tokio::select! {
                biased;
                _ = self.call.terminated() => break StopReason::CallEnded,
                _ = ticker.tick() => {}
            }
            ticks += 1;

            let polled = tokio::select! {
                biased;
                _ = self.call.terminated() => break StopReason::CallEnded,
                polled = self.source.poll() => polled,
            };
            if !self.call.is_active() {
                debug!("Call ended while fetching stats, result discarded");
                break StopReason::CallEnded;
            }

            let elapsed = clock.elapsed().as_secs_f64();
            let scored = polled.and_then(|records| {
                let snapshot = StatsSnapshot::from_records(&records, Some(&StatsType::SCORING));
                self.scorer.score_snapshot(&snapshot, elapsed)
            });
            match scored {
                Ok(report) => last_score = Some(report.score),
                Err(e) => warn!("time: {}s cannot calculate score: {}", elapsed.floor(), e),
            }

            if elapsed >= min_duration && last_score.is_some() {
                break StopReason::MinDurationReached;
            }
        };

        let audio_codecs = match stop_reason {
            StopReason::CallEnded => None,
            _ => self.detect_audio_codecs().await,
        };
        let outcome = QualityTestOutcome {
            score: last_score,
            ticks,
            elapsed: clock.elapsed(),
            stop_reason,
            audio_codecs,
        };

        match outcome.score {
            Some(score) => info!("Test passed: score={} after {} polls ({:?})", score, ticks, stop_reason),
            None => warn!("Test failed: no score after {} polls ({:?})", ticks, stop_reason),
        }
        info!("Testing RTP quality is finished");
        outcome
    }

    /// Log the complete final report and the audio codecs in use
    async fn detect_audio_codecs(&self) -> Option<String> {
        let records = match self.source.poll().await {
            Ok(records) => records,
            Err(e) => {
                debug!("Final stats poll failed: {}", e);
                return None;
            }
        };
        let snapshot = StatsSnapshot::from_records(&records, None);
        trace!("Reports {:?}", snapshot);

        let codecs = snapshot.audio_codec_string();
        if let Some(codecs) = &codecs {
            info!("Tested audio codecs={}", codecs);
        }
        codecs
    }
}

/// Run a browser quality test and return its score
///
/// `None` means no usable score was obtained and the test failed.
pub async fn run_quality_test(
    source: Arc<dyn StatisticsSource>,
    call: Arc<dyn ActiveCallHandle>,
    clock: Arc<dyn ElapsedClock>,
    config: QualityTestConfig,
) -> Option<f64> {
    QualityTestSampler::new(source, call, config)
        .with_clock(clock)
        .run()
        .await
        .score
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    struct EmptySource;

    #[async_trait]
    impl StatisticsSource for EmptySource {
        async fn poll(&self) -> Result<Vec<StatsRecord>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn test_unscorable_polls_are_logged() {
        let config = QualityTestConfig::new().with_min_duration(1).with_max_duration(2);
        let sampler = QualityTestSampler::new(
            Arc::new(EmptySource),
            Arc::new(CallActivity::new()),
            config,
        );

        let outcome = sampler.run().await;

        assert_eq!(outcome.score, None);
        assert_eq!(outcome.ticks, 2);
        assert!(logs_contain("time: 1s cannot calculate score: No \"inbound-rtp\" stats"));
        assert!(logs_contain("Test failed"));
        assert!(logs_contain("Testing RTP quality is finished"));
    }

    #[tokio::test]
    async fn test_call_activity() {
        let call = CallActivity::new();
        assert!(call.is_active());

        let watcher = call.clone();
        let waiter = tokio::spawn(async move { watcher.terminated().await });

        call.end();
        waiter.await.unwrap();
        assert!(!call.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_follows_paused_time() {
        let clock = TokioClock::start();
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(clock.elapsed().as_secs(), 3);
    }

    #[test]
    fn test_outcome_verdict() {
        let outcome = QualityTestOutcome {
            score: None,
            ticks: 20,
            elapsed: Duration::from_secs(20),
            stop_reason: StopReason::MaxDurationReached,
            audio_codecs: None,
        };
        assert_eq!(outcome.verdict(), QualityVerdict::Failed);
    }
}
