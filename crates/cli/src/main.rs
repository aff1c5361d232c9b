//! `c2c-quality`: offline driver for the click-to-call voice quality engine

mod replay;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use tracing::{debug, info};

use c2c_voice_quality::logging::{self, LoggingConfig};
use c2c_voice_quality::prelude::{
    lookup, sbc_verdict, ActiveCallHandle, CallActivity, G711QualityScorer, QualityTestConfig,
    QualityTestSampler, QualityVerdict, SbcVerdict, ScoreSource, StatisticsSource, StatsSnapshot,
    StatsType,
};

use crate::replay::{parse_stats, ReplaySource, ScaledClock};

/// Score WebRTC statistics the way the click-to-call test call does
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn", env = "C2C_QUALITY_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up the matrix score for a packet loss and delay
    Lookup {
        /// Packet loss in percent
        #[arg(long)]
        loss: f64,

        /// One-way delay in milliseconds
        #[arg(long)]
        delay: f64,
    },

    /// Score one getStats() dump (JSON array, or object keyed by id)
    Analyze {
        stats: PathBuf,

        /// Seconds since the test started, used to estimate rendered audio
        #[arg(long, default_value_t = 10.0)]
        elapsed: f64,
    },

    /// Run recorded polls (JSON Lines) through the quality test sampler
    Replay {
        polls: PathBuf,

        /// Quality test configuration (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Wall-clock time between replayed polls
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: u64,
    },

    /// Parse an X-VoiceQuality header value computed by the SBC
    SbcHeader {
        value: String,

        /// Quality test configuration (TOML) with the color texts
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show which test call a browser would be offered
    Mode {
        #[arg(long)]
        browser: String,

        #[arg(long)]
        os: String,

        /// Quality test configuration (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut log_config = LoggingConfig::new(logging::parse_log_level(&cli.log_level)?, "c2c-quality");
    if cli.json_logs {
        log_config = log_config.with_json();
    }
    logging::setup_logging(&log_config)?;
    logging::log_welcome(&log_config.app_name, env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Lookup { loss, delay } => Ok(run_lookup(loss, delay)),
        Command::Analyze { stats, elapsed } => run_analyze(&stats, elapsed),
        Command::Replay { polls, config, interval_ms } => {
            run_replay(&polls, config.as_deref(), Duration::from_millis(interval_ms)).await
        }
        Command::SbcHeader { value, config } => {
            let config = load_config(config.as_deref())?;
            Ok(print_sbc_verdict(&sbc_verdict(Some(value.as_str()), &config)))
        }
        Command::Mode { browser, os, config } => {
            let config = load_config(config.as_deref())?;
            let mode = match config.effective_score_source(&browser, &os) {
                Some(ScoreSource::Browser) => "browser test call".green(),
                Some(ScoreSource::Sbc) => "SBC test call".green(),
                None => "no test call offered (browser test unsupported)".yellow(),
            };
            println!("{} on {}: {}", browser, os, mode);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<QualityTestConfig> {
    match path {
        Some(path) => QualityTestConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(QualityTestConfig::default()),
    }
}

fn paint(text: &str, color: &str) -> ColoredString {
    match color.to_ascii_lowercase().as_str() {
        "darkgreen" | "green" => text.green(),
        "lightgreen" => text.bright_green(),
        "orange" | "yellow" => text.yellow(),
        "gray" => text.dimmed(),
        _ => text.red(),
    }
}

fn print_verdict(verdict: &QualityVerdict) -> ExitCode {
    println!("{}", paint(&verdict.to_string(), verdict.color()).bold());
    if verdict.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_sbc_verdict(verdict: &SbcVerdict) -> ExitCode {
    match verdict {
        SbcVerdict::Passed { score, color, .. } => {
            println!("score: {}", score);
            println!("{}", paint(&verdict.to_string(), color).bold());
            ExitCode::SUCCESS
        }
        SbcVerdict::Failed => {
            println!("{}", verdict.to_string().red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run_lookup(loss: f64, delay: f64) -> ExitCode {
    let result = lookup(loss, delay);
    println!("{}", result);
    print_verdict(&QualityVerdict::from_score(Some(result.score)))
}

fn run_analyze(path: &Path, elapsed: f64) -> Result<ExitCode> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let records = parse_stats(value)?;
    debug!("Parsed {} stats records", records.len());

    let snapshot = StatsSnapshot::from_records(&records, Some(&StatsType::SCORING));
    let report = match G711QualityScorer::new().score_snapshot(&snapshot, elapsed) {
        Ok(report) => report,
        Err(e) => {
            println!("{} {}", "cannot calculate score:".red(), e);
            return Ok(ExitCode::FAILURE);
        }
    };

    println!("packet loss:            {:.2}%", report.loss_percent);
    println!("one-way delay:          {:.1}ms", report.delay_ms);
    println!(
        "total samples duration: {:.3}s ({:?})",
        report.total_samples_duration, report.samples_source
    );
    println!("{}", report.lookup);
    if let Some(codecs) = StatsSnapshot::from_records(&records, None).audio_codec_string() {
        println!("audio codecs:           {}", codecs);
    }
    Ok(print_verdict(&QualityVerdict::from_score(Some(report.score))))
}

async fn run_replay(path: &Path, config: Option<&Path>, pace: Duration) -> Result<ExitCode> {
    let config = load_config(config)?;
    if config.score_source == ScoreSource::Sbc {
        info!("Configuration selects SBC scoring, replaying the browser test anyway");
    }

    let source = Arc::new(ReplaySource::from_file(path)?);
    let recorded = source.recorded();

    // replay faster than recorded while the sampler sees recorded time
    let clock = ScaledClock::start(config.poll_interval(), pace);
    let sampler_config = config.clone().with_poll_interval(pace);

    let call = CallActivity::new();
    let hangup = call.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            hangup.end();
        }
    });

    let stats_source: Arc<dyn StatisticsSource> = source;
    let call_handle: Arc<dyn ActiveCallHandle> = Arc::new(call);
    let outcome = QualityTestSampler::new(stats_source, call_handle, sampler_config)
        .with_clock(Arc::new(clock))
        .run()
        .await;

    println!("polls:        {} of {} recorded", outcome.ticks, recorded);
    println!("stopped:      {:?} after {:.1}s", outcome.stop_reason, outcome.elapsed.as_secs_f64());
    match outcome.score {
        Some(score) => println!("score:        {}", score),
        None => println!("score:        {}", "none".red()),
    }
    if let Some(codecs) = &outcome.audio_codecs {
        println!("audio codecs: {}", codecs);
    }
    Ok(print_verdict(&outcome.verdict()))
}
