use std::fs;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use form_sentinel::clock::MonotonicClock;
use form_sentinel::sink::JsonLinesLog;
use form_sentinel::source::ReplaySource;
use form_sentinel::{Config, SessionDriver, SessionHandle};

#[derive(Parser, Debug)]
#[command(name = "form-sentinel")]
#[command(about = "Counts exercise reps from pose landmarks and grades their form")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Recorded pose frames as JSON lines ("-" reads stdin)
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Where to write rep events (overrides the config)
    #[arg(short, long)]
    events: Option<PathBuf>,

    /// Session length in seconds, 0 for unlimited (overrides the config)
    #[arg(short, long)]
    duration: Option<f64>,

    /// Write the default config to this path and exit
    #[arg(long)]
    write_default_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "form_sentinel=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    if let Some(path) = &args.write_default_config {
        Config::default().save(path)?;
        tracing::info!(path = %path.display(), "Default config written");
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(path) = args.events {
        config.session.events_path = path;
    }
    if let Some(duration) = args.duration {
        config.session.duration_secs = duration;
    }
    config.validate()?;

    let sink = JsonLinesLog::create(&config.session.events_path).with_context(|| {
        format!(
            "Failed to create event log {}",
            config.session.events_path.display()
        )
    })?;
    let session = SessionHandle::new();
    let mut driver = SessionDriver::new(&config, session, sink);

    let clock = MonotonicClock::new();
    let stop = AtomicBool::new(false);
    let summary = if args.input == "-" {
        let mut source = ReplaySource::new(BufReader::new(io::stdin()));
        driver.run(&mut source, &clock, &stop)?
    } else {
        let mut source = ReplaySource::open(&args.input)
            .with_context(|| format!("Failed to open pose input {}", args.input))?;
        driver.run(&mut source, &clock, &stop)?
    };

    let report = serde_json::to_string_pretty(&summary.report)?;
    if let Some(path) = &config.session.report_path {
        fs::write(path, &report)?;
    }
    println!("{report}");

    Ok(())
}
