// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

mod duration;
mod engine;
mod monitor;
mod source;
mod track;

use engine::{Engine, EngineConfig};
use source::TcpFeed;
use track::TrackedTerms;

#[derive(Parser, Debug)]
#[command(name = "termwatch")]
#[command(about = "Counts tracked terms on a filtered post feed, one line per interval")]
struct Args {
    /// Reporting interval in seconds
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Terms to count, matched as literal case-sensitive substrings
    #[arg(required = true)]
    terms: Vec<String>,

    /// Feed endpoint to connect to (host:port)
    #[arg(short, long)]
    connect: String,

    /// Feed silence tolerated before reconnecting (e.g., "30s", "500ms")
    #[arg(long, default_value = "30s")]
    timeout: String,

    /// History rows in the shutdown summary
    #[arg(long, default_value = "10")]
    summary_rows: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let timeout = duration::parse_duration(&args.timeout).context("invalid --timeout")?;
    validate_endpoint(&args.connect)?;
    let terms = TrackedTerms::new(args.terms)?;

    let config = EngineConfig {
        update_interval: Duration::from_secs(args.interval),
        timeout,
        summary_rows: args.summary_rows,
    };
    let feed = TcpFeed::new(&args.connect);
    let (engine, handle) = Engine::new(config, terms, Box::new(feed), io::stdout());

    let mut engine_task = tokio::spawn(engine.run());
    tokio::select! {
        result = &mut engine_task => return result?,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
            handle.stop();
        }
    }
    engine_task.await?
}

/// Diagnostics go to stderr so the stdout table stays machine-readable.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

/// Shape check for host:port endpoints; resolution happens at connect time.
fn validate_endpoint(addr: &str) -> Result<()> {
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => {
            port.parse::<u16>()
                .with_context(|| format!("invalid port in feed endpoint '{}'", addr))?;
            Ok(())
        }
        _ => bail!("feed endpoint must be host:port, got '{}'", addr),
    }
}
