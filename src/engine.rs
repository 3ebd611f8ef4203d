//! The report engine: periodic ticks, stall recovery, epoch rollover.
//!
//! ```text
//! connector task ──events──▶ ┌────────────┐
//!                            │   Engine   │──▶ header + count lines
//! interval ticks ──────────▶ │ (run loop) │
//! stop signal    ──────────▶ └────────────┘
//! ```
//!
//! One task owns all mutable state: feed events and timer ticks are
//! serialized through the same `select!` loop, so the tracker and monitor
//! never see concurrent writers.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::duration::format_duration;
use crate::monitor::StreamMonitor;
use crate::source::{FeedConnector, FeedEvent};
use crate::track::{FilterSpec, TableLayout, TermTracker, TrackedTerms};

/// Engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Time between count lines. Must be positive.
    pub update_interval: Duration,
    /// Feed silence tolerated before a reconnect is forced.
    pub timeout: Duration,
    /// History rows included in the shutdown summary.
    pub summary_rows: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
            summary_rows: 10,
        }
    }
}

/// Stops a running [`Engine`].
///
/// Dropping the handle also stops the engine.
pub struct EngineHandle {
    stop_tx: watch::Sender<bool>,
}

impl EngineHandle {
    /// Ask the engine to finish its current round and stop.
    pub fn stop(self) {
        let _ = self.stop_tx.send(true);
    }
}

/// Owns the tracker and monitor and drives the tick loop.
///
/// Generic over the output writer so embedders and tests can capture the
/// table; the binary passes stdout.
pub struct Engine<W> {
    config: EngineConfig,
    tracker: TermTracker,
    monitor: StreamMonitor,
    layout: TableLayout,
    out: W,
    stop_rx: watch::Receiver<bool>,
}

impl<W: Write> Engine<W> {
    /// Build an engine and the handle that stops it.
    pub fn new(
        config: EngineConfig,
        terms: TrackedTerms,
        connector: Box<dyn FeedConnector>,
        out: W,
    ) -> (Self, EngineHandle) {
        let (stop_tx, stop_rx) = watch::channel(false);
        let layout = TableLayout::for_terms(&terms);
        let filter = FilterSpec::for_terms(&terms);
        let engine = Self {
            config,
            tracker: TermTracker::new(terms),
            monitor: StreamMonitor::new(connector, filter),
            layout,
            out,
            stop_rx,
        };
        (engine, EngineHandle { stop_tx })
    }

    /// Run until stopped.
    ///
    /// Prints the header once, connects, then emits one count line per
    /// interval while the feed is live, reconnecting whenever it stays
    /// silent past the allowance. On stop, prints the recent-epoch summary
    /// and returns.
    pub async fn run(mut self) -> Result<()> {
        writeln!(self.out, "{}", self.tracker.render_header(&self.layout))?;

        let mut events = self.monitor.launch();
        let mut stop_rx = self.stop_rx.clone();
        let mut ticker = interval(self.config.update_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() fires immediately; the first report is due one
        // interval from now
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick(&mut events)?,
                Some(event) = events.recv() => {
                    self.monitor.handle_event(event, &mut self.tracker);
                }
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("stopping");
        self.summary()
    }

    /// One scheduler tick: recover from a stall, then report and roll the
    /// epoch over.
    ///
    /// The stall check runs first, so a reconnecting epoch's line still
    /// shows the counts from before the stall; the next epoch reflects the
    /// fresh connection. Nothing is reported while the feed has yet to
    /// produce input on the current connection lineage.
    fn tick(&mut self, events: &mut mpsc::Receiver<FeedEvent>) -> Result<()> {
        if self.monitor.stalled(self.config.timeout) {
            match self.monitor.since_last_input() {
                Ok(since) => info!("no input for {}; reconnecting", format_duration(since)),
                Err(_) => {
                    let down = self.monitor.since_launch().unwrap_or_default();
                    info!("stream down for {}; reconnecting", format_duration(down));
                }
            }
            *events = self.monitor.launch();
        }

        if self.monitor.is_running() {
            match self.tracker.render_count_line(&self.layout) {
                Ok(line) => writeln!(self.out, "{}", line)?,
                Err(e) => {
                    error!("cannot report: {}", e);
                    return Ok(());
                }
            }
            if let Err(e) = self.tracker.end_epoch() {
                error!("epoch rollover failed: {}", e);
                return Ok(());
            }
            self.tracker.start_epoch();
        }

        Ok(())
    }

    /// Tabulated dump of the live epoch and the most recent closed ones.
    fn summary(&mut self) -> Result<()> {
        let lines = self.tracker.render_tabulated(&self.layout, self.config.summary_rows);
        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }
}
