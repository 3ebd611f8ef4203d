// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # termwatch
//!
//! A stream-health monitor and windowed term counter for filtered post feeds.
//!
//! termwatch connects to a push feed of short text records, counts which
//! tracked terms appear in each record, and prints one tabulated count line
//! per reporting interval. The feed's liveness is watched the whole time:
//! when nothing arrives for longer than the silence allowance, the engine
//! reconnects on its next tick and keeps counting.
//!
//! ## Architecture
//!
//! The crate is organized into four main modules:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Engine                              │
//! │  ┌─────────┐    ┌──────────┐    ┌──────────┐   ┌─────────┐  │
//! │  │ source  │───▶│ monitor  │───▶│  track   │──▶│ stdout  │  │
//! │  │ (feed)  │    │(liveness)│    │(counting)│   │ (table) │  │
//! │  └─────────┘    └──────────┘    └──────────┘   └─────────┘  │
//! │       ▲               │
//! │       └── launch() ───┘   reconnect when the feed stalls    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Feed connector abstraction ([`FeedConnector`] trait) with
//!   implementations for the TCP line protocol and in-process channels, plus
//!   the wire record shapes
//! - **[`monitor`]**: Liveness state machine - refreshes a timestamp on every
//!   inbound event, forwards text and drop notices to the tracker, and owns
//!   connection handles and relaunches
//! - **[`track`]**: Pure aggregation - the tracked-term set, per-epoch
//!   counters and history, and fixed-width table rendering
//! - **[`engine`]**: The tick loop - serializes feed events against interval
//!   ticks, checks for stalls, emits count lines, and rolls epochs over
//!
//! ## Features
//!
//! - **Presence counting**: each record bumps a term's counter at most once,
//!   however many times the term occurs within it
//! - **Stall recovery**: a feed silent past the allowance is reconnected on
//!   the next tick, without dropping the open epoch
//! - **Drop accounting**: provider limit notices ratchet a per-epoch missed
//!   count that is reported alongside the term columns
//! - **Shutdown summary**: stopping the engine prints a tabulated dump of the
//!   most recent epochs
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Count "rust" and "tokio" once per second on a feed at localhost:9090
//! termwatch --connect localhost:9090 1 rust tokio
//!
//! # Report every 5s, tolerating a minute of feed silence before reconnecting
//! termwatch --connect localhost:9090 --timeout 60s 5 rust tokio
//! ```
//!
//! ### Counting without a feed
//!
//! ```
//! use termwatch::track::{TableLayout, TermTracker, TrackedTerms};
//!
//! let terms = TrackedTerms::new(["rust"]).unwrap();
//! let layout = TableLayout::for_terms(&terms);
//! let mut tracker = TermTracker::new(terms);
//!
//! tracker.start_epoch();
//! tracker.process_text("rust is fast");
//! assert_eq!(tracker.count_of("rust"), Some(1));
//! println!("{}", tracker.render_header(&layout));
//! ```
//!
//! ### As a library with a TCP feed
//!
//! ```no_run
//! use std::io;
//!
//! use termwatch::source::TcpFeed;
//! use termwatch::track::TrackedTerms;
//! use termwatch::{Engine, EngineConfig};
//!
//! # tokio_test::block_on(async {
//! let terms = TrackedTerms::new(["rust", "tokio"]).unwrap();
//! let feed = TcpFeed::new("localhost:9090");
//!
//! let (engine, handle) = Engine::new(
//!     EngineConfig::default(),
//!     terms,
//!     Box::new(feed),
//!     io::stdout(),
//! );
//! # let _ = handle;
//! engine.run().await.unwrap();
//! # });
//! ```
//!
//! ### Embedding with a channel feed
//!
//! ```
//! use termwatch::source::{ChannelFeed, FeedData, FeedEvent};
//!
//! # tokio_test::block_on(async {
//! // The sender side belongs to your application; the feed plugs into
//! // an Engine exactly like a TCP connector would.
//! let (tx, feed) = ChannelFeed::create("embedded");
//!
//! tx.send(FeedEvent::Start).await.unwrap();
//! tx.send(FeedEvent::Data(FeedData::Text("a post about rust".into())))
//!     .await
//!     .unwrap();
//! # let _ = feed;
//! # });
//! ```

pub mod duration;
pub mod engine;
pub mod monitor;
pub mod source;
pub mod track;

// Re-export main types for convenience
pub use engine::{Engine, EngineConfig, EngineHandle};
pub use monitor::{Liveness, MonitorError, StreamMonitor};
pub use source::{ChannelFeed, FeedConnector, FeedData, FeedEvent, TcpFeed};
pub use track::{EpochRecord, FilterSpec, TableLayout, TermTracker, TrackedTerms, TrackerError};
