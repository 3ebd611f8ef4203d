//! Feed connector abstraction for receiving stream events.
//!
//! This module provides a trait-based abstraction for delivering feed events
//! from various backends (TCP line protocol, in-process channels) into the
//! engine's event channel.

mod channel;
mod record;
mod tcp;

pub use channel::ChannelFeed;
pub use record::{LimitNotice, PostRecord};
pub use tcp::TcpFeed;

use std::fmt::Debug;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::track::FilterSpec;

/// Capacity of the per-connection event channel.
pub(crate) const EVENT_BUFFER: usize = 64;

/// One signal from the feed.
///
/// Connectors translate their wire format into this vocabulary; the monitor
/// consumes it sequentially, so ordering within a connection is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// Connection established; records follow.
    Start,
    /// A decoded record.
    Data(FeedData),
    /// A liveness-only signal: a protocol keep-alive, or a record carrying
    /// neither text nor a drop notice.
    Ping,
    /// The connection failed; terminal for this connection instance.
    Error(String),
    /// The feed closed the connection; terminal for this connection
    /// instance.
    End,
}

/// Payload of a data record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedData {
    /// Text of one post.
    Text(String),
    /// Provider drop notice: this many matching records were not delivered.
    Limit(u64),
}

/// Trait for connectors that deliver feed events.
///
/// `connect` must return immediately: implementations spawn a task that
/// establishes the connection and pushes events through `events`, reporting
/// connection failures as [`FeedEvent::Error`] rather than returning them.
/// Aborting the returned handle is the only teardown a connection needs.
///
/// # Example
///
/// ```
/// use termwatch::source::{ChannelFeed, FeedConnector, FeedEvent};
/// use termwatch::track::{FilterSpec, TrackedTerms};
/// use tokio::sync::mpsc;
///
/// # tokio_test::block_on(async {
/// let terms = TrackedTerms::new(["rust"]).unwrap();
/// let (feed_tx, feed) = ChannelFeed::create("demo");
/// let (tx, mut rx) = mpsc::channel(16);
///
/// let _conn = feed.connect(&FilterSpec::for_terms(&terms), tx);
/// feed_tx.send(FeedEvent::Start).await.unwrap();
/// assert_eq!(rx.recv().await, Some(FeedEvent::Start));
/// # });
/// ```
pub trait FeedConnector: Send + Sync + Debug {
    /// Start delivering events for `filter` into `events`.
    ///
    /// Each call opens an independent connection; the caller is expected to
    /// abort the previous handle when superseding one.
    fn connect(&self, filter: &FilterSpec, events: mpsc::Sender<FeedEvent>) -> JoinHandle<()>;

    /// Human-readable description of the endpoint, for log lines.
    fn description(&self) -> String;
}
