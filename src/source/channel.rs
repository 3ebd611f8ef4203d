//! Channel-based feed connector.
//!
//! Delivers events pushed by an in-process producer. This is useful for
//! embedding the engine without a network feed, and for tests that need to
//! script exact event sequences.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use super::{FeedConnector, FeedEvent, EVENT_BUFFER};
use crate::track::FilterSpec;

/// A feed connector fed through an in-process channel.
///
/// The producer sends [`FeedEvent`]s directly, including `Start`; nothing is
/// synthesized. The filter is accepted for interface parity and ignored,
/// since the producer decides what it sends. Reconnects re-attach to the
/// same producer channel, so events sent while no connection is attached
/// wait in the channel. When the producer side closes, the connection
/// reports [`FeedEvent::End`].
///
/// # Example
///
/// ```
/// use termwatch::source::{ChannelFeed, FeedEvent};
///
/// let (feed_tx, feed) = ChannelFeed::create("synthetic");
/// ```
#[derive(Debug, Clone)]
pub struct ChannelFeed {
    shared: Arc<Mutex<mpsc::Receiver<FeedEvent>>>,
    description: String,
}

impl ChannelFeed {
    /// Create a producer/connector pair.
    ///
    /// Returns (sender, feed) where the sender pushes events and the feed
    /// plugs into the engine.
    pub fn create(description: &str) -> (mpsc::Sender<FeedEvent>, Self) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let feed = Self {
            shared: Arc::new(Mutex::new(rx)),
            description: format!("channel: {}", description),
        };
        (tx, feed)
    }
}

impl FeedConnector for ChannelFeed {
    fn connect(&self, _filter: &FilterSpec, events: mpsc::Sender<FeedEvent>) -> JoinHandle<()> {
        let shared = self.shared.clone();

        tokio::spawn(async move {
            let mut feed = shared.lock().await;
            while let Some(event) = feed.recv().await {
                if events.send(event).await.is_err() {
                    // Receiver gone: connection superseded, leave the
                    // producer channel attached for the next connect
                    return;
                }
            }
            let _ = events.send(FeedEvent::End).await;
        })
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}
