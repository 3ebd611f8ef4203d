//! Stream liveness tracking and reconnect ownership.
//!
//! This module bridges the feed connector to the term tracker: every
//! inbound event refreshes a liveness timestamp, text and drop notices are
//! forwarded to the tracker, and a stall predicate tells the engine when
//! the silence allowance has run out.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::source::{FeedConnector, FeedData, FeedEvent, EVENT_BUFFER};
use crate::track::{FilterSpec, TermTracker};

/// Errors from liveness queries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonitorError {
    /// No input has been seen on the current connection lineage.
    #[error("stream has not produced any input")]
    NotRunning,
}

/// Liveness of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// No input ever seen on the current connection lineage.
    Unstarted,
    /// Instant of the most recent inbound signal.
    LastSeen(Instant),
}

/// Bridges the feed connector to the term tracker and watches for stalls.
///
/// Owns the liveness state and the handle to the current connection task.
/// The engine drives it from a single task, so nothing here is
/// synchronized; connector tasks only ever talk to it through the event
/// channel.
#[derive(Debug)]
pub struct StreamMonitor {
    connector: Box<dyn FeedConnector>,
    filter: FilterSpec,
    liveness: Liveness,
    last_launch: Option<Instant>,
    connection: Option<JoinHandle<()>>,
}

impl StreamMonitor {
    pub fn new(connector: Box<dyn FeedConnector>, filter: FilterSpec) -> Self {
        Self {
            connector,
            filter,
            liveness: Liveness::Unstarted,
            last_launch: None,
            connection: None,
        }
    }

    /// True iff input has been seen and no error or end has cleared it.
    pub fn is_running(&self) -> bool {
        matches!(self.liveness, Liveness::LastSeen(_))
    }

    /// Time since the last inbound signal.
    pub fn since_last_input(&self) -> Result<Duration, MonitorError> {
        match self.liveness {
            Liveness::LastSeen(at) => Ok(at.elapsed()),
            Liveness::Unstarted => Err(MonitorError::NotRunning),
        }
    }

    /// Open a fresh connection, superseding any previous one.
    ///
    /// The prior connection task is aborted, and events still queued from
    /// it are discarded along with its channel. Returns the receiver for
    /// the new connection's events.
    pub fn launch(&mut self) -> mpsc::Receiver<FeedEvent> {
        if let Some(connection) = self.connection.take() {
            connection.abort();
        }
        info!("connecting to {}", self.connector.description());
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        self.connection = Some(self.connector.connect(&self.filter, tx));
        self.last_launch = Some(Instant::now());
        rx
    }

    /// Time since the most recent launch, if one has been issued.
    pub fn since_launch(&self) -> Option<Duration> {
        self.last_launch.map(|at| at.elapsed())
    }

    /// True when the silence allowance is spent and the connection should
    /// be reopened.
    ///
    /// While running, silence is measured from the last inbound signal.
    /// After an error or end, or a connect that never produced input, it is
    /// measured from the launch itself, so a dead connection is retried
    /// after the same allowance instead of never. Always false before the
    /// first launch.
    pub fn stalled(&self, allowance: Duration) -> bool {
        match self.liveness {
            Liveness::LastSeen(at) => at.elapsed() > allowance,
            Liveness::Unstarted => self
                .last_launch
                .map(|at| at.elapsed() > allowance)
                .unwrap_or(false),
        }
    }

    /// Apply one feed event: refresh liveness and forward payloads to the
    /// tracker.
    pub fn handle_event(&mut self, event: FeedEvent, tracker: &mut TermTracker) {
        match event {
            FeedEvent::Start => {
                self.mark_seen();
                info!("stream started");
                tracker.start_epoch();
            }
            FeedEvent::Data(FeedData::Text(text)) => {
                self.mark_seen();
                tracker.process_text(&text);
            }
            FeedEvent::Data(FeedData::Limit(dropped)) => {
                self.mark_seen();
                debug!("provider dropped {} records", dropped);
                tracker.record_missed(dropped);
            }
            FeedEvent::Ping => {
                self.mark_seen();
                debug!("keep-alive");
            }
            FeedEvent::Error(message) => {
                self.liveness = Liveness::Unstarted;
                warn!("stream error: {}", message);
            }
            FeedEvent::End => {
                self.liveness = Liveness::Unstarted;
                warn!("stream ended");
            }
        }
    }

    fn mark_seen(&mut self) {
        self.liveness = Liveness::LastSeen(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ChannelFeed;
    use crate::track::TrackedTerms;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::advance;

    #[derive(Debug, Default)]
    struct StubConnector {
        connects: Arc<AtomicUsize>,
    }

    impl FeedConnector for StubConnector {
        fn connect(&self, _filter: &FilterSpec, _events: mpsc::Sender<FeedEvent>) -> JoinHandle<()> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async {})
        }

        fn description(&self) -> String {
            "stub".to_string()
        }
    }

    fn filter() -> FilterSpec {
        FilterSpec::for_terms(&TrackedTerms::new(["alpha"]).unwrap())
    }

    fn stub_monitor() -> (StreamMonitor, Arc<AtomicUsize>) {
        let connector = StubConnector::default();
        let connects = connector.connects.clone();
        (StreamMonitor::new(Box::new(connector), filter()), connects)
    }

    fn tracker() -> TermTracker {
        TermTracker::new(TrackedTerms::new(["alpha", "beta"]).unwrap())
    }

    #[tokio::test]
    async fn test_not_running_until_first_signal() {
        let (mut monitor, _) = stub_monitor();
        assert!(!monitor.is_running());

        let _rx = monitor.launch();
        assert!(!monitor.is_running());

        monitor.handle_event(FeedEvent::Start, &mut tracker());
        assert!(monitor.is_running());
    }

    #[tokio::test]
    async fn test_any_signal_counts_as_input() {
        let (mut monitor, _) = stub_monitor();
        let mut t = tracker();

        for event in [
            FeedEvent::Start,
            FeedEvent::Data(FeedData::Text("x".to_string())),
            FeedEvent::Data(FeedData::Limit(1)),
            FeedEvent::Ping,
        ] {
            monitor.handle_event(FeedEvent::Error("reset".to_string()), &mut t);
            assert!(!monitor.is_running());
            monitor.handle_event(event, &mut t);
            assert!(monitor.is_running());
        }
    }

    #[tokio::test]
    async fn test_error_and_end_clear_liveness() {
        let (mut monitor, _) = stub_monitor();
        let mut t = tracker();

        monitor.handle_event(FeedEvent::Start, &mut t);
        monitor.handle_event(FeedEvent::Error("boom".to_string()), &mut t);
        assert!(!monitor.is_running());

        monitor.handle_event(FeedEvent::Ping, &mut t);
        monitor.handle_event(FeedEvent::End, &mut t);
        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn test_since_last_input_errors_when_unstarted() {
        let (monitor, _) = stub_monitor();
        assert_eq!(monitor.since_last_input(), Err(MonitorError::NotRunning));
    }

    #[tokio::test(start_paused = true)]
    async fn test_since_last_input_measures_from_last_signal() {
        let (mut monitor, _) = stub_monitor();
        monitor.handle_event(FeedEvent::Ping, &mut tracker());

        advance(Duration::from_secs(5)).await;
        assert_eq!(monitor.since_last_input(), Ok(Duration::from_secs(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_only_after_allowance_passes() {
        let allowance = Duration::from_secs(30);
        let (mut monitor, _) = stub_monitor();
        let mut t = tracker();

        let _rx = monitor.launch();
        monitor.handle_event(FeedEvent::Start, &mut t);
        assert!(!monitor.stalled(allowance));

        advance(Duration::from_secs(30)).await;
        assert!(!monitor.stalled(allowance));

        advance(Duration::from_secs(1)).await;
        assert!(monitor.stalled(allowance));
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_resets_the_stall_clock() {
        let allowance = Duration::from_secs(30);
        let (mut monitor, _) = stub_monitor();
        let mut t = tracker();

        let _rx = monitor.launch();
        monitor.handle_event(FeedEvent::Start, &mut t);

        advance(Duration::from_secs(29)).await;
        monitor.handle_event(FeedEvent::Ping, &mut t);
        advance(Duration::from_secs(29)).await;
        assert!(!monitor.stalled(allowance));

        advance(Duration::from_secs(2)).await;
        assert!(monitor.stalled(allowance));
    }

    #[tokio::test(start_paused = true)]
    async fn test_since_launch_measures_from_the_launch() {
        let (mut monitor, _) = stub_monitor();
        assert_eq!(monitor.since_launch(), None);

        let _rx = monitor.launch();
        advance(Duration::from_secs(7)).await;
        assert_eq!(monitor.since_launch(), Some(Duration::from_secs(7)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_launched_never_stalls() {
        let (monitor, _) = stub_monitor();
        advance(Duration::from_secs(3600)).await;
        assert!(!monitor.stalled(Duration::from_secs(30)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dead_connection_stalls_from_launch_time() {
        let allowance = Duration::from_secs(30);
        let (mut monitor, _) = stub_monitor();
        let mut t = tracker();

        let _rx = monitor.launch();
        monitor.handle_event(FeedEvent::Start, &mut t);
        monitor.handle_event(FeedEvent::Error("gone".to_string()), &mut t);

        // Not yet: the launch is recent, a reconnect may be in flight
        advance(Duration::from_secs(30)).await;
        assert!(!monitor.stalled(allowance));

        advance(Duration::from_secs(1)).await;
        assert!(monitor.stalled(allowance));
    }

    #[tokio::test]
    async fn test_each_launch_opens_a_new_connection() {
        let (mut monitor, connects) = stub_monitor();

        let _rx1 = monitor.launch();
        let _rx2 = monitor.launch();
        assert_eq!(connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_launch_supersedes_previous_connection() {
        let (_feed_tx, feed) = ChannelFeed::create("test");
        let mut monitor = StreamMonitor::new(Box::new(feed), filter());

        let mut rx1 = monitor.launch();
        let _rx2 = monitor.launch();

        // The first connection task is aborted, so its channel closes
        assert_eq!(rx1.recv().await, None);
    }

    #[tokio::test]
    async fn test_events_flow_into_the_tracker() {
        let (mut monitor, _) = stub_monitor();
        let mut t = tracker();

        monitor.handle_event(FeedEvent::Start, &mut t);
        assert!(t.epoch_open());

        monitor.handle_event(
            FeedEvent::Data(FeedData::Text("alpha test".to_string())),
            &mut t,
        );
        monitor.handle_event(FeedEvent::Data(FeedData::Limit(3)), &mut t);

        assert_eq!(t.count_of("alpha"), Some(1));
        assert_eq!(t.count_of("beta"), Some(0));
        assert_eq!(t.missed(), 3);
    }

    #[tokio::test]
    async fn test_error_leaves_the_epoch_open() {
        let (mut monitor, _) = stub_monitor();
        let mut t = tracker();

        monitor.handle_event(FeedEvent::Start, &mut t);
        monitor.handle_event(
            FeedEvent::Data(FeedData::Text("alpha".to_string())),
            &mut t,
        );
        monitor.handle_event(FeedEvent::Error("gone".to_string()), &mut t);

        assert!(t.epoch_open());
        assert_eq!(t.count_of("alpha"), Some(1));
    }
}
