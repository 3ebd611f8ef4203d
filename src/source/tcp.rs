//! TCP feed connector.
//!
//! Speaks the newline-delimited JSON feed protocol: the filter specification
//! goes out as one JSON line, then records stream back one per line, with
//! blank lines as keep-alives.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use super::record::decode_line;
use super::{FeedConnector, FeedEvent};
use crate::track::FilterSpec;

/// Connects to a feed endpoint over TCP.
///
/// Each `connect` call dials the endpoint afresh, subscribes with the
/// filter, emits [`FeedEvent::Start`], and then pumps records until the
/// connection ends.
#[derive(Debug, Clone)]
pub struct TcpFeed {
    addr: String,
}

impl TcpFeed {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

impl FeedConnector for TcpFeed {
    fn connect(&self, filter: &FilterSpec, events: mpsc::Sender<FeedEvent>) -> JoinHandle<()> {
        let addr = self.addr.clone();
        let filter = filter.clone();

        tokio::spawn(async move {
            let mut stream = match TcpStream::connect(&addr).await {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = events
                        .send(FeedEvent::Error(format!("connect {}: {}", addr, e)))
                        .await;
                    return;
                }
            };

            let subscribe = match serde_json::to_string(&filter) {
                Ok(line) => line,
                Err(e) => {
                    let _ = events
                        .send(FeedEvent::Error(format!("encode filter: {}", e)))
                        .await;
                    return;
                }
            };
            if let Err(e) = stream.write_all(format!("{}\n", subscribe).as_bytes()).await {
                let _ = events
                    .send(FeedEvent::Error(format!("subscribe: {}", e)))
                    .await;
                return;
            }

            if events.send(FeedEvent::Start).await.is_err() {
                return;
            }
            pump_lines(BufReader::new(stream), events).await;
        })
    }

    fn description(&self) -> String {
        format!("tcp: {}", self.addr)
    }
}

/// Read newline-delimited records and push them as events until the
/// connection ends.
///
/// EOF maps to [`FeedEvent::End`] and read failures to [`FeedEvent::Error`].
/// Undecodable lines are logged and skipped without an event.
pub(crate) async fn pump_lines<R>(mut reader: R, events: mpsc::Sender<FeedEvent>)
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                let _ = events.send(FeedEvent::End).await;
                break;
            }
            Ok(_) => match decode_line(&line) {
                Ok(event) => {
                    if events.send(event).await.is_err() {
                        // Receiver gone: connection superseded
                        break;
                    }
                }
                Err(e) => {
                    warn!("undecodable feed line: {}", e);
                }
            },
            Err(e) => {
                let _ = events.send(FeedEvent::Error(format!("read: {}", e))).await;
                break;
            }
        }
    }
}
