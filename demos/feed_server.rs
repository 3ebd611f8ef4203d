//! Example: A toy feed server speaking the termwatch wire protocol
//!
//! Serves newline-delimited JSON records to any connected termwatch
//! instance: the first line received on a connection is the subscribe
//! filter, and the records sent back mention the filtered terms so the
//! counters move.
//!
//! # Usage
//!
//! Start the server:
//!
//! ```bash
//! cargo run --example feed_server -- 127.0.0.1:9090
//! ```
//!
//! Then point termwatch at it:
//!
//! ```bash
//! cargo run -- --connect 127.0.0.1:9090 1 rust tokio
//! ```

use std::env;
use std::time::Duration;

use termwatch::track::FilterSpec;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::sleep;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let addr = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example feed_server -- <host:port>");
        eprintln!();
        eprintln!("Example: cargo run --example feed_server -- 127.0.0.1:9090");
        std::process::exit(1);
    });

    let listener = TcpListener::bind(&addr).await?;
    println!("Feed server listening on {}", addr);

    loop {
        let (socket, peer) = listener.accept().await?;
        println!("Subscriber connected from {}", peer);

        tokio::spawn(async move {
            if let Err(e) = serve(socket).await {
                eprintln!("Connection from {} closed: {}", peer, e);
            }
        });
    }
}

/// Read the subscribe filter, then emit records forever: one post per
/// tracked term each round, a keep-alive blank line between rounds, and an
/// occasional drop notice.
async fn serve(socket: TcpStream) -> anyhow::Result<()> {
    let (read_half, mut write_half) = socket.into_split();

    let mut lines = BufReader::new(read_half);
    let mut subscribe = String::new();
    lines.read_line(&mut subscribe).await?;
    let filter: FilterSpec = serde_json::from_str(subscribe.trim())?;
    println!("Tracking {:?}", filter.track);

    let mut round = 0u64;
    loop {
        round += 1;

        for term in &filter.track {
            // Skip terms on some rounds so the counts vary
            if (round + term.len() as u64) % 3 == 0 {
                continue;
            }
            let record = serde_json::json!({
                "text": format!("synthetic post number {} about {}", round, term),
            });
            write_half
                .write_all(format!("{}\n", record).as_bytes())
                .await?;
        }

        if round % 5 == 0 {
            let record = serde_json::json!({ "limit": { "track": round / 5 } });
            write_half
                .write_all(format!("{}\n", record).as_bytes())
                .await?;
        }

        // Blank line keep-alive
        write_half.write_all(b"\n").await?;

        sleep(Duration::from_millis(400)).await;
    }
}
