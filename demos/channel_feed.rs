//! Example: Driving the engine from an in-process feed
//!
//! This example demonstrates how to embed termwatch in your own application
//! by pushing feed events through a channel instead of connecting to a
//! network feed.
//!
//! This is useful when you want to:
//! - Count terms on records you already have in memory
//! - Bridge from another transport (websocket, message queue, etc.)
//! - Generate synthetic data for testing
//!
//! # Usage
//!
//! ```bash
//! cargo run --example channel_feed
//! ```

use std::io;
use std::time::Duration;

use termwatch::source::{ChannelFeed, FeedData, FeedEvent};
use termwatch::track::TrackedTerms;
use termwatch::{Engine, EngineConfig};
use tokio::time::sleep;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("Channel feed example");
    println!("Generating synthetic posts about \"rust\" and \"tokio\"...\n");

    // Create a channel feed - this returns both a sender and the connector
    let (tx, feed) = ChannelFeed::create("synthetic-posts");

    // Spawn a producer that scripts a short stream: a start signal, posts
    // every 300ms, and the occasional drop notice and keep-alive
    tokio::spawn(async move {
        let posts = [
            "rust makes systems programming fun",
            "async rust runs on tokio",
            "nothing to see in this one",
            "tokio schedules tasks cooperatively",
            "rust rust rust still counts once",
        ];

        let _ = tx.send(FeedEvent::Start).await;

        for (i, post) in posts.iter().cycle().take(30).enumerate() {
            let _ = tx
                .send(FeedEvent::Data(FeedData::Text(post.to_string())))
                .await;

            if i % 10 == 9 {
                let _ = tx.send(FeedEvent::Data(FeedData::Limit(i as u64))).await;
            }
            if i % 7 == 6 {
                let _ = tx.send(FeedEvent::Ping).await;
            }

            sleep(Duration::from_millis(300)).await;
        }
        // Dropping the sender ends the stream
    });

    let terms = TrackedTerms::new(["rust", "tokio"])?;
    let config = EngineConfig {
        update_interval: Duration::from_secs(1),
        timeout: Duration::from_secs(30),
        summary_rows: 5,
    };
    let (engine, handle) = Engine::new(config, terms, Box::new(feed), io::stdout());

    // Let it report for ten seconds, then stop and print the summary
    let run = tokio::spawn(engine.run());
    sleep(Duration::from_secs(10)).await;

    handle.stop();
    run.await??;
    Ok(())
}
