//! # Printer Example
//!
//! One slow printer consumes a hot stream of lines.
//!
//! Shows:
//! - A push with no subscribers returns at once and the item is lost.
//! - `schedule` returns only after the printer is waiting for its first line.
//! - Each push waits until the printer has finished the previous line.
//! - `close` cancels the printer and ends the stream.
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example printer --features logging
//! ```

use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use streamvisor::{LogWriter, Observer, Streamer, StreamerConfig, TaskError, TaskFn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut cfg = StreamerConfig::default();
    cfg.grace = Duration::from_secs(2);

    let observers: Vec<Arc<dyn Observer>> = vec![Arc::new(LogWriter::new())];
    let streamer: Streamer<String> = Streamer::builder(cfg).with_observers(observers).build();

    streamer.push("no printers yet".to_string()).await;

    let mut lines = streamer.subscribe();
    let printer = streamer
        .schedule(TaskFn::new("printer", move |_ctx: CancellationToken| async move {
            while let Some(line) = lines.recv().await {
                println!("{line}");
                tokio::time::sleep(Duration::from_secs(1)).await;
                println!("sleepy item {line}");
            }
            Ok::<(), TaskError>(())
        }))
        .await;

    for line in ["foo", "bar", "foobar"] {
        streamer.push(line.to_string()).await;
    }

    println!("currently {:?}", streamer.stats());
    streamer.close().await?;
    println!("currently {:?}", streamer.stats());
    println!("printer outcome: {:?}", printer.outcome());

    // Let the observer worker drain its queue before exit.
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
