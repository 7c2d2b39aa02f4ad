//! HTTP batching example
//!
//! Starts a local collector, then ships entries to it in batches. A batch is
//! sent when it fills up, when the idle timer fires, or on shutdown.
//!
//! Run with: cargo run --example http_batching

use axum::routing::post;
use axum::{Json, Router};
use chromalog::prelude::*;
use serde_json::Value;
use std::time::Duration;

async fn collect(Json(batch): Json<Vec<Value>>) -> &'static str {
    println!("   collector received {} entries", batch.len());
    for entry in &batch {
        println!("     {} {}", entry["level"], entry["message"]);
    }
    "ok"
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== chromalog - HTTP Batching Example ===\n");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|e| LoggerError::io_operation("bind", "127.0.0.1:0", e))?;
    let addr = listener
        .local_addr()
        .map_err(|e| LoggerError::io_operation("local_addr", "collector", e))?;
    tokio::spawn(async move {
        let router = Router::new().route("/logs", post(collect));
        if let Err(e) = axum::serve(listener, router).await {
            eprintln!("collector stopped: {}", e);
        }
    });

    let logger = Logger::builder()
        .context_field("host", "demo-1")
        .transport(HttpTransport::new(
            HttpTransportConfig::new(format!("http://{}/logs", addr))
                .with_header("X-Api-Key", "demo")
                .with_batch_size(3)
                .with_batch_timeout(Duration::from_millis(500)),
        )?)
        .build()?;

    println!("1. Three entries fill a batch:");
    logger.info("user signed in").await;
    logger.info("cart updated").await;
    logger.warn("payment retried").await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    println!("\n2. A lone entry is flushed by the idle timer:");
    logger.error("payment declined").await;
    tokio::time::sleep(Duration::from_millis(800)).await;

    println!("\n3. Shutdown sends whatever is pending:");
    logger.debug("session closed").await;
    logger.info("bye").await;
    logger.end().await?;

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
