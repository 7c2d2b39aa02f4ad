//! Basic logger usage example
//!
//! Demonstrates the default console output, level gating, context, child
//! loggers, error expansion and timers.
//!
//! Run with: cargo run --example basic_usage

use chromalog::prelude::*;
use std::fmt;

#[derive(Debug)]
struct PoolExhausted;

impl fmt::Display for PoolExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connection pool exhausted")
    }
}

impl std::error::Error for PoolExhausted {}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    println!("=== chromalog - Basic Usage Example ===\n");

    println!("1. Default logger (no transports prints to stdout):");
    let logger = Logger::new();
    logger.debug("This is a debug message").await;
    logger.info("This is an info message").await;
    logger.warn("This is a warning message").await;
    logger.error("This is an error message").await;

    println!("\n2. Minimum level WARN - debug and info are gated:");
    let logger = Logger::builder()
        .min_level(LogLevel::Warn)
        .transport(ConsoleTransport::new())
        .build()?;
    logger.debug("Debug message (hidden)").await;
    logger.info("Info message (hidden)").await;
    logger.warn("Warning message (visible)").await;
    println!("   gated entries: {}", logger.metrics().gated_count());

    println!("\n3. Context and child loggers:");
    let logger = Logger::builder()
        .time_format("%H:%M:%S")
        .context_field("service", "billing")
        .custom_color(LogLevel::Info, Color::Magenta)
        .transport(ConsoleTransport::new())
        .build()?;
    logger.info("Service started").await;

    let request = logger.child(&LogContext::new().with_field("request_id", "req-42"));
    request.info("Handling request").await;
    request
        .warn_with_context("Slow upstream", &LogContext::new().with_field("latency_ms", 870))
        .await;

    println!("\n4. Errors and JSON payloads:");
    logger.error(LogMessage::error(&PoolExhausted)).await;
    let payload = serde_json::json!({ "invoice": 1001, "items": 3 });
    logger.info(LogMessage::json(&payload)).await;

    println!("\n5. Timers:");
    logger.time("startup");
    std::thread::sleep(std::time::Duration::from_millis(15));
    logger.time_end("startup").await;
    logger.time_end("never-started").await;

    logger.end().await?;

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
