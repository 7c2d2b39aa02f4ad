//! File logging example
//!
//! Demonstrates a rotating file transport next to the console, a per-transport
//! level gate and the built-in JSON formatter.
//!
//! Run with: cargo run --example file_logging

use chromalog::prelude::*;
use std::fs;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    println!("=== chromalog - File Logging Example ===\n");

    let dir = std::env::temp_dir().join("chromalog-file-logging");
    fs::create_dir_all(&dir).map_err(|e| LoggerError::io_operation("create_dir", dir.display().to_string(), e))?;

    let app_log = dir.join("application.log");
    let errors_log = dir.join("errors.jsonl");

    let logger = Logger::builder()
        .min_level(LogLevel::Debug)
        .transport(ConsoleTransport::new())
        .transport(FileTransport::new(
            FileTransportConfig::new(&app_log)
                .with_max_size(2 * 1024)
                .with_max_files(3),
        )?)
        .transport(FileTransport::new(
            FileTransportConfig::new(&errors_log).with_options(
                TransportOptions::new("errors")
                    .with_level(LogLevel::Error)
                    .with_format(JsonFormatter::new()),
            ),
        )?)
        .build()?;

    println!("1. Logging to console and files:");
    logger.info("Application started").await;
    logger.debug("Loading configuration...").await;
    logger.warn("Using default settings for some options").await;
    logger.error("Failed to load optional plugin").await;

    println!("\n2. Writing enough lines to rotate application.log:");
    for i in 0..100 {
        // Fire and forget; the file writer keeps call order
        drop(logger.debug(format!("Processing item {}", i)));
    }

    logger.end().await?;

    println!("\n3. Files in {}:", dir.display());
    let mut names: Vec<_> = fs::read_dir(&dir)
        .map_err(|e| LoggerError::io_operation("read_dir", dir.display().to_string(), e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    for name in names {
        println!("   - {}", name);
    }

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
