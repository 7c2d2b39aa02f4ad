//! Criterion benchmarks for chromalog

use chromalog::core::{colorize, delivered, strip_ansi, Components, Delivery, LogTemplate};
use chromalog::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;

struct Discard;

impl Transport for Discard {
    fn name(&self) -> &str {
        "discard"
    }

    fn write(&self, entry: &Arc<LogEntry>) -> Delivery {
        black_box(entry.formatted_message.len());
        delivered()
    }
}

// ============================================================================
// Template Benchmarks
// ============================================================================

fn bench_template(c: &mut Criterion) {
    let mut group = c.benchmark_group("template");
    group.throughput(Throughput::Elements(1));

    let template = LogTemplate::default();
    let full = Components {
        level: "\x1b[36mINFO\x1b[0m",
        timestamp: "[12:00:00]",
        file_name: "[main.rs:42]",
        context: "{\"service\":\"api\"}",
        message: "request handled",
    };
    let sparse = Components {
        level: "INFO",
        message: "request handled",
        ..Components::default()
    };

    group.bench_function("parse", |b| {
        b.iter(|| LogTemplate::parse(black_box("{level} {timestamp} {fileName} {context} {message}")));
    });

    group.bench_function("render_all_components", |b| {
        b.iter(|| template.render(black_box(&full)));
    });

    group.bench_function("render_missing_components", |b| {
        b.iter(|| template.render(black_box(&sparse)));
    });

    group.finish();
}

// ============================================================================
// Logging Benchmarks
// ============================================================================

fn bench_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("logging");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::builder()
        .min_level(LogLevel::Info)
        .transport(Discard)
        .build()
        .unwrap();

    group.bench_function("gated", |b| {
        b.iter(|| drop(logger.debug(black_box("filtered out"))));
    });

    group.bench_function("text", |b| {
        b.iter(|| drop(logger.info(black_box("request handled"))));
    });

    let context = LogContext::new()
        .with_field("request_id", 42)
        .with_field("route", "/users");
    group.bench_function("with_context", |b| {
        b.iter(|| drop(logger.info_with_context(black_box("request handled"), &context)));
    });

    let child = logger.child(&LogContext::new().with_field("component", "db"));
    group.bench_function("child", |b| {
        b.iter(|| drop(child.warn(black_box("slow query"))));
    });

    let payload = serde_json::json!({ "user": { "id": 7, "roles": ["admin", "ops"] } });
    group.bench_function("json_payload", |b| {
        b.iter(|| drop(logger.info(LogMessage::json(black_box(&payload)))));
    });

    group.finish();
}

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out");

    for count in [1usize, 4, 16] {
        let mut builder = Logger::builder().show_timestamp(false);
        for _ in 0..count {
            builder = builder.transport(Discard);
        }
        let logger = builder.build().unwrap();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("transports_{}", count), |b| {
            b.iter(|| drop(logger.info(black_box("fan out"))));
        });
    }

    group.finish();
}

// ============================================================================
// Formatter Benchmarks
// ============================================================================

fn bench_formatters(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatters");
    group.throughput(Throughput::Elements(1));

    let entry = LogEntry::new(LogLevel::Warn, "disk almost full")
        .with_context(LogContext::new().with_field("mount", "/var"))
        .with_file_name("[disk.rs:10]");

    let simple = SimpleFormatter::default();
    let json = JsonFormatter::new();
    let pretty = PrettyFormatter::default();

    group.bench_function("simple", |b| b.iter(|| simple.format(black_box(&entry))));
    group.bench_function("json", |b| b.iter(|| json.format(black_box(&entry))));
    group.bench_function("pretty", |b| b.iter(|| pretty.format(black_box(&entry))));

    group.finish();
}

// ============================================================================
// ANSI Benchmarks
// ============================================================================

fn bench_ansi(c: &mut Criterion) {
    let mut group = c.benchmark_group("ansi");

    let colored = format!(
        "{} [12:00:00] {}",
        colorize("ERROR", Color::Red),
        colorize("connection reset by peer", Color::Yellow)
    );
    let plain = "ERROR [12:00:00] connection reset by peer";

    group.throughput(Throughput::Bytes(colored.len() as u64));
    group.bench_function("strip_colored", |b| b.iter(|| strip_ansi(black_box(&colored))));

    group.throughput(Throughput::Bytes(plain.len() as u64));
    group.bench_function("strip_plain", |b| b.iter(|| strip_ansi(black_box(plain))));

    group.finish();
}

criterion_group!(
    benches,
    bench_template,
    bench_logging,
    bench_fan_out,
    bench_formatters,
    bench_ansi,
);
criterion_main!(benches);
