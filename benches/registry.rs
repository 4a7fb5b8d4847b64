use criterion::{Criterion, criterion_group, criterion_main};
use logbytes::{Level, LogRecord, Registry, Sink, Stream};
use parking_lot::Mutex;
use std::hint::black_box;
use std::sync::Arc;

fn bench_lookup_existing(c: &mut Criterion) {
    let registry = Registry::new();
    let _logger = registry.logger("bench", Level::INFO).expect("logger");

    c.bench_function("Registry::logger (existing)", |b| {
        b.iter(|| {
            registry
                .logger(black_box("bench"), black_box(Level::INFO))
                .expect("lookup failed")
        });
    });
}

fn bench_lookup_by_name(c: &mut Criterion) {
    let registry = Registry::new();
    let _logger = registry.logger("bench", Level::INFO).expect("logger");

    c.bench_function("Registry::logger (level name)", |b| {
        b.iter(|| {
            registry
                .logger(black_box("bench"), black_box("warning"))
                .expect("lookup failed")
        });
    });
}

fn bench_stream_emit(c: &mut Criterion) {
    let registry = Registry::new();
    let buf = Arc::new(Mutex::new(Vec::new()));
    let sink = registry
        .stream_sink("bench", Level::INFO, Some(Stream::Writer(buf.clone())))
        .expect("sink");
    let record = LogRecord::new(Level::WARNING, "bench", "benchmark log message");

    c.bench_function("StreamSink::emit", |b| {
        b.iter(|| {
            sink.emit(black_box(&record)).expect("emit failed");
            buf.lock().clear();
        });
    });
}

fn bench_logger_fan_out(c: &mut Criterion) {
    let registry = Registry::new();
    let logger = registry.bare_logger("bench", Level::INFO).expect("logger");
    for name in ["a", "b", "c"] {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = registry
            .stream_sink(name, Level::INFO, Some(Stream::Writer(buf)))
            .expect("sink");
        logger.attach(&sink);
    }

    c.bench_function("Logger::emit (3 sinks)", |b| {
        b.iter(|| logger.info(black_box("fan out")).expect("emit failed"));
    });
}

criterion_group!(
    benches,
    bench_lookup_existing,
    bench_lookup_by_name,
    bench_stream_emit,
    bench_logger_fan_out,
);
criterion_main!(benches);
