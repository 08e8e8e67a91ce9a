//! Benchmarks for record serialisation and framing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use femtoship::{
    Level, LogRecord, SerializationFormat, SourceLocation,
    viewer_handler::serialise::encode_record_frame,
};

const MAX_FRAME: usize = 1 << 20;

fn sample_record(extra: usize) -> LogRecord {
    let mut record = LogRecord::new("bench.app.db", Level::Warning, "connection pool saturated")
        .with_location(SourceLocation::new("src/db/pool.rs", 214, "db::pool::acquire"));
    for i in 0..extra {
        record = record.with_metadata(format!("key{i}"), format!("value {i}"));
    }
    record
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_record_frame");
    for format in [SerializationFormat::MsgPack, SerializationFormat::Json] {
        for extra in [0usize, 16] {
            let record = sample_record(extra);
            group.bench_with_input(
                BenchmarkId::new(format.as_str(), extra),
                &record,
                |b, record| {
                    b.iter(|| {
                        encode_record_frame(black_box(record), format, MAX_FRAME)
                            .expect("encode succeeds")
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_encode);
criterion_main!(benches);
