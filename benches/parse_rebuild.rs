//! Benchmarks for WebM parsing and rebuilding.
//!
//! Runs over a synthetic streaming capture so results do not depend on
//! fixture files.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use webmend::{mend, parse_flatten, rebuild, simple_block, streaming_cluster, WebmWriter};

/// Build a capture with `clusters` clusters of `blocks` video frames each.
fn synthetic_capture(clusters: u32, blocks: u32) -> Vec<u8> {
    let writer = WebmWriter::new();
    let frame = vec![0xAB; 512];
    let mut capture = writer.ebml_header().expect("ebml header");
    capture.extend(writer.segment_start());
    capture.extend(writer.info().expect("info"));
    capture.extend(writer.tracks().expect("tracks"));
    for cluster in 0..clusters {
        capture.extend(streaming_cluster(cluster * 1000).expect("cluster"));
        for block in 0..blocks {
            let timecode = (block * 33) as i16;
            capture.extend(simple_block(1, timecode, &frame, block == 0).expect("block"));
        }
    }
    capture
}

fn bench_parse(c: &mut Criterion) {
    let capture = synthetic_capture(64, 30);
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(capture.len() as u64));
    group.bench_function("parse_flatten", |b| {
        b.iter(|| parse_flatten(black_box(&capture)).expect("parse"))
    });
    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let capture = synthetic_capture(64, 30);
    let elements = parse_flatten(&capture).expect("parse");
    let mut group = c.benchmark_group("rebuild");
    group.throughput(Throughput::Bytes(capture.len() as u64));
    group.bench_function("rebuild", |b| {
        b.iter(|| rebuild(black_box(&elements)).expect("rebuild"))
    });
    group.bench_function("mend", |b| {
        b.iter(|| mend(black_box(&capture)).expect("mend"))
    });
    group.finish();
}

criterion_group!(benches, bench_parse, bench_rebuild);
criterion_main!(benches);
