//! Benchmark – `bytescan::HeaderParser`, `bytescan::BodyParser` and
//! `bytescan::GlobMatcher`
#![allow(missing_docs)]

use std::{fmt::Write, time::Duration};

use bytescan::{BodyParser, GlobMatcher, HeaderParser, produce_chunks};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// A request head with `fields` header lines, ending in the blank line.
fn make_request_head(fields: usize) -> Vec<u8> {
    let mut s = String::from("POST /upload?id=42 HTTP/1.1\r\n");
    for i in 0..fields {
        writeln!(s, "X-Field-{i}: value-{i}-abcdefghijklmnopqrstuvwxyz\r").unwrap();
    }
    s.push_str("\r\n");
    s.into_bytes()
}

/// A multipart body with one file part of `content_len` bytes.
fn make_multipart(content_len: usize) -> Vec<u8> {
    let mut body = b"--bench0boundary\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"blob.bin\"\r\n\
Content-Type: application/octet-stream\r\n\r\n"
        .to_vec();
    body.extend((0..content_len).map(|i| b"ab\r\n-"[i % 5]));
    body.extend_from_slice(b"\r\n--bench0boundary--\r\n");
    body
}

/// Feeds `payload` in `parts` chunks and returns the number of fields parsed
/// so Criterion cannot optimise the work away.
fn run_header_parser(payload: &[u8], parts: usize) -> usize {
    let mut parser = HeaderParser::new();
    for chunk in produce_chunks(payload, parts) {
        if parser.parse(chunk).expect("bench head is valid") {
            break;
        }
    }
    parser.header().fields.len()
}

fn run_body_parser(payload: &[u8], parts: usize) -> usize {
    let mut parser = BodyParser::new();
    for chunk in produce_chunks(payload, parts) {
        if parser.parse(chunk).expect("bench body is valid") {
            break;
        }
    }
    parser.body().files.values().map(|file| file.data.len()).sum()
}

fn bench_header_parser(c: &mut Criterion) {
    let payload = make_request_head(200);

    let mut group = c.benchmark_group("header_parser_split");
    for &parts in &[1usize, 100, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(parts), &parts, |b, &p| {
            b.iter(|| black_box(run_header_parser(black_box(&payload), p)));
        });
    }
    group.finish();
}

fn bench_body_parser(c: &mut Criterion) {
    let payload = make_multipart(100_000);

    let mut group = c.benchmark_group("multipart_split");
    for &parts in &[1usize, 100, 5_000] {
        group.bench_with_input(BenchmarkId::from_parameter(parts), &parts, |b, &p| {
            b.iter(|| black_box(run_body_parser(black_box(&payload), p)));
        });
    }
    group.finish();
}

fn bench_glob(c: &mut Criterion) {
    let paths: Vec<String> = (0..1_000)
        .map(|i| format!("src/module_{}/file_{i}.{}", i % 17, ["rs", "toml", "md"][i % 3]))
        .collect();

    let mut group = c.benchmark_group("glob_match");
    for pattern in ["src/*/*.rs", "src/module_[0-9]/*.{rs,md}", "*file_9??.*"] {
        let glob = GlobMatcher::parse(pattern).expect("bench pattern is valid");
        group.bench_with_input(BenchmarkId::from_parameter(pattern), &glob, |b, glob| {
            b.iter(|| {
                let hits = paths
                    .iter()
                    .filter(|path| glob.is_match(black_box(path.as_bytes())))
                    .count();
                black_box(hits);
            });
        });
    }
    group.finish();
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(3))
            .measurement_time(Duration::from_secs(5));
    }
    c
}

criterion_group! {
    name = benches;
    config = criterion();
    targets = bench_header_parser, bench_body_parser, bench_glob
}
criterion_main!(benches);
