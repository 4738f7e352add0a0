use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::io::Cursor;

use framepress::compress::{HeaderDecoder, HeaderEncoder};
use framepress::frame::{ETHERNET_IPV4_TCP, ETHERNET_IPV6_TCP};

fn gen_data(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.push((s >> 33) as u8);
    }
    out
}

/// One flow with per-header churn in `churn` byte positions outside the
/// fast-path signature.
fn flow_headers(len: usize, count: usize, churn: usize, seed: u64) -> Vec<Vec<u8>> {
    let base = gen_data(len, seed);
    let mut headers = Vec::with_capacity(count);
    let mut s = seed;
    for _ in 0..count {
        let mut header = base.clone();
        for _ in 0..churn {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
            let offset = 38 + (s >> 33) as usize % (len - 38);
            header[offset] = (s >> 17) as u8;
        }
        headers.push(header);
    }
    headers
}

fn encode_all(headers: &[Vec<u8>]) -> Vec<u8> {
    let mut encoder = HeaderEncoder::new(Vec::new());
    for header in headers {
        encoder.encode(header).unwrap();
    }
    encoder.into_inner()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_throughput");
    let workloads = [
        ("ipv4_tcp_fast_path", flow_headers(ETHERNET_IPV4_TCP, 1024, 3, 7)),
        ("ipv6_tcp_fast_path", flow_headers(ETHERNET_IPV6_TCP, 1024, 3, 11)),
        ("slow_path_97_byte", flow_headers(97, 1024, 3, 13)),
    ];
    for (name, headers) in &workloads {
        let bytes: usize = headers.iter().map(Vec::len).sum();
        group.throughput(Throughput::Bytes(bytes as u64));
        group.bench_function(*name, |b| {
            b.iter(|| black_box(encode_all(headers)));
        });
    }
    group.finish();
}

fn bench_encode_identical(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_identical");
    let headers = vec![gen_data(ETHERNET_IPV4_TCP, 3); 1024];
    let bytes: usize = headers.iter().map(Vec::len).sum();
    group.throughput(Throughput::Bytes(bytes as u64));
    group.bench_function("last_records_only", |b| {
        b.iter(|| black_box(encode_all(&headers)));
    });
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_throughput");
    let headers = flow_headers(ETHERNET_IPV4_TCP, 1024, 3, 19);
    let stream = encode_all(&headers);
    let bytes: usize = headers.iter().map(Vec::len).sum();
    group.throughput(Throughput::Bytes(bytes as u64));
    group.bench_function("ipv4_tcp_fast_path", |b| {
        b.iter(|| {
            let mut decoder = HeaderDecoder::new(Cursor::new(&stream));
            let mut buf = [0u8; 255];
            for _ in 0..headers.len() {
                decoder.decode(&mut buf).unwrap();
            }
            black_box(buf);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_encode, bench_encode_identical, bench_decode);
criterion_main!(benches);
