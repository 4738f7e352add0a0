// End-to-end roundtrip coverage over generated header traffic.
//
// Headers are produced by a deterministic generator seeded per test, so the
// decode side can be checked by replaying the same generator instead of
// buffering the whole sequence.

use std::io::Cursor;

use framepress::compress::{HeaderDecoder, HeaderEncoder};
use framepress::frame::{
    ETHERNET_IPV4_TCP, ETHERNET_IPV4_UDP, ETHERNET_IPV6_TCP, ETHERNET_IPV6_UDP,
};

// ---------------------------------------------------------------------------
// Deterministic traffic generator
// ---------------------------------------------------------------------------

struct Lcg(u64);

impl Lcg {
    fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }
}

/// Evolving set of flows: each call picks a flow, mutates a few of its
/// bytes, and returns a copy, mimicking sequence/checksum churn on a link.
struct HeaderGen {
    rng: Lcg,
    flows: Vec<Vec<u8>>,
}

impl HeaderGen {
    fn new(seed: u64) -> Self {
        let mut rng = Lcg(seed);
        let lengths = [
            ETHERNET_IPV4_TCP,
            ETHERNET_IPV4_UDP,
            ETHERNET_IPV6_TCP,
            ETHERNET_IPV6_UDP,
            // odd shapes that only the slow search can serve
            23,
            96,
            200,
        ];
        let mut flows = Vec::new();
        for &len in &lengths {
            for _ in 0..2 {
                let mut flow = vec![0u8; len];
                for byte in flow.iter_mut() {
                    *byte = rng.next_u32() as u8;
                }
                flows.push(flow);
            }
        }
        Self { rng, flows }
    }

    fn next(&mut self) -> Vec<u8> {
        let index = self.rng.next_u32() as usize % self.flows.len();
        let len = self.flows[index].len();
        let mutations = self.rng.next_u32() % 4;
        for _ in 0..mutations {
            let offset = self.rng.next_u32() as usize % len;
            let value = self.rng.next_u32() as u8;
            self.flows[index][offset] = value;
        }
        self.flows[index].clone()
    }
}

fn roundtrip(capacity: usize, count: usize, seed: u64) {
    let mut gen = HeaderGen::new(seed);
    let mut encoder = HeaderEncoder::with_capacity(Vec::new(), capacity).unwrap();
    for _ in 0..count {
        let header = gen.next();
        assert_eq!(encoder.encode(&header).unwrap(), header.len());
    }
    let stream = encoder.into_inner();

    let mut gen = HeaderGen::new(seed);
    let mut decoder = HeaderDecoder::with_capacity(Cursor::new(stream), capacity).unwrap();
    let mut buf = [0u8; 255];
    for i in 0..count {
        let expected = gen.next();
        let n = decoder.decode(&mut buf).unwrap();
        assert_eq!(&buf[..n], &expected[..], "header {i} of {count}");
    }
}

// ---------------------------------------------------------------------------
// Roundtrip grid
// ---------------------------------------------------------------------------

#[test]
fn roundtrip_single_header() {
    for capacity in [1, 16, 256] {
        roundtrip(capacity, 1, 0xC0FFEE + capacity as u64);
    }
}

#[test]
fn roundtrip_mixed_traffic() {
    for capacity in [1, 16, 256] {
        roundtrip(capacity, 1024, 0xBEEF + capacity as u64);
    }
}

#[test]
fn roundtrip_soak_half_million_headers() {
    for capacity in [1, 16, 256] {
        roundtrip(capacity, 512 * 1024, 0xFEED + capacity as u64);
    }
}

#[test]
fn repetitive_traffic_compresses_well() {
    let mut gen = HeaderGen::new(42);
    let mut encoder = HeaderEncoder::new(Vec::new());
    let mut raw = 0usize;
    for _ in 0..4096 {
        let header = gen.next();
        raw += header.len();
        encoder.encode(&header).unwrap();
    }
    let compressed = encoder.into_inner().len();
    assert!(
        compressed * 4 < raw,
        "expected at least 4:1 on flow traffic, got {compressed}/{raw}"
    );
}

// ---------------------------------------------------------------------------
// Cache behavior over whole streams
// ---------------------------------------------------------------------------

#[test]
fn eviction_forgets_the_oldest_flow() {
    // four distinct 20-byte headers fill a capacity-4 cache; a fifth evicts
    // the first, so re-encoding the first is a fresh AddDict
    let headers: Vec<Vec<u8>> = (0..5u8).map(|i| vec![i * 50; 20]).collect();
    let mut encoder = HeaderEncoder::with_capacity(Vec::new(), 4).unwrap();
    for header in &headers {
        encoder.encode(header).unwrap();
    }
    let before = encoder.get_ref().len();
    encoder.encode(&headers[0]).unwrap();
    let record = &encoder.get_ref()[before..];
    assert_eq!(record[0], 0x01, "evicted header must re-enter as AddDict");

    // the most recent four are still hits
    for header in headers[2..].iter().rev() {
        let before = encoder.get_ref().len();
        encoder.encode(header).unwrap();
        assert_ne!(encoder.get_ref()[before], 0x01, "recent header was evicted");
    }
}

#[test]
fn decoder_tracks_encoder_eviction() {
    // interleave five flows through a capacity-2 codec pair; indices in the
    // stream stay in range and the roundtrip holds
    let flows: Vec<Vec<u8>> = (0..5u8).map(|i| vec![i.wrapping_mul(37); 33]).collect();
    let mut headers = Vec::new();
    for round in 0..40usize {
        let mut header = flows[round % 5].clone();
        header[32] = round as u8;
        headers.push(header);
    }

    let mut encoder = HeaderEncoder::with_capacity(Vec::new(), 2).unwrap();
    for header in &headers {
        encoder.encode(header).unwrap();
    }
    let stream = encoder.into_inner();

    let mut decoder = HeaderDecoder::with_capacity(Cursor::new(stream), 2).unwrap();
    let mut buf = [0u8; 255];
    for expected in &headers {
        let n = decoder.decode(&mut buf).unwrap();
        assert_eq!(&buf[..n], &expected[..]);
    }
}
