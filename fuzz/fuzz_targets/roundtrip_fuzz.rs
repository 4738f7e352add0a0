#![no_main]
use libfuzzer_sys::fuzz_target;

use framepress::compress::{HeaderDecoder, HeaderEncoder};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let capacity = 1 + data[0] as usize; // 1..=256
    let mut rest = &data[1..];

    // Chunk the payload into headers of 1..=255 bytes, each chunk length
    // taken from the input itself.
    let mut headers: Vec<&[u8]> = Vec::new();
    while rest.len() >= 2 {
        let len = (rest[0] as usize % 255) + 1;
        rest = &rest[1..];
        let take = len.min(rest.len());
        if take == 0 {
            break;
        }
        headers.push(&rest[..take]);
        rest = &rest[take..];
    }
    if headers.is_empty() {
        return;
    }

    let mut encoder = HeaderEncoder::with_capacity(Vec::new(), capacity).unwrap();
    for header in &headers {
        assert_eq!(encoder.encode(header).unwrap(), header.len());
    }
    let stream = encoder.into_inner();

    // Decode and verify the exact header sequence comes back.
    let mut decoder =
        HeaderDecoder::with_capacity(std::io::Cursor::new(stream), capacity).unwrap();
    let mut buf = [0u8; 255];
    for header in &headers {
        let n = decoder.decode(&mut buf).unwrap();
        assert_eq!(&buf[..n], *header);
    }
});
