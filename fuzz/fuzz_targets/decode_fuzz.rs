#![no_main]
use libfuzzer_sys::fuzz_target;

use framepress::compress::HeaderDecoder;

fuzz_target!(|data: &[u8]| {
    // Feed the decoder arbitrary bytes. Malformed streams must only ever
    // produce errors, never a panic or an out-of-bounds access.
    if data.is_empty() {
        return;
    }
    let capacity = 1 + data[0] as usize; // 1..=256
    let stream = &data[1..];

    let mut decoder =
        HeaderDecoder::with_capacity(std::io::Cursor::new(stream), capacity).unwrap();
    let mut buf = [0u8; 255];
    loop {
        if decoder.get_ref().position() as usize >= stream.len() {
            break;
        }
        if decoder.decode(&mut buf).is_err() {
            break;
        }
    }
});
