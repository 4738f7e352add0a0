use framepress::compress::{decompress_all, HeaderDecoder, HeaderEncoder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Three headers of one TCP flow: identical MACs and addresses, only the
    // sequence-number bytes move.
    let mut base = vec![0u8; 54];
    for (i, byte) in base.iter_mut().enumerate() {
        *byte = i as u8;
    }
    let mut second = base.clone();
    second[38] = 0xAA;
    let mut third = second.clone();
    third[39] = 0xBB;

    let mut encoder = HeaderEncoder::new(Vec::new());
    for header in [&base, &second, &third] {
        encoder.encode(header)?;
    }
    let stream = encoder.into_inner();

    let restored = decompress_all(&stream)?;
    assert_eq!(restored, [base.clone(), second, third]);

    let raw: usize = restored.iter().map(Vec::len).sum();
    println!(
        "encoded {} headers ({} bytes) into {} bytes",
        restored.len(),
        raw,
        stream.len()
    );

    // The same stream can also be drained with a small caller buffer.
    let mut decoder = HeaderDecoder::new(std::io::Cursor::new(stream));
    let mut buf = [0u8; 16];
    let mut reassembled = Vec::new();
    while reassembled.len() < base.len() {
        let n = decoder.decode(&mut buf)?;
        reassembled.extend_from_slice(&buf[..n]);
    }
    assert_eq!(reassembled, base);
    println!("partial reads reassembled the first header");

    Ok(())
}
