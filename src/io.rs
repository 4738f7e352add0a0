// File-oriented helpers for header stream compression.
//
// The raw side of the codec has no record boundaries of its own, so files
// use a length-prefixed container: each header is stored as `len:u8` followed
// by `len` bytes, matching the one-byte length convention of the wire format.
// `compress_file()` turns such a container into a codec stream;
// `decompress_file()` reverses it. Optionally computes a streaming SHA-256
// of the container bytes (feature-gated behind `file-io`) so the two sides
// can be compared end-to-end.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::compress::{ConfigError, DecodeError, EncodeError, HeaderDecoder, HeaderEncoder};
use crate::wire::MAX_HEADER_SIZE;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `compress_file()`.
#[derive(Debug, Clone)]
pub struct CompressStats {
    /// Number of headers compressed.
    pub headers: u64,
    /// Container input size in bytes.
    pub raw_size: u64,
    /// Codec stream output size in bytes.
    pub compressed_size: u64,
    /// SHA-256 of the container bytes (if the `file-io` feature is enabled).
    pub raw_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `decompress_file()`.
#[derive(Debug, Clone)]
pub struct DecompressStats {
    /// Number of headers reconstructed.
    pub headers: u64,
    /// Codec stream input size in bytes.
    pub compressed_size: u64,
    /// Container output size in bytes.
    pub raw_size: u64,
    /// SHA-256 of the container bytes (if the `file-io` feature is enabled).
    pub raw_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file operations.
#[derive(Debug)]
pub enum IoError {
    /// I/O error (file open, read, write).
    Io(io::Error),
    /// Invalid dictionary capacity.
    Config(ConfigError),
    /// Header compression error.
    Encode(EncodeError),
    /// Stream decoding error.
    Decode(DecodeError),
    /// Malformed length-prefixed container.
    Container(String),
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::Encode(e) => write!(f, "compress error: {e}"),
            Self::Decode(e) => write!(f, "decompress error: {e}"),
            Self::Container(msg) => write!(f, "container error: {msg}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Encode(e) => Some(e),
            Self::Decode(e) => Some(e),
            Self::Container(_) => None,
        }
    }
}

impl From<io::Error> for IoError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ConfigError> for IoError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<EncodeError> for IoError {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

impl From<DecodeError> for IoError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// compress_file
// ---------------------------------------------------------------------------

/// Compress a length-prefixed header container into a codec stream.
///
/// The input is streamed through a `BufReader`, the output through a
/// `BufWriter`; one encoder of capacity `dictionaries` lives for the whole
/// file. When the `file-io` feature is enabled, a SHA-256 of the container
/// bytes is computed as they flow through.
pub fn compress_file(
    input_path: &Path,
    output_path: &Path,
    dictionaries: usize,
) -> Result<CompressStats, IoError> {
    let input = File::open(input_path)?;
    let raw_size = input.metadata()?.len();
    let mut reader = BufReader::with_capacity(BUF_SIZE, input);

    let writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    let mut encoder = HeaderEncoder::with_capacity(writer, dictionaries)?;

    #[cfg(feature = "file-io")]
    let mut hasher = sha2::Sha256::new();

    let mut headers = 0u64;
    let mut len_byte = [0u8; 1];
    let mut header = [0u8; MAX_HEADER_SIZE];
    loop {
        if reader.read(&mut len_byte)? == 0 {
            break;
        }
        let len = len_byte[0] as usize;
        if len == 0 {
            return Err(IoError::Container(format!(
                "zero-length header at record {headers}"
            )));
        }
        reader.read_exact(&mut header[..len])?;
        #[cfg(feature = "file-io")]
        {
            hasher.update(len_byte);
            hasher.update(&header[..len]);
        }
        encoder.encode(&header[..len])?;
        headers += 1;
    }

    let compressed_size = encoder
        .into_inner()
        .into_inner()
        .map_err(|e| e.into_error())?
        .metadata()?
        .len();

    #[cfg(feature = "file-io")]
    let raw_sha256 = Some(hasher.finalize().into());
    #[cfg(not(feature = "file-io"))]
    let raw_sha256: Option<[u8; 32]> = None;

    Ok(CompressStats {
        headers,
        raw_size,
        compressed_size,
        raw_sha256,
    })
}

// ---------------------------------------------------------------------------
// decompress_file
// ---------------------------------------------------------------------------

/// Decompress a codec stream back into a length-prefixed header container.
pub fn decompress_file(
    input_path: &Path,
    output_path: &Path,
    dictionaries: usize,
) -> Result<DecompressStats, IoError> {
    let input = File::open(input_path)?;
    let compressed_size = input.metadata()?.len();
    let reader = BufReader::with_capacity(BUF_SIZE, input);
    let mut decoder = HeaderDecoder::with_capacity(reader, dictionaries)?;

    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);

    #[cfg(feature = "file-io")]
    let mut hasher = sha2::Sha256::new();

    let mut headers = 0u64;
    let mut raw_size = 0u64;
    let mut buf = [0u8; MAX_HEADER_SIZE];
    loop {
        if decoder.get_mut().fill_buf()?.is_empty() {
            break;
        }
        let n = decoder.decode(&mut buf)?;
        if n == 0 {
            return Err(IoError::Container(format!(
                "empty reconstruction at record {headers}"
            )));
        }
        let mut record = Vec::with_capacity(1 + n);
        record.push(n as u8);
        record.extend_from_slice(&buf[..n]);
        #[cfg(feature = "file-io")]
        hasher.update(&record);
        writer.write_all(&record)?;
        headers += 1;
        raw_size += record.len() as u64;
    }

    writer.flush()?;

    #[cfg(feature = "file-io")]
    let raw_sha256 = Some(hasher.finalize().into());
    #[cfg(not(feature = "file-io"))]
    let raw_sha256: Option<[u8; 32]> = None;

    Ok(DecompressStats {
        headers,
        compressed_size,
        raw_size,
        raw_sha256,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
