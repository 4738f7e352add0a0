// Streaming header decoder.
//
// HeaderDecoder parses exactly one wire record per call and replays the
// encoder's cache mutations, reconstructing each header byte-for-byte.
// Reconstructions larger than the caller's buffer are parked in a remainder
// buffer and drained by subsequent calls before any new record is parsed.
//
// Every field read is read-exactly: end-of-stream in the middle of a record
// is an error carrying the name of the missing field. Malformed input only
// ever produces errors, never a panic.

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use crate::wire::{CMD_ADD_DICT, CMD_DATA, CMD_LAST, CMD_PREV, MAX_DICTIONARIES, MAX_HEADER_SIZE};

use super::dictionary::DictCache;
use super::{validate_capacity, ConfigError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for the decoding side.
///
/// Everything except `BufferTooLarge` latches: the stream position is no
/// longer trustworthy after a failed record, so the instance is poisoned
/// and must be discarded.
#[derive(Debug, Clone)]
pub enum DecodeError {
    /// A read from the source failed or ended mid-record.
    Io {
        /// The field being read when the source failed.
        context: &'static str,
        source: Arc<io::Error>,
    },
    /// Caller buffer exceeds [`MAX_HEADER_SIZE`] bytes.
    BufferTooLarge(usize),
    /// Command byte outside `1..=4`.
    InvalidCommand(u8),
    /// AddDict record with a zero size field.
    EmptyDictionary,
    /// Record references an unoccupied or out-of-range dictionary slot.
    InvalidDictIndex(u8),
    /// Data record carries more pairs than the dictionary has bytes.
    InvalidPairCount(u8),
    /// Data pair offset beyond the end of the dictionary.
    InvalidPairOffset(u8),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { context, source } => write!(f, "failed to read {context}: {source}"),
            Self::BufferTooLarge(n) => {
                write!(f, "read buffer too large: {n} bytes (max {MAX_HEADER_SIZE})")
            }
            Self::InvalidCommand(cmd) => write!(f, "invalid decompress command: {cmd}"),
            Self::EmptyDictionary => write!(f, "read empty dictionary"),
            Self::InvalidDictIndex(index) => {
                write!(f, "read invalid dictionary index: {index}")
            }
            Self::InvalidPairCount(count) => {
                write!(f, "read invalid changed data size: {count}")
            }
            Self::InvalidPairOffset(offset) => {
                write!(f, "invalid changed data index: {offset}")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

fn read_field<R: Read>(
    source: &mut R,
    buf: &mut [u8],
    context: &'static str,
) -> Result<(), DecodeError> {
    source.read_exact(buf).map_err(|e| DecodeError::Io {
        context,
        source: Arc::new(e),
    })
}

// ---------------------------------------------------------------------------
// HeaderDecoder
// ---------------------------------------------------------------------------

/// Streaming header decoder.
///
/// The counterpart of [`HeaderEncoder`](super::HeaderEncoder); must be
/// constructed with the same dictionary capacity as the encoder that
/// produced the stream.
///
/// # Example
/// ```
/// use framepress::compress::{HeaderDecoder, HeaderEncoder};
///
/// let mut encoder = HeaderEncoder::new(Vec::new());
/// encoder.encode(&[7; 30]).unwrap();
/// let stream = encoder.into_inner();
///
/// let mut decoder = HeaderDecoder::new(std::io::Cursor::new(stream));
/// let mut buf = [0u8; 255];
/// let n = decoder.decode(&mut buf).unwrap();
/// assert_eq!(&buf[..n], &[7; 30][..]);
/// ```
pub struct HeaderDecoder<R: Read> {
    source: R,
    cache: DictCache,
    last: Vec<u8>,
    byte: [u8; 1],
    pairs: [u8; 2 * MAX_HEADER_SIZE],
    remainder: Vec<u8>,
    err: Option<DecodeError>,
}

impl<R: Read> HeaderDecoder<R> {
    /// Create a decoder with the full 256-slot dictionary cache.
    pub fn new(source: R) -> Self {
        Self::build(source, MAX_DICTIONARIES)
    }

    /// Create a decoder with a custom dictionary capacity in `1..=256`.
    pub fn with_capacity(source: R, capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self::build(source, validate_capacity(capacity)?))
    }

    fn build(source: R, capacity: usize) -> Self {
        Self {
            source,
            cache: DictCache::new(capacity),
            last: Vec::with_capacity(MAX_HEADER_SIZE),
            byte: [0],
            pairs: [0; 2 * MAX_HEADER_SIZE],
            remainder: Vec::new(),
            err: None,
        }
    }

    /// Decode up to `buf.len()` bytes of the next reconstructed header.
    ///
    /// Bytes left over from a reconstruction larger than the caller's
    /// buffer are returned by the following call(s); a new record is only
    /// parsed once the remainder is drained. An empty `buf` is a no-op
    /// returning 0; a `buf` longer than [`MAX_HEADER_SIZE`] is rejected
    /// without consuming input.
    pub fn decode(&mut self, buf: &mut [u8]) -> Result<usize, DecodeError> {
        if buf.is_empty() {
            return Ok(0);
        }
        if buf.len() > MAX_HEADER_SIZE {
            return Err(DecodeError::BufferTooLarge(buf.len()));
        }
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        match self.read_record(buf) {
            Ok(n) => Ok(n),
            Err(err) => {
                self.err = Some(err.clone());
                Err(err)
            }
        }
    }

    fn read_record(&mut self, buf: &mut [u8]) -> Result<usize, DecodeError> {
        // bytes still owed from the previous reconstruction
        if !self.remainder.is_empty() {
            let n = buf.len().min(self.remainder.len());
            buf[..n].copy_from_slice(&self.remainder[..n]);
            self.remainder.drain(..n);
            return Ok(n);
        }

        let cmd = self.read_byte("decompress command")?;
        match cmd {
            CMD_ADD_DICT => self.read_add_dict()?,
            CMD_DATA => self.read_changed_data()?,
            CMD_LAST => {}
            CMD_PREV => self.read_previous()?,
            _ => return Err(DecodeError::InvalidCommand(cmd)),
        }

        // every handler leaves the reconstruction in `last`
        let n = buf.len().min(self.last.len());
        buf[..n].copy_from_slice(&self.last[..n]);
        self.remainder.extend_from_slice(&self.last[n..]);
        Ok(n)
    }

    fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        read_field(&mut self.source, &mut self.byte, context)?;
        Ok(self.byte[0])
    }

    fn read_add_dict(&mut self) -> Result<(), DecodeError> {
        let size = self.read_byte("dictionary size")? as usize;
        if size == 0 {
            return Err(DecodeError::EmptyDictionary);
        }
        let mut dict = vec![0u8; size];
        read_field(&mut self.source, &mut dict, "dictionary data")?;
        self.last.clear();
        self.last.extend_from_slice(&dict);
        self.cache.insert_front(&dict);
        Ok(())
    }

    fn read_changed_data(&mut self) -> Result<(), DecodeError> {
        let index = self.read_byte("dictionary index")?;
        let dict_len = match self.cache.get(index as usize) {
            Some(dict) => dict.len(),
            None => return Err(DecodeError::InvalidDictIndex(index)),
        };
        let count = self.read_byte("the number of changed data")?;
        if count as usize > dict_len {
            return Err(DecodeError::InvalidPairCount(count));
        }
        let len = 2 * count as usize;
        read_field(&mut self.source, &mut self.pairs[..len], "changed data")?;

        let dict = self
            .cache
            .get_mut(index as usize)
            .ok_or(DecodeError::InvalidDictIndex(index))?;
        for pair in self.pairs[..len].chunks_exact(2) {
            let (offset, value) = (pair[0], pair[1]);
            match dict.get_mut(offset as usize) {
                Some(slot) => *slot = value,
                None => return Err(DecodeError::InvalidPairOffset(offset)),
            }
        }
        self.last.clear();
        self.last.extend_from_slice(dict);
        self.cache.promote(index as usize);
        Ok(())
    }

    fn read_previous(&mut self) -> Result<(), DecodeError> {
        let index = self.read_byte("dictionary index")?;
        let dict = match self.cache.get(index as usize) {
            Some(dict) => dict,
            None => return Err(DecodeError::InvalidDictIndex(index)),
        };
        self.last.clear();
        self.last.extend_from_slice(dict);
        self.cache.promote(index as usize);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Dictionary capacity this decoder was built with.
    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// MRU-ordered view of the dictionary slots.
    pub fn dictionaries(&self) -> &[Vec<u8>] {
        self.cache.slots()
    }

    /// Reference to the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Mutable reference to the underlying source.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source
    }

    /// Consume the decoder, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }
}

// ---------------------------------------------------------------------------
// Convenience function
// ---------------------------------------------------------------------------

/// Decode an in-memory stream to completion, one header per record, using
/// the full 256-slot dictionary cache.
pub fn decompress_all(stream: &[u8]) -> Result<Vec<Vec<u8>>, DecodeError> {
    let mut decoder = HeaderDecoder::new(io::Cursor::new(stream));
    let mut headers = Vec::new();
    let mut buf = [0u8; MAX_HEADER_SIZE];
    while (decoder.get_ref().position() as usize) < stream.len() || !decoder.remainder.is_empty() {
        let n = decoder.decode(&mut buf)?;
        headers.push(buf[..n].to_vec());
    }
    Ok(headers)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
