// Streaming header encoder.
//
// HeaderEncoder turns each submitted header into exactly one wire record:
//   - Last    when the header equals the previous emission
//   - AddDict on a dictionary miss
//   - Data / Prev on a hit, after rewriting the dictionary in place
//
// Dictionary selection dispatches on header length: a registered custom
// searcher wins, the four Ethernet shapes take the structural fast path,
// everything else falls back to the diff-bounded slow scan. The record for
// one header is always handed to the sink in a single write.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::ops::Range;
use std::sync::Arc;

use crate::frame::{
    ETHERNET_IPV4_TCP, ETHERNET_IPV4_UDP, ETHERNET_IPV6_TCP, ETHERNET_IPV6_UDP,
};
use crate::wire::{
    CMD_ADD_DICT, CMD_DATA, CMD_LAST, CMD_PREV, MAX_DICTIONARIES, MAX_DIFF_DIV, MAX_HEADER_SIZE,
    MAX_RECORD_SIZE, MIN_DIFF_DIV,
};

use super::dictionary::DictCache;
use super::{validate_capacity, ConfigError};

// Fast-path signature ranges: Ethernet destination+source MAC, then the
// flow-identifying span of the IP header onward.
const ETHERNET_ADDRS: Range<usize> = 0..12;
const IPV4_SIGNATURE: Range<usize> = 22..34;
const IPV6_SIGNATURE: Range<usize> = 22..58;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for the encoding side.
///
/// `Io` latches: once the sink has failed, every later call returns the same
/// error and the instance must be discarded. `PayloadTooLarge` is a plain
/// rejection and leaves the encoder usable.
#[derive(Debug, Clone)]
pub enum EncodeError {
    /// The sink failed or wrote short.
    Io(Arc<io::Error>),
    /// Submitted header exceeds [`MAX_HEADER_SIZE`] bytes.
    PayloadTooLarge(usize),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::PayloadTooLarge(n) => {
                write!(f, "header too large: {n} bytes (max {MAX_HEADER_SIZE})")
            }
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e.as_ref()),
            Self::PayloadTooLarge(_) => None,
        }
    }
}

impl From<io::Error> for EncodeError {
    fn from(e: io::Error) -> Self {
        Self::Io(Arc::new(e))
    }
}

// ---------------------------------------------------------------------------
// Custom searchers
// ---------------------------------------------------------------------------

/// Caller-provided dictionary searcher for one exact header length.
///
/// Receives the MRU-ordered dictionary slots (unoccupied slots are empty)
/// and the incoming header; returns the index of the slot to diff against,
/// or `None` for a miss. The searcher must not retain references beyond the
/// call; a result pointing at an unoccupied slot or at a slot of a different
/// length is treated as a miss.
pub type Searcher = Box<dyn Fn(&[Vec<u8>], &[u8]) -> Option<usize>>;

// ---------------------------------------------------------------------------
// HeaderEncoder
// ---------------------------------------------------------------------------

/// Streaming header encoder.
///
/// Compresses each header against an MRU cache of previously seen headers
/// and writes one self-delimiting record per call to the underlying sink.
/// The paired [`HeaderDecoder`](super::HeaderDecoder) must be constructed
/// with the same dictionary capacity.
///
/// # Example
/// ```
/// use framepress::compress::HeaderEncoder;
///
/// let mut encoder = HeaderEncoder::new(Vec::new());
/// encoder.encode(&[0x42; 20]).unwrap();
/// encoder.encode(&[0x42; 20]).unwrap();
/// let stream = encoder.into_inner();
/// assert_eq!(stream.len(), 23); // AddDict record + one Last byte
/// ```
pub struct HeaderEncoder<W: Write> {
    sink: W,
    cache: DictCache,
    searchers: HashMap<usize, Searcher>,
    last: Vec<u8>,
    record: Vec<u8>,
    pairs: Vec<u8>,
    err: Option<EncodeError>,
}

impl<W: Write> HeaderEncoder<W> {
    /// Create an encoder with the full 256-slot dictionary cache.
    pub fn new(sink: W) -> Self {
        Self::build(sink, MAX_DICTIONARIES)
    }

    /// Create an encoder with a custom dictionary capacity in `1..=256`.
    pub fn with_capacity(sink: W, capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self::build(sink, validate_capacity(capacity)?))
    }

    fn build(sink: W, capacity: usize) -> Self {
        Self {
            sink,
            cache: DictCache::new(capacity),
            searchers: HashMap::new(),
            last: Vec::with_capacity(MAX_HEADER_SIZE),
            record: Vec::with_capacity(MAX_RECORD_SIZE),
            pairs: Vec::with_capacity(2 * MAX_HEADER_SIZE),
            err: None,
        }
    }

    /// Install a custom dictionary searcher for headers of exactly
    /// `len` bytes, overriding the built-in search for that length.
    pub fn register_searcher(
        &mut self,
        len: usize,
        searcher: Searcher,
    ) -> Result<(), ConfigError> {
        match self.searchers.entry(len) {
            Entry::Occupied(_) => Err(ConfigError::DuplicateSearcher(len)),
            Entry::Vacant(slot) => {
                slot.insert(searcher);
                Ok(())
            }
        }
    }

    /// Compress one header and write its record to the sink.
    ///
    /// Returns the number of input bytes consumed — always the full header
    /// length on success. Empty input is a no-op returning 0. Headers longer
    /// than [`MAX_HEADER_SIZE`] are rejected without touching any state.
    pub fn encode(&mut self, header: &[u8]) -> Result<usize, EncodeError> {
        if header.is_empty() {
            return Ok(0);
        }
        if header.len() > MAX_HEADER_SIZE {
            return Err(EncodeError::PayloadTooLarge(header.len()));
        }
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        match self.write_record(header) {
            Ok(()) => Ok(header.len()),
            Err(err) => {
                self.err = Some(err.clone());
                Err(err)
            }
        }
    }

    fn write_record(&mut self, header: &[u8]) -> Result<(), EncodeError> {
        self.record.clear();

        // repeat of the previous emission
        if self.last == header {
            self.record.push(CMD_LAST);
            self.sink.write_all(&self.record)?;
            return Ok(());
        }

        let Some(index) = self.search_dictionary(header) else {
            self.record.push(CMD_ADD_DICT);
            self.record.push(header.len() as u8);
            self.record.extend_from_slice(header);
            self.sink.write_all(&self.record)?;
            self.cache.insert_front(header);
            self.update_last(header);
            return Ok(());
        };

        // diff against the selected dictionary, rewriting it in place
        self.pairs.clear();
        if let Some(dict) = self.cache.get_mut(index) {
            for (offset, (slot, &byte)) in dict.iter_mut().zip(header).enumerate() {
                if *slot != byte {
                    self.pairs.push(offset as u8);
                    self.pairs.push(byte);
                    *slot = byte;
                }
            }
        }
        if self.pairs.is_empty() {
            self.record.push(CMD_PREV);
            self.record.push(index as u8);
        } else {
            self.record.push(CMD_DATA);
            self.record.push(index as u8);
            self.record.push((self.pairs.len() / 2) as u8);
            self.record.extend_from_slice(&self.pairs);
        }
        self.sink.write_all(&self.record)?;
        self.cache.promote(index);
        self.update_last(header);
        Ok(())
    }

    fn update_last(&mut self, header: &[u8]) {
        self.last.clear();
        self.last.extend_from_slice(header);
    }

    // -----------------------------------------------------------------------
    // Dictionary selection
    // -----------------------------------------------------------------------

    fn search_dictionary(&self, header: &[u8]) -> Option<usize> {
        if let Some(searcher) = self.searchers.get(&header.len()) {
            let index = searcher(self.cache.slots(), header)?;
            // a misbehaving searcher degrades to a miss, never to a panic
            return match self.cache.get(index) {
                Some(dict) if dict.len() == header.len() => Some(index),
                _ => None,
            };
        }
        match header.len() {
            ETHERNET_IPV4_TCP | ETHERNET_IPV4_UDP => self.fast_search(header, IPV4_SIGNATURE),
            ETHERNET_IPV6_TCP | ETHERNET_IPV6_UDP => self.fast_search(header, IPV6_SIGNATURE),
            _ => self.slow_search(header),
        }
    }

    /// Structural search for the recognized Ethernet shapes: a candidate
    /// matches when its length, MAC addresses, and flow signature all equal
    /// the header's. First match in MRU order wins.
    fn fast_search(&self, header: &[u8], signature: Range<usize>) -> Option<usize> {
        let macs = &header[ETHERNET_ADDRS];
        let flow = &header[signature.clone()];
        for (index, dict) in self.cache.slots().iter().enumerate() {
            if dict.len() != header.len() {
                continue;
            }
            if &dict[ETHERNET_ADDRS] != macs {
                continue;
            }
            if &dict[signature.clone()] != flow {
                continue;
            }
            return Some(index);
        }
        None
    }

    /// Diff-bounded scan for unrecognized header lengths.
    ///
    /// Counts mismatching bytes per equal-length candidate, abandoning a
    /// candidate past `len / 4` mismatches. A candidate within `len / 10`
    /// ends the search immediately; otherwise the smallest diff wins, first
    /// encountered in MRU order on ties.
    fn slow_search(&self, header: &[u8]) -> Option<usize> {
        let min_diff = header.len() / MIN_DIFF_DIV;
        let max_diff = header.len() / MAX_DIFF_DIV;
        let mut best: Option<(usize, usize)> = None; // (diff, index)
        'slots: for (index, dict) in self.cache.slots().iter().enumerate() {
            if dict.len() != header.len() {
                continue;
            }
            let mut diff = 0usize;
            for (a, b) in dict.iter().zip(header) {
                if a != b {
                    diff += 1;
                    if diff > max_diff {
                        continue 'slots;
                    }
                }
            }
            if diff <= min_diff {
                return Some(index);
            }
            if best.map_or(true, |(d, _)| diff < d) {
                best = Some((diff, index));
            }
        }
        best.map(|(_, index)| index)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Dictionary capacity this encoder was built with.
    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// MRU-ordered view of the dictionary slots.
    pub fn dictionaries(&self) -> &[Vec<u8>] {
        self.cache.slots()
    }

    /// Reference to the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Mutable reference to the underlying sink.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Consume the encoder, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

// ---------------------------------------------------------------------------
// Convenience function
// ---------------------------------------------------------------------------

/// Compress a sequence of headers into a fresh in-memory stream, using the
/// full 256-slot dictionary cache.
pub fn compress_all<'a, I>(headers: I) -> Result<Vec<u8>, EncodeError>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut encoder = HeaderEncoder::new(Vec::new());
    for header in headers {
        encoder.encode(header)?;
    }
    Ok(encoder.into_inner())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
