//! Framepress: dictionary-based compression for repetitive network frame
//! headers.
//!
//! Short headers on a busy link — Ethernet + IPv4/IPv6 + TCP/UDP, or any
//! caller-defined shape up to 255 bytes — usually differ from their
//! predecessors in only a handful of bytes. Framepress keeps a small MRU
//! cache of recently seen headers on both ends of a stream and encodes each
//! new header as a diff record against the best cached candidate, falling
//! back to a verbatim insert on a miss.
//!
//! The crate provides:
//! - The streaming codec (`compress`): [`compress::HeaderEncoder`] and
//!   [`compress::HeaderDecoder`]
//! - A frame-header shape recognizer (`frame`) for deciding what to feed in
//! - File-oriented helpers (`io`)
//! - Wire-format constants (`wire`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use framepress::compress::{HeaderDecoder, HeaderEncoder};
//!
//! let mut encoder = HeaderEncoder::new(Vec::new());
//! let mut header = [0xA5u8; 54];
//! encoder.encode(&header).unwrap();
//! header[40] = 0x01; // one byte changed: a five-byte diff record
//! encoder.encode(&header).unwrap();
//! let stream = encoder.into_inner();
//! assert_eq!(stream.len(), 56 + 5);
//!
//! let mut decoder = HeaderDecoder::new(std::io::Cursor::new(stream));
//! let mut buf = [0u8; 255];
//! decoder.decode(&mut buf).unwrap();
//! let n = decoder.decode(&mut buf).unwrap();
//! assert_eq!(&buf[..n], &header[..]);
//! ```

pub mod compress;
pub mod frame;
pub mod io;
pub mod wire;

#[cfg(feature = "cli")]
pub mod cli;
