// Header compression pipeline.
//
// The streaming codec proper, built from three pieces:
//
// - `dictionary` — DictCache: the MRU slot store both sides replay in
//                  lockstep
// - `encoder`    — HeaderEncoder: turns each header into one wire record
// - `decoder`    — HeaderDecoder: parses one record per call and
//                  reconstructs the header bytes exactly

pub mod decoder;
pub mod dictionary;
pub mod encoder;

pub use decoder::{decompress_all, DecodeError, HeaderDecoder};
pub use dictionary::DictCache;
pub use encoder::{compress_all, EncodeError, HeaderEncoder, Searcher};

use std::fmt;

use crate::wire::MAX_DICTIONARIES;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Construction and registration error.
///
/// Raised by the fallible constructors and by
/// [`HeaderEncoder::register_searcher`]; never latched as a sticky error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Dictionary capacity outside `1..=256`.
    CapacityOutOfRange(usize),
    /// A searcher is already registered for this header length.
    DuplicateSearcher(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOutOfRange(n) => {
                write!(
                    f,
                    "dictionary capacity out of range: {n} (expected 1..={MAX_DICTIONARIES})"
                )
            }
            Self::DuplicateSearcher(len) => {
                write!(f, "searcher for header length {len} is already registered")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

pub(crate) fn validate_capacity(capacity: usize) -> Result<usize, ConfigError> {
    if (1..=MAX_DICTIONARIES).contains(&capacity) {
        Ok(capacity)
    } else {
        Err(ConfigError::CapacityOutOfRange(capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_bounds() {
        assert!(validate_capacity(0).is_err());
        assert_eq!(validate_capacity(1), Ok(1));
        assert_eq!(validate_capacity(256), Ok(256));
        assert_eq!(
            validate_capacity(257),
            Err(ConfigError::CapacityOutOfRange(257))
        );
    }

    #[test]
    fn config_error_messages() {
        assert_eq!(
            ConfigError::CapacityOutOfRange(0).to_string(),
            "dictionary capacity out of range: 0 (expected 1..=256)"
        );
        assert_eq!(
            ConfigError::DuplicateSearcher(31).to_string(),
            "searcher for header length 31 is already registered"
        );
    }
}
