//! Error types for muwav

use std::fmt;
use thiserror::Error;

/// Result type alias for muwav operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for muwav
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Container format error
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create an initialization error
    pub fn init<S: Into<String>>(msg: S) -> Self {
        Error::Init(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Returns the format error if this is one
    pub fn as_format(&self) -> Option<&FormatError> {
        match self {
            Error::Format(e) => Some(e),
            _ => None,
        }
    }
}

/// A violated RIFF/WAVE header invariant.
///
/// Every variant identifies the failing field or offset; the parser never
/// returns a partially populated file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A required four-byte tag did not match
    #[error("expected chunk tag {} at offset {offset}", Tag(.expected))]
    BadMagic { expected: [u8; 4], offset: u64 },

    /// Non-PCM format tag or a fmt chunk that is not the minimal 16 bytes
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// `riff_size - data_size + 8` does not land on the data offset
    #[error(
        "inconsistent sizes: riff_size {riff_size} - data_size {data_size} + 8 != data_offset {data_offset}"
    )]
    InconsistentSize {
        riff_size: u32,
        data_size: u32,
        data_offset: u64,
    },

    /// A header field required to be positive was zero
    #[error("header field `{0}` must be non-zero")]
    ZeroField(&'static str),

    /// The sliding scan gave up before finding the data chunk
    #[error("data chunk not found after scanning {scanned} bytes")]
    DataChunkNotFound { scanned: u64 },
}

/// Displays a chunk tag as quoted ASCII, escaping anything unprintable.
struct Tag<'a>(&'a [u8; 4]);

impl fmt::Display for Tag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for &b in self.0 {
            write!(f, "{}", std::ascii::escape_default(b))?;
        }
        f.write_str("\"")
    }
}
