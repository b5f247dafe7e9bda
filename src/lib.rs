//! muwav - PCM WAVE parsing and G.711 mu-law companding
//!
//! muwav reads the RIFF/WAVE container of a linear PCM file and converts its
//! samples to and from 8-bit ITU-T G.711 mu-law codewords.
//!
//! # Architecture
//!
//! - `format`: RIFF/WAVE container parsing
//! - `codec`: the mu-law codec and its compression/decompression drivers
//!
//! The two halves are independent; the drivers in `codec::mulaw` take a
//! parsed [`format::wav::WaveFile`] and a writer.

pub mod codec;
pub mod error;
pub mod format;

pub use error::{Error, FormatError, Result};

/// muwav version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const VERSION_MAJOR: u32 = 0;
pub const VERSION_MINOR: u32 = 1;
pub const VERSION_PATCH: u32 = 0;

/// Configuration for the muwav library
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Enable verbose logging
    pub verbose: bool,
    /// Enable debug output
    pub debug: bool,
}

impl Config {
    /// The tracing filter directive implied by the flags, if any
    pub fn log_level(&self) -> Option<&'static str> {
        if self.debug {
            Some("debug")
        } else if self.verbose {
            Some("info")
        } else {
            None
        }
    }
}

/// Initialize the muwav library with the given configuration
pub fn init(config: Config) -> Result<()> {
    // Initialize logging
    if let Some(level) = config.log_level() {
        tracing_subscriber::fmt()
            .with_env_filter(level)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| Error::init(format!("Failed to initialize logging: {}", e)))?;
    }

    Ok(())
}
