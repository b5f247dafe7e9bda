//! WAV audio format support
//!
//! This module implements RIFF/WAVE header parsing for minimal PCM files.
//! The parser validates the mandatory `RIFF`/`WAVE`/`fmt ` sequence, slides
//! past any chunks that precede `data`, and loads the whole payload.

pub mod header;

pub use header::{FormatTag, WavReadOptions, WaveFile};

/// WAV format magic numbers
pub const RIFF_MAGIC: &[u8; 4] = b"RIFF";
pub const WAVE_MAGIC: &[u8; 4] = b"WAVE";
pub const FMT_CHUNK: &[u8; 4] = b"fmt ";
pub const DATA_CHUNK: &[u8; 4] = b"data";

/// Size of the only supported fmt chunk body (plain PCM, no extension)
pub const PCM_FMT_SIZE: u32 = 16;

/// Bytes taken by the RIFF tag and size fields ahead of `riff_size`
pub const RIFF_HEADER_OVERHEAD: u32 = 8;

/// Default bound on the sliding scan for the data chunk
pub const DEFAULT_MAX_SCAN_BYTES: u64 = 64 * 1024;
