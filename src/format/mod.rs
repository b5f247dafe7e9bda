//! Container format handling
//!
//! Only the RIFF/WAVE subset needed to locate linear PCM sample data is
//! supported.

pub mod wav;

pub use wav::{FormatTag, WavReadOptions, WaveFile};
