//! Common test utilities for muwav integration tests
//!
//! Helpers for building RIFF/WAVE byte streams, sample buffers, and
//! temporary files on disk.

#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;

// ============================================================================
// WAV Generation
// ============================================================================

/// Builder for PCM WAVE byte streams, including deliberately malformed ones
#[derive(Debug, Clone)]
pub struct WavBuilder {
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Extra bytes appended to the 16-byte fmt body (fmt size grows to match)
    pub fmt_extension: Vec<u8>,
    /// Raw bytes placed between the fmt chunk and the data chunk
    pub intervening: Vec<u8>,
    pub data: Vec<u8>,
    /// Overrides the computed RIFF size
    pub riff_size: Option<u32>,
    /// Overrides the declared data chunk size
    pub data_size: Option<u32>,
}

impl WavBuilder {
    pub fn new(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        WavBuilder {
            format_tag: 1,
            channels,
            sample_rate,
            bits_per_sample,
            fmt_extension: Vec::new(),
            intervening: Vec::new(),
            data: Vec::new(),
            riff_size: None,
            data_size: None,
        }
    }

    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    pub fn samples(self, samples: &[i16]) -> Self {
        self.data(pcm16(samples))
    }

    pub fn format_tag(mut self, tag: u16) -> Self {
        self.format_tag = tag;
        self
    }

    pub fn fmt_extension(mut self, bytes: &[u8]) -> Self {
        self.fmt_extension = bytes.to_vec();
        self
    }

    /// Insert a chunk with the given tag and payload ahead of the data chunk
    pub fn chunk(mut self, tag: &[u8; 4], payload: &[u8]) -> Self {
        self.intervening.extend_from_slice(tag);
        self.intervening
            .extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.intervening.extend_from_slice(payload);
        self
    }

    pub fn riff_size(mut self, size: u32) -> Self {
        self.riff_size = Some(size);
        self
    }

    pub fn data_size(mut self, size: u32) -> Self {
        self.data_size = Some(size);
        self
    }

    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    /// Offset of the first PCM byte in the built stream
    pub fn data_offset(&self) -> u32 {
        (12 + 8 + 16 + self.fmt_extension.len() + self.intervening.len() + 8) as u32
    }

    pub fn build(&self) -> Vec<u8> {
        let fmt_size = 16 + self.fmt_extension.len() as u32;
        let data_size = self.data_size.unwrap_or(self.data.len() as u32);
        let riff_size = self
            .riff_size
            .unwrap_or(self.data_offset() - 8 + data_size);

        let mut bytes = Vec::new();

        // RIFF header
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&riff_size.to_le_bytes());
        bytes.extend_from_slice(b"WAVE");

        // fmt chunk
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&fmt_size.to_le_bytes());
        bytes.extend_from_slice(&self.format_tag.to_le_bytes());
        bytes.extend_from_slice(&self.channels.to_le_bytes());
        bytes.extend_from_slice(&self.sample_rate.to_le_bytes());
        bytes.extend_from_slice(&self.byte_rate().to_le_bytes());
        bytes.extend_from_slice(&self.block_align().to_le_bytes());
        bytes.extend_from_slice(&self.bits_per_sample.to_le_bytes());
        bytes.extend_from_slice(&self.fmt_extension);

        bytes.extend_from_slice(&self.intervening);

        // data chunk
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_size.to_le_bytes());
        bytes.extend_from_slice(&self.data);

        bytes
    }

    /// Write the built stream to a temporary `.wav` file
    pub fn write_temp(&self) -> NamedTempFile {
        write_temp_file(&self.build(), ".wav")
    }
}

// ============================================================================
// Sample Generation
// ============================================================================

/// Serialize samples as little-endian 16-bit PCM
pub fn pcm16(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Parse little-endian 16-bit PCM
pub fn parse_pcm16(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// A 440 Hz sine at half scale
pub fn sine_samples(count: usize, sample_rate: u32) -> Vec<i16> {
    (0..count)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            ((2.0 * std::f64::consts::PI * 440.0 * t).sin() * 0.5 * i16::MAX as f64) as i16
        })
        .collect()
}

/// Duplicate each mono sample into a left/right pair
pub fn to_stereo(samples: &[i16]) -> Vec<i16> {
    samples.iter().flat_map(|&s| [s, s]).collect()
}

// ============================================================================
// Files
// ============================================================================

pub fn write_temp_file(bytes: &[u8], suffix: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::with_suffix(suffix).expect("Failed to create temp file");
    temp_file.write_all(bytes).expect("Failed to write temp file");
    temp_file.flush().expect("Failed to flush");
    temp_file
}
