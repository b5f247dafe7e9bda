//! mu-law compression driver

use super::{CodingStats, MuLawConfig};
use crate::error::Result;
use crate::format::wav::{WavReadOptions, WaveFile};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Assemble one sample from little-endian bytes.
///
/// The accumulator is 16 bits wide: for samples wider than 16 bits the
/// high-order bytes shift out and are lost. 8-bit samples enter as their raw
/// byte value.
pub fn assemble_sample(bytes: &[u8]) -> i16 {
    bytes.iter().enumerate().fold(0u16, |acc, (j, &b)| {
        acc | (b as u16).checked_shl(8 * j as u32).unwrap_or(0)
    }) as i16
}

/// mu-law encoder
pub struct MuLawEncoder {
    config: MuLawConfig,
}

impl MuLawEncoder {
    /// Create a new mu-law encoder
    pub fn new(config: MuLawConfig) -> Self {
        MuLawEncoder { config }
    }

    /// Get the encoder configuration
    pub fn config(&self) -> &MuLawConfig {
        &self.config
    }

    /// Encode the whole PCM payload, one codeword per sample.
    ///
    /// Samples are `bits_per_sample / 8` bytes wide and are taken in file
    /// order, so interleaved channels stay interleaved. A trailing partial
    /// sample is assembled from the bytes that are present.
    pub fn encode_pcm(&self, wave: &WaveFile) -> Vec<u8> {
        let encode = self.config.strategy.encoder();
        wave.pcm()
            .chunks(wave.bytes_per_sample())
            .map(|bytes| encode(assemble_sample(bytes)))
            .collect()
    }

    /// Encode `wave` and write the codewords to `writer`
    pub fn compress<W: Write>(&self, wave: &WaveFile, writer: W) -> Result<CodingStats> {
        let start = Instant::now();

        let encoded = self.encode_pcm(wave);
        let mut writer = BufWriter::new(writer);
        writer.write_all(&encoded)?;
        writer.flush()?;

        let stats = CodingStats {
            samples: encoded.len() as u64,
            bytes_in: wave.data_size() as u64,
            bytes_out: encoded.len() as u64,
            elapsed: start.elapsed(),
        };
        debug!(
            strategy = %self.config.strategy,
            samples = stats.samples,
            "Compressed PCM payload"
        );

        Ok(stats)
    }
}

impl Default for MuLawEncoder {
    fn default() -> Self {
        Self::new(MuLawConfig::default())
    }
}

/// Parse a WAV file and write its mu-law stream to `output`.
///
/// No output file is left behind when parsing or writing fails.
pub fn compress_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    config: &MuLawConfig,
    options: WavReadOptions,
) -> Result<CodingStats> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let wave = WaveFile::open_with_options(input, options)?;

    let encoder = MuLawEncoder::new(config.clone());
    let stats = write_or_remove(output, |file| encoder.compress(&wave, file))?;

    info!(
        "Compressed {} -> {} ({} samples, {} -> {} bytes)",
        input.display(),
        output.display(),
        stats.samples,
        stats.bytes_in,
        stats.bytes_out
    );
    Ok(stats)
}

/// Create `path`, run `write` against it, and delete it again on failure
pub(crate) fn write_or_remove<F>(path: &Path, write: F) -> Result<CodingStats>
where
    F: FnOnce(&mut File) -> Result<CodingStats>,
{
    let mut file = File::create(path)?;
    let result = write(&mut file);
    drop(file);

    if result.is_err() {
        if let Err(e) = fs::remove_file(path) {
            warn!("Failed to remove partial output {}: {}", path.display(), e);
        }
    }
    result
}
