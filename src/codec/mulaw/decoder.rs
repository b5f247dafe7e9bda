//! mu-law decompression driver

use super::encoder::write_or_remove;
use super::{decode_byte, CodingStats};
use crate::error::Result;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

const READ_CHUNK: usize = 8192;

/// mu-law decoder
///
/// Output is raw little-endian 16-bit PCM with no WAVE header.
#[derive(Debug, Default, Clone, Copy)]
pub struct MuLawDecoder;

impl MuLawDecoder {
    /// Create a new mu-law decoder
    pub fn new() -> Self {
        MuLawDecoder
    }

    /// Expand a slice of codewords
    pub fn decode_codewords(&self, codes: &[u8]) -> Vec<i16> {
        codes.iter().map(|&code| decode_byte(code)).collect()
    }

    /// Read codewords until end of stream, writing one little-endian i16
    /// per codeword
    pub fn decompress<R: Read, W: Write>(&self, reader: R, writer: W) -> Result<CodingStats> {
        let start = Instant::now();
        let mut reader = BufReader::new(reader);
        let mut writer = BufWriter::new(writer);

        let mut buf = [0u8; READ_CHUNK];
        let mut samples = 0u64;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            for &code in &buf[..n] {
                writer.write_all(&decode_byte(code).to_le_bytes())?;
            }
            samples += n as u64;
        }
        writer.flush()?;

        let stats = CodingStats {
            samples,
            bytes_in: samples,
            bytes_out: samples * 2,
            elapsed: start.elapsed(),
        };
        debug!(samples, "Decompressed mu-law stream");

        Ok(stats)
    }
}

/// Expand a raw mu-law file into raw 16-bit PCM.
///
/// No output file is left behind when reading or writing fails.
pub fn decompress_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<CodingStats> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let source = File::open(input)?;

    let stats = write_or_remove(output, |file| MuLawDecoder::new().decompress(source, file))?;

    info!(
        "Decompressed {} -> {} ({} codewords, {} bytes)",
        input.display(),
        output.display(),
        stats.samples,
        stats.bytes_out
    );
    Ok(stats)
}
