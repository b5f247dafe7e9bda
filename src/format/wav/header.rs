//! WAV file header structures and parsing

use super::{
    DATA_CHUNK, DEFAULT_MAX_SCAN_BYTES, FMT_CHUNK, PCM_FMT_SIZE, RIFF_HEADER_OVERHEAD,
    RIFF_MAGIC, WAVE_MAGIC,
};
use crate::error::{Error, FormatError, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, trace, warn};

/// WAV format tag identifying the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTag {
    /// PCM (uncompressed)
    Pcm,
    /// IEEE Float
    IeeeFloat,
    /// A-Law
    ALaw,
    /// Mu-Law
    MuLaw,
    /// Extensible format
    Extensible,
    /// Unknown format
    Unknown(u16),
}

impl From<u16> for FormatTag {
    fn from(val: u16) -> Self {
        match val {
            0x0001 => FormatTag::Pcm,
            0x0003 => FormatTag::IeeeFloat,
            0x0006 => FormatTag::ALaw,
            0x0007 => FormatTag::MuLaw,
            0xFFFE => FormatTag::Extensible,
            other => FormatTag::Unknown(other),
        }
    }
}

impl From<FormatTag> for u16 {
    fn from(tag: FormatTag) -> Self {
        match tag {
            FormatTag::Pcm => 0x0001,
            FormatTag::IeeeFloat => 0x0003,
            FormatTag::ALaw => 0x0006,
            FormatTag::MuLaw => 0x0007,
            FormatTag::Extensible => 0xFFFE,
            FormatTag::Unknown(val) => val,
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatTag::Pcm => write!(f, "PCM"),
            FormatTag::IeeeFloat => write!(f, "IEEE float"),
            FormatTag::ALaw => write!(f, "A-law"),
            FormatTag::MuLaw => write!(f, "mu-law"),
            FormatTag::Extensible => write!(f, "extensible"),
            FormatTag::Unknown(val) => write!(f, "unknown ({:#06x})", val),
        }
    }
}

/// Options controlling how a WAV file is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavReadOptions {
    /// How far the data chunk scan may slide past the end of the fmt chunk
    /// before giving up
    pub max_scan_bytes: u64,
}

impl WavReadOptions {
    /// Create options with the default scan bound
    pub fn new() -> Self {
        WavReadOptions {
            max_scan_bytes: DEFAULT_MAX_SCAN_BYTES,
        }
    }

    /// Set the data chunk scan bound
    pub fn with_max_scan_bytes(mut self, max_scan_bytes: u64) -> Self {
        self.max_scan_bytes = max_scan_bytes;
        self
    }
}

impl Default for WavReadOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed PCM WAVE file: header fields plus the whole data chunk payload.
///
/// Values are only produced by a successful parse (or [`WaveFile::from_pcm`]),
/// so every invariant checked by the parser holds for the lifetime of the
/// value. Nothing is mutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveFile {
    riff_size: u32,
    format_tag: u16,
    channel_count: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
    data_offset: u32,
    data_size: u32,
    frame_count: u64,
    bytes_per_frame: u32,
    pcm: Vec<u8>,
}

impl WaveFile {
    /// Open and parse a WAV file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, WavReadOptions::default())
    }

    /// Open and parse a WAV file from disk with explicit options
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: WavReadOptions) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening WAV file {}", path.display());

        let mut reader = BufReader::new(File::open(path)?);
        Self::read_with_options(&mut reader, options)
    }

    /// Read and parse a WAV file from a reader positioned at the file start
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        Self::read_with_options(reader, WavReadOptions::default())
    }

    /// Read and parse a WAV file with explicit options.
    ///
    /// Fails on the first violated invariant; see [`FormatError`] for the
    /// possible causes. Short reads surface as [`Error::Io`].
    pub fn read_with_options<R: Read + Seek>(
        reader: &mut R,
        options: WavReadOptions,
    ) -> Result<Self> {
        // RIFF header
        expect_tag(reader, RIFF_MAGIC)?;
        let riff_size = reader.read_u32::<LittleEndian>()?;
        nonzero(riff_size, "riff_size")?;
        expect_tag(reader, WAVE_MAGIC)?;

        // fmt chunk
        expect_tag(reader, FMT_CHUNK)?;
        let fmt_size = reader.read_u32::<LittleEndian>()?;
        if fmt_size != PCM_FMT_SIZE {
            return Err(FormatError::UnsupportedFormat(format!(
                "fmt chunk size {} (only the {}-byte PCM fmt chunk is supported)",
                fmt_size, PCM_FMT_SIZE
            ))
            .into());
        }

        let format_tag = reader.read_u16::<LittleEndian>()?;
        if FormatTag::from(format_tag) != FormatTag::Pcm {
            return Err(FormatError::UnsupportedFormat(format!(
                "format tag {} is not linear PCM",
                FormatTag::from(format_tag)
            ))
            .into());
        }

        let channel_count = nonzero(reader.read_u16::<LittleEndian>()?, "channel_count")?;
        let sample_rate = nonzero(reader.read_u32::<LittleEndian>()?, "sample_rate")?;
        let byte_rate = nonzero(reader.read_u32::<LittleEndian>()?, "byte_rate")?;
        let block_align = nonzero(reader.read_u16::<LittleEndian>()?, "block_align")?;
        let bits_per_sample = nonzero(reader.read_u16::<LittleEndian>()?, "bits_per_sample")?;

        debug!(
            channel_count,
            sample_rate, byte_rate, block_align, bits_per_sample, "Parsed fmt chunk"
        );

        // data chunk
        let skipped = scan_for_data_chunk(reader, options.max_scan_bytes)?;
        if skipped > 0 {
            warn!("Skipped {} bytes of chunks ahead of the data chunk", skipped);
        }

        let data_size = nonzero(reader.read_u32::<LittleEndian>()?, "data_size")?;
        let data_offset = reader.stream_position()?;

        let expected_offset = riff_size as i64 - data_size as i64 + RIFF_HEADER_OVERHEAD as i64;
        let inconsistent = || FormatError::InconsistentSize {
            riff_size,
            data_size,
            data_offset,
        };
        if expected_offset != data_offset as i64 {
            return Err(inconsistent().into());
        }
        let data_offset = u32::try_from(data_offset).map_err(|_| inconsistent())?;

        debug!(riff_size, data_size, data_offset, "Located data chunk");

        let pcm = read_payload(reader, data_size as usize)?;

        Ok(Self::with_derived(
            riff_size,
            format_tag,
            channel_count,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
            data_offset,
            pcm,
        ))
    }

    /// Build a canonical 44-byte-header WAV description around raw PCM bytes.
    ///
    /// The header fields are the ones a minimal writer would emit: no
    /// intervening chunks, byte rate and block alignment derived from the
    /// channel count and sample width.
    pub fn from_pcm(
        channel_count: u16,
        sample_rate: u32,
        bits_per_sample: u16,
        pcm: Vec<u8>,
    ) -> Result<Self> {
        nonzero(channel_count, "channel_count")?;
        nonzero(sample_rate, "sample_rate")?;
        nonzero(bits_per_sample, "bits_per_sample")?;
        if pcm.is_empty() {
            return Err(FormatError::ZeroField("data_size").into());
        }

        let data_size = u32::try_from(pcm.len())
            .ok()
            .filter(|size| size.checked_add(36).is_some())
            .ok_or_else(|| Error::invalid_input("PCM payload too large for a RIFF file"))?;

        let block_align = ((channel_count as u32 * bits_per_sample as u32).div_ceil(8)).max(1);
        let block_align = u16::try_from(block_align)
            .map_err(|_| Error::invalid_input("Block alignment does not fit in 16 bits"))?;
        let byte_rate = sample_rate
            .checked_mul(block_align as u32)
            .ok_or_else(|| Error::invalid_input("Byte rate does not fit in 32 bits"))?;

        Ok(Self::with_derived(
            36 + data_size,
            u16::from(FormatTag::Pcm),
            channel_count,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
            44,
            pcm,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn with_derived(
        riff_size: u32,
        format_tag: u16,
        channel_count: u16,
        sample_rate: u32,
        byte_rate: u32,
        block_align: u16,
        bits_per_sample: u16,
        data_offset: u32,
        pcm: Vec<u8>,
    ) -> Self {
        let data_size = pcm.len() as u32;
        let bits_per_frame = channel_count as u64 * bits_per_sample as u64;

        WaveFile {
            riff_size,
            format_tag,
            channel_count,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
            data_offset,
            data_size,
            frame_count: (8 * data_size as u64) / bits_per_frame,
            bytes_per_frame: (bits_per_frame / 8) as u32,
            pcm,
        }
    }

    /// Byte count following the RIFF size field
    pub fn riff_size(&self) -> u32 {
        self.riff_size
    }

    /// Total file size as declared by the RIFF header (`riff_size + 8`)
    pub fn file_size(&self) -> u64 {
        self.riff_size as u64 + RIFF_HEADER_OVERHEAD as u64
    }

    /// Raw format tag; always 1 (PCM) for a parsed file
    pub fn format_tag(&self) -> u16 {
        self.format_tag
    }

    /// Format tag as an enum
    pub fn format(&self) -> FormatTag {
        FormatTag::from(self.format_tag)
    }

    /// Number of interleaved channels
    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Sample frames per second
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Declared average bytes per second
    pub fn byte_rate(&self) -> u32 {
        self.byte_rate
    }

    /// Declared bytes per sample frame
    pub fn block_align(&self) -> u16 {
        self.block_align
    }

    /// Bits used by a single channel's sample
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Absolute offset of the first PCM byte
    pub fn data_offset(&self) -> u32 {
        self.data_offset
    }

    /// Length of the PCM payload in bytes
    pub fn data_size(&self) -> u32 {
        self.data_size
    }

    /// `(8 * data_size) / (channel_count * bits_per_sample)`
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// `(channel_count * bits_per_sample) / 8`
    pub fn bytes_per_frame(&self) -> u32 {
        self.bytes_per_frame
    }

    /// Bytes per single-channel sample, at least one
    pub fn bytes_per_sample(&self) -> usize {
        (self.bits_per_sample as usize / 8).max(1)
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.frame_count as f64 / self.sample_rate as f64
    }

    /// The raw, interleaved PCM payload
    pub fn pcm(&self) -> &[u8] {
        &self.pcm
    }

    /// Take ownership of the PCM payload
    pub fn into_pcm(self) -> Vec<u8> {
        self.pcm
    }
}

fn nonzero<T: Default + PartialEq>(value: T, field: &'static str) -> Result<T> {
    if value == T::default() {
        return Err(FormatError::ZeroField(field).into());
    }
    Ok(value)
}

fn expect_tag<R: Read + Seek>(reader: &mut R, expected: &[u8; 4]) -> Result<()> {
    let offset = reader.stream_position()?;
    let mut tag = [0u8; 4];
    reader.read_exact(&mut tag)?;

    if &tag != expected {
        return Err(FormatError::BadMagic {
            expected: *expected,
            offset,
        }
        .into());
    }
    Ok(())
}

/// Slide a four-byte window forward one byte at a time until it reads
/// `data`, leaving the reader just past the tag.
///
/// Returns how many bytes were skipped.
fn scan_for_data_chunk<R: Read + Seek>(reader: &mut R, max_scan_bytes: u64) -> Result<u64> {
    let mut window = [0u8; 4];
    let mut scanned = 0u64;

    read_window(reader, &mut window, scanned)?;
    while &window != DATA_CHUNK {
        if scanned >= max_scan_bytes {
            return Err(FormatError::DataChunkNotFound { scanned }.into());
        }
        trace!(
            "Skipping byte {:#04x} while scanning for data chunk",
            window[0]
        );

        reader.seek(SeekFrom::Current(1 - window.len() as i64))?;
        scanned += 1;
        read_window(reader, &mut window, scanned)?;
    }

    Ok(scanned)
}

fn read_window<R: Read>(reader: &mut R, window: &mut [u8; 4], scanned: u64) -> Result<()> {
    reader.read_exact(window).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::Format(FormatError::DataChunkNotFound { scanned }),
        _ => Error::Io(e),
    })
}

fn read_payload<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut pcm = Vec::new();
    pcm.try_reserve_exact(len).map_err(|e| {
        io::Error::new(
            io::ErrorKind::OutOfMemory,
            format!("Failed to allocate {} byte PCM buffer: {}", len, e),
        )
    })?;
    pcm.resize(len, 0);
    reader.read_exact(&mut pcm)?;
    Ok(pcm)
}
