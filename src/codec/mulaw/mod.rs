//! G.711 mu-law codec
//!
//! Companding between 16-bit linear PCM and 8-bit mu-law codewords using the
//! biased 14-bit variant: magnitudes are clipped to [`CLIP`], offset by
//! [`BIAS`], and split into a 3-bit segment ("chord") and a 4-bit step. The
//! transmitted codeword is the bitwise complement of `sign|chord|step`.
//!
//! [`encode_sample`] and [`decode_byte`] are pure, total functions. The
//! drivers in [`encoder`] and [`decoder`] apply them to whole streams.

pub mod decoder;
pub mod encoder;
pub mod tables;

pub use decoder::{decompress_file, MuLawDecoder};
pub use encoder::{assemble_sample, compress_file, MuLawEncoder};

use crate::error::Error;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tables::{DECODE_TABLE, EXPONENT_TABLE};

/// Added to every clipped magnitude before segmentation
pub const BIAS: i32 = 0x84;

/// Largest magnitude that survives clipping (`0x7FFF - BIAS`)
pub const CLIP: i32 = 32635;

/// Encode one linear sample to a mu-law codeword.
///
/// Table-driven; this is the function every other strategy must agree with.
/// `i16::MIN` has no positive counterpart and is encoded as `-CLIP`.
pub fn encode_sample(sample: i16) -> u8 {
    let (sign, magnitude) = sign_and_magnitude(sample);
    let biased = magnitude + BIAS;

    let exponent = EXPONENT_TABLE[((biased >> 7) & 0xFF) as usize];
    let mantissa = ((biased >> (exponent + 3)) & 0xF) as u8;

    compose(sign, exponent, mantissa)
}

/// Encode using a leading-zero count in place of the segment table
pub fn encode_sample_leading_zeros(sample: i16) -> u8 {
    let sign = u8::from(sample < 0);

    // clipping after the bias is the same as clipping to CLIP before it
    let biased = (sample.unsigned_abs() as u32 + BIAS as u32).min(0x7FFF);
    let exponent = 24u32.saturating_sub(biased.leading_zeros()) as u8;
    let mantissa = ((biased >> (exponent + 3)) & 0xF) as u8;

    compose(sign, exponent, mantissa)
}

/// Encode by testing the biased magnitude's bits from 14 down to 7
pub fn encode_sample_cascade(sample: i16) -> u8 {
    let (sign, magnitude) = sign_and_magnitude(sample);
    let biased = magnitude + BIAS;

    let exponent = (0..8u8)
        .rev()
        .find(|&e| biased & (1 << (e + 7)) != 0)
        .unwrap_or(0);
    let mantissa = ((biased >> (exponent + 3)) & 0xF) as u8;

    compose(sign, exponent, mantissa)
}

/// Expand a mu-law codeword to its linear reconstruction
pub fn decode_byte(code: u8) -> i16 {
    DECODE_TABLE[code as usize]
}

/// Width of one mantissa step in segment `exponent`.
///
/// A round trip through the codec never moves a sample further than this.
pub fn quantization_step(exponent: u8) -> i32 {
    8 << exponent
}

#[inline]
fn sign_and_magnitude(sample: i16) -> (u8, i32) {
    let sign = u8::from(sample < 0);
    let magnitude = if sample == i16::MIN {
        CLIP
    } else {
        (sample as i32).abs().min(CLIP)
    };
    (sign, magnitude)
}

#[inline]
fn compose(sign: u8, exponent: u8, mantissa: u8) -> u8 {
    !((sign << 7) | (exponent << 4) | mantissa)
}

/// A transmitted mu-law codeword and its bit fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MuLawCodeword(pub u8);

impl MuLawCodeword {
    /// Encode a linear sample
    pub fn encode(sample: i16) -> Self {
        MuLawCodeword(encode_sample(sample))
    }

    /// Build a codeword from its fields; the complement is applied here
    pub fn from_parts(sign: bool, chord: u8, step: u8) -> Self {
        MuLawCodeword(compose(u8::from(sign), chord & 0x7, step & 0xF))
    }

    /// True for negative samples
    pub fn sign(self) -> bool {
        !self.0 & 0x80 != 0
    }

    /// Segment (exponent), 0..=7
    pub fn chord(self) -> u8 {
        (!self.0 >> 4) & 0x7
    }

    /// Position within the segment (mantissa), 0..=15
    pub fn step(self) -> u8 {
        !self.0 & 0xF
    }

    /// Linear reconstruction
    pub fn decode(self) -> i16 {
        decode_byte(self.0)
    }
}

impl From<MuLawCodeword> for u8 {
    fn from(code: MuLawCodeword) -> Self {
        code.0
    }
}

/// How the encoder derives the segment of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodeStrategy {
    /// 256-entry segment table
    #[default]
    Table,
    /// Closed form from a leading-zero count
    LeadingZeros,
    /// Bit-by-bit branch cascade
    Cascade,
}

impl EncodeStrategy {
    /// Every strategy, in benchmark order
    pub const ALL: [EncodeStrategy; 3] = [
        EncodeStrategy::Cascade,
        EncodeStrategy::Table,
        EncodeStrategy::LeadingZeros,
    ];

    /// The per-sample encode function for this strategy
    pub fn encoder(self) -> fn(i16) -> u8 {
        match self {
            EncodeStrategy::Table => encode_sample,
            EncodeStrategy::LeadingZeros => encode_sample_leading_zeros,
            EncodeStrategy::Cascade => encode_sample_cascade,
        }
    }

    /// Short name as accepted on the command line
    pub fn name(self) -> &'static str {
        match self {
            EncodeStrategy::Table => "table",
            EncodeStrategy::LeadingZeros => "leading-zeros",
            EncodeStrategy::Cascade => "cascade",
        }
    }
}

impl fmt::Display for EncodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for EncodeStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" | "lookup" => Ok(EncodeStrategy::Table),
            "leading-zeros" | "clz" => Ok(EncodeStrategy::LeadingZeros),
            "cascade" | "branch" => Ok(EncodeStrategy::Cascade),
            other => Err(Error::invalid_input(format!(
                "Unknown encode strategy '{}' (expected table, leading-zeros or cascade)",
                other
            ))),
        }
    }
}

/// mu-law encoder configuration
#[derive(Debug, Clone, Default)]
pub struct MuLawConfig {
    /// Segment derivation used per sample
    pub strategy: EncodeStrategy,
}

impl MuLawConfig {
    /// Create a new configuration
    pub fn new(strategy: EncodeStrategy) -> Self {
        MuLawConfig { strategy }
    }
}

/// Counters reported by the compression and decompression drivers
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CodingStats {
    /// Samples (compress) or codewords (decompress) processed
    pub samples: u64,
    /// Bytes consumed
    pub bytes_in: u64,
    /// Bytes produced
    pub bytes_out: u64,
    /// Wall time spent coding and writing
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_samples() -> impl Iterator<Item = i16> {
        i16::MIN..=i16::MAX
    }

    #[test]
    fn test_known_codewords() {
        assert_eq!(encode_sample(0), 0xFF);
        assert_eq!(encode_sample(100), 0xF2);
        assert_eq!(encode_sample(1000), 0xCE);
        assert_eq!(encode_sample(-1000), 0x4E);
        assert_eq!(encode_sample(i16::MAX), 0x80);
        assert_eq!(encode_sample(i16::MIN), 0x00);
    }

    #[test]
    fn test_codeword_fields() {
        // 1000 + 132 = 0b100_0110_1100: chord 3, step 1
        let code = MuLawCodeword::encode(1000);
        assert!(!code.sign());
        assert_eq!(code.chord(), 3);
        assert_eq!(code.step(), 1);
        assert_eq!(code, MuLawCodeword::from_parts(false, 3, 1));

        // 100 + 132 = 232: chord 0, step 13
        let code = MuLawCodeword::encode(-100);
        assert!(code.sign());
        assert_eq!(code.chord(), 0);
        assert_eq!(code.step(), 13);

        let code = MuLawCodeword::encode(i16::MIN);
        assert!(code.sign());
        assert_eq!(code.chord(), 7);
        assert_eq!(code.step(), 15);
        assert_eq!(u8::from(code), 0x00);
    }

    #[test]
    fn test_strategies_match_table_exhaustively() {
        for sample in all_samples() {
            let expected = encode_sample(sample);
            assert_eq!(
                encode_sample_leading_zeros(sample),
                expected,
                "leading-zeros mismatch for {}",
                sample
            );
            assert_eq!(
                encode_sample_cascade(sample),
                expected,
                "cascade mismatch for {}",
                sample
            );
        }
    }

    #[test]
    fn test_round_trip_within_step() {
        for sample in all_samples() {
            let code = MuLawCodeword::encode(sample);
            let error = (code.decode() as i32 - sample as i32).abs();
            assert!(
                error <= quantization_step(code.chord()),
                "sample {} decoded to {} (chord {})",
                sample,
                code.decode(),
                code.chord()
            );
        }
    }

    #[test]
    fn test_sign_symmetry() {
        for magnitude in 1..=(CLIP as i16) {
            let pos = encode_sample(magnitude);
            let neg = encode_sample(-magnitude);
            assert_eq!(pos ^ neg, 0x80, "magnitude {}", magnitude);
        }
        assert_eq!(encode_sample(0), encode_sample(-0));
    }

    #[test]
    fn test_min_value_is_clipped() {
        assert_eq!(encode_sample(i16::MIN), encode_sample(-(CLIP as i16)));
        assert_eq!(encode_sample(i16::MIN), encode_sample(-32767));
        assert_eq!(
            encode_sample_leading_zeros(i16::MIN),
            encode_sample(-(CLIP as i16))
        );
    }

    #[test]
    fn test_clipping_collapses_top_range() {
        let top = encode_sample(CLIP as i16);
        for sample in (CLIP as i16)..=i16::MAX {
            assert_eq!(encode_sample(sample), top);
        }
    }

    #[test]
    fn test_decode_table_endpoints() {
        assert_eq!(decode_byte(0x00), -32124);
        assert_eq!(decode_byte(0x7F), -1);
        assert_eq!(decode_byte(0x80), 32124);
        assert_eq!(decode_byte(0xFF), 0);
    }

    #[test]
    fn test_decode_matches_segment_formula() {
        for code in 0..=255u8 {
            let word = MuLawCodeword(code);
            let magnitude = ((((word.step() as i32) << 3) + BIAS) << word.chord()) - BIAS;
            let expected = if word.sign() { -magnitude } else { magnitude };

            if code == 0x7F {
                assert_eq!(decode_byte(code), -1);
            } else {
                assert_eq!(decode_byte(code) as i32, expected, "codeword {:#04x}", code);
            }
        }
    }

    #[test]
    fn test_decode_table_monotonic() {
        assert!(DECODE_TABLE[..128].windows(2).all(|w| w[0] < w[1]));
        assert!(DECODE_TABLE[128..].windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_decode_inverts_encode_on_reconstructions() {
        for code in 0..=255u8 {
            let value = decode_byte(code);
            assert_eq!(decode_byte(encode_sample(value)), value, "codeword {:#04x}", code);
        }
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("table".parse::<EncodeStrategy>().unwrap(), EncodeStrategy::Table);
        assert_eq!(
            "CLZ".parse::<EncodeStrategy>().unwrap(),
            EncodeStrategy::LeadingZeros
        );
        assert_eq!(
            "cascade".parse::<EncodeStrategy>().unwrap(),
            EncodeStrategy::Cascade
        );
        assert!("alaw".parse::<EncodeStrategy>().is_err());

        for strategy in EncodeStrategy::ALL {
            assert_eq!(strategy.name().parse::<EncodeStrategy>().unwrap(), strategy);
        }
    }
}
