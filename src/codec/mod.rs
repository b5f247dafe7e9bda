//! Codec implementations

pub mod mulaw;

pub use mulaw::{
    compress_file, decode_byte, decompress_file, encode_sample, CodingStats, EncodeStrategy,
    MuLawCodeword, MuLawConfig, MuLawDecoder, MuLawEncoder,
};
