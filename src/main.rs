//! muwav CLI - WAVE to mu-law and back
//!
//! A command-line tool for G.711 mu-law compression of PCM WAVE files

use clap::{Parser, Subcommand};
use muwav_lib::codec::{
    compress_file, decompress_file, EncodeStrategy, MuLawConfig, MuLawDecoder, MuLawEncoder,
};
use muwav_lib::format::wav::DEFAULT_MAX_SCAN_BYTES;
use muwav_lib::format::{WavReadOptions, WaveFile};
use muwav_lib::{init, Config};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "muwav")]
#[command(about = "muwav - G.711 mu-law compression for PCM WAVE files", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the parsed header of a WAVE file
    Info {
        /// Input WAVE file
        input: PathBuf,

        /// Maximum bytes to scan for the data chunk
        #[arg(long, default_value_t = DEFAULT_MAX_SCAN_BYTES)]
        max_scan: u64,
    },

    /// Compress a PCM WAVE file to a raw mu-law stream
    Compress {
        /// Input WAVE file
        input: PathBuf,

        /// Output file for the mu-law codewords
        #[arg(short, long)]
        output: PathBuf,

        /// Encoder strategy (table, leading-zeros, cascade)
        #[arg(short, long, default_value = "table")]
        strategy: EncodeStrategy,

        /// Maximum bytes to scan for the data chunk
        #[arg(long, default_value_t = DEFAULT_MAX_SCAN_BYTES)]
        max_scan: u64,
    },

    /// Expand a raw mu-law stream to raw 16-bit little-endian PCM
    Decompress {
        /// Input mu-law file
        input: PathBuf,

        /// Output file for the PCM samples
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Time every encoder strategy on the same WAVE file
    Bench {
        /// Input WAVE file
        input: PathBuf,

        /// Where each compressed stream is written
        #[arg(long, default_value = "test_compress.out")]
        compressed_out: PathBuf,

        /// Where each decompressed stream is written
        #[arg(long, default_value = "test_decompress.out")]
        decompressed_out: PathBuf,

        /// Maximum bytes to scan for the data chunk
        #[arg(long, default_value_t = DEFAULT_MAX_SCAN_BYTES)]
        max_scan: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize the library
    let config = Config {
        verbose: cli.verbose,
        debug: cli.debug,
    };

    init(config)?;

    info!("muwav v{}", muwav_lib::VERSION);

    // Execute command
    match cli.command {
        Commands::Info { input, max_scan } => {
            info!("Getting info for: {}", input.display());
            cmd_info(&input, read_options(max_scan))?;
        }
        Commands::Compress {
            input,
            output,
            strategy,
            max_scan,
        } => {
            info!("Compressing {} -> {}", input.display(), output.display());
            cmd_compress(&input, &output, strategy, read_options(max_scan))?;
        }
        Commands::Decompress { input, output } => {
            info!("Decompressing {} -> {}", input.display(), output.display());
            cmd_decompress(&input, &output)?;
        }
        Commands::Bench {
            input,
            compressed_out,
            decompressed_out,
            max_scan,
        } => {
            cmd_bench(
                &input,
                &compressed_out,
                &decompressed_out,
                read_options(max_scan),
            )?;
        }
    }

    Ok(())
}

fn read_options(max_scan: u64) -> WavReadOptions {
    WavReadOptions::new().with_max_scan_bytes(max_scan)
}

fn cmd_info(input: &Path, options: WavReadOptions) -> anyhow::Result<()> {
    let wave = WaveFile::open_with_options(input, options)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", input.display(), e))?;

    println!("File: {}", input.display());
    println!();

    let rows: [(&str, String, &str); 13] = [
        ("format_tag", wave.format().to_string(), "from header"),
        ("channel_count", wave.channel_count().to_string(), "from header"),
        ("sample_rate", wave.sample_rate().to_string(), "from header"),
        ("byte_rate", wave.byte_rate().to_string(), "from header"),
        ("block_align", wave.block_align().to_string(), "from header"),
        ("bits_per_sample", wave.bits_per_sample().to_string(), "from header"),
        ("data_size", wave.data_size().to_string(), "from data chunk size"),
        ("riff_size", wave.riff_size().to_string(), "from riff chunk size"),
        ("file_size", wave.file_size().to_string(), "calc from 8+riff_size"),
        ("data_offset", wave.data_offset().to_string(), "found in file scan"),
        ("frame_count", wave.frame_count().to_string(), "calculated"),
        ("bytes_per_frame", wave.bytes_per_frame().to_string(), "calculated"),
        (
            "duration",
            format!("{:.2}s", wave.duration_seconds()),
            "calculated",
        ),
    ];

    for (name, value, source) in rows {
        println!("{:>20}: {:>10} {}", name, value, source);
    }

    Ok(())
}

fn cmd_compress(
    input: &Path,
    output: &Path,
    strategy: EncodeStrategy,
    options: WavReadOptions,
) -> anyhow::Result<()> {
    let stats = compress_file(input, output, &MuLawConfig::new(strategy), options)
        .map_err(|e| anyhow::anyhow!("Failed to compress {}: {}", input.display(), e))?;

    println!(
        "Compressed {} samples ({} -> {} bytes) with the {} encoder in {:.6}s",
        stats.samples,
        stats.bytes_in,
        stats.bytes_out,
        strategy,
        stats.elapsed.as_secs_f64()
    );

    Ok(())
}

fn cmd_decompress(input: &Path, output: &Path) -> anyhow::Result<()> {
    let stats = decompress_file(input, output)
        .map_err(|e| anyhow::anyhow!("Failed to decompress {}: {}", input.display(), e))?;

    println!(
        "Decompressed {} codewords ({} -> {} bytes) in {:.6}s",
        stats.samples,
        stats.bytes_in,
        stats.bytes_out,
        stats.elapsed.as_secs_f64()
    );

    Ok(())
}

fn cmd_bench(
    input: &Path,
    compressed_out: &Path,
    decompressed_out: &Path,
    options: WavReadOptions,
) -> anyhow::Result<()> {
    let wave = WaveFile::open_with_options(input, options)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", input.display(), e))?;

    println!(
        "Benchmarking {} ({} samples)",
        input.display(),
        wave.data_size() as usize / wave.bytes_per_sample()
    );

    for strategy in EncodeStrategy::ALL {
        let encoder = MuLawEncoder::new(MuLawConfig::new(strategy));
        let stats = encoder.compress(&wave, File::create(compressed_out)?)?;

        MuLawDecoder::new().decompress(
            File::open(compressed_out)?,
            File::create(decompressed_out)?,
        )?;

        println!(
            "Time used by the {:>13} encoder: {:.6}s",
            strategy,
            stats.elapsed.as_secs_f64()
        );
    }

    Ok(())
}
