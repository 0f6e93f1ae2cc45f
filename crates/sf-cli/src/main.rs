//! syncforge
//!
//! Usage:
//!   syncforge cam1.mp4 cam2.mov zoom.wav
//!   syncforge --json --known_delay_ge_map '{"1": 120}' long1.mp4 long2.mp4
//!
//! The first file is the reference. For every file the tool reports how
//! much to cut from (or pad before) its beginning so all files line up.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use sf_align::{AlignConfig, Aligner, KnownDelayHints};
use sf_core::MediaBackend;
use sf_fingerprint::FingerprintConfig;
use sf_media::DecoderKind;

#[derive(Parser, Debug)]
#[command(
    name = "syncforge",
    version,
    about = "Find the offsets between recordings of the same event by their soundtracks"
)]
struct Cli {
    /// Media files with an audio stream; anything the decoder can read
    #[arg(value_name = "FILE")]
    file_names: Vec<PathBuf>,

    /// Seconds of each file the coarse pass scans. Lower it for long media
    #[arg(long = "max_misalignment", default_value_t = 120.0)]
    max_misalignment: f64,

    /// Known minimum delays as JSON, e.g. '{"1": 120}'. Keys are indices into FILE
    #[arg(long = "known_delay_ge_map", value_name = "JSON")]
    known_delay_ge_map: Option<String>,

    /// Sample rate of the fine pass. Lower values trade precision for memory
    #[arg(long = "sample_rate", default_value_t = 48000)]
    sample_rate: u32,

    /// Report in JSON format
    #[arg(long)]
    json: bool,

    /// Decode backend (ffmpeg, native)
    #[arg(long, default_value = "ffmpeg")]
    decoder: DecoderKind,

    /// DFT window length in samples
    #[arg(long = "fft_bin_size", default_value_t = 1024)]
    fft_bin_size: usize,

    /// Samples shared by consecutive windows
    #[arg(long, default_value_t = 0)]
    overlap: usize,

    /// Frequency bins per landmark cell
    #[arg(long = "box_height", default_value_t = 512)]
    box_height: usize,

    /// Windows per landmark cell
    #[arg(long = "box_width", default_value_t = 43)]
    box_width: usize,

    /// Landmarks kept per cell
    #[arg(long = "samples_per_box", default_value_t = 7)]
    samples_per_box: usize,
}

impl Cli {
    fn align_config(&self) -> AlignConfig {
        let fingerprint = FingerprintConfig::default()
            .with_fft_bin_size(self.fft_bin_size)
            .with_overlap(self.overlap)
            .with_box(self.box_height, self.box_width)
            .with_max_peaks_per_box(self.samples_per_box);

        AlignConfig::default()
            .with_fingerprint(fingerprint)
            .with_max_misalignment(self.max_misalignment)
            .with_sample_rate(self.sample_rate)
    }

    fn hints(&self) -> Result<KnownDelayHints> {
        match &self.known_delay_ge_map {
            Some(json) => {
                KnownDelayHints::from_json(json).context("Failed to parse --known_delay_ge_map")
            }
            None => Ok(KnownDelayHints::new()),
        }
    }
}

/// Print usage and exit with status 1
fn bail_out() -> ! {
    let _ = Cli::command().print_help();
    println!();
    process::exit(1);
}

fn absolute(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    paths
        .iter()
        .map(|path| {
            std::path::absolute(path)
                .with_context(|| format!("Failed to resolve {}", path.display()))
        })
        .collect()
}

fn missing(paths: &[PathBuf]) -> Vec<&Path> {
    paths
        .iter()
        .map(PathBuf::as_path)
        .filter(|path| !path.is_file())
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let hints = cli.hints()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if cli.file_names.len() < 2 {
        bail_out();
    }
    let files = absolute(&cli.file_names)?;

    let missing = missing(&files);
    if !missing.is_empty() {
        let names: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
        println!("** The following are not existing files: {} **", names.join(","));
        bail_out();
    }

    let aligner = Aligner::new(cli.decoder.backend(), cli.align_config())
        .context("Invalid alignment parameters")?;
    log::debug!("decoding with {}", aligner.backend().name());

    let edits = aligner.align(&files, &hints)?;

    if cli.json {
        println!("{}", edits.to_json_pretty()?);
    } else {
        println!("{}", edits.text_report());
    }
    Ok(())
}
