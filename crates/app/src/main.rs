mod pipeline;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bluecap")]
#[command(about = "BLE advertising packet recovery from complex baseband captures")]
struct Cli {
    /// IQ file input
    #[arg(short = 'f', long)]
    file: PathBuf,

    /// Sample format for file input: ci8, ci16, cf32
    #[arg(long, default_value = "cf32")]
    format: String,

    /// Sample rate in Hz
    #[arg(short = 'r', long, default_value = "2000000")]
    sample_rate: f64,

    /// Symbol rate in Hz (sample rate must be an integer multiple)
    #[arg(long, default_value = "1000000")]
    symbol_rate: f64,

    /// Center frequency in MHz (informational)
    #[arg(short = 'c', long, default_value = "2426")]
    center_freq: u32,

    /// BLE channel index, selects the whitening initial state
    #[arg(long, default_value = "38")]
    channel: u8,

    /// Complex samples per processing block
    #[arg(short = 'n', long, default_value = "2097152")]
    block_size: usize,

    /// FFT size for the carrier offset estimate
    #[arg(long, default_value = "1024")]
    fft_size: usize,

    /// Samples fed to the carrier tracking loop per block
    #[arg(long, default_value = "1024")]
    dpll_samples: usize,

    /// Directory for diagnostic series output (DPLL error signal)
    #[arg(short = 'd', long)]
    diagnostics: Option<PathBuf>,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.verbose {
        log::info!("bluecap starting");
        log::info!("center frequency: {} MHz", cli.center_freq);
        log::info!("sample rate: {} Hz", cli.sample_rate);
        log::info!("channel: {}", cli.channel);
    }

    let format = match cli.format.as_str() {
        "ci8" => bc_sdr::file::SampleFormat::Ci8,
        "ci16" => bc_sdr::file::SampleFormat::Ci16,
        "cf32" => bc_sdr::file::SampleFormat::Cf32,
        other => {
            eprintln!("unknown sample format: {} (use ci8, ci16, or cf32)", other);
            std::process::exit(1);
        }
    };

    let config = pipeline::PipelineConfig {
        file: cli.file,
        format,
        sample_rate: cli.sample_rate,
        symbol_rate: cli.symbol_rate,
        center_freq_mhz: cli.center_freq,
        channel: cli.channel,
        block_size: cli.block_size,
        fft_size: cli.fft_size,
        dpll_samples: cli.dpll_samples,
        diagnostics: cli.diagnostics,
    };

    if let Err(e) = pipeline::run_file(&config) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
