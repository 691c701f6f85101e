use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use crossbeam::channel;

use bc_dsp::bits::extract_bits;
use bc_dsp::coarse::CoarseCorrector;
use bc_dsp::dpll::{CarrierTracker, LoopConfig};
use bc_dsp::freq_est::FreqEstimator;
use bc_output::diag::{DiagnosticSink, FileSink, NullSink};
use bc_protocol::decode::PacketDecoder;
use bc_protocol::frame::{FrameSync, SyncResult};
use bc_protocol::whitening::WhiteningState;
use bc_protocol::{access_address_bits, preamble_bits, BLE_ADV_AA, BLE_AA_BITS};
use bc_sdr::file::{FileSource, SampleFormat};
use bc_sdr::SampleSource;

/// Immutable pipeline configuration, assembled once from the CLI and
/// passed explicitly to every component constructor.
pub struct PipelineConfig {
    pub file: PathBuf,
    pub format: SampleFormat,
    pub sample_rate: f64,
    pub symbol_rate: f64,
    pub center_freq_mhz: u32,
    pub channel: u8,
    pub block_size: usize,
    pub fft_size: usize,
    pub dpll_samples: usize,
    pub diagnostics: Option<PathBuf>,
}

/// Run the full pipeline from IQ file to hex output on stdout.
///
/// Per block: coarse offset estimate, frequency correction, bit
/// extraction, frame sync, packet decode. The DPLL runs over a fixed
/// prefix of each corrected block on an independent diagnostic path; a
/// tracking failure never aborts packet extraction.
pub fn run_file(config: &PipelineConfig) -> Result<()> {
    if config.sample_rate <= 0.0 || config.symbol_rate <= 0.0 {
        bail!("sample and symbol rates must be positive");
    }
    let ratio = config.sample_rate / config.symbol_rate;
    if ratio < 1.0 || ratio.fract() != 0.0 {
        bail!(
            "sample rate {} Hz is not an integer multiple of symbol rate {} Hz",
            config.sample_rate,
            config.symbol_rate
        );
    }
    let oversampling = ratio as usize;

    let whitening = WhiteningState::for_channel(config.channel)
        .with_context(|| format!("invalid BLE channel index {}", config.channel))?;

    // Pipeline components. The detrend line assumes the signal of interest
    // sits half the sample rate above the tuned frequency.
    let mut estimator = FreqEstimator::new(config.fft_size, config.sample_rate);
    let corrector = CoarseCorrector::new(config.sample_rate, -0.5 * config.sample_rate);
    let tracker = CarrierTracker::new(LoopConfig {
        loop_bandwidth: 0.01,
        damping: 1.0,
        gain: 1.0,
        update_rate: config.sample_rate,
        reference_hz: config.symbol_rate,
    });
    let sync = FrameSync::new(
        preamble_bits(oversampling),
        access_address_bits(BLE_ADV_AA),
        oversampling,
    );
    let decoder = PacketDecoder::new(whitening, BLE_AA_BITS);

    let mut sink: Box<dyn DiagnosticSink> = match &config.diagnostics {
        Some(dir) => Box::new(FileSink::new(dir)),
        None => Box::new(NullSink),
    };

    let mut source = FileSource::new(
        config.file.to_string_lossy().to_string(),
        config.format,
        config.sample_rate,
        config.center_freq_mhz as u64 * 1_000_000,
    );
    source.set_block_size(config.block_size);

    let (tx, rx) = channel::bounded(4);
    let reader_thread = std::thread::spawn(move || {
        if let Err(e) = source.start(tx) {
            log::error!("sample source error: {}", e);
        }
    });

    let mut blocks = 0usize;
    let mut packets = 0u64;
    let mut rejected = 0u64;
    let mut ambiguous = 0u64;

    for buf in rx.iter() {
        let block = blocks;
        blocks += 1;

        // Coarse path. A tail block shorter than the FFT size is processed
        // without offset correction rather than dropped.
        let offset_hz = match estimator.estimate(&buf.samples) {
            Ok(offset) => offset,
            Err(e) => {
                log::warn!("block {}: offset estimate unavailable ({}), continuing uncorrected", block, e);
                0.0
            }
        };
        log::debug!("block {}: carrier offset estimate {:.1} Hz", block, offset_hz);

        let corrected = match corrector.correct(&buf.samples, offset_hz) {
            Ok(corrected) => corrected,
            Err(e) => {
                log::error!("block {}: {}", block, e);
                continue;
            }
        };

        // Diagnostic path, independent of packet extraction.
        let dpll_len = config.dpll_samples.min(corrected.len());
        match tracker.track(&corrected[..dpll_len]) {
            Ok(errors) => sink.write_series(&format!("dpll_error_block{}", block), &errors),
            Err(e) => log::warn!("block {}: carrier tracking failed: {}", block, e),
        }

        // Packet extraction path.
        let bits = extract_bits(&corrected);
        for result in sync.synchronize(&bits) {
            match result {
                SyncResult::Candidate(candidate) => match decoder.decode(&candidate) {
                    Ok(hex) => {
                        println!("{}", hex);
                        packets += 1;
                    }
                    Err(e) => {
                        rejected += 1;
                        log::warn!(
                            "block {}: candidate in segment {} rejected: {}",
                            block,
                            candidate.segment,
                            e
                        );
                    }
                },
                SyncResult::Ambiguous { segment } => {
                    ambiguous += 1;
                    log::warn!(
                        "block {}: segment {} matches the access address on multiple phases, skipping",
                        block,
                        segment
                    );
                }
            }
        }
    }

    let _ = reader_thread.join();

    if blocks == 0 {
        bail!("no data: sample source produced no blocks");
    }

    log::info!(
        "{} packets decoded from {} blocks ({} rejected, {} ambiguous)",
        packets,
        blocks,
        rejected,
        ambiguous
    );
    Ok(())
}
