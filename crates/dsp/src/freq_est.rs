use num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use crate::DspError;

/// Coarse carrier offset estimator using rustfft.
///
/// Locates the spectral energy centroid of a sample block: forward FFT,
/// shift to centered bin order, then walk the bins accumulating |X[k]|^2
/// until the running sum reaches half the total. The crossing bin, measured
/// against N/2, gives the offset in units of one bin width (sample_rate / N).
/// Ties at the half-energy threshold go to the first bin in scan order; no
/// interpolation between bins is attempted.
pub struct FreqEstimator {
    fft: Arc<dyn Fft<f32>>,
    size: usize,
    scratch: Vec<Complex32>,
    sample_rate: f64,
}

impl FreqEstimator {
    /// Create an estimator for a fixed transform size.
    pub fn new(size: usize, sample_rate: f64) -> Self {
        assert!(size > 0, "FFT size must be non-zero");
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch_len = fft.get_inplace_scratch_len();
        Self {
            fft,
            size,
            scratch: vec![Complex32::new(0.0, 0.0); scratch_len],
            sample_rate,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Estimate the carrier offset of `samples` in Hz.
    ///
    /// Positive means the energy centroid sits above the center frequency.
    /// Only the first `size` samples are used; a block shorter than `size`
    /// is an error.
    pub fn estimate(&mut self, samples: &[Complex32]) -> Result<f64, DspError> {
        if samples.is_empty() {
            return Err(DspError::EmptyBlock);
        }
        if samples.len() < self.size {
            return Err(DspError::ShortBlock {
                got: samples.len(),
                need: self.size,
            });
        }

        let mut spectrum = samples[..self.size].to_vec();
        self.fft.process_with_scratch(&mut spectrum, &mut self.scratch);

        let n = self.size;
        let half_n = n / 2;

        // Energy per bin in centered (fftshift) order: bin 0 is -fs/2.
        let energy = |k: usize| spectrum[(k + half_n) % n].norm_sqr() as f64;

        let total: f64 = (0..n).map(energy).sum();
        let half_energy = total / 2.0;

        let mut running = 0.0f64;
        let mut centroid = n - 1;
        for k in 0..n {
            running += energy(k);
            if running >= half_energy {
                centroid = k;
                break;
            }
        }

        let bin_width = self.sample_rate / n as f64;
        Ok(bin_width * (centroid as f64 - half_n as f64))
    }
}
