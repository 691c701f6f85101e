use num_complex::Complex32;
use std::f64::consts::PI;

use crate::DspError;

/// One-shot coarse frequency correction.
///
/// Multiplies sample i by exp(j*2pi*detrend*t_i) * exp(-j*2pi*offset*t_i),
/// t_i = i / sample_rate: the first exponential cancels the fixed
/// down-conversion detrend line, the second the offset estimated by the
/// spectral centroid. The two phases are summed before the rotation so the
/// block is traversed once.
pub struct CoarseCorrector {
    sample_rate: f64,
    detrend_hz: f64,
}

impl CoarseCorrector {
    /// `detrend_hz` is the fixed local-oscillator detrend offset; the
    /// correction applies it with its sign, so a low-IF capture sitting at
    /// +fs/2 takes `detrend_hz = -fs/2`.
    pub fn new(sample_rate: f64, detrend_hz: f64) -> Self {
        Self {
            sample_rate,
            detrend_hz,
        }
    }

    /// Return a frequency-corrected copy of `samples`.
    ///
    /// `offset_hz` is the estimated carrier offset (positive = energy above
    /// center); it is cancelled, not applied.
    pub fn correct(
        &self,
        samples: &[Complex32],
        offset_hz: f64,
    ) -> Result<Vec<Complex32>, DspError> {
        if samples.is_empty() {
            return Err(DspError::EmptyBlock);
        }

        let rate_hz = self.detrend_hz - offset_hz;
        let mut out = Vec::with_capacity(samples.len());
        for (i, &sample) in samples.iter().enumerate() {
            let phase = 2.0 * PI * rate_hz * i as f64 / self.sample_rate;
            let rotation = Complex32::new(phase.cos() as f32, phase.sin() as f32);
            out.push(sample * rotation);
        }
        Ok(out)
    }
}
