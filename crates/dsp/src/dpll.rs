use num_complex::Complex32;
use std::f64::consts::PI;

use crate::DspError;

/// Loop filter magnitudes beyond this are treated as numerical divergence.
const MAX_LOOP_FILTER_NORM: f32 = 1.0e3;

/// Tuning parameters for the second-order carrier tracking loop.
///
/// The four scalars collapse into a single loop-filter gain once per run
/// (see [`LoopConfig::filter_gain`]); they are kept separate so the tuning
/// reads in the conventional B_L / damping terms.
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    /// Normalized loop bandwidth B_L.
    pub loop_bandwidth: f64,
    /// Damping factor.
    pub damping: f64,
    /// Detector gain constant K.
    pub gain: f64,
    /// Nominal loop update rate in Hz (the sample rate).
    pub update_rate: f64,
    /// Ideal reference tone frequency in Hz.
    pub reference_hz: f64,
}

impl LoopConfig {
    /// Scalar loop-filter gain from the standard second-order-loop
    /// bandwidth formula:
    ///
    ///   theta = B_L / (M * ((damping + 1/4) / damping))
    ///   delta = 1 + 2 * damping * theta + theta^2
    ///   G     = (4 * damping * theta / delta) / (M * K)
    pub fn filter_gain(&self) -> f64 {
        let theta =
            self.loop_bandwidth / (self.update_rate * ((self.damping + 0.25) / self.damping));
        let delta = 1.0 + 2.0 * self.damping * theta + theta * theta;
        (4.0 * self.damping * theta / delta) / (self.update_rate * self.gain)
    }
}

/// Per-sample carrier tracking loop (DPLL).
///
/// Each sample is rotated by the NCO, compared against an ideal reference
/// tone to form an error value, and the error drives a first-order filter
/// whose phase angle becomes the next NCO rotation. Loop state lives only
/// for the duration of one [`CarrierTracker::track`] call; blocks are
/// tracked independently.
pub struct CarrierTracker {
    config: LoopConfig,
    filter_gain: f32,
}

impl CarrierTracker {
    pub fn new(config: LoopConfig) -> Self {
        let filter_gain = config.filter_gain() as f32;
        Self {
            config,
            filter_gain,
        }
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Track a frequency-corrected block and return the complex error
    /// sequence, one value per input sample.
    ///
    /// The NCO rotator starts at identity (zero rotation). If the loop
    /// filter magnitude leaves its sane range the run aborts with
    /// [`DspError::TrackingDiverged`] so NaN or unbounded values never
    /// reach the diagnostic sink.
    pub fn track(&self, samples: &[Complex32]) -> Result<Vec<Complex32>, DspError> {
        if samples.is_empty() {
            return Err(DspError::EmptyBlock);
        }

        let mut rotator = Complex32::new(1.0, 0.0);
        let mut loop_filter = Complex32::new(0.0, 0.0);
        let mut prev_error = Complex32::new(0.0, 0.0);
        let mut errors = Vec::with_capacity(samples.len());

        for (i, &sample) in samples.iter().enumerate() {
            let ref_phase = -2.0 * PI * self.config.reference_hz * i as f64 / self.config.update_rate;
            let reference = Complex32::new(ref_phase.cos() as f32, ref_phase.sin() as f32);

            let rotated = sample * rotator;
            let error = rotated * reference;

            loop_filter += self.filter_gain * prev_error;
            let magnitude = loop_filter.norm();
            if !magnitude.is_finite() || magnitude > MAX_LOOP_FILTER_NORM {
                return Err(DspError::TrackingDiverged {
                    index: i,
                    magnitude,
                });
            }

            let angle = loop_filter.arg();
            rotator = Complex32::new(angle.cos(), -angle.sin());

            prev_error = error;
            errors.push(error);
        }

        Ok(errors)
    }
}
