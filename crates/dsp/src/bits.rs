use num_complex::Complex32;
use std::f64::consts::PI;

/// Unwrap sample phases into a continuous sequence.
///
/// Steps between consecutive raw angles larger than pi in magnitude are
/// corrected by the appropriate multiple of 2*pi. The accumulator runs in
/// f64 so multi-million-sample captures keep sub-radian precision.
pub fn unwrap_phase(samples: &[Complex32]) -> Vec<f64> {
    let mut out = Vec::with_capacity(samples.len());
    let mut offset = 0.0f64;
    let mut prev_raw = 0.0f64;

    for (i, sample) in samples.iter().enumerate() {
        let raw = sample.arg() as f64;
        if i > 0 {
            let step = raw - prev_raw;
            if step > PI {
                offset -= 2.0 * PI;
            } else if step < -PI {
                offset += 2.0 * PI;
            }
        }
        prev_raw = raw;
        out.push(raw + offset);
    }
    out
}

/// Instantaneous-frequency bit detector.
///
/// Takes the first difference of the unwrapped phase and maps each
/// derivative sample to a bit: 1 if negative, 0 otherwise. Output length is
/// input length - 1; an empty or single-sample input yields no bits.
pub fn extract_bits(samples: &[Complex32]) -> Vec<u8> {
    let phase = unwrap_phase(samples);
    phase
        .windows(2)
        .map(|pair| if pair[1] - pair[0] < 0.0 { 1 } else { 0 })
        .collect()
}
