pub mod file;

use crossbeam::channel::Sender;
use num_complex::Complex32;

/// A block of complex baseband samples.
pub struct SampleBuf {
    pub samples: Vec<Complex32>,
}

/// Common trait for sample sources (IQ file playback, SDR hardware).
pub trait SampleSource: Send {
    /// Start streaming sample blocks into the channel.
    /// Runs until the stream is exhausted, stop() is called, or the
    /// receiver side of the channel is dropped.
    fn start(&mut self, tx: Sender<SampleBuf>) -> Result<(), String>;

    /// Signal the source to stop streaming
    fn stop(&mut self);

    /// Get the sample rate in Hz
    fn sample_rate(&self) -> f64;

    /// Get the center frequency in Hz
    fn center_frequency(&self) -> u64;
}
