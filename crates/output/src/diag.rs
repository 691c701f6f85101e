use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use byteorder::{LittleEndian, WriteBytesExt};
use num_complex::Complex32;

/// Sink for named diagnostic sample sequences (the DPLL error signal).
///
/// Fire and forget: a sink never feeds back into the pipeline, and write
/// failures are logged rather than propagated.
pub trait DiagnosticSink {
    fn write_series(&mut self, name: &str, series: &[Complex32]);
}

/// Discards every series.
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn write_series(&mut self, _name: &str, _series: &[Complex32]) {}
}

/// Writes each series as interleaved little-endian f32 I/Q pairs, one
/// `<name>.cf32` file per series under a base directory. The format is
/// readable by the usual IQ plotting tools.
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn write_file(&self, name: &str, series: &[Complex32]) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.cf32", name));
        let mut writer = BufWriter::new(File::create(&path)?);
        for sample in series {
            writer.write_f32::<LittleEndian>(sample.re)?;
            writer.write_f32::<LittleEndian>(sample.im)?;
        }
        io::Write::flush(&mut writer)
    }
}

impl DiagnosticSink for FileSink {
    fn write_series(&mut self, name: &str, series: &[Complex32]) {
        if let Err(e) = self.write_file(name, series) {
            log::warn!("failed to write diagnostic series {}: {}", name, e);
        }
    }
}
