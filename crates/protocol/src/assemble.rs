use std::fmt::Write;

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AssembleError {
    /// The input must split into whole 8-bit groups; truncating would
    /// silently corrupt the payload, so this is a hard error.
    #[error("bit sequence length {len} is not a multiple of 8")]
    NotByteAligned { len: usize },
}

/// Reverse bit order within each consecutive 8-bit group and pack the
/// groups into bytes, preserving group order.
pub fn flip_bytes(bits: &[u8]) -> Result<Vec<u8>, AssembleError> {
    if bits.len() % 8 != 0 {
        return Err(AssembleError::NotByteAligned { len: bits.len() });
    }
    Ok(bits
        .chunks_exact(8)
        .map(|group| {
            group
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, &bit)| byte | ((bit & 1) << i))
        })
        .collect())
}

/// Render a bit sequence as lowercase hexadecimal text: per-byte bit flip,
/// then the byte sequence is read as one big-endian integer. Leading zeros
/// are suppressed like an integer rendering (an all-zero payload is `"0"`),
/// and no `0x` prefix is emitted.
pub fn bits_to_hex(bits: &[u8]) -> Result<String, AssembleError> {
    let bytes = flip_bytes(bits)?;

    let mut iter = bytes.iter().skip_while(|&&b| b == 0);
    let first = match iter.next() {
        Some(b) => b,
        None => return Ok("0".to_string()),
    };

    let mut hex = String::with_capacity(bytes.len() * 2);
    let _ = write!(hex, "{:x}", first);
    for byte in iter {
        let _ = write!(hex, "{:02x}", byte);
    }
    Ok(hex)
}
