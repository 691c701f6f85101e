pub mod assemble;
pub mod decode;
pub mod frame;
pub mod whitening;

/// BLE advertising access address.
pub const BLE_ADV_AA: u32 = 0x8E89BED6;

/// Access address length in bits.
pub const BLE_AA_BITS: usize = 32;

/// Render an access address as its over-the-air bit sequence (LSB first).
pub fn access_address_bits(aa: u32) -> Vec<u8> {
    (0..BLE_AA_BITS).map(|i| ((aa >> i) & 1) as u8).collect()
}

/// The 8-symbol alternating BLE preamble as it appears in the raw bit
/// sequence at `oversampling` samples per symbol: each symbol bit repeats
/// `oversampling` times, so k=2 yields `0011001100110011`.
pub fn preamble_bits(oversampling: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 * oversampling);
    for symbol in 0..8u8 {
        for _ in 0..oversampling {
            out.push(symbol & 1);
        }
    }
    out
}
