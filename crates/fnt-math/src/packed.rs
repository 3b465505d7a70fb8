//! Bit-packed coefficient vectors. Bit 0 of each group of eight is the
//! most-significant bit of its byte.

pub use fnt_core::packed_byte_count;

#[inline(always)]
fn bit_mask(bit: usize) -> u8 {
    0x80 >> (bit % 8)
}

#[inline]
pub fn is_set(packed: &[u8], bit: usize) -> bool {
    packed[bit / 8] & bit_mask(bit) != 0
}

/// Sets a bit. Never clears; callers pre-zero the buffer.
#[inline]
pub fn set(packed: &mut [u8], bit: usize) {
    packed[bit / 8] |= bit_mask(bit);
}

/// Packs a boolean vector into a zeroed buffer of `packed_byte_count(len)` bytes.
pub fn pack_into(coefficients: &[bool], packed: &mut [u8]) {
    packed.fill(0);
    for (i, &c) in coefficients.iter().enumerate() {
        if c { set(packed, i); }
    }
}

pub fn unpack_into(packed: &[u8], coefficients: &mut [bool]) {
    for (i, c) in coefficients.iter_mut().enumerate() {
        *c = is_set(packed, i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_zero_is_msb() {
        let mut buf = [0u8; 2];
        set(&mut buf, 0);
        set(&mut buf, 9);
        assert_eq!(buf, [0x80, 0x40]);
        assert!(is_set(&buf, 0));
        assert!(is_set(&buf, 9));
        assert!(!is_set(&buf, 1));
    }

    #[test]
    fn pack_then_unpack() {
        let coeffs = [true, false, false, true, true, false, false, false, false, true];
        let mut packed = vec![0xFFu8; packed_byte_count(coeffs.len())];
        pack_into(&coeffs, &mut packed);
        assert_eq!(packed, vec![0b1001_1000, 0b0100_0000]);

        let mut out = [false; 10];
        unpack_into(&packed, &mut out);
        assert_eq!(out, coeffs);
    }
}
