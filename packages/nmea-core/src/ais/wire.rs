//! wire.rs — MSB-first bit-field access for AIVDM payloads
//!
//! Field widths are exact; signed fields are two's complement in their
//! declared width. Reads past the end of the vector see zero bits, which
//! matches receivers that zero-fill short payloads.

use bitvec::prelude::*;

use crate::ais::sixbit::{sixbit_to_text, text_to_sixbit};

/// Append `len` bits of `value`, most significant first.
pub fn put_u64(bv: &mut BitVec<u8, Msb0>, value: u64, len: usize) {
    for i in (0..len).rev() {
        let bit = if i < 64 { (value >> i) & 1 != 0 } else { false };
        bv.push(bit);
    }
}

/// Append `len` bits of `value` as two's complement.
pub fn put_i64(bv: &mut BitVec<u8, Msb0>, value: i64, len: usize) {
    let raw = if value < 0 {
        ((1i64 << len) + value) as u64
    } else {
        value as u64
    };
    put_u64(bv, raw, len);
}

/// Append a string field of `len_bits / 6` characters, upper-cased and
/// right-padded with `@`.
pub fn put_str(bv: &mut BitVec<u8, Msb0>, text: &str, len_bits: usize) {
    let max_chars = len_bits / 6;
    let mut chars = text.chars();
    for _ in 0..max_chars {
        let v = chars.next().map(text_to_sixbit).unwrap_or(0);
        put_u64(bv, v as u64, 6);
    }
}

/// Read `len` bits starting at `index` as an unsigned value.
pub fn pick_u64(bv: &BitSlice<u8, Msb0>, index: usize, len: usize) -> u64 {
    let mut res = 0u64;
    for pos in index..(index + len) {
        let bit = bv.get(pos).map(|b| *b).unwrap_or(false);
        res = (res << 1) | (bit as u64);
    }
    res
}

/// Read `len` bits starting at `index` as a two's complement value.
pub fn pick_i64(bv: &BitSlice<u8, Msb0>, index: usize, len: usize) -> i64 {
    let raw = pick_u64(bv, index, len);
    let sign_bit = 1u64 << (len - 1);
    if raw & sign_bit != 0 {
        ((raw & (sign_bit - 1)) as i64) - (sign_bit as i64)
    } else {
        raw as i64
    }
}

/// Read a `char_count`-character string field. Decoding stops at the first
/// `@` (value 0); trailing spaces are trimmed.
pub fn pick_string(bv: &BitSlice<u8, Msb0>, index: usize, char_count: usize) -> String {
    let mut res = String::with_capacity(char_count);
    for i in 0..char_count {
        match pick_u64(bv, index + i * 6, 6) as u8 {
            0 => break,
            v => res.push(sixbit_to_text(v)),
        }
    }
    res.truncate(res.trim_end().len());
    res
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unsigned_round_trip() {
        let mut bv: BitVec<u8, Msb0> = BitVec::new();
        put_u64(&mut bv, 5, 6);
        put_u64(&mut bv, 368_962_950, 30);
        put_u64(&mut bv, 0, 2);
        assert_eq!(pick_u64(&bv, 0, 6), 5);
        assert_eq!(pick_u64(&bv, 6, 30), 368_962_950);
        assert_eq!(pick_u64(&bv, 36, 2), 0);
    }

    #[test]
    fn signed_round_trip() {
        let mut bv: BitVec<u8, Msb0> = BitVec::new();
        put_i64(&mut bv, -600_000, 27);
        put_i64(&mut bv, 600_000, 28);
        put_i64(&mut bv, -1, 8);
        assert_eq!(pick_i64(&bv, 0, 27), -600_000);
        assert_eq!(pick_i64(&bv, 27, 28), 600_000);
        assert_eq!(pick_i64(&bv, 55, 8), -1);
    }

    #[test]
    fn negative_latitude_raw_field() {
        // lat −1.0° → minutes × 10 000 = −600 000, two's complement in 27 bits
        let mut bv: BitVec<u8, Msb0> = BitVec::new();
        put_i64(&mut bv, -600_000, 27);
        assert_eq!(pick_u64(&bv, 0, 27), (1u64 << 27) - 600_000);
    }

    #[test]
    fn reads_past_end_are_zero() {
        let bv: BitVec<u8, Msb0> = bitvec![u8, Msb0; 1, 1];
        assert_eq!(pick_u64(&bv, 0, 6), 0b110000);
    }

    #[test]
    fn string_pad_and_truncate() {
        let mut bv: BitVec<u8, Msb0> = BitVec::new();
        put_str(&mut bv, "ever given", 120); // 20 chars
        assert_eq!(bv.len(), 120);
        assert_eq!(pick_string(&bv, 0, 20), "EVER GIVEN");

        let mut bv: BitVec<u8, Msb0> = BitVec::new();
        put_str(&mut bv, "BUSAN NEW PORT TERMINAL 4", 120);
        assert_eq!(pick_string(&bv, 0, 20), "BUSAN NEW PORT TERMI");
    }
}
