// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Base-128 varints and zigzag transforms.

use crate::config::MAX_VARINT_LEN;
use crate::error::{DecodeError, DecodeResult};

/// Append `value` as a varint (7 payload bits per byte, low group first).
#[inline]
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Number of bytes `value` occupies as a varint.
#[inline]
pub const fn varint_len(value: u64) -> usize {
    // 1 byte for zero, otherwise one byte per started 7-bit group
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// Read a varint starting at `pos`.
///
/// Returns the value and the position just past it. A tenth byte may only
/// contribute bit 63; bits beyond are discarded the way other decoders do.
/// A continuation bit on the tenth byte is malformed input.
pub fn read_varint(buf: &[u8], pos: usize) -> DecodeResult<(u64, usize)> {
    let mut value: u64 = 0;
    for i in 0..MAX_VARINT_LEN {
        let Some(&byte) = buf.get(pos + i) else {
            return Err(DecodeError::Truncated {
                offset: pos + i,
                needed: 1,
            });
        };
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, pos + i + 1));
        }
    }
    Err(DecodeError::VarintTooLong { offset: pos })
}

/// `(n << 1) ^ (n >> 63)`: small magnitudes map to small unsigned values.
#[inline]
pub const fn zigzag_encode_64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

#[inline]
pub const fn zigzag_decode_64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

#[inline]
pub const fn zigzag_encode_32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

#[inline]
pub const fn zigzag_decode_32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_varint(value, &mut buf);
        buf
    }

    #[test]
    fn test_varint_boundary_encodings() {
        assert_eq!(encoded(0), vec![0x00]);
        assert_eq!(encoded(127), vec![0x7f]);
        assert_eq!(encoded(128), vec![0x80, 0x01]);
        assert_eq!(encoded(300), vec![0xac, 0x02]);
        assert_eq!(encoded(u64::MAX).len(), MAX_VARINT_LEN);
    }

    #[test]
    fn test_varint_len_matches_encoding() {
        for value in [
            0,
            1,
            127,
            128,
            16_383,
            16_384,
            (1 << 35) - 1,
            i64::MAX as u64,
            u64::MAX,
        ] {
            assert_eq!(varint_len(value), encoded(value).len(), "value {}", value);
        }
    }

    #[test]
    fn test_read_varint_reports_next_position() {
        let buf = [0xff, 0xac, 0x02, 0x05];
        let (value, next) = read_varint(&buf, 1).expect("varint");
        assert_eq!(value, 300);
        assert_eq!(next, 3);
    }

    #[test]
    fn test_read_varint_truncated() {
        let err = read_varint(&[0x80, 0x80], 0).unwrap_err();
        assert_eq!(err, DecodeError::Truncated { offset: 2, needed: 1 });

        let err = read_varint(&[], 0).unwrap_err();
        assert_eq!(err, DecodeError::Truncated { offset: 0, needed: 1 });
    }

    #[test]
    fn test_read_varint_rejects_eleven_bytes() {
        let mut buf = vec![0xff; 10];
        buf.push(0x01);
        let err = read_varint(&buf, 0).unwrap_err();
        assert_eq!(err, DecodeError::VarintTooLong { offset: 0 });
    }

    #[test]
    fn test_read_varint_accepts_ten_byte_max() {
        let buf = encoded(u64::MAX);
        let (value, next) = read_varint(&buf, 0).expect("ten-byte varint");
        assert_eq!(value, u64::MAX);
        assert_eq!(next, 10);
    }

    #[test]
    fn test_zigzag_known_values() {
        assert_eq!(zigzag_encode_64(0), 0);
        assert_eq!(zigzag_encode_64(-1), 1);
        assert_eq!(zigzag_encode_64(1), 2);
        assert_eq!(zigzag_encode_64(-2), 3);
        assert_eq!(zigzag_encode_64(i64::MAX), u64::MAX - 1);
        assert_eq!(zigzag_encode_64(i64::MIN), u64::MAX);
        assert_eq!(zigzag_encode_32(-1), 1);
        assert_eq!(zigzag_encode_32(i32::MIN), u32::MAX);
    }

    #[test]
    fn test_zigzag_inverse() {
        for n in [0i64, 1, -1, 63, -64, i64::MAX, i64::MIN] {
            assert_eq!(zigzag_decode_64(zigzag_encode_64(n)), n);
        }
        for n in [0i32, 1, -1, i32::MAX, i32::MIN] {
            assert_eq!(zigzag_decode_32(zigzag_encode_32(n)), n);
        }
    }
}
