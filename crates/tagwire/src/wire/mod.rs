// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire codec: tags, varints, zigzag, fixed-width and length-delimited values.
//!
//! Every field on the wire is a tag followed by a value:
//!
//! ```text
//! tag   = varint((field_number << 3) | wire_type)
//! value = varint                       (wire type 0)
//!       | 8 bytes little-endian        (wire type 1)
//!       | varint(len) + len bytes      (wire type 2)
//!       | 4 bytes little-endian        (wire type 5)
//! ```
//!
//! Group wire types (3 and 4) and the unassigned values 6 and 7 are
//! rejected as malformed input.

pub mod reader;
pub mod varint;
pub mod writer;

pub use reader::WireReader;
pub use varint::{
    encode_varint, read_varint, varint_len, zigzag_decode_32, zigzag_decode_64, zigzag_encode_32,
    zigzag_encode_64,
};
pub use writer::WireWriter;

use crate::config::{MAX_FIELD_NUMBER, MIN_FIELD_NUMBER};
use crate::error::{DecodeError, DecodeResult};

/// The 3-bit code in a tag telling how the value that follows is framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl WireType {
    /// Map the low three bits of a tag to a wire type.
    pub const fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::LengthDelimited),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether repeated values of this wire type may be packed into a
    /// single length-delimited run.
    pub const fn is_packable(self) -> bool {
        !matches!(self, Self::LengthDelimited)
    }
}

/// Field number plus wire type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    field_number: u32,
    wire_type: WireType,
}

impl Tag {
    /// Build a tag.
    ///
    /// `field_number` must lie in `1..=MAX_FIELD_NUMBER`; generated code and
    /// extension descriptors only ever pass declared numbers.
    pub const fn new(field_number: u32, wire_type: WireType) -> Self {
        debug_assert!(field_number >= MIN_FIELD_NUMBER && field_number <= MAX_FIELD_NUMBER);
        Self {
            field_number,
            wire_type,
        }
    }

    /// Parse a raw tag value read at `offset`.
    pub fn from_raw(raw: u64, offset: usize) -> DecodeResult<Self> {
        let wire_bits = (raw & 0x7) as u8;
        let wire_type = WireType::from_raw(wire_bits).ok_or(DecodeError::InvalidWireType {
            offset,
            wire_type: wire_bits,
        })?;
        let number = raw >> 3;
        if number < u64::from(MIN_FIELD_NUMBER) || number > u64::from(MAX_FIELD_NUMBER) {
            return Err(DecodeError::InvalidFieldNumber { offset, number });
        }
        Ok(Self {
            field_number: number as u32,
            wire_type,
        })
    }

    pub const fn field_number(self) -> u32 {
        self.field_number
    }

    pub const fn wire_type(self) -> WireType {
        self.wire_type
    }

    /// Raw tag value, `(field_number << 3) | wire_type`.
    pub const fn to_raw(self) -> u32 {
        (self.field_number << 3) | self.wire_type as u32
    }

    /// Number of bytes the tag occupies when varint-encoded.
    pub fn encoded_len(self) -> usize {
        varint_len(u64::from(self.to_raw()))
    }
}
