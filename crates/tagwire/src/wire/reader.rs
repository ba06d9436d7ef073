// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked read cursor over an encoded buffer.

use super::{read_varint, Tag, WireType};
use crate::error::{DecodeError, DecodeResult};

/// Generate fixed-width little-endian read methods.
///
/// Each generated method checks that `$size` bytes remain (reporting
/// `DecodeError::Truncated` otherwise), decodes them and advances.
macro_rules! impl_read_fixed {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> DecodeResult<$type> {
            let bytes = self.read_bytes($size)?;
            let mut raw = [0u8; $size];
            raw.copy_from_slice(bytes);
            Ok(<$type>::from_le_bytes(raw))
        }
    };
}

/// Read cursor over one message's bytes.
///
/// Slices handed out borrow from the source buffer; callers that keep
/// them copy the bytes out.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    pub fn read_varint(&mut self) -> DecodeResult<u64> {
        let (value, next) = read_varint(self.buffer, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    impl_read_fixed!(read_fixed32, u32, 4);
    impl_read_fixed!(read_fixed64, u64, 8);

    /// Read the next tag and validate its wire type and field number.
    pub fn read_tag(&mut self) -> DecodeResult<Tag> {
        let start = self.offset;
        let raw = self.read_varint()?;
        Tag::from_raw(raw, start)
    }

    pub fn read_bytes(&mut self, len: usize) -> DecodeResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(DecodeError::Truncated {
                offset: self.offset,
                needed: len - self.remaining(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// Read a varint length followed by that many bytes.
    pub fn read_length_delimited(&mut self) -> DecodeResult<&'a [u8]> {
        let start = self.offset;
        let len = self.read_varint()?;
        let Ok(len) = usize::try_from(len) else {
            return Err(DecodeError::Truncated {
                offset: start,
                needed: usize::MAX,
            });
        };
        self.read_bytes(len)
    }

    /// Consume one value of the given wire type without interpreting it.
    pub fn skip_value(&mut self, wire_type: WireType) -> DecodeResult<()> {
        match wire_type {
            WireType::Varint => self.read_varint().map(drop),
            WireType::Fixed64 => self.read_bytes(8).map(drop),
            WireType::LengthDelimited => self.read_length_delimited().map(drop),
            WireType::Fixed32 => self.read_bytes(4).map(drop),
        }
    }

    /// Bytes between `start` and the current offset.
    pub fn consumed_since(&self, start: usize) -> &'a [u8] {
        &self.buffer[start.min(self.offset)..self.offset]
    }
}
