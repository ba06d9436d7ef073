// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Growable output buffer for wire values. Writes never fail.

use super::{encode_varint, Tag};

/// Generate fixed-width little-endian write methods.
macro_rules! impl_write_fixed {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) {
            self.buffer.extend_from_slice(&value.to_le_bytes());
        }
    };
}

#[derive(Debug, Clone, Default)]
pub struct WireWriter {
    buffer: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn put_varint(&mut self, value: u64) {
        encode_varint(value, &mut self.buffer);
    }

    pub fn put_tag(&mut self, tag: Tag) {
        self.put_varint(u64::from(tag.to_raw()));
    }

    impl_write_fixed!(put_fixed32, u32);
    impl_write_fixed!(put_fixed64, u64);

    /// Varint length prefix followed by the bytes.
    pub fn put_length_delimited(&mut self, bytes: &[u8]) {
        self.put_varint(bytes.len() as u64);
        self.buffer.extend_from_slice(bytes);
    }

    /// Append bytes verbatim (already-encoded fields).
    pub fn put_raw(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }
}
