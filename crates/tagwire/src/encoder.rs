// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary wire-format visitor and its size-only counterpart.
//!
//! Embedded messages are written in place: the length prefix comes from a
//! [`SizeCounter`] pass, then the nested fields go straight into the
//! parent's buffer.

use crate::message::Traversable;
use crate::visitor::{FieldValue, Visitor};
use crate::wire::{varint_len, Tag, WireType, WireWriter};

/// Visitor that writes every visited field in wire format.
#[derive(Debug, Default)]
pub struct BinaryEncoder {
    writer: WireWriter,
}

impl BinaryEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.writer.as_bytes()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_bytes()
    }
}

fn packed_body_len(values: &[FieldValue<'_>]) -> usize {
    values.iter().map(FieldValue::encoded_len).sum()
}

impl Visitor for BinaryEncoder {
    fn visit_singular_field(&mut self, number: u32, value: FieldValue<'_>) {
        self.writer.put_tag(Tag::new(number, value.wire_type()));
        value.encode(&mut self.writer);
    }

    fn visit_packed_field(&mut self, number: u32, values: &[FieldValue<'_>]) {
        if values.is_empty() {
            return;
        }
        self.writer
            .put_tag(Tag::new(number, WireType::LengthDelimited));
        self.writer.put_varint(packed_body_len(values) as u64);
        for value in values {
            value.encode(&mut self.writer);
        }
    }

    fn visit_unknown(&mut self, bytes: &[u8]) {
        self.writer.put_raw(bytes);
    }
}

/// Visitor that only adds up the encoded size of every visited field.
#[derive(Debug, Default)]
pub struct SizeCounter {
    len: usize,
}

impl SizeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Visitor for SizeCounter {
    fn visit_singular_field(&mut self, number: u32, value: FieldValue<'_>) {
        self.len += Tag::new(number, value.wire_type()).encoded_len() + value.encoded_len();
    }

    fn visit_packed_field(&mut self, number: u32, values: &[FieldValue<'_>]) {
        if values.is_empty() {
            return;
        }
        let body = packed_body_len(values);
        self.len += Tag::new(number, WireType::LengthDelimited).encoded_len()
            + varint_len(body as u64)
            + body;
    }

    fn visit_unknown(&mut self, bytes: &[u8]) {
        self.len += bytes.len();
    }
}

/// Encode any traversable message to wire bytes.
pub fn encode_traversable(message: &dyn Traversable) -> Vec<u8> {
    let mut writer = WireWriter::with_capacity(traversable_len(message));
    encode_traversable_into(message, &mut writer);
    writer.into_bytes()
}

/// Append the message's fields (no length prefix) to `writer`.
pub fn encode_traversable_into(message: &dyn Traversable, writer: &mut WireWriter) {
    let mut encoder = BinaryEncoder {
        writer: std::mem::take(writer),
    };
    message.traverse(&mut encoder);
    *writer = encoder.writer;
}

/// Encoded size of the message's fields, without producing any bytes.
pub fn traversable_len(message: &dyn Traversable) -> usize {
    let mut counter = SizeCounter::new();
    message.traverse(&mut counter);
    counter.len()
}
