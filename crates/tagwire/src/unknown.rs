// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Storage for fields the decoding schema does not recognize.
//!
//! Entries keep the exact bytes seen on the wire (tag included) in the
//! order they were met, so re-encoding replays them unchanged.

use crate::visitor::Visitor;
use crate::wire::{Tag, WireWriter};

/// One unrecognized field: its parsed tag and its raw encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnknownField {
    tag: Tag,
    raw: Vec<u8>,
    value_start: usize,
}

impl UnknownField {
    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn field_number(&self) -> u32 {
        self.tag.field_number()
    }

    /// Tag and value bytes exactly as they appeared on the wire.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Value bytes following the tag (length prefix included for
    /// length-delimited fields).
    pub fn value_bytes(&self) -> &[u8] {
        &self.raw[self.value_start..]
    }
}

/// Append-only accumulator of unknown fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UnknownFields {
    fields: Vec<UnknownField>,
}

impl UnknownFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field whose complete encoding (tag included) is `field`.
    pub fn append(&mut self, tag: Tag, field: &[u8]) {
        let value_start = tag.encoded_len().min(field.len());
        self.fields.push(UnknownField {
            tag,
            raw: field.to_vec(),
            value_start,
        });
    }

    /// Record a field from its tag and already-encoded value bytes.
    pub fn append_value(&mut self, tag: Tag, value: &[u8]) {
        let mut writer = WireWriter::with_capacity(tag.encoded_len() + value.len());
        writer.put_tag(tag);
        let value_start = writer.len();
        writer.put_raw(value);
        self.fields.push(UnknownField {
            tag,
            raw: writer.into_bytes(),
            value_start,
        });
    }

    /// Append all of `other`'s entries after this store's own.
    pub fn merge(&mut self, other: &Self) {
        self.fields.extend(other.fields.iter().cloned());
    }

    /// Re-emit every entry through `visitor`, in append order.
    pub fn traverse(&self, visitor: &mut dyn Visitor) {
        for field in &self.fields {
            visitor.visit_unknown(field.raw());
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnknownField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Total encoded size of all entries.
    pub fn encoded_len(&self) -> usize {
        self.fields.iter().map(|f| f.raw.len()).sum()
    }

    /// Concatenated raw bytes of all entries.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        for field in &self.fields {
            out.extend_from_slice(&field.raw);
        }
        out
    }
}

impl<'a> IntoIterator for &'a UnknownFields {
    type Item = &'a UnknownField;
    type IntoIter = std::slice::Iter<'a, UnknownField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
