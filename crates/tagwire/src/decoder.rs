// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field-by-field decoding driver.
//!
//! [`FieldDecoder::merge_message`] reads tags until the buffer is
//! exhausted and offers each field to the message's generated
//! `decode_field`. A field the message does not claim is tried as an
//! extension, then stored as unknown (or dropped, with
//! `discard_unknown_fields`).
//!
//! A field claimed by number but carrying an unexpected wire type is
//! reported as unhandled by the typed helpers and takes the unknown path,
//! so its bytes survive a re-encode.

use crate::config::DecodeOptions;
use crate::error::{DecodeError, DecodeResult};
use crate::extension::ExtensionRegistry;
use crate::field_type::FieldType;
use crate::message::Message;
use crate::wire::{WireReader, WireType};

/// Decoding state for one (possibly embedded) message buffer.
pub struct FieldDecoder<'a> {
    reader: WireReader<'a>,
    options: DecodeOptions,
    registry: Option<&'a ExtensionRegistry>,
    /// Embedded-message nesting level; 0 for the top-level buffer.
    depth: usize,
    /// Wire type of the field currently being decoded.
    wire_type: WireType,
}

impl<'a> FieldDecoder<'a> {
    pub fn new(
        buffer: &'a [u8],
        options: DecodeOptions,
        registry: Option<&'a ExtensionRegistry>,
    ) -> Self {
        Self {
            reader: WireReader::new(buffer),
            options,
            registry,
            depth: 0,
            wire_type: WireType::Varint,
        }
    }

    fn nested(&self, payload: &'a [u8], depth: usize, wire_type: WireType) -> Self {
        Self {
            reader: WireReader::new(payload),
            options: self.options,
            registry: self.registry,
            depth,
            wire_type,
        }
    }

    pub fn reader(&mut self) -> &mut WireReader<'a> {
        &mut self.reader
    }

    /// Wire type of the tag that introduced the current field.
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    pub fn registry(&self) -> Option<&'a ExtensionRegistry> {
        self.registry
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Decode every remaining field of the buffer into `message`.
    pub fn merge_message<M: Message>(&mut self, message: &mut M) -> DecodeResult<()> {
        while !self.reader.is_eof() {
            let start = self.reader.offset();
            let tag = self.reader.read_tag()?;
            self.wire_type = tag.wire_type();
            let number = tag.field_number();

            if message.decode_field(self, number)? {
                continue;
            }
            if M::extension_ranges().iter().any(|r| r.contains(&number))
                && self.decode_extension(message, number)?
            {
                continue;
            }

            self.reader.skip_value(tag.wire_type())?;
            if self.options.discard_unknown_fields {
                log::trace!("[decode] {}: dropped unknown field {}", M::NAME, number);
                continue;
            }
            log::trace!("[decode] {}: kept unknown field {}", M::NAME, number);
            message
                .unknown_fields_mut()
                .append(tag, self.reader.consumed_since(start));
        }
        Ok(())
    }

    fn decode_extension<M: Message>(&mut self, message: &mut M, number: u32) -> DecodeResult<bool> {
        let Some(extension) = self.registry.and_then(|r| r.lookup(M::NAME, number)) else {
            return Ok(false);
        };
        let Some(set) = message.extension_set_mut() else {
            return Ok(false);
        };
        let handled = set.decode_extension(self, extension)?;
        if handled {
            log::trace!("[decode] {}: extension field {}", M::NAME, number);
        }
        Ok(handled)
    }

    /// Decode an optional field; `Ok(false)` on wire-type mismatch.
    ///
    /// Scalars take the last occurrence; embedded messages merge.
    pub fn decode_singular<T: FieldType>(&mut self, slot: &mut Option<T::Value>) -> DecodeResult<bool> {
        if self.wire_type != T::WIRE_TYPE {
            return Ok(false);
        }
        let value = slot.get_or_insert_with(T::Value::default);
        T::decode_into(self, value)?;
        Ok(true)
    }

    /// Decode a field stored without presence tracking.
    pub fn decode_value<T: FieldType>(&mut self, value: &mut T::Value) -> DecodeResult<bool> {
        if self.wire_type != T::WIRE_TYPE {
            return Ok(false);
        }
        T::decode_into(self, value)?;
        Ok(true)
    }

    /// Decode one occurrence of a repeated field, packed or not.
    ///
    /// Packable types accept both encodings regardless of how the field is
    /// declared.
    pub fn decode_repeated<T: FieldType>(&mut self, values: &mut Vec<T::Value>) -> DecodeResult<bool> {
        if self.wire_type == T::WIRE_TYPE {
            let mut value = T::Value::default();
            T::decode_into(self, &mut value)?;
            values.push(value);
            return Ok(true);
        }
        if self.wire_type == WireType::LengthDelimited && T::WIRE_TYPE.is_packable() {
            let payload = self.reader.read_length_delimited()?;
            let mut packed = self.nested(payload, self.depth, T::WIRE_TYPE);
            while !packed.reader.is_eof() {
                let mut value = T::Value::default();
                T::decode_into(&mut packed, &mut value)?;
                values.push(value);
            }
            return Ok(true);
        }
        Ok(false)
    }

    /// Read a length-delimited payload and merge it into `message`.
    pub(crate) fn merge_nested_message<M: Message>(&mut self, message: &mut M) -> DecodeResult<()> {
        let payload = self.reader.read_length_delimited()?;
        if self.depth >= self.options.recursion_limit {
            log::debug!(
                "[decode] {}: nesting exceeds limit {}",
                M::NAME,
                self.options.recursion_limit
            );
            return Err(DecodeError::RecursionLimitExceeded {
                limit: self.options.recursion_limit,
            });
        }
        let mut nested = self.nested(payload, self.depth + 1, WireType::Varint);
        nested.merge_message(message)
    }
}

impl std::fmt::Debug for FieldDecoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDecoder")
            .field("offset", &self.reader.offset())
            .field("remaining", &self.reader.remaining())
            .field("depth", &self.depth)
            .field("wire_type", &self.wire_type)
            .finish_non_exhaustive()
    }
}
