// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message traits implemented by `#[derive(Message)]`.

use std::fmt;
use std::ops::Range;

use crate::config::DecodeOptions;
use crate::decoder::FieldDecoder;
use crate::encoder::{encode_traversable, traversable_len};
use crate::error::DecodeResult;
use crate::extension::{ExtensionKind, ExtensionRegistry, ExtensionSet, MessageExtension};
use crate::names::NameMap;
use crate::unknown::UnknownFields;
use crate::visitor::Visitor;

/// Object-safe view of a message: walk its fields, look up its names.
pub trait Traversable: fmt::Debug {
    /// Emit declared fields (ascending number), then extension fields
    /// within the declared ranges, then unknown fields.
    fn traverse(&self, visitor: &mut dyn Visitor);

    /// Fully-qualified schema name, e.g. `"pkg.Outer.Inner"`.
    fn message_name(&self) -> &'static str;

    /// Field-number to name table, if the message was generated with one.
    fn name_map(&self) -> Option<&'static NameMap> {
        None
    }

    fn extension_set(&self) -> Option<&ExtensionSet> {
        None
    }
}

/// A generated message type.
///
/// Equality compares declared fields, extension fields and unknown fields.
pub trait Message: Traversable + Clone + Default + PartialEq + Send + Sync + 'static {
    /// Fully-qualified schema name; keys extension registration.
    const NAME: &'static str;

    /// Decode the field the decoder is positioned on, if `number` is
    /// declared and its wire type matches. `Ok(false)` leaves the value
    /// unread.
    fn decode_field(&mut self, decoder: &mut FieldDecoder<'_>, number: u32) -> DecodeResult<bool>;

    /// Merge `other` into `self`: present scalars overwrite, repeated
    /// fields append, embedded messages merge recursively, unknown fields
    /// append.
    fn merge(&mut self, other: &Self);

    fn unknown_fields(&self) -> &UnknownFields;

    fn unknown_fields_mut(&mut self) -> &mut UnknownFields;

    /// Field-number ranges (half-open) reserved for extensions.
    fn extension_ranges() -> &'static [Range<u32>] {
        &[]
    }

    fn extension_set_mut(&mut self) -> Option<&mut ExtensionSet> {
        None
    }

    /// Decode with default options and no extension registry.
    fn decode(bytes: &[u8]) -> DecodeResult<Self> {
        Self::decode_with(bytes, &DecodeOptions::default(), None)
    }

    /// Decode a complete message. Any malformed input fails the whole
    /// call.
    fn decode_with(
        bytes: &[u8],
        options: &DecodeOptions,
        registry: Option<&ExtensionRegistry>,
    ) -> DecodeResult<Self> {
        let mut message = Self::default();
        message.merge_from_bytes(bytes, options, registry)?;
        Ok(message)
    }

    /// Decode `bytes` on top of the current contents.
    ///
    /// On failure `self` is left untouched.
    fn merge_from_bytes(
        &mut self,
        bytes: &[u8],
        options: &DecodeOptions,
        registry: Option<&ExtensionRegistry>,
    ) -> DecodeResult<()> {
        let mut staged = self.clone();
        let mut decoder = FieldDecoder::new(bytes, *options, registry);
        if let Err(e) = decoder.merge_message(&mut staged) {
            log::debug!("[decode] {} rejected ({} bytes): {}", Self::NAME, bytes.len(), e);
            return Err(e);
        }
        *self = staged;
        Ok(())
    }

    fn encode(&self) -> Vec<u8> {
        encode_traversable(self)
    }

    /// Size of [`encode`](Self::encode)'s output, computed without encoding.
    fn encoded_len(&self) -> usize {
        traversable_len(self)
    }

    fn extension<K: ExtensionKind>(&self, extension: &MessageExtension<K, Self>) -> Option<&K::Value> {
        self.extension_set()?.get(extension)
    }

    fn has_extension<K: ExtensionKind>(&self, extension: &MessageExtension<K, Self>) -> bool {
        self.extension(extension).is_some()
    }

    /// Store an extension value, replacing any previous one.
    ///
    /// Returns `false`, storing nothing, if the message has no extension
    /// storage or the number lies outside its extension ranges.
    fn set_extension<K: ExtensionKind>(
        &mut self,
        extension: &MessageExtension<K, Self>,
        value: K::Value,
    ) -> bool {
        self.extension_set_mut()
            .is_some_and(|set| set.set(extension, value))
    }

    /// Remove an extension value; returns whether one was present.
    fn clear_extension<K: ExtensionKind>(&mut self, extension: &MessageExtension<K, Self>) -> bool {
        self.extension_set_mut()
            .is_some_and(|set| set.clear(extension.field_number()))
    }
}
