// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Extension fields: values attached to a message by number, outside its
//! static layout.
//!
//! Each stored entry is a type-erased [`AnyExtensionField`] that knows how
//! to traverse, compare, hash, decode and merge itself. The concrete type
//! comes from the [`MessageExtension`] descriptor that created it.

mod descriptor;
mod registry;

pub use descriptor::{
    AnyMessageExtension, ExtensionKind, ExtensionValue, MessageExtension, Optional, Packed,
    Repeated,
};
pub use registry::{ExtensionRegistry, ExtensionRegistryBuilder};

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

use crate::decoder::FieldDecoder;
use crate::error::DecodeResult;
use crate::message::Message;
use crate::names::FieldNames;
use crate::visitor::Visitor;

/// One stored extension value, type-erased.
pub trait AnyExtensionField: fmt::Debug + Send + Sync {
    fn field_number(&self) -> u32;

    fn field_names(&self) -> FieldNames;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn clone_box(&self) -> Box<dyn AnyExtensionField>;

    fn traverse(&self, visitor: &mut dyn Visitor);

    /// Equal only if `other` has the same concrete type and value.
    fn is_equal(&self, other: &dyn AnyExtensionField) -> bool;

    /// Feed field number and value into `state`.
    fn hash_into(&self, state: &mut dyn Hasher);

    /// Decode one more occurrence into this value. `Ok(false)` on
    /// wire-type mismatch.
    fn decode_into(&mut self, decoder: &mut FieldDecoder<'_>) -> DecodeResult<bool>;

    /// Merge `other` into this value; ignored when the types differ.
    fn merge_from(&mut self, other: &dyn AnyExtensionField);
}

impl Clone for Box<dyn AnyExtensionField> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Sparse, number-keyed extension storage of one message.
#[derive(Debug, Clone, Default)]
pub struct ExtensionSet {
    fields: BTreeMap<u32, Box<dyn AnyExtensionField>>,
}

impl ExtensionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has(&self, number: u32) -> bool {
        self.fields.contains_key(&number)
    }

    /// Typed read through a descriptor. `None` when absent or stored
    /// under a different type.
    pub fn get<K: ExtensionKind, M>(&self, extension: &MessageExtension<K, M>) -> Option<&K::Value> {
        self.fields
            .get(&extension.field_number())?
            .as_any()
            .downcast_ref::<ExtensionValue<K>>()
            .map(ExtensionValue::value)
    }

    pub fn get_mut<K: ExtensionKind, M>(
        &mut self,
        extension: &MessageExtension<K, M>,
    ) -> Option<&mut K::Value> {
        self.fields
            .get_mut(&extension.field_number())?
            .as_any_mut()
            .downcast_mut::<ExtensionValue<K>>()
            .map(ExtensionValue::value_mut)
    }

    /// Typed write; replaces whatever was stored under the number.
    ///
    /// Returns `false`, storing nothing, when the number lies outside
    /// `M`'s extension ranges: traversal would never emit it.
    pub fn set<K: ExtensionKind, M: Message>(
        &mut self,
        extension: &MessageExtension<K, M>,
        value: K::Value,
    ) -> bool {
        let number = extension.field_number();
        if !M::extension_ranges().iter().any(|r| r.contains(&number)) {
            log::debug!("[extension] {}: {} is outside the extension ranges", M::NAME, number);
            return false;
        }
        self.insert(Box::new(extension.make_value(value)));
        true
    }

    /// Untyped read.
    pub fn field(&self, number: u32) -> Option<&dyn AnyExtensionField> {
        self.fields.get(&number).map(|f| &**f)
    }

    /// Store an entry under its own field number, returning the previous one.
    fn insert(&mut self, field: Box<dyn AnyExtensionField>) -> Option<Box<dyn AnyExtensionField>> {
        self.fields.insert(field.field_number(), field)
    }

    /// Remove the entry for `number`; returns whether one existed.
    pub fn clear(&mut self, number: u32) -> bool {
        self.fields.remove(&number).is_some()
    }

    pub fn field_names(&self, number: u32) -> Option<FieldNames> {
        self.fields.get(&number).map(|f| f.field_names())
    }

    /// Entries in ascending field-number order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &dyn AnyExtensionField)> + '_ {
        self.fields.iter().map(|(n, f)| (*n, f.as_ref()))
    }

    /// Visit entries with numbers in `[range.start, range.end)`, ascending.
    pub fn traverse(&self, visitor: &mut dyn Visitor, range: Range<u32>) {
        for field in self.fields.range(range).map(|(_, f)| f) {
            field.traverse(visitor);
        }
    }

    /// Merge per number: same-typed entries merge, anything else is
    /// replaced by `other`'s entry.
    pub fn merge(&mut self, other: &Self) {
        for (number, field) in &other.fields {
            match self.fields.get_mut(number) {
                Some(existing) if existing.as_any().type_id() == field.as_any().type_id() => {
                    existing.merge_from(field.as_ref());
                }
                _ => {
                    self.fields.insert(*number, field.clone_box());
                }
            }
        }
    }

    /// Decode the current field through `extension`, merging into an
    /// existing entry of the same type.
    pub(crate) fn decode_extension(
        &mut self,
        decoder: &mut FieldDecoder<'_>,
        extension: &dyn AnyMessageExtension,
    ) -> DecodeResult<bool> {
        let number = extension.field_number();
        if let Some(existing) = self.fields.get_mut(&number) {
            if extension.holds(&**existing) {
                return existing.decode_into(decoder);
            }
        }
        match extension.decode_new(decoder)? {
            Some(field) => {
                self.fields.insert(number, field);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Values compare on their wire representation, so floats compare by bit
/// pattern (`0.0 != -0.0`, `NaN == NaN`) in step with [`Hash`].
impl PartialEq for ExtensionSet {
    fn eq(&self, other: &Self) -> bool {
        // keys are unique: equal size plus one-way containment covers both directions
        self.fields.len() == other.fields.len()
            && self.fields.iter().all(|(number, field)| {
                other
                    .fields
                    .get(number)
                    .is_some_and(|o| field.is_equal(o.as_ref()))
            })
    }
}

impl Eq for ExtensionSet {}

impl Hash for ExtensionSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.fields.len());
        for field in self.fields.values() {
            field.hash_into(&mut *state);
        }
    }
}
