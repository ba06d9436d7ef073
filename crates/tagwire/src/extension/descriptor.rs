// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Extension descriptors and the stored value type they produce.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::Hasher;
use std::marker::PhantomData;

use super::AnyExtensionField;
use crate::decoder::FieldDecoder;
use crate::error::DecodeResult;
use crate::field_type::FieldType;
use crate::message::Message;
use crate::names::FieldNames;
use crate::visitor::{visit_packed, visit_repeated, Visitor};

/// Cardinality and encoding of an extension field over a [`FieldType`].
pub trait ExtensionKind: 'static {
    type Value: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static;

    fn decode(decoder: &mut FieldDecoder<'_>, value: &mut Self::Value) -> DecodeResult<bool>;

    fn traverse(value: &Self::Value, number: u32, visitor: &mut dyn Visitor);

    fn hash_value(value: &Self::Value, state: &mut dyn Hasher);

    /// Equality consistent with [`hash_value`](Self::hash_value).
    fn value_eq(a: &Self::Value, b: &Self::Value) -> bool;

    fn merge(dst: &mut Self::Value, src: &Self::Value);
}

/// Single value.
pub struct Optional<T>(PhantomData<fn() -> T>);

/// Repeated values, emitted one tag per element.
pub struct Repeated<T>(PhantomData<fn() -> T>);

/// Repeated values, emitted as one length-delimited run.
pub struct Packed<T>(PhantomData<fn() -> T>);

impl<T: FieldType> ExtensionKind for Optional<T> {
    type Value = T::Value;

    fn decode(decoder: &mut FieldDecoder<'_>, value: &mut T::Value) -> DecodeResult<bool> {
        decoder.decode_value::<T>(value)
    }

    fn traverse(value: &T::Value, number: u32, visitor: &mut dyn Visitor) {
        visitor.visit_singular_field(number, T::value_ref(value));
    }

    fn hash_value(value: &T::Value, state: &mut dyn Hasher) {
        T::value_ref(value).hash_into(state);
    }

    fn value_eq(a: &T::Value, b: &T::Value) -> bool {
        T::value_ref(a).wire_eq(&T::value_ref(b))
    }

    fn merge(dst: &mut T::Value, src: &T::Value) {
        T::merge_value(dst, src);
    }
}

fn hash_values<T: FieldType>(values: &[T::Value], state: &mut dyn Hasher) {
    state.write_usize(values.len());
    for value in values {
        T::value_ref(value).hash_into(state);
    }
}

fn values_eq<T: FieldType>(a: &[T::Value], b: &[T::Value]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| T::value_ref(x).wire_eq(&T::value_ref(y)))
}

impl<T: FieldType> ExtensionKind for Repeated<T> {
    type Value = Vec<T::Value>;

    fn decode(decoder: &mut FieldDecoder<'_>, values: &mut Vec<T::Value>) -> DecodeResult<bool> {
        decoder.decode_repeated::<T>(values)
    }

    fn traverse(values: &Vec<T::Value>, number: u32, visitor: &mut dyn Visitor) {
        visit_repeated::<T>(visitor, number, values);
    }

    fn hash_value(values: &Vec<T::Value>, state: &mut dyn Hasher) {
        hash_values::<T>(values, state);
    }

    fn value_eq(a: &Vec<T::Value>, b: &Vec<T::Value>) -> bool {
        values_eq::<T>(a, b)
    }

    fn merge(dst: &mut Vec<T::Value>, src: &Vec<T::Value>) {
        dst.extend_from_slice(src);
    }
}

impl<T: FieldType> ExtensionKind for Packed<T> {
    type Value = Vec<T::Value>;

    fn decode(decoder: &mut FieldDecoder<'_>, values: &mut Vec<T::Value>) -> DecodeResult<bool> {
        decoder.decode_repeated::<T>(values)
    }

    fn traverse(values: &Vec<T::Value>, number: u32, visitor: &mut dyn Visitor) {
        visit_packed::<T>(visitor, number, values);
    }

    fn hash_value(values: &Vec<T::Value>, state: &mut dyn Hasher) {
        hash_values::<T>(values, state);
    }

    fn value_eq(a: &Vec<T::Value>, b: &Vec<T::Value>) -> bool {
        values_eq::<T>(a, b)
    }

    fn merge(dst: &mut Vec<T::Value>, src: &Vec<T::Value>) {
        dst.extend_from_slice(src);
    }
}

/// A stored extension value of kind `K`.
pub struct ExtensionValue<K: ExtensionKind> {
    number: u32,
    names: FieldNames,
    value: K::Value,
}

impl<K: ExtensionKind> ExtensionValue<K> {
    pub fn new(number: u32, names: FieldNames, value: K::Value) -> Self {
        Self {
            number,
            names,
            value,
        }
    }

    pub fn value(&self) -> &K::Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut K::Value {
        &mut self.value
    }

    pub fn into_value(self) -> K::Value {
        self.value
    }
}

impl<K: ExtensionKind> Clone for ExtensionValue<K> {
    fn clone(&self) -> Self {
        Self {
            number: self.number,
            names: self.names,
            value: self.value.clone(),
        }
    }
}

impl<K: ExtensionKind> fmt::Debug for ExtensionValue<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionValue")
            .field("number", &self.number)
            .field("name", &self.names.proto)
            .field("value", &self.value)
            .finish()
    }
}

impl<K: ExtensionKind> AnyExtensionField for ExtensionValue<K> {
    fn field_number(&self) -> u32 {
        self.number
    }

    fn field_names(&self) -> FieldNames {
        self.names
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn AnyExtensionField> {
        Box::new(self.clone())
    }

    fn traverse(&self, visitor: &mut dyn Visitor) {
        K::traverse(&self.value, self.number, visitor);
    }

    fn is_equal(&self, other: &dyn AnyExtensionField) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| o.number == self.number && K::value_eq(&o.value, &self.value))
    }

    fn hash_into(&self, state: &mut dyn Hasher) {
        state.write_u32(self.number);
        K::hash_value(&self.value, state);
    }

    fn decode_into(&mut self, decoder: &mut FieldDecoder<'_>) -> DecodeResult<bool> {
        K::decode(decoder, &mut self.value)
    }

    fn merge_from(&mut self, other: &dyn AnyExtensionField) {
        if let Some(o) = other.as_any().downcast_ref::<Self>() {
            K::merge(&mut self.value, &o.value);
        }
    }
}

/// Descriptor of one extension field of kind `K` on message `M`.
///
/// Declared as a `static` and registered by reference:
///
/// ```
/// use tagwire::extension::{MessageExtension, Optional};
/// use tagwire::field_type::Int32;
/// use tagwire::names::FieldNames;
///
/// #[derive(Debug, Clone, Default, PartialEq, tagwire::Message)]
/// #[message(name = "demo.Host", extensions = 100..200)]
/// struct Host {
///     #[unknown]
///     unknown: tagwire::UnknownFields,
///     #[extensions]
///     extensions: tagwire::ExtensionSet,
/// }
///
/// static SCORE: MessageExtension<Optional<Int32>, Host> =
///     MessageExtension::new(100, FieldNames::same("score", "score"));
/// ```
pub struct MessageExtension<K, M> {
    number: u32,
    names: FieldNames,
    _marker: PhantomData<fn() -> (K, M)>,
}

impl<K, M> MessageExtension<K, M> {
    pub const fn new(number: u32, names: FieldNames) -> Self {
        Self {
            number,
            names,
            _marker: PhantomData,
        }
    }

    pub const fn field_number(&self) -> u32 {
        self.number
    }

    pub const fn field_names(&self) -> FieldNames {
        self.names
    }
}

impl<K: ExtensionKind, M> MessageExtension<K, M> {
    pub fn make_value(&self, value: K::Value) -> ExtensionValue<K> {
        ExtensionValue::new(self.number, self.names, value)
    }
}

impl<K, M> fmt::Debug for MessageExtension<K, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageExtension")
            .field("number", &self.number)
            .field("name", &self.names.proto)
            .finish_non_exhaustive()
    }
}

/// Type-erased descriptor, as stored in an
/// [`ExtensionRegistry`](super::ExtensionRegistry).
pub trait AnyMessageExtension: fmt::Debug + Send + Sync {
    fn field_number(&self) -> u32;

    /// Full name of the message this extension attaches to.
    fn extendee(&self) -> &'static str;

    fn field_names(&self) -> FieldNames;

    /// Type of the stored value this descriptor produces.
    fn value_type_id(&self) -> TypeId;

    /// Whether `field` was produced by a descriptor of this type.
    fn holds(&self, field: &dyn AnyExtensionField) -> bool;

    /// Decode the current field into a fresh entry. `Ok(None)` on
    /// wire-type mismatch.
    fn decode_new(
        &self,
        decoder: &mut FieldDecoder<'_>,
    ) -> DecodeResult<Option<Box<dyn AnyExtensionField>>>;
}

impl<K: ExtensionKind, M: Message> AnyMessageExtension for MessageExtension<K, M> {
    fn field_number(&self) -> u32 {
        self.number
    }

    fn extendee(&self) -> &'static str {
        M::NAME
    }

    fn field_names(&self) -> FieldNames {
        self.names
    }

    fn value_type_id(&self) -> TypeId {
        TypeId::of::<ExtensionValue<K>>()
    }

    fn holds(&self, field: &dyn AnyExtensionField) -> bool {
        field.as_any().is::<ExtensionValue<K>>()
    }

    fn decode_new(
        &self,
        decoder: &mut FieldDecoder<'_>,
    ) -> DecodeResult<Option<Box<dyn AnyExtensionField>>> {
        let mut field = self.make_value(K::Value::default());
        if K::decode(decoder, field.value_mut())? {
            Ok(Some(Box::new(field)))
        } else {
            Ok(None)
        }
    }
}
