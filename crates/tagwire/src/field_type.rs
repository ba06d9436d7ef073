// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Marker types binding a schema field type to its Rust value type and
//! wire representation.
//!
//! Generated code and extension descriptors are generic over these
//! markers, so one decode/traverse path serves every scalar.

use std::fmt;
use std::marker::PhantomData;

use crate::decoder::FieldDecoder;
use crate::error::{DecodeError, DecodeResult};
use crate::message::Message;
use crate::visitor::FieldValue;
use crate::wire::{zigzag_decode_32, zigzag_decode_64, WireType};

/// A schema field type.
pub trait FieldType: 'static {
    /// In-memory representation of one value.
    type Value: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static;

    /// Wire type of a single (unpacked) value.
    const WIRE_TYPE: WireType;

    /// Schema keyword, for diagnostics.
    const NAME: &'static str;

    /// Decode one value at the decoder's position into `dst`.
    ///
    /// Scalars overwrite `dst`; embedded messages merge into it.
    fn decode_into(decoder: &mut FieldDecoder<'_>, dst: &mut Self::Value) -> DecodeResult<()>;

    fn value_ref(value: &Self::Value) -> FieldValue<'_>;

    /// Combine `src` into `dst` the way a second occurrence on the wire
    /// would.
    fn merge_value(dst: &mut Self::Value, src: &Self::Value) {
        dst.clone_from(src);
    }
}

/// Generate a scalar marker type.
///
/// `|$reader| $decode` reads one value from the decoder's wire reader.
macro_rules! scalar_field_type {
    ($(#[$doc:meta])* $name:ident, $value:ty, $wire:ident, $keyword:literal, $variant:ident,
     |$reader:ident| $decode:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name;

        impl FieldType for $name {
            type Value = $value;
            const WIRE_TYPE: WireType = WireType::$wire;
            const NAME: &'static str = $keyword;

            fn decode_into(decoder: &mut FieldDecoder<'_>, dst: &mut $value) -> DecodeResult<()> {
                let $reader = decoder.reader();
                *dst = $decode;
                Ok(())
            }

            fn value_ref(value: &$value) -> FieldValue<'_> {
                FieldValue::$variant(*value)
            }
        }
    };
}

scalar_field_type!(
    /// Varint; negative values occupy ten bytes.
    Int32, i32, Varint, "int32", Int32,
    |r| r.read_varint()? as i32
);
scalar_field_type!(Int64, i64, Varint, "int64", Int64, |r| r.read_varint()? as i64);
scalar_field_type!(UInt32, u32, Varint, "uint32", UInt32, |r| r.read_varint()? as u32);
scalar_field_type!(UInt64, u64, Varint, "uint64", UInt64, |r| r.read_varint()?);
scalar_field_type!(
    /// Zigzag varint.
    SInt32, i32, Varint, "sint32", SInt32,
    |r| zigzag_decode_32(r.read_varint()? as u32)
);
scalar_field_type!(
    /// Zigzag varint.
    SInt64, i64, Varint, "sint64", SInt64,
    |r| zigzag_decode_64(r.read_varint()?)
);
scalar_field_type!(Fixed32, u32, Fixed32, "fixed32", Fixed32, |r| r.read_fixed32()?);
scalar_field_type!(Fixed64, u64, Fixed64, "fixed64", Fixed64, |r| r.read_fixed64()?);
scalar_field_type!(SFixed32, i32, Fixed32, "sfixed32", SFixed32, |r| r.read_fixed32()? as i32);
scalar_field_type!(SFixed64, i64, Fixed64, "sfixed64", SFixed64, |r| r.read_fixed64()? as i64);
scalar_field_type!(Float, f32, Fixed32, "float", Float, |r| f32::from_bits(r.read_fixed32()?));
scalar_field_type!(Double, f64, Fixed64, "double", Double, |r| f64::from_bits(r.read_fixed64()?));
scalar_field_type!(
    /// Any non-zero varint decodes as `true`.
    Bool, bool, Varint, "bool", Bool,
    |r| r.read_varint()? != 0
);

/// UTF-8 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ProtoString;

impl FieldType for ProtoString {
    type Value = String;
    const WIRE_TYPE: WireType = WireType::LengthDelimited;
    const NAME: &'static str = "string";

    fn decode_into(decoder: &mut FieldDecoder<'_>, dst: &mut String) -> DecodeResult<()> {
        let reader = decoder.reader();
        let start = reader.offset();
        let bytes = reader.read_length_delimited()?;
        let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { offset: start })?;
        dst.clear();
        dst.push_str(text);
        Ok(())
    }

    fn value_ref(value: &String) -> FieldValue<'_> {
        FieldValue::String(value)
    }
}

/// Opaque byte string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ProtoBytes;

impl FieldType for ProtoBytes {
    type Value = Vec<u8>;
    const WIRE_TYPE: WireType = WireType::LengthDelimited;
    const NAME: &'static str = "bytes";

    fn decode_into(decoder: &mut FieldDecoder<'_>, dst: &mut Vec<u8>) -> DecodeResult<()> {
        let bytes = decoder.reader().read_length_delimited()?;
        dst.clear();
        dst.extend_from_slice(bytes);
        Ok(())
    }

    fn value_ref(value: &Vec<u8>) -> FieldValue<'_> {
        FieldValue::Bytes(value)
    }
}

/// Embedded message held inline.
pub struct MessageField<M>(PhantomData<fn() -> M>);

impl<M: Message> FieldType for MessageField<M> {
    type Value = M;
    const WIRE_TYPE: WireType = WireType::LengthDelimited;
    const NAME: &'static str = "message";

    fn decode_into(decoder: &mut FieldDecoder<'_>, dst: &mut M) -> DecodeResult<()> {
        decoder.merge_nested_message(dst)
    }

    fn value_ref(value: &M) -> FieldValue<'_> {
        FieldValue::Message(value)
    }

    fn merge_value(dst: &mut M, src: &M) {
        dst.merge(src);
    }
}

/// Embedded message held behind a `Box`, for recursive schemas.
pub struct BoxedMessageField<M>(PhantomData<fn() -> M>);

impl<M: Message> FieldType for BoxedMessageField<M> {
    type Value = Box<M>;
    const WIRE_TYPE: WireType = WireType::LengthDelimited;
    const NAME: &'static str = "message";

    fn decode_into(decoder: &mut FieldDecoder<'_>, dst: &mut Box<M>) -> DecodeResult<()> {
        decoder.merge_nested_message(&mut **dst)
    }

    fn value_ref(value: &Box<M>) -> FieldValue<'_> {
        FieldValue::Message(&**value)
    }

    fn merge_value(dst: &mut Box<M>, src: &Box<M>) {
        dst.merge(src);
    }
}

/// Merge an optional field: present `src` wins, embedded messages merge.
pub fn merge_optional<T: FieldType>(dst: &mut Option<T::Value>, src: &Option<T::Value>) {
    let Some(s) = src else {
        return;
    };
    if let Some(d) = dst.as_mut() {
        T::merge_value(d, s);
    } else {
        *dst = Some(s.clone());
    }
}

/// Merge a repeated field: `src` elements are appended.
pub fn merge_repeated<T: FieldType>(dst: &mut Vec<T::Value>, src: &[T::Value]) {
    dst.extend_from_slice(src);
}
