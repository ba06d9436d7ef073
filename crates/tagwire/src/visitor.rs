// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Traversal protocol: messages walk their populated fields through a
//! [`Visitor`].
//!
//! Order is fixed so output is byte-stable for a given message:
//!
//! 1. declared fields, ascending field number
//! 2. extension fields in the declared extension ranges, ascending
//! 3. unknown fields, in the order they were decoded
//!
//! The binary encoder is one visitor; text or JSON formatters are others
//! and resolve field names through [`crate::names`].

use std::hash::Hasher;

use crate::encoder::{encode_traversable, encode_traversable_into, traversable_len};
use crate::field_type::FieldType;
use crate::message::Traversable;
use crate::wire::{varint_len, zigzag_encode_32, zigzag_encode_64, WireType, WireWriter};

/// Borrowed, type-tagged view of one field value.
///
/// One variant per scalar wire representation; signed integers come in
/// three flavours because their encodings differ.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    SInt32(i32),
    SInt64(i64),
    Fixed32(u32),
    Fixed64(u64),
    SFixed32(i32),
    SFixed64(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    String(&'a str),
    Bytes(&'a [u8]),
    Message(&'a dyn Traversable),
}

impl FieldValue<'_> {
    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Int32(_)
            | Self::Int64(_)
            | Self::UInt32(_)
            | Self::UInt64(_)
            | Self::SInt32(_)
            | Self::SInt64(_)
            | Self::Bool(_) => WireType::Varint,
            Self::Fixed64(_) | Self::SFixed64(_) | Self::Double(_) => WireType::Fixed64,
            Self::Fixed32(_) | Self::SFixed32(_) | Self::Float(_) => WireType::Fixed32,
            Self::String(_) | Self::Bytes(_) | Self::Message(_) => WireType::LengthDelimited,
        }
    }

    /// Write the value (without tag) in its wire representation.
    pub fn encode(&self, writer: &mut WireWriter) {
        match *self {
            // negative int32 is sign-extended to a 10-byte varint
            Self::Int32(v) => writer.put_varint(i64::from(v) as u64),
            Self::Int64(v) => writer.put_varint(v as u64),
            Self::UInt32(v) => writer.put_varint(u64::from(v)),
            Self::UInt64(v) => writer.put_varint(v),
            Self::SInt32(v) => writer.put_varint(u64::from(zigzag_encode_32(v))),
            Self::SInt64(v) => writer.put_varint(zigzag_encode_64(v)),
            Self::Fixed32(v) => writer.put_fixed32(v),
            Self::Fixed64(v) => writer.put_fixed64(v),
            Self::SFixed32(v) => writer.put_fixed32(v as u32),
            Self::SFixed64(v) => writer.put_fixed64(v as u64),
            Self::Float(v) => writer.put_fixed32(v.to_bits()),
            Self::Double(v) => writer.put_fixed64(v.to_bits()),
            Self::Bool(v) => writer.put_varint(u64::from(v)),
            Self::String(v) => writer.put_length_delimited(v.as_bytes()),
            Self::Bytes(v) => writer.put_length_delimited(v),
            Self::Message(m) => {
                writer.put_varint(traversable_len(m) as u64);
                encode_traversable_into(m, writer);
            }
        }
    }

    /// Size of the value as written by [`encode`](Self::encode), length
    /// prefix included.
    pub fn encoded_len(&self) -> usize {
        match *self {
            Self::Int32(v) => varint_len(i64::from(v) as u64),
            Self::Int64(v) => varint_len(v as u64),
            Self::UInt32(v) => varint_len(u64::from(v)),
            Self::UInt64(v) => varint_len(v),
            Self::SInt32(v) => varint_len(u64::from(zigzag_encode_32(v))),
            Self::SInt64(v) => varint_len(zigzag_encode_64(v)),
            Self::Fixed32(_) | Self::SFixed32(_) | Self::Float(_) => 4,
            Self::Fixed64(_) | Self::SFixed64(_) | Self::Double(_) => 8,
            Self::Bool(_) => 1,
            Self::String(v) => delimited_len(v.len()),
            Self::Bytes(v) => delimited_len(v.len()),
            Self::Message(m) => delimited_len(traversable_len(m)),
        }
    }

    /// Equality on the wire representation: floats compare by bit pattern,
    /// embedded messages by their encoding. Agrees with
    /// [`hash_into`](Self::hash_into).
    pub fn wire_eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Message(a), Self::Message(b)) => {
                encode_traversable(a) == encode_traversable(b)
            }
            (a, b) if std::mem::discriminant(&a) == std::mem::discriminant(&b) => {
                let mut left = WireWriter::new();
                let mut right = WireWriter::new();
                a.encode(&mut left);
                b.encode(&mut right);
                left.as_bytes() == right.as_bytes()
            }
            _ => false,
        }
    }

    /// Feed the value into `state`.
    ///
    /// Floats hash by bit pattern; embedded messages by their encoding.
    pub fn hash_into(&self, state: &mut dyn Hasher) {
        match *self {
            Self::Int32(v) | Self::SInt32(v) | Self::SFixed32(v) => state.write_i32(v),
            Self::Int64(v) | Self::SInt64(v) | Self::SFixed64(v) => state.write_i64(v),
            Self::UInt32(v) | Self::Fixed32(v) => state.write_u32(v),
            Self::UInt64(v) | Self::Fixed64(v) => state.write_u64(v),
            Self::Float(v) => state.write_u32(v.to_bits()),
            Self::Double(v) => state.write_u64(v.to_bits()),
            Self::Bool(v) => state.write_u8(u8::from(v)),
            Self::String(v) => {
                state.write_usize(v.len());
                state.write(v.as_bytes());
            }
            Self::Bytes(v) => {
                state.write_usize(v.len());
                state.write(v);
            }
            Self::Message(m) => {
                let bytes = encode_traversable(m);
                state.write_usize(bytes.len());
                state.write(&bytes);
            }
        }
    }
}

fn delimited_len(len: usize) -> usize {
    varint_len(len as u64) + len
}

/// Receiver of a message's populated fields.
pub trait Visitor {
    fn visit_singular_field(&mut self, number: u32, value: FieldValue<'_>);

    /// Repeated field emitted element by element.
    fn visit_repeated_field(&mut self, number: u32, values: &[FieldValue<'_>]) {
        for value in values {
            self.visit_singular_field(number, *value);
        }
    }

    /// Repeated field that the schema marks as packed.
    fn visit_packed_field(&mut self, number: u32, values: &[FieldValue<'_>]) {
        self.visit_repeated_field(number, values);
    }

    /// Raw bytes of one unknown field, tag included.
    fn visit_unknown(&mut self, bytes: &[u8]);
}

/// Visit an optional field if it is present.
pub fn visit_singular<T: FieldType>(
    visitor: &mut dyn Visitor,
    number: u32,
    value: &Option<T::Value>,
) {
    if let Some(v) = value {
        visitor.visit_singular_field(number, T::value_ref(v));
    }
}

/// Visit a repeated field if it is non-empty.
pub fn visit_repeated<T: FieldType>(visitor: &mut dyn Visitor, number: u32, values: &[T::Value]) {
    if values.is_empty() {
        return;
    }
    let refs: Vec<FieldValue<'_>> = values.iter().map(T::value_ref).collect();
    visitor.visit_repeated_field(number, &refs);
}

/// Visit a packed repeated field if it is non-empty.
pub fn visit_packed<T: FieldType>(visitor: &mut dyn Visitor, number: u32, values: &[T::Value]) {
    if values.is_empty() {
        return;
    }
    let refs: Vec<FieldValue<'_>> = values.iter().map(T::value_ref).collect();
    visitor.visit_packed_field(number, &refs);
}
