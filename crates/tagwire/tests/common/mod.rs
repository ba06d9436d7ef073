// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message types and extension descriptors shared by the integration tests.

#![allow(dead_code)]

use tagwire::extension::{ExtensionRegistry, MessageExtension, Optional, Packed, Repeated};
use tagwire::field_type::{Int32, MessageField, ProtoString, UInt64};
use tagwire::{ExtensionSet, FieldNames, UnknownFields};

/// `{ a: int32 = 1 }`
#[derive(Debug, Clone, Default, PartialEq, tagwire::Message)]
#[message(name = "test.Simple")]
pub struct Simple {
    #[field(number = 1, int32)]
    pub a: Option<i32>,
    #[unknown]
    pub unknown: UnknownFields,
}

impl Simple {
    pub fn with_a(a: i32) -> Self {
        Self {
            a: Some(a),
            ..Self::default()
        }
    }
}

/// One optional field per scalar type, numbered 1..=15.
#[derive(Debug, Clone, Default, PartialEq, tagwire::Message)]
#[message(name = "test.Scalars")]
pub struct Scalars {
    #[field(number = 1, int32)]
    pub int32: Option<i32>,
    #[field(number = 2, int64)]
    pub int64: Option<i64>,
    #[field(number = 3, uint32)]
    pub uint32: Option<u32>,
    #[field(number = 4, uint64)]
    pub uint64: Option<u64>,
    #[field(number = 5, sint32)]
    pub sint32: Option<i32>,
    #[field(number = 6, sint64)]
    pub sint64: Option<i64>,
    #[field(number = 7, fixed32)]
    pub fixed32: Option<u32>,
    #[field(number = 8, fixed64)]
    pub fixed64: Option<u64>,
    #[field(number = 9, sfixed32)]
    pub sfixed32: Option<i32>,
    #[field(number = 10, sfixed64)]
    pub sfixed64: Option<i64>,
    #[field(number = 11, float)]
    pub float: Option<f32>,
    #[field(number = 12, double)]
    pub double: Option<f64>,
    #[field(number = 13, bool)]
    pub flag: Option<bool>,
    #[field(number = 14, string)]
    pub text: Option<String>,
    #[field(number = 15, bytes)]
    pub data: Option<Vec<u8>>,
    #[unknown]
    pub unknown: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, tagwire::Message)]
#[message(name = "test.Repeats")]
pub struct Repeats {
    #[field(number = 1, int32, repeated)]
    pub plain: Vec<i32>,
    #[field(number = 2, sint64, repeated, packed)]
    pub packed: Vec<i64>,
    #[field(number = 3, string, repeated)]
    pub names: Vec<String>,
    #[field(number = 4, message, repeated)]
    pub items: Vec<Simple>,
    #[unknown]
    pub unknown: UnknownFields,
}

/// Recursive message; `weight` has implicit presence.
#[derive(Debug, Clone, Default, PartialEq, tagwire::Message)]
#[message(name = "test.Node")]
pub struct Node {
    #[field(number = 1, string)]
    pub label: Option<String>,
    #[field(number = 2, message)]
    pub child: Option<Box<Node>>,
    #[field(number = 3, uint32)]
    pub weight: u32,
    #[unknown]
    pub unknown: UnknownFields,
}

impl Node {
    /// Chain of `depth` nodes below the returned root.
    pub fn chain(depth: usize) -> Self {
        let mut node = Node {
            label: Some("leaf".to_string()),
            ..Node::default()
        };
        for level in 0..depth {
            node = Node {
                label: None,
                child: Some(Box::new(node)),
                weight: level as u32 + 1,
                unknown: UnknownFields::new(),
            };
        }
        node
    }
}

/// Extendable message: ranges `100..200` and `1000..=1999`.
#[derive(Debug, Clone, Default, PartialEq, tagwire::Message)]
#[message(name = "test.Host", extensions = 100..200, extensions = 1000..=1999)]
pub struct Host {
    #[field(number = 1, string, json = "hostName")]
    pub name: Option<String>,
    #[field(number = 2, message)]
    pub inner: Option<Simple>,
    #[field(number = 300, int64)]
    pub late_field: Option<i64>,
    #[unknown]
    pub unknown: UnknownFields,
    #[extensions]
    pub extensions: ExtensionSet,
}

pub static SCORE: MessageExtension<Optional<Int32>, Host> =
    MessageExtension::new(100, FieldNames::same("score", "score"));

pub static LABELS: MessageExtension<Repeated<ProtoString>, Host> =
    MessageExtension::new(101, FieldNames::same("labels", "labels"));

pub static NESTED: MessageExtension<Optional<MessageField<Simple>>, Host> =
    MessageExtension::new(150, FieldNames::unique("nested_ext", "nestedExt", "nested_ext"));

pub static TICKS: MessageExtension<Packed<UInt64>, Host> =
    MessageExtension::new(1000, FieldNames::same("ticks", "ticks"));

/// Same number as `SCORE`, different value type.
pub static SCORE_AS_LABELS: MessageExtension<Repeated<ProtoString>, Host> =
    MessageExtension::new(100, FieldNames::same("score_labels", "score_labels"));

pub fn registry() -> ExtensionRegistry {
    ExtensionRegistry::builder()
        .register(&SCORE)
        .and_then(|b| b.register(&LABELS))
        .and_then(|b| b.register(&NESTED))
        .and_then(|b| b.register(&TICKS))
        .expect("valid registrations")
        .build()
}
