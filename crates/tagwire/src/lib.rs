// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # tagwire - tag/varint wire format runtime
//!
//! Runtime core for messages encoded in the protobuf-style tag/varint
//! binary format: the wire codec, field dispatch during decode, traversal
//! during encode, extension fields, preservation of unknown fields and
//! field-name resolution.
//!
//! ## Quick Start
//!
//! ```rust
//! use tagwire::Message;
//!
//! #[derive(Debug, Clone, Default, PartialEq, tagwire::Message)]
//! #[message(name = "demo.Point")]
//! struct Point {
//!     #[field(number = 1, sint32)]
//!     x: Option<i32>,
//!     #[field(number = 2, sint32)]
//!     y: Option<i32>,
//!     #[field(number = 3, string, repeated)]
//!     tags: Vec<String>,
//!     #[unknown]
//!     unknown: tagwire::UnknownFields,
//! }
//!
//! # fn main() -> Result<(), tagwire::DecodeError> {
//! let point = Point { x: Some(-1), y: None, tags: vec!["a".into()], ..Default::default() };
//! let bytes = point.encode();
//! assert_eq!(Point::decode(&bytes)?, point);
//! # Ok(())
//! # }
//! ```
//!
//! ## Data flow
//!
//! ```text
//! decode: bytes -> WireReader (tag + value) -> Message::decode_field
//!                                           -> ExtensionSet   (extension range + registry)
//!                                           -> UnknownFields  (otherwise)
//!
//! encode: message -> Traversable::traverse -> declared fields (ascending number)
//!                                          -> extensions      (ascending number)
//!                                          -> unknown fields  (decode order)
//!                  -> BinaryEncoder (or any other Visitor)
//! ```
//!
//! ## Modules Overview
//!
//! - [`wire`] - tags, varints, zigzag, fixed-width and length-delimited values
//! - [`decoder`] / [`message`] - decode dispatch and the message traits
//! - [`visitor`] / [`encoder`] - traversal protocol and the binary visitor
//! - [`extension`] - extension set, descriptors and registry
//! - [`unknown`] - unknown field store
//! - [`names`] - proto/JSON/Rust name resolution

// Allow the derive macro to work inside this crate's tests
extern crate self as tagwire;

/// Wire constants and decode options.
pub mod config;
/// Field decoder driving decode dispatch.
pub mod decoder;
/// Binary wire-format visitor.
pub mod encoder;
/// Decode and registry errors.
pub mod error;
/// Extension fields, descriptors and registry.
pub mod extension;
/// Typed field codecs for every scalar type and embedded messages.
pub mod field_type;
/// Message traits.
pub mod message;
/// Field-name tables and resolvers.
pub mod names;
/// Unknown field storage.
pub mod unknown;
/// Traversal protocol.
pub mod visitor;
/// Low-level wire codec.
pub mod wire;

pub use config::DecodeOptions;
pub use decoder::FieldDecoder;
pub use encoder::{BinaryEncoder, SizeCounter};
pub use error::{DecodeError, DecodeResult, RegistryError};
pub use extension::{
    AnyExtensionField, ExtensionRegistry, ExtensionSet, MessageExtension, Optional, Packed,
    Repeated,
};
pub use message::{Message, Traversable};
pub use names::{FieldNames, NameKind, NameMap};
pub use unknown::UnknownFields;
pub use visitor::{FieldValue, Visitor};
pub use wire::{Tag, WireType};

pub use tagwire_codegen::Message; // Derive macro (for #[derive(tagwire::Message)])
