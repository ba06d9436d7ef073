// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for decoding and extension registration.
//!
//! Every [`DecodeError`] variant is a malformed-input failure: it aborts
//! the whole decode call and no partial message is returned. Unrecognized
//! but well-formed fields are never errors; they end up in the unknown
//! field store.

/// Malformed input detected while decoding.
///
/// Offsets are relative to the buffer being read. Inside an embedded
/// message that is the nested payload, not the top-level buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Fewer bytes remain than the value being read requires.
    #[error("truncated input at offset {offset}: {needed} more byte(s) required")]
    Truncated { offset: usize, needed: usize },

    /// A varint continues past its tenth byte.
    #[error("varint at offset {offset} is longer than 10 bytes")]
    VarintTooLong { offset: usize },

    /// Low three bits of a tag hold none of the four known wire types.
    #[error("invalid wire type {wire_type} at offset {offset}")]
    InvalidWireType { offset: usize, wire_type: u8 },

    /// Field number is zero or above the 29-bit maximum.
    #[error("invalid field number {number} at offset {offset}")]
    InvalidFieldNumber { offset: usize, number: u64 },

    /// A string field does not hold valid UTF-8.
    #[error("invalid UTF-8 in string field at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// Embedded messages nest deeper than the configured limit.
    #[error("embedded messages nest deeper than the recursion limit of {limit}")]
    RecursionLimitExceeded { limit: usize },
}

impl DecodeError {
    /// Offset where the failure was detected, when known.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Truncated { offset, .. }
            | Self::VarintTooLong { offset }
            | Self::InvalidWireType { offset, .. }
            | Self::InvalidFieldNumber { offset, .. }
            | Self::InvalidUtf8 { offset } => Some(*offset),
            Self::RecursionLimitExceeded { .. } => None,
        }
    }
}

/// Failure while building an [`ExtensionRegistry`](crate::ExtensionRegistry).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Another extension already claims this number on the same message.
    #[error("extension {number} is already registered on {extendee}")]
    Duplicate { extendee: &'static str, number: u32 },

    /// The number lies outside every extension range the message declares.
    #[error("field {number} is outside the extension ranges of {extendee}")]
    OutOfRange { extendee: &'static str, number: u32 },
}

/// Result alias for decode operations.
pub type DecodeResult<T> = core::result::Result<T, DecodeError>;
