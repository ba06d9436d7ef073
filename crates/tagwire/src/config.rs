// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire-format constants and decode configuration.
//!
//! All limits of the wire grammar live here; the codec, decoder and
//! registry read them from this module instead of repeating literals.
//!
//! # Example
//!
//! ```
//! use tagwire::config::DecodeOptions;
//!
//! let options = DecodeOptions::default()
//!     .with_recursion_limit(16)
//!     .with_discard_unknown_fields(true);
//! assert_eq!(options.recursion_limit, 16);
//! ```

/// Longest legal varint: 10 bytes carry 64 bits of payload (7 bits each).
pub const MAX_VARINT_LEN: usize = 10;

/// Largest field number a tag can carry (29 bits).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Smallest legal field number.
pub const MIN_FIELD_NUMBER: u32 = 1;

/// Default bound on embedded-message nesting during decode.
pub const DEFAULT_RECURSION_LIMIT: usize = 100;

/// Options that shape a single decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum nesting depth of embedded messages below the top-level one.
    pub recursion_limit: usize,
    /// Drop unrecognized fields instead of keeping them for re-encode.
    pub discard_unknown_fields: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            discard_unknown_fields: false,
        }
    }
}

impl DecodeOptions {
    /// Set the embedded-message nesting limit.
    #[must_use]
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Drop (`true`) or preserve (`false`) unrecognized fields.
    #[must_use]
    pub fn with_discard_unknown_fields(mut self, discard: bool) -> Self {
        self.discard_unknown_fields = discard;
        self
    }
}
