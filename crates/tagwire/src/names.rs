// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field-number to name resolution.
//!
//! Every field has three names: the schema (proto) name, the JSON name and
//! the Rust field name. Generated messages carry a static [`NameMap`];
//! extension entries carry their own [`FieldNames`]. A resolver checks the
//! message's table first, then its extension set.

use crate::message::Traversable;

/// Which of a field's names to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    Proto,
    Json,
    Rust,
}

/// The names of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldNames {
    pub proto: &'static str,
    pub json: &'static str,
    pub rust: &'static str,
}

impl FieldNames {
    /// JSON name identical to the proto name.
    pub const fn same(proto: &'static str, rust: &'static str) -> Self {
        Self {
            proto,
            json: proto,
            rust,
        }
    }

    pub const fn unique(proto: &'static str, json: &'static str, rust: &'static str) -> Self {
        Self { proto, json, rust }
    }

    pub const fn get(&self, kind: NameKind) -> &'static str {
        match kind {
            NameKind::Proto => self.proto,
            NameKind::Json => self.json,
            NameKind::Rust => self.rust,
        }
    }
}

/// Static table of a message's declared fields, sorted by number.
#[derive(Debug, Clone, Copy)]
pub struct NameMap {
    entries: &'static [(u32, FieldNames)],
}

impl NameMap {
    /// `entries` must be sorted by ascending field number.
    pub const fn new(entries: &'static [(u32, FieldNames)]) -> Self {
        Self { entries }
    }

    pub fn names(&self, number: u32) -> Option<&'static FieldNames> {
        let entries = self.entries;
        entries
            .binary_search_by_key(&number, |(n, _)| *n)
            .ok()
            .map(|i| &entries[i].1)
    }

    pub fn name(&self, kind: NameKind, number: u32) -> Option<&'static str> {
        self.names(number).map(|n| n.get(kind))
    }

    /// Reverse lookup: field number for a name of the given kind.
    pub fn number_for(&self, kind: NameKind, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(_, names)| names.get(kind) == name)
            .map(|(n, _)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &'static FieldNames)> {
        self.entries.iter().map(|(n, names)| (*n, names))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Name of field `number` in `message`, declared fields first, then
/// extensions present in the message.
///
/// `None` when the message carries no name table or the number is unknown
/// to both.
pub fn resolve(message: &dyn Traversable, kind: NameKind, number: u32) -> Option<&'static str> {
    message
        .name_map()
        .and_then(|map| map.name(kind, number))
        .or_else(|| {
            message
                .extension_set()
                .and_then(|set| set.field_names(number))
                .map(|names| names.get(kind))
        })
}

/// Resolver bound to one message and name kind.
pub type NameResolver<'a> = Box<dyn Fn(u32) -> Option<&'static str> + 'a>;

pub fn proto_name_resolver(message: &dyn Traversable) -> NameResolver<'_> {
    Box::new(move |number| resolve(message, NameKind::Proto, number))
}

pub fn json_name_resolver(message: &dyn Traversable) -> NameResolver<'_> {
    Box::new(move |number| resolve(message, NameKind::Json, number))
}

pub fn rust_name_resolver(message: &dyn Traversable) -> NameResolver<'_> {
    Box::new(move |number| resolve(message, NameKind::Rust, number))
}

#[cfg(test)]
mod tests {
    use super::*;

    static ENTRIES: [(u32, FieldNames); 3] = [
        (1, FieldNames::same("a", "a")),
        (3, FieldNames::unique("last_seen", "lastSeen", "last_seen")),
        (9, FieldNames::unique("Type", "Type", "r#type")),
    ];
    static MAP: NameMap = NameMap::new(&ENTRIES);

    #[test]
    fn test_names_by_number() {
        assert_eq!(MAP.name(NameKind::Json, 3), Some("lastSeen"));
        assert_eq!(MAP.name(NameKind::Proto, 3), Some("last_seen"));
        assert_eq!(MAP.name(NameKind::Rust, 9), Some("r#type"));
        assert_eq!(MAP.name(NameKind::Proto, 2), None);
    }

    #[test]
    fn test_number_for_each_kind() {
        assert_eq!(MAP.number_for(NameKind::Json, "lastSeen"), Some(3));
        assert_eq!(MAP.number_for(NameKind::Proto, "lastSeen"), None);
        assert_eq!(MAP.number_for(NameKind::Rust, "a"), Some(1));
    }

    #[test]
    fn test_same_copies_proto_into_json() {
        let names = FieldNames::same("x_y", "x_y");
        assert_eq!(names.json, "x_y");
        assert_eq!(MAP.len(), 3);
        assert_eq!(MAP.iter().map(|(n, _)| n).collect::<Vec<_>>(), vec![1, 3, 9]);
    }
}
