// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Extension fields: registry-driven decode, typed access, equality,
//! hashing and registry construction.

mod common;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use common::{registry, Host, Simple, LABELS, NESTED, SCORE, SCORE_AS_LABELS, TICKS};
use tagwire::extension::{ExtensionRegistry, MessageExtension, Optional};
use tagwire::field_type::Int32;
use tagwire::{DecodeOptions, FieldNames, Message, RegistryError, Tag, WireType};

static OUT_OF_RANGE: MessageExtension<Optional<Int32>, Host> =
    MessageExtension::new(250, FieldNames::same("stray", "stray"));

static SCORE_AGAIN: MessageExtension<Optional<Int32>, Host> =
    MessageExtension::new(100, FieldNames::same("score_again", "score_again"));

fn decode_with_registry(bytes: &[u8], registry: &ExtensionRegistry) -> Host {
    Host::decode_with(bytes, &DecodeOptions::default(), Some(registry)).expect("decode")
}

fn hash_of(host: &Host) -> u64 {
    let mut hasher = DefaultHasher::new();
    host.extensions.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn test_extension_decoded_with_registry() {
    let registry = registry();
    // name = "h", score (100) = 7
    let input = [0x0a, 0x01, b'h', 0xa0, 0x06, 0x07];
    let host = decode_with_registry(&input, &registry);

    assert_eq!(host.extension(&SCORE), Some(&7));
    assert!(host.has_extension(&SCORE));
    assert!(host.unknown.is_empty());
    assert_eq!(host.encode(), input);
}

#[test]
fn test_extension_without_registry_is_unknown() {
    let input = [0x0a, 0x01, b'h', 0xa0, 0x06, 0x07];
    let host = Host::decode(&input).expect("decode");

    assert_eq!(host.extension(&SCORE), None);
    assert!(host.extensions.is_empty());
    assert_eq!(host.unknown.len(), 1);
    assert_eq!(host.encode(), input);
}

#[test]
fn test_unregistered_number_in_range_is_unknown() {
    let registry = registry();
    // field 120 lies in 100..200 but has no descriptor
    let input = [0xc0, 0x07, 0x01];
    let host = decode_with_registry(&input, &registry);
    assert!(host.extensions.is_empty());
    assert_eq!(host.unknown.len(), 1);
    assert_eq!(host.encode(), input);
}

#[test]
fn test_extension_wire_type_mismatch_is_unknown() {
    let registry = registry();
    // score (100) sent length-delimited
    let input = [0xa2, 0x06, 0x01, 0x00];
    let host = decode_with_registry(&input, &registry);
    assert!(!host.has_extension(&SCORE));
    assert_eq!(host.unknown.len(), 1);
    assert_eq!(host.encode(), input);
}

#[test]
fn test_encode_order_declared_then_extensions_then_unknown() {
    let mut host = Host {
        name: Some("h".to_string()),
        inner: Some(Simple::with_a(1)),
        late_field: Some(5),
        ..Host::default()
    };
    assert!(host.set_extension(&TICKS, vec![1, 2]));
    assert!(host.set_extension(&SCORE, 7));
    host.unknown
        .append_value(Tag::new(250, WireType::Varint), &[0x09]);

    let expected = vec![
        0x0a, 0x01, b'h', // name
        0x12, 0x02, 0x08, 0x01, // inner
        0xe0, 0x12, 0x05, // late_field (300)
        0xa0, 0x06, 0x07, // score (100)
        0xc2, 0x3e, 0x02, 0x01, 0x02, // ticks (1000), packed
        0xd0, 0x0f, 0x09, // unknown 250
    ];
    assert_eq!(host.encode(), expected);

    let decoded = decode_with_registry(&expected, &registry());
    assert_eq!(decoded, host);
}

#[test]
fn test_set_extension_replaces_and_clear_removes() {
    let mut host = Host::default();
    assert!(host.set_extension(&SCORE, 1));
    assert!(host.set_extension(&SCORE, 2));
    assert_eq!(host.extension(&SCORE), Some(&2));

    assert!(host.clear_extension(&SCORE));
    assert!(!host.clear_extension(&SCORE));
    assert!(!host.has_extension(&SCORE));
}

#[test]
fn test_set_extension_outside_ranges_is_rejected() {
    let mut host = Host::default();
    assert!(!host.set_extension(&OUT_OF_RANGE, 5));
    assert!(!host.has_extension(&OUT_OF_RANGE));
    assert!(host.extensions.is_empty());

    assert!(host.set_extension(&SCORE, 5));
    let decoded = decode_with_registry(&host.encode(), &registry());
    assert_eq!(decoded, host);
}

#[test]
fn test_same_number_other_type_reads_none() {
    let mut host = Host::default();
    host.set_extension(&SCORE, 3);
    assert_eq!(host.extension(&SCORE_AS_LABELS), None);
    assert!(host.extensions.field(100).is_some());
}

#[test]
fn test_extension_equality() {
    let mut a = Host::default();
    let mut b = Host::default();
    a.set_extension(&SCORE, 3);
    assert_ne!(a, b);

    b.set_extension(&SCORE_AS_LABELS, vec!["3".to_string()]);
    assert_ne!(a, b, "same number, different value type");

    b.set_extension(&SCORE, 3);
    assert_eq!(a, b);

    b.set_extension(&LABELS, vec![]);
    assert_ne!(a, b, "extra key on one side");
    assert_ne!(b, a, "extra key on the other side");
}

#[test]
fn test_extension_hash_independent_of_insertion_order() {
    let mut a = Host::default();
    a.set_extension(&SCORE, 3);
    a.set_extension(&LABELS, vec!["x".to_string()]);

    let mut b = Host::default();
    b.set_extension(&LABELS, vec!["x".to_string()]);
    b.set_extension(&SCORE, 3);

    assert_eq!(a.extensions, b.extensions);
    assert_eq!(hash_of(&a), hash_of(&b));

    b.set_extension(&SCORE, 4);
    assert_ne!(hash_of(&a), hash_of(&b));
}

#[test]
fn test_repeated_extension_accepts_packed_and_unpacked() {
    let registry = registry();
    // ticks (1000): one unpacked element, then a packed run
    let input = [0xc0, 0x3e, 0x05, 0xc2, 0x3e, 0x02, 0x06, 0x07];
    let host = decode_with_registry(&input, &registry);
    assert_eq!(host.extension(&TICKS), Some(&vec![5, 6, 7]));
    // re-encoded as a single packed run
    assert_eq!(host.encode(), vec![0xc2, 0x3e, 0x03, 0x05, 0x06, 0x07]);
}

#[test]
fn test_repeated_string_extension_appends() {
    let registry = registry();
    let input = [0xaa, 0x06, 0x01, b'a', 0xaa, 0x06, 0x01, b'b'];
    let host = decode_with_registry(&input, &registry);
    assert_eq!(
        host.extension(&LABELS),
        Some(&vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(host.encode(), input);
}

#[test]
fn test_message_extension_merges_occurrences() {
    let registry = registry();
    // nested (150) = { a: 1 }, then nested = { <field 2 = 3> }
    let input = [0xb2, 0x09, 0x02, 0x08, 0x01, 0xb2, 0x09, 0x02, 0x10, 0x03];
    let host = decode_with_registry(&input, &registry);
    let nested = host.extension(&NESTED).expect("nested");
    assert_eq!(nested.a, Some(1));
    assert_eq!(nested.unknown.len(), 1);
}

#[test]
fn test_merge_extension_sets() {
    let mut left = Host::default();
    left.set_extension(&LABELS, vec!["a".to_string()]);
    left.set_extension(&SCORE, 1);

    let mut right = Host::default();
    right.set_extension(&LABELS, vec!["b".to_string()]);
    right.set_extension(&TICKS, vec![9]);

    left.merge(&right);
    assert_eq!(
        left.extension(&LABELS),
        Some(&vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(left.extension(&SCORE), Some(&1));
    assert_eq!(left.extension(&TICKS), Some(&vec![9]));
}

#[test]
fn test_registry_lookup() {
    let registry = registry();
    assert_eq!(registry.len(), 4);
    assert!(!registry.is_empty());

    let score = registry.lookup("test.Host", 100).expect("score");
    assert_eq!(score.extendee(), "test.Host");
    assert_eq!(score.field_names().proto, "score");
    assert!(registry.lookup("test.Host", 120).is_none());
    assert!(registry.lookup("test.Simple", 100).is_none());

    let numbers: Vec<u32> = registry
        .extensions_for("test.Host")
        .map(|e| e.field_number())
        .collect();
    assert_eq!(numbers, vec![100, 101, 150, 1000]);
}

#[test]
fn test_registry_rejects_duplicates() {
    let err = ExtensionRegistry::builder()
        .register(&SCORE)
        .and_then(|b| b.register(&SCORE_AGAIN))
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::Duplicate {
            extendee: "test.Host",
            number: 100
        }
    );
}

#[test]
fn test_registry_rejects_out_of_range_numbers() {
    let err = ExtensionRegistry::builder()
        .register(&OUT_OF_RANGE)
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::OutOfRange {
            extendee: "test.Host",
            number: 250
        }
    );
}

#[test]
fn test_closed_extension_range_bounds() {
    assert_eq!(Host::extension_ranges(), &[100..200, 1000..2000]);
    assert!(Simple::extension_ranges().is_empty());
}
