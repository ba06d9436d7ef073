// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use tagwire::extension::{ExtensionRegistry, MessageExtension, Optional, Repeated};
use tagwire::field_type::{MessageField, ProtoString, SInt64};
use tagwire::{DecodeOptions, ExtensionSet, FieldNames, Message, UnknownFields};

#[derive(Debug, Clone, Default, PartialEq, tagwire::Message)]
#[message(name = "fuzz.Tree", extensions = 100..200)]
struct Tree {
    #[field(number = 1, string)]
    label: Option<String>,
    #[field(number = 2, message)]
    left: Option<Box<Tree>>,
    #[field(number = 3, message, repeated)]
    children: Vec<Tree>,
    #[field(number = 4, sint64, repeated, packed)]
    samples: Vec<i64>,
    #[field(number = 5, fixed32)]
    flags: u32,
    #[unknown]
    unknown: UnknownFields,
    #[extensions]
    extensions: ExtensionSet,
}

static NOTE: MessageExtension<Repeated<ProtoString>, Tree> =
    MessageExtension::new(100, FieldNames::same("note", "note"));
static OFFSET: MessageExtension<Optional<SInt64>, Tree> =
    MessageExtension::new(101, FieldNames::same("offset", "offset"));
static SUBTREE: MessageExtension<Optional<MessageField<Tree>>, Tree> =
    MessageExtension::new(150, FieldNames::same("subtree", "subtree"));

fuzz_target!(|data: &[u8]| {
    let Ok(registry) = ExtensionRegistry::builder()
        .register(&NOTE)
        .and_then(|b| b.register(&OFFSET))
        .and_then(|b| b.register(&SUBTREE))
    else {
        return;
    };
    let registry = registry.build();
    let options = DecodeOptions::default().with_recursion_limit(32);

    // Malformed input must fail cleanly; well-formed input must survive a
    // re-encode unchanged.
    if let Ok(tree) = Tree::decode_with(data, &options, Some(&registry)) {
        let bytes = tree.encode();
        let again = Tree::decode_with(&bytes, &options, Some(&registry))
            .expect("re-encoded tree decodes");
        assert_eq!(again, tree);
        assert_eq!(again.encode(), bytes);
    }
});
