// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Extension registry: (extendee name, field number) to descriptor.
//!
//! Built once through [`ExtensionRegistryBuilder`], then shared read-only
//! by every decode call that wants extensions recognized.

use std::collections::{BTreeMap, HashMap};

use super::descriptor::{AnyMessageExtension, ExtensionKind, MessageExtension};
use crate::error::RegistryError;
use crate::message::Message;

/// Frozen lookup table of extension descriptors.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    by_extendee: HashMap<&'static str, BTreeMap<u32, &'static dyn AnyMessageExtension>>,
}

impl ExtensionRegistry {
    pub fn builder() -> ExtensionRegistryBuilder {
        ExtensionRegistryBuilder::default()
    }

    /// Descriptor for `number` on the message named `extendee`.
    pub fn lookup(&self, extendee: &str, number: u32) -> Option<&'static dyn AnyMessageExtension> {
        self.by_extendee.get(extendee)?.get(&number).copied()
    }

    /// Descriptors registered on `extendee`, ascending by number.
    pub fn extensions_for<'r>(
        &'r self,
        extendee: &str,
    ) -> impl Iterator<Item = &'static dyn AnyMessageExtension> + 'r {
        self.by_extendee
            .get(extendee)
            .into_iter()
            .flat_map(|by_number| by_number.values().copied())
    }

    pub fn len(&self) -> usize {
        self.by_extendee.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extendee.values().all(BTreeMap::is_empty)
    }
}

/// Accumulates descriptors; [`build`](Self::build) freezes them.
#[derive(Debug, Default)]
pub struct ExtensionRegistryBuilder {
    registry: ExtensionRegistry,
}

impl ExtensionRegistryBuilder {
    /// Add one descriptor.
    ///
    /// Fails if `M` already has an extension with this number or if the
    /// number lies outside `M`'s extension ranges.
    pub fn register<K: ExtensionKind, M: Message>(
        mut self,
        extension: &'static MessageExtension<K, M>,
    ) -> Result<Self, RegistryError> {
        let number = extension.field_number();
        if !M::extension_ranges().iter().any(|r| r.contains(&number)) {
            return Err(RegistryError::OutOfRange {
                extendee: M::NAME,
                number,
            });
        }
        let by_number = self.registry.by_extendee.entry(M::NAME).or_default();
        if by_number.contains_key(&number) {
            return Err(RegistryError::Duplicate {
                extendee: M::NAME,
                number,
            });
        }
        by_number.insert(number, extension);
        log::debug!(
            "[registry] {} extension {} ({})",
            M::NAME,
            number,
            extension.field_names().proto
        );
        Ok(self)
    }

    pub fn build(self) -> ExtensionRegistry {
        self.registry
    }
}
