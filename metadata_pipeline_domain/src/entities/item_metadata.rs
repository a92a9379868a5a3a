// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Item Metadata Multimap
//!
//! This module provides the side-channel metadata store carried by every
//! [`Item`](crate::Item): a multimap from concrete Rust type to an
//! insertion-ordered list of values of that type.
//!
//! ## Overview
//!
//! Stages communicate facts about an item - identifiers, status findings,
//! timing records, domain tags - without touching its payload by attaching
//! values to the item's `ItemMetadataMap`. The map is:
//!
//! - **Type-indexed**: values are stored and retrieved by their concrete
//!   type; callers ask for `values_of::<ItemId>()` and get only `ItemId`s,
//!   in the order they were attached
//! - **Open**: any type implementing the [`ItemMetadata`] marker trait can
//!   be attached, including caller-defined domain tags the core never
//!   inspects
//! - **Sharing-friendly**: values are immutable once attached and held
//!   behind `Arc`, so an item and its copies reference the *same* value
//!   instances
//!
//! ## Immutability
//!
//! Attached values are never mutated or overwritten; stages only append.
//! The single exception to bit-level immutability is the write-once
//! completion instant inside [`ComponentInfo`](crate::ComponentInfo), which
//! moves strictly from unset to set and so is safe to share.
//!
//! ## Status lookup
//!
//! The status taxonomy is one concrete type,
//! [`StatusMetadata`](crate::StatusMetadata), with a severity variant.
//! "All statuses" is therefore an ordinary typed lookup, and "all errors"
//! filters by severity - see the convenience accessors on
//! [`Item`](crate::Item).

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Marker trait for values that can be attached to an item.
///
/// Implementations must be immutable after construction. The trait is
/// deliberately empty; it exists so that attachment is an explicit opt-in
/// rather than a blanket capability of every type.
pub trait ItemMetadata: Any + fmt::Debug + Send + Sync {}

/// Insertion-ordered multimap from concrete type to attached values.
///
/// Values are stored as `Arc<dyn ItemMetadata>`; cloning the map (as
/// [`Item::copy`](crate::Item::copy) does) clones the `Arc`s, not the
/// values, so copies share identity-equal metadata with the original.
#[derive(Debug, Clone, Default)]
pub struct ItemMetadataMap {
    entries: HashMap<TypeId, Vec<Arc<dyn ItemMetadata>>>,
}

impl ItemMetadataMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a value, taking ownership.
    pub fn add<M: ItemMetadata>(&mut self, value: M) {
        self.entries
            .entry(TypeId::of::<M>())
            .or_default()
            .push(Arc::new(value));
    }

    /// Attaches an already-shared value.
    ///
    /// The same instance may be attached to many items (this is how copies
    /// share metadata), but never twice to the same item: an `Arc` that is
    /// already present under the key is ignored.
    pub fn add_shared<M: ItemMetadata>(&mut self, value: Arc<M>) {
        let value: Arc<dyn ItemMetadata> = value;
        let bucket = self.entries.entry(TypeId::of::<M>()).or_default();
        if !bucket.iter().any(|existing| Arc::ptr_eq(existing, &value)) {
            bucket.push(value);
        }
    }

    /// All values of the given type, in insertion order.
    pub fn values_of<M: ItemMetadata>(&self) -> impl Iterator<Item = &M> {
        self.entries
            .get(&TypeId::of::<M>())
            .into_iter()
            .flatten()
            .filter_map(|meta| {
                let any: &dyn Any = meta.as_ref();
                any.downcast_ref::<M>()
            })
    }

    /// The first attached value of the given type.
    pub fn first_of<M: ItemMetadata>(&self) -> Option<&M> {
        self.values_of::<M>().next()
    }

    /// Whether any value of the given type is attached.
    pub fn contains<M: ItemMetadata>(&self) -> bool {
        self.count_of::<M>() > 0
    }

    /// Number of attached values of the given type.
    pub fn count_of<M: ItemMetadata>(&self) -> usize {
        self.entries
            .get(&TypeId::of::<M>())
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// The shared handles for values of the given type, in insertion order.
    ///
    /// Used where value *identity* matters, e.g. to re-attach the same
    /// instances elsewhere or to test identity sharing between an item and
    /// its copy.
    pub fn shared_values_of<M: ItemMetadata>(
        &self,
    ) -> impl Iterator<Item = &Arc<dyn ItemMetadata>> {
        self.entries.get(&TypeId::of::<M>()).into_iter().flatten()
    }

    /// Total number of attached values across all types.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Whether the map holds no values at all.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::item_id::ItemId;
    use crate::value_objects::status_metadata::{Severity, StatusMetadata};

    #[derive(Debug, PartialEq)]
    struct RegistrationAuthority(String);

    impl ItemMetadata for RegistrationAuthority {}

    #[test]
    fn test_typed_lookup_is_insertion_ordered() {
        let mut map = ItemMetadataMap::new();
        map.add(ItemId::new("urn:a").unwrap());
        map.add(StatusMetadata::warning("stage", "first"));
        map.add(ItemId::new("urn:b").unwrap());

        let ids: Vec<&str> = map.values_of::<ItemId>().map(ItemId::as_str).collect();
        assert_eq!(ids, vec!["urn:a", "urn:b"]);
        assert_eq!(map.count_of::<StatusMetadata>(), 1);
    }

    #[test]
    fn test_lookup_by_other_type_is_empty() {
        let mut map = ItemMetadataMap::new();
        map.add(ItemId::new("urn:a").unwrap());
        assert!(!map.contains::<StatusMetadata>());
        assert!(map.first_of::<StatusMetadata>().is_none());
    }

    #[test]
    fn test_domain_tags_are_opaque_but_retrievable() {
        let mut map = ItemMetadataMap::new();
        map.add(RegistrationAuthority("https://registrar.example.org".into()));
        let tag = map.first_of::<RegistrationAuthority>().unwrap();
        assert_eq!(tag.0, "https://registrar.example.org");
    }

    #[test]
    fn test_add_shared_rejects_duplicate_instance() {
        let mut map = ItemMetadataMap::new();
        let id = Arc::new(ItemId::new("urn:a").unwrap());
        map.add_shared(id.clone());
        map.add_shared(id);
        assert_eq!(map.count_of::<ItemId>(), 1);
    }

    #[test]
    fn test_clone_shares_value_identity() {
        let mut map = ItemMetadataMap::new();
        map.add(StatusMetadata::new(Severity::Error, "stage", "broken"));
        let copy = map.clone();

        let original = map.shared_values_of::<StatusMetadata>().next().unwrap();
        let copied = copy.shared_values_of::<StatusMetadata>().next().unwrap();
        assert!(Arc::ptr_eq(original, copied));
    }

    #[test]
    fn test_len_counts_across_types() {
        let mut map = ItemMetadataMap::new();
        assert!(map.is_empty());
        map.add(ItemId::new("urn:a").unwrap());
        map.add(StatusMetadata::info("stage", "note"));
        assert_eq!(map.len(), 2);
        assert!(!map.is_empty());
    }
}
