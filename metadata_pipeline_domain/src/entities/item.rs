// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Item Entity
//!
//! This module provides [`Item`], the carrier passed between pipeline
//! stages: one payload of type `T` plus the side-channel
//! [`ItemMetadataMap`].
//!
//! ## Overview
//!
//! The pipeline is generic over the payload type; the usual payload is an
//! XML element tree supplied by an external collaborator, but the core never
//! inspects it. The only requirement is `T: Clone`, where `Clone` is a deep
//! copy by contract - cloning a payload must yield a structure whose
//! mutation cannot be observed through the original.
//!
//! ## Copying
//!
//! [`Item::copy`] produces an independent item: the payload is deep-copied,
//! while the metadata map is a fresh multimap sharing the *same* immutable
//! value instances with the original. This is what makes fan-out cheap and
//! safe: child pipelines receive disjoint payloads, and status history
//! accumulated before the split is not duplicated.
//!
//! ## Thread safety
//!
//! An item is not synchronized; it is owned by exactly one stage invocation
//! at a time. Concurrent stages operate on disjoint copies.

use crate::entities::item_metadata::ItemMetadataMap;
use crate::value_objects::item_id::ItemId;
use crate::value_objects::status_metadata::{Severity, StatusMetadata};

/// The mutable, ordered collection of items a pipeline owns and stages
/// borrow for the duration of their call.
pub type ItemCollection<T> = Vec<Item<T>>;

/// Carrier of one payload plus side-channel metadata.
#[derive(Debug)]
pub struct Item<T> {
    payload: T,
    metadata: ItemMetadataMap,
}

impl<T> Item<T> {
    /// Wraps a payload with an empty metadata map.
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            metadata: ItemMetadataMap::new(),
        }
    }

    /// Read access to the payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Write access to the payload.
    pub fn payload_mut(&mut self) -> &mut T {
        &mut self.payload
    }

    /// Replaces the payload, returning the previous one.
    pub fn replace_payload(&mut self, payload: T) -> T {
        std::mem::replace(&mut self.payload, payload)
    }

    /// Consumes the item, yielding the payload.
    pub fn into_payload(self) -> T {
        self.payload
    }

    /// Read access to the metadata multimap.
    pub fn metadata(&self) -> &ItemMetadataMap {
        &self.metadata
    }

    /// Write access to the metadata multimap.
    pub fn metadata_mut(&mut self) -> &mut ItemMetadataMap {
        &mut self.metadata
    }

    /// All identifiers attached to the item, in attachment order.
    pub fn item_ids(&self) -> impl Iterator<Item = &ItemId> {
        self.metadata.values_of::<ItemId>()
    }

    /// The first identifier attached to the item, if any.
    pub fn first_item_id(&self) -> Option<&ItemId> {
        self.metadata.first_of::<ItemId>()
    }

    /// Attaches an identifier.
    pub fn add_item_id(&mut self, id: ItemId) {
        self.metadata.add(id);
    }

    /// All status records, in attachment order.
    pub fn statuses(&self) -> impl Iterator<Item = &StatusMetadata> {
        self.metadata.values_of::<StatusMetadata>()
    }

    /// Status records of one severity, in attachment order.
    pub fn statuses_of(&self, severity: Severity) -> impl Iterator<Item = &StatusMetadata> {
        self.statuses().filter(move |s| s.severity() == severity)
    }

    /// Whether the item carries at least one error-severity status.
    pub fn has_error_status(&self) -> bool {
        self.statuses_of(Severity::Error).next().is_some()
    }

    /// Records an informational finding against the item.
    pub fn record_info(&mut self, component_id: &str, message: impl Into<String>) {
        self.metadata.add(StatusMetadata::info(component_id, message));
    }

    /// Records a warning finding against the item.
    pub fn record_warning(&mut self, component_id: &str, message: impl Into<String>) {
        self.metadata
            .add(StatusMetadata::warning(component_id, message));
    }

    /// Records an error finding against the item. This does not abort the
    /// pipeline; fatal conditions are signalled through
    /// [`PipelineError`](crate::PipelineError) instead.
    pub fn record_error(&mut self, component_id: &str, message: impl Into<String>) {
        self.metadata
            .add(StatusMetadata::error(component_id, message));
    }
}

impl<T: Clone> Item<T> {
    /// Produces an independent deep copy.
    ///
    /// The payload is cloned; the metadata map is a new multimap holding the
    /// same shared value instances as the original.
    pub fn copy(&self) -> Self {
        Self {
            payload: self.payload.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

impl<T: Clone> Clone for Item<T> {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl<T> From<T> for Item<T> {
    fn from(payload: T) -> Self {
        Self::new(payload)
    }
}
