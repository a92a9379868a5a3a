// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Component Timing Record
//!
//! This module provides [`ComponentInfo`], the provenance and timing record
//! a stage attaches to each item it brackets.
//!
//! ## Lifecycle
//!
//! A record is created at stage entry with the stage's id and kind and the
//! entry instant. On normal exit the completion instant is set - exactly
//! once, through a write-once cell, so a record can be shared between the
//! bracketing stage and the item's metadata map without interior locking.
//! When a stage fails, the completion instant stays unset and the partially
//! filled record remains attached; the unset completion is how downstream
//! consumers recognize an aborted bracket.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;

use crate::entities::item_metadata::ItemMetadata;

/// Timing and provenance record attached by stages on entry.
#[derive(Debug)]
pub struct ComponentInfo {
    component_id: String,
    component_kind: &'static str,
    start: DateTime<Utc>,
    complete: OnceCell<DateTime<Utc>>,
}

impl ComponentInfo {
    /// Creates a record with the start instant set to now.
    pub fn started(component_id: &str, component_kind: &'static str) -> Self {
        Self {
            component_id: component_id.to_string(),
            component_kind,
            start: Utc::now(),
            complete: OnceCell::new(),
        }
    }

    /// The id of the component that attached the record.
    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    /// The type name of the component that attached the record.
    pub fn component_kind(&self) -> &'static str {
        self.component_kind
    }

    /// The instant the component started work on the item.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// The instant the component finished, if it exited normally.
    pub fn complete(&self) -> Option<DateTime<Utc>> {
        self.complete.get().copied()
    }

    /// Marks the record complete. The first call wins; later calls are
    /// ignored so shared records cannot be rewound or overwritten.
    pub fn mark_complete(&self) {
        let _ = self.complete.set(Utc::now());
    }

    /// Whether the bracket closed normally.
    pub fn is_complete(&self) -> bool {
        self.complete.get().is_some()
    }
}

impl ItemMetadata for ComponentInfo {}
