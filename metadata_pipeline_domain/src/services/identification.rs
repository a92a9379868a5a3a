// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Item identification contract.
//!
//! Stages never print raw items; when an item must be named in a log line,
//! a status message, or an error, they ask the configured strategy for a
//! human-readable label. Strategies must always return a non-empty string -
//! the framework implementations fall back to a placeholder when an item
//! carries no identifier.

use crate::component::Component;
use crate::entities::item::Item;

/// Computes a human-readable label for an item.
pub trait ItemIdentificationStrategy<T>: Component + Send + Sync {
    /// The label for the given item. Never empty.
    fn identify(&self, item: &Item<T>) -> String;
}
