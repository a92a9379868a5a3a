// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Item Identifier Value Object
//!
//! This module provides [`ItemId`], the identifier an item carries as
//! metadata.
//!
//! ## Overview
//!
//! An `ItemId` is a non-empty, trimmed string. Equality, hashing, and the
//! lexicographic ordering are all over the string value, so identifiers can
//! key sets and maps directly. An item may carry any number of them -
//! typically the SAML `entityID` plus aliases contributed by upstream
//! registrars - and uniqueness within an aggregate is a policy goal enforced
//! by merge strategies, not an invariant of the type.
//!
//! ## Serialization
//!
//! Serde support round-trips through the plain string form, re-validating on
//! deserialization so an `ItemId` can never hold an empty value regardless
//! of where it came from.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::item_metadata::ItemMetadata;
use crate::error::PipelineError;

/// A non-empty, trimmed identifier carried by an item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Creates an identifier from a string, trimming surrounding whitespace.
    ///
    /// Fails with a validation error when the trimmed value is empty.
    pub fn new(value: &str) -> Result<Self, PipelineError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::validation_error(
                "item id must be a non-empty string",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The identifier value.
    pub fn value(&self) -> &str {
        &self.0
    }

    /// The identifier value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ItemId {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl ItemMetadata for ItemId {}
