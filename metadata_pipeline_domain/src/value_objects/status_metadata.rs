// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Status Metadata
//!
//! This module provides the per-item finding record: a message, the id of
//! the component that produced it, and a severity.
//!
//! ## Overview
//!
//! Stages and validators record findings against individual items instead of
//! aborting the whole run. Findings accumulate monotonically - a stage may
//! append but never rewrite or remove what earlier stages recorded - and
//! travel with the item through copies and merges, so the published
//! aggregate can carry the full processing history of every entity.
//!
//! The message is operator-facing: it should make sense in a log line or in
//! a generated report without further context.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::item_metadata::ItemMetadata;

/// Severity of a recorded finding.
///
/// Ordering is by increasing severity: `Info < Warning < Error`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("info"),
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A finding recorded against one item by one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMetadata {
    component_id: String,
    message: String,
    severity: Severity,
}

impl StatusMetadata {
    /// Creates a status record.
    pub fn new(severity: Severity, component_id: &str, message: impl Into<String>) -> Self {
        Self {
            component_id: component_id.to_string(),
            message: message.into(),
            severity,
        }
    }

    /// Creates an informational record.
    pub fn info(component_id: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, component_id, message)
    }

    /// Creates a warning record.
    pub fn warning(component_id: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, component_id, message)
    }

    /// Creates an error record.
    pub fn error(component_id: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, component_id, message)
    }

    /// The id of the component that produced the finding.
    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    /// The operator-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The severity of the finding.
    pub fn severity(&self) -> Severity {
        self.severity
    }
}

impl fmt::Display for StatusMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.component_id, self.message)
    }
}

impl ItemMetadata for StatusMetadata {}
