// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Error Types
//!
//! This module provides the unified error type used across the pipeline
//! system. Every fallible operation in the domain and framework layers
//! returns `Result<_, PipelineError>`.
//!
//! ## Error Categories
//!
//! - **Lifecycle errors**: a component was used in the wrong state
//!   (`Initialization`, `UnmodifiableComponent`, `DestroyedComponent`).
//!   These indicate programming bugs and are never produced by well-formed
//!   pipeline wiring.
//! - **Configuration errors**: a setter received an invalid value
//!   (`InvalidConfiguration`, `ValidationError`). Fatal at construction
//!   time; never reached by `execute`.
//! - **Processing errors**: a stage could not proceed (`StageProcessing`,
//!   `Io`, `Serialization`, `Signing`). These abort the containing
//!   pipeline and carry the failing stage's identifier.
//!
//! Per-item defects are *not* errors; they are recorded as
//! [`StatusMetadata`](crate::StatusMetadata) on the affected item and travel
//! with it instead of unwinding the pipeline.

use thiserror::Error;

/// Unified error type for the pipeline system.
///
/// Each variant carries a descriptive message. Errors are `Clone` so they
/// can be logged, recorded on items, and propagated without ceremony.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Unmodifiable component: {0}")]
    UnmodifiableComponent(String),

    #[error("Destroyed component: {0}")]
    DestroyedComponent(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Stage '{stage}' failed: {message}")]
    StageProcessing { stage: String, message: String },

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Signing error: {0}")]
    Signing(String),
}

impl PipelineError {
    /// Creates a new initialization error
    pub fn initialization(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Creates a new unmodifiable-component error
    pub fn unmodifiable_component(msg: impl Into<String>) -> Self {
        Self::UnmodifiableComponent(msg.into())
    }

    /// Creates a new destroyed-component error
    pub fn destroyed_component(msg: impl Into<String>) -> Self {
        Self::DestroyedComponent(msg.into())
    }

    /// Creates a new configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates a new validation error
    pub fn validation_error(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Creates a new stage processing error carrying the failing stage's id
    pub fn stage_processing(stage: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::StageProcessing {
            stage: stage.into(),
            message: msg.into(),
        }
    }

    /// Creates a new IO error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Creates a new serialization error
    pub fn serialization_error(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates a new signing error
    pub fn signing_error(msg: impl Into<String>) -> Self {
        Self::Signing(msg.into())
    }

    /// Decorates an error with the id of the stage it unwound through.
    ///
    /// A `StageProcessing` error already names the stage that failed and is
    /// passed through unchanged; anything else is wrapped so the failing
    /// stage's id travels with it.
    pub fn into_stage_error(self, stage: &str) -> Self {
        match self {
            err @ PipelineError::StageProcessing { .. } => err,
            err => PipelineError::StageProcessing {
                stage: stage.to_string(),
                message: err.to_string(),
            },
        }
    }

    /// Checks if the error is a component lifecycle error
    pub fn is_lifecycle_error(&self) -> bool {
        matches!(
            self,
            PipelineError::Initialization(_)
                | PipelineError::UnmodifiableComponent(_)
                | PipelineError::DestroyedComponent(_)
        )
    }

    /// Checks if the error aborts a running pipeline
    pub fn is_processing_error(&self) -> bool {
        matches!(
            self,
            PipelineError::StageProcessing { .. }
                | PipelineError::Io(_)
                | PipelineError::Serialization(_)
                | PipelineError::Signing(_)
        )
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err.to_string())
    }
}
