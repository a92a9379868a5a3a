// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Component Lifecycle
//!
//! This module provides the lifecycle discipline shared by every configurable
//! part of the pipeline system: stages, pipelines, validators, serializers,
//! and strategies.
//!
//! ## Overview
//!
//! A component moves through three states:
//!
//! ```text
//! uninitialized ──initialize()──► initialized ──destroy()──► destroyed
//! ```
//!
//! - Configuration setters are only legal while uninitialized; every public
//!   setter calls [`Component::check_setter_preconditions`] first.
//! - [`Component::initialize`] transitions to `Initialized` exactly once,
//!   running the component's [`Component::do_initialize`] hook. Stages and
//!   pipelines additionally require an identifier at this point.
//! - [`Component::destroy`] is idempotent; after it, every operation fails
//!   with [`PipelineError::DestroyedComponent`].
//!
//! ## Rationale
//!
//! Freezing configuration at `initialize()` lets execution-time code read it
//! without locks: once a component is initialized, its setters refuse to run,
//! so `execute` sees an immutable snapshot for the lifetime of the component.
//!
//! ## Usage
//!
//! Implementors embed a [`ComponentBase`] and forward the two accessor
//! methods; everything else is provided:
//!
//! ```rust
//! use metadata_pipeline_domain::component::{Component, ComponentBase};
//! use metadata_pipeline_domain::PipelineError;
//!
//! struct Widget {
//!     base: ComponentBase,
//!     threshold: usize,
//! }
//!
//! impl Widget {
//!     fn new() -> Self {
//!         Self { base: ComponentBase::new(std::any::type_name::<Self>()), threshold: 0 }
//!     }
//!
//!     fn set_threshold(&mut self, threshold: usize) -> Result<(), PipelineError> {
//!         self.check_setter_preconditions()?;
//!         self.threshold = threshold;
//!         Ok(())
//!     }
//! }
//!
//! impl Component for Widget {
//!     fn component(&self) -> &ComponentBase {
//!         &self.base
//!     }
//!
//!     fn component_mut(&mut self) -> &mut ComponentBase {
//!         &mut self.base
//!     }
//! }
//!
//! let mut widget = Widget::new();
//! widget.set_threshold(3).unwrap();
//! widget.initialize().unwrap();
//! assert!(widget.set_threshold(4).is_err());
//! ```

use crate::error::PipelineError;

/// The three lifecycle states of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    Destroyed,
}

/// State embedded by every component implementation.
///
/// Holds the optional identifier, the component kind (the implementing type's
/// name, used in timing records and error messages), the lifecycle state, and
/// whether an identifier is mandatory at initialization time.
#[derive(Debug)]
pub struct ComponentBase {
    id: Option<String>,
    kind: &'static str,
    state: LifecycleState,
    id_required: bool,
}

impl ComponentBase {
    /// Creates base state for a component with an optional identifier.
    pub fn new(kind: &'static str) -> Self {
        Self {
            id: None,
            kind,
            state: LifecycleState::Uninitialized,
            id_required: false,
        }
    }

    /// Creates base state for a component that must carry an identifier by
    /// the time it is initialized. Stages and pipelines use this.
    pub fn requiring_id(kind: &'static str) -> Self {
        Self {
            id_required: true,
            ..Self::new(kind)
        }
    }

    /// The implementing type's name.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    fn label(&self) -> &str {
        self.id.as_deref().unwrap_or(self.kind)
    }
}

/// Lifecycle contract shared by stages, pipelines, validators, serializers,
/// and strategies.
///
/// Implementors supply the two accessors plus the optional
/// [`do_initialize`](Component::do_initialize) /
/// [`do_destroy`](Component::do_destroy) hooks; state transitions, guards,
/// and identifier handling are provided.
pub trait Component {
    /// Accessor for the embedded base state.
    fn component(&self) -> &ComponentBase;

    /// Mutable accessor for the embedded base state.
    fn component_mut(&mut self) -> &mut ComponentBase;

    /// Component-specific initialization, run once from
    /// [`initialize`](Component::initialize). Composite components propagate
    /// initialization to their members here.
    fn do_initialize(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }

    /// Component-specific teardown, run once from
    /// [`destroy`](Component::destroy).
    fn do_destroy(&mut self) {}

    /// The component's identifier, if one has been set.
    fn id(&self) -> Option<&str> {
        self.component().id.as_deref()
    }

    /// Sets the component's identifier. The value is trimmed and must be
    /// non-empty.
    fn set_id(&mut self, id: &str) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::invalid_config(
                "component id must be a non-empty string",
            ));
        }
        self.component_mut().id = Some(trimmed.to_string());
        Ok(())
    }

    /// Returns the identifier, failing with an initialization error when it
    /// is unset.
    fn ensure_id(&self) -> Result<&str, PipelineError> {
        self.id().ok_or_else(|| {
            PipelineError::initialization(format!(
                "{} requires an id before use",
                self.component().kind()
            ))
        })
    }

    /// Guard called by every public configuration setter.
    fn check_setter_preconditions(&self) -> Result<(), PipelineError> {
        match self.component().state() {
            LifecycleState::Uninitialized => Ok(()),
            LifecycleState::Initialized => Err(PipelineError::unmodifiable_component(format!(
                "{} is already initialized",
                self.component().label()
            ))),
            LifecycleState::Destroyed => Err(PipelineError::destroyed_component(
                self.component().label().to_string(),
            )),
        }
    }

    /// Guard called at the top of every execution-time operation.
    fn ensure_initialized(&self) -> Result<(), PipelineError> {
        match self.component().state() {
            LifecycleState::Initialized => Ok(()),
            LifecycleState::Uninitialized => Err(PipelineError::initialization(format!(
                "{} has not been initialized",
                self.component().label()
            ))),
            LifecycleState::Destroyed => Err(PipelineError::destroyed_component(
                self.component().label().to_string(),
            )),
        }
    }

    /// Transitions the component to `Initialized`.
    ///
    /// Fails if the component is already initialized or destroyed, or if an
    /// identifier is required and unset. Runs
    /// [`do_initialize`](Component::do_initialize) before committing the
    /// transition, so a failed hook leaves the component uninitialized.
    fn initialize(&mut self) -> Result<(), PipelineError> {
        match self.component().state() {
            LifecycleState::Initialized => {
                return Err(PipelineError::initialization(format!(
                    "{} is already initialized",
                    self.component().label()
                )));
            }
            LifecycleState::Destroyed => {
                return Err(PipelineError::destroyed_component(
                    self.component().label().to_string(),
                ));
            }
            LifecycleState::Uninitialized => {}
        }
        if self.component().id_required {
            self.ensure_id()?;
        }
        self.do_initialize()?;
        self.component_mut().state = LifecycleState::Initialized;
        Ok(())
    }

    /// Transitions the component to `Destroyed`. Idempotent.
    fn destroy(&mut self) {
        if self.component().state() != LifecycleState::Destroyed {
            self.do_destroy();
            self.component_mut().state = LifecycleState::Destroyed;
        }
    }

    /// The identifier when set, otherwise the component kind. Used in log
    /// lines and error messages.
    fn display_label(&self) -> String {
        self.component().label().to_string()
    }
}
