// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Built-in validators.
//!
//! Real validation rules - key lengths, exponents, blacklists, scope
//! regexes - live with the collaborators that understand the values they
//! check. The framework ships the two degenerate rules: accept everything
//! (a placeholder while wiring a sequence) and reject everything (a
//! sequence terminator for values earlier rules failed to claim).

use metadata_pipeline_domain::component::{Component, ComponentBase};
use metadata_pipeline_domain::error::PipelineError;
use metadata_pipeline_domain::services::validation::{Action, ValidationContext, Validator};

/// Accepts every value and lets the sequence continue.
#[derive(Debug)]
pub struct AcceptAllValidator {
    base: ComponentBase,
}

impl AcceptAllValidator {
    pub fn new() -> Self {
        Self {
            base: ComponentBase::new(std::any::type_name::<Self>()),
        }
    }
}

impl Default for AcceptAllValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for AcceptAllValidator {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }
}

impl<V> Validator<V> for AcceptAllValidator {
    fn validate(
        &self,
        _value: &V,
        _context: &mut ValidationContext<'_>,
    ) -> Result<Action, PipelineError> {
        Ok(Action::Continue)
    }
}

/// Records an error status for every value and ends the sequence.
#[derive(Debug)]
pub struct RejectAllValidator {
    base: ComponentBase,
    message: String,
}

impl RejectAllValidator {
    pub fn new() -> Self {
        Self {
            base: ComponentBase::new(std::any::type_name::<Self>()),
            message: String::from("value rejected"),
        }
    }

    /// Replaces the recorded message.
    pub fn set_message(&mut self, message: &str) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.message = message.to_string();
        Ok(())
    }
}

impl Default for RejectAllValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for RejectAllValidator {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }
}

impl<V> Validator<V> for RejectAllValidator {
    fn validate(
        &self,
        _value: &V,
        context: &mut ValidationContext<'_>,
    ) -> Result<Action, PipelineError> {
        let message = format!("{} ({})", self.message, context.source_id());
        context.error(message);
        Ok(Action::Done)
    }
}
