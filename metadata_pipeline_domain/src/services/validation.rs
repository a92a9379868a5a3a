// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Validators
//!
//! This module defines the pluggable validation contract used by stages
//! whose notion of "valid" is an ordered list of rules: key lengths, RSA
//! exponents, certificate blacklists, registration scopes, and the like.
//!
//! ## Overview
//!
//! A [`Validator`] examines one value and either lets the sequence continue
//! (`Action::Continue`) or ends it (`Action::Done`). Findings are recorded
//! through the [`ValidationContext`], which tags every status with the id of
//! the *stage* driving the validation - validators contribute messages, the
//! stage owns attribution.
//!
//! A [`ValidatorSequence`] composes validators in insertion order and is
//! itself a validator, so sequences nest. Lifecycle transitions propagate to
//! every member.

use crate::component::{Component, ComponentBase};
use crate::entities::item_metadata::ItemMetadataMap;
use crate::error::PipelineError;
use crate::value_objects::status_metadata::StatusMetadata;

/// Outcome of applying one validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue with the next validator in the sequence.
    Continue,
    /// Stop the sequence; later validators are not invoked.
    Done,
}

/// Per-call context handed to validators.
///
/// Carries the metadata map of the item under validation, the id of the
/// stage performing the validation (used to tag recorded statuses), and the
/// item's identification string for use in messages.
pub struct ValidationContext<'a> {
    metadata: &'a mut ItemMetadataMap,
    component_id: &'a str,
    source_id: &'a str,
}

impl<'a> ValidationContext<'a> {
    /// Creates a context for one value's validation.
    pub fn new(
        metadata: &'a mut ItemMetadataMap,
        component_id: &'a str,
        source_id: &'a str,
    ) -> Self {
        Self {
            metadata,
            component_id,
            source_id,
        }
    }

    /// The id statuses are tagged with.
    pub fn component_id(&self) -> &str {
        self.component_id
    }

    /// The identification string of the item under validation.
    pub fn source_id(&self) -> &str {
        self.source_id
    }

    /// Records an informational finding.
    pub fn info(&mut self, message: impl Into<String>) {
        self.metadata
            .add(StatusMetadata::info(self.component_id, message));
    }

    /// Records a warning finding.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.metadata
            .add(StatusMetadata::warning(self.component_id, message));
    }

    /// Records an error finding.
    pub fn error(&mut self, message: impl Into<String>) {
        self.metadata
            .add(StatusMetadata::error(self.component_id, message));
    }

    /// Direct access to the item's metadata, for validators that attach
    /// more than statuses.
    pub fn metadata_mut(&mut self) -> &mut ItemMetadataMap {
        self.metadata
    }
}

/// An ordered rule applied to a value during stage execution.
pub trait Validator<V>: Component + Send + Sync {
    /// Applies the rule, recording findings through the context.
    fn validate(
        &self,
        value: &V,
        context: &mut ValidationContext<'_>,
    ) -> Result<Action, PipelineError>;
}

/// An ordered sequence of validators, itself usable as a validator.
pub struct ValidatorSequence<V> {
    base: ComponentBase,
    validators: Vec<Box<dyn Validator<V>>>,
}

impl<V> ValidatorSequence<V> {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self {
            base: ComponentBase::new(std::any::type_name::<Self>()),
            validators: Vec::new(),
        }
    }

    /// Replaces the member validators.
    pub fn set_validators(
        &mut self,
        validators: Vec<Box<dyn Validator<V>>>,
    ) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.validators = validators;
        Ok(())
    }

    /// Appends one validator.
    pub fn add_validator(&mut self, validator: Box<dyn Validator<V>>) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.validators.push(validator);
        Ok(())
    }

    /// Number of member validators.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Whether the sequence has no members.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl<V> Default for ValidatorSequence<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Component for ValidatorSequence<V> {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn do_initialize(&mut self) -> Result<(), PipelineError> {
        for validator in &mut self.validators {
            validator.initialize()?;
        }
        Ok(())
    }

    fn do_destroy(&mut self) {
        for validator in &mut self.validators {
            validator.destroy();
        }
    }
}

impl<V> Validator<V> for ValidatorSequence<V> {
    fn validate(
        &self,
        value: &V,
        context: &mut ValidationContext<'_>,
    ) -> Result<Action, PipelineError> {
        self.ensure_initialized()?;
        for validator in &self.validators {
            if validator.validate(value, context)? == Action::Done {
                return Ok(Action::Done);
            }
        }
        Ok(Action::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedValidator {
        base: ComponentBase,
        action: Action,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedValidator {
        fn boxed(action: Action, calls: Arc<AtomicUsize>) -> Box<dyn Validator<String>> {
            Box::new(Self {
                base: ComponentBase::new("ScriptedValidator"),
                action,
                calls,
            })
        }
    }

    impl Component for ScriptedValidator {
        fn component(&self) -> &ComponentBase {
            &self.base
        }

        fn component_mut(&mut self) -> &mut ComponentBase {
            &mut self.base
        }
    }

    impl Validator<String> for ScriptedValidator {
        fn validate(
            &self,
            _value: &String,
            context: &mut ValidationContext<'_>,
        ) -> Result<Action, PipelineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.action == Action::Done {
                context.error("rule matched");
            }
            Ok(self.action)
        }
    }

    #[test]
    fn test_sequence_stops_at_first_done() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut sequence = ValidatorSequence::new();
        sequence
            .set_validators(vec![
                ScriptedValidator::boxed(Action::Continue, calls.clone()),
                ScriptedValidator::boxed(Action::Done, calls.clone()),
                ScriptedValidator::boxed(Action::Continue, calls.clone()),
            ])
            .unwrap();
        sequence.initialize().unwrap();

        let mut metadata = ItemMetadataMap::new();
        let mut context = ValidationContext::new(&mut metadata, "stage", "urn:item");
        let action = sequence
            .validate(&"value".to_string(), &mut context)
            .unwrap();

        assert_eq!(action, Action::Done);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_sequence_continues() {
        let mut sequence: ValidatorSequence<String> = ValidatorSequence::new();
        sequence.initialize().unwrap();
        let mut metadata = ItemMetadataMap::new();
        let mut context = ValidationContext::new(&mut metadata, "stage", "urn:item");
        assert_eq!(
            sequence.validate(&String::new(), &mut context).unwrap(),
            Action::Continue
        );
    }

    #[test]
    fn test_context_tags_statuses_with_component_id() {
        let mut metadata = ItemMetadataMap::new();
        let mut context = ValidationContext::new(&mut metadata, "key-check", "urn:item");
        context.error("too short");
        context.warning("almost too short");

        let statuses: Vec<&StatusMetadata> =
            metadata.values_of::<StatusMetadata>().collect();
        assert_eq!(statuses.len(), 2);
        assert!(statuses
            .iter()
            .all(|status| status.component_id() == "key-check"));
    }

    #[test]
    fn test_sequence_requires_initialization() {
        let sequence: ValidatorSequence<String> = ValidatorSequence::new();
        let mut metadata = ItemMetadataMap::new();
        let mut context = ValidationContext::new(&mut metadata, "stage", "urn:item");
        assert!(sequence.validate(&String::new(), &mut context).is_err());
    }

    #[test]
    fn test_setters_frozen_after_initialize() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut sequence: ValidatorSequence<String> = ValidatorSequence::new();
        sequence.initialize().unwrap();
        assert!(sequence
            .add_validator(ScriptedValidator::boxed(Action::Continue, calls))
            .is_err());
    }
}
