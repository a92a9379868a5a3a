// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Validator Sequence Tests
//!
//! Short-circuiting and status recording through a sequence driven the way
//! a validating stage drives it.

use metadata_pipeline::validation::AcceptAllValidator;
use metadata_pipeline_domain::component::{Component, ComponentBase};
use metadata_pipeline_domain::entities::item_metadata::ItemMetadataMap;
use metadata_pipeline_domain::services::validation::{
    Action, ValidationContext, Validator, ValidatorSequence,
};
use metadata_pipeline_domain::{PipelineError, Severity, StatusMetadata};

/// Records an error and lets the sequence continue.
struct AlwaysErrorValidator {
    base: ComponentBase,
    message: String,
}

impl AlwaysErrorValidator {
    fn boxed(message: &str) -> Box<dyn Validator<String>> {
        Box::new(Self {
            base: ComponentBase::new("AlwaysErrorValidator"),
            message: message.to_string(),
        })
    }
}

impl Component for AlwaysErrorValidator {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }
}

impl Validator<String> for AlwaysErrorValidator {
    fn validate(
        &self,
        _value: &String,
        context: &mut ValidationContext<'_>,
    ) -> Result<Action, PipelineError> {
        context.error(self.message.clone());
        Ok(Action::Continue)
    }
}

/// Panics if invoked; stands in for a rule that must be short-circuited
/// away.
struct MustNotRunValidator {
    base: ComponentBase,
}

impl MustNotRunValidator {
    fn boxed() -> Box<dyn Validator<String>> {
        Box::new(Self {
            base: ComponentBase::new("MustNotRunValidator"),
        })
    }
}

impl Component for MustNotRunValidator {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }
}

impl Validator<String> for MustNotRunValidator {
    fn validate(
        &self,
        _value: &String,
        _context: &mut ValidationContext<'_>,
    ) -> Result<Action, PipelineError> {
        panic!("validator after DONE must not run");
    }
}

/// Returns DONE without recording anything.
struct DoneValidator {
    base: ComponentBase,
}

impl DoneValidator {
    fn boxed() -> Box<dyn Validator<String>> {
        Box::new(Self {
            base: ComponentBase::new("DoneValidator"),
        })
    }
}

impl Component for DoneValidator {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }
}

impl Validator<String> for DoneValidator {
    fn validate(
        &self,
        _value: &String,
        _context: &mut ValidationContext<'_>,
    ) -> Result<Action, PipelineError> {
        Ok(Action::Done)
    }
}

/// `[CONTINUE, DONE, FAIL-IF-CALLED]` resolves to DONE without reaching
/// the third rule.
#[test]
fn test_sequence_short_circuits_at_done() {
    let mut sequence = ValidatorSequence::new();
    sequence
        .set_validators(vec![
            Box::new(AcceptAllValidator::new()),
            DoneValidator::boxed(),
            MustNotRunValidator::boxed(),
        ])
        .unwrap();
    sequence.initialize().unwrap();

    let mut metadata = ItemMetadataMap::new();
    let mut context = ValidationContext::new(&mut metadata, "stage", "urn:item");
    let action = sequence
        .validate(&"v".to_string(), &mut context)
        .unwrap();
    assert_eq!(action, Action::Done);
}

/// Scenario: two always-error validators leave exactly two error statuses
/// in insertion order, tagged with the driving stage's id.
#[test]
fn test_two_error_validators_record_ordered_findings() {
    let mut sequence = ValidatorSequence::new();
    sequence
        .set_validators(vec![
            AlwaysErrorValidator::boxed("first finding"),
            AlwaysErrorValidator::boxed("second finding"),
        ])
        .unwrap();
    sequence.initialize().unwrap();

    let mut metadata = ItemMetadataMap::new();
    let mut context = ValidationContext::new(&mut metadata, "checker", "urn:item");
    let action = sequence
        .validate(&"v".to_string(), &mut context)
        .unwrap();
    assert_eq!(action, Action::Continue);

    let errors: Vec<&StatusMetadata> = metadata
        .values_of::<StatusMetadata>()
        .filter(|status| status.severity() == Severity::Error)
        .collect();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].message(), "first finding");
    assert_eq!(errors[1].message(), "second finding");
    assert!(errors.iter().all(|status| status.component_id() == "checker"));
}
