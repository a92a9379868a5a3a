// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Composite Stage
//!
//! [`CompositeStage`] runs an ordered list of sub-stages as one stage, so a
//! reusable group of transformations can be configured once and dropped
//! into pipelines as a unit. Each sub-stage brackets items with its own
//! timing record; the composite adds one more for the group.

use metadata_pipeline_domain::component::{Component, ComponentBase};
use metadata_pipeline_domain::entities::item::ItemCollection;
use metadata_pipeline_domain::error::PipelineError;
use metadata_pipeline_domain::services::stage::Stage;

/// Stage composed of an ordered list of sub-stages.
pub struct CompositeStage<T> {
    base: ComponentBase,
    stages: Vec<Box<dyn Stage<T>>>,
}

impl<T> CompositeStage<T> {
    /// Creates an empty composite.
    pub fn new() -> Self {
        Self {
            base: ComponentBase::requiring_id(std::any::type_name::<Self>()),
            stages: Vec::new(),
        }
    }

    /// Replaces the sub-stage list.
    pub fn set_stages(&mut self, stages: Vec<Box<dyn Stage<T>>>) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.stages = stages;
        Ok(())
    }

    /// Appends one sub-stage.
    pub fn add_stage(&mut self, stage: Box<dyn Stage<T>>) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.stages.push(stage);
        Ok(())
    }
}

impl<T> Default for CompositeStage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Component for CompositeStage<T> {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn do_initialize(&mut self) -> Result<(), PipelineError> {
        for stage in &mut self.stages {
            stage.initialize()?;
        }
        Ok(())
    }

    fn do_destroy(&mut self) {
        for stage in &mut self.stages {
            stage.destroy();
        }
    }
}

impl<T> Stage<T> for CompositeStage<T> {
    fn do_execute(&self, items: &mut ItemCollection<T>) -> Result<(), PipelineError> {
        for stage in &self.stages {
            stage.execute(items)?;
        }
        Ok(())
    }
}
