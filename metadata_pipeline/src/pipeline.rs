// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline
//!
//! This module provides [`Pipeline`], the ordered composition of stages.
//!
//! ## Overview
//!
//! A pipeline owns its stages and runs them in order over the same item
//! list, on the caller's thread. The first stage failure aborts the run;
//! the surfaced error names the failing stage. Lifecycle transitions
//! propagate to every stage, so initializing the pipeline initializes the
//! whole composition.
//!
//! A pipeline is itself a stage, which is how nesting works: a pipeline can
//! appear inside another pipeline or - the common case - as a child of a
//! fan-out splitter. Like any stage it brackets the items it processes with
//! its own timing record.

use std::time::Instant;

use tracing::{debug, error};

use metadata_pipeline_domain::component::{Component, ComponentBase};
use metadata_pipeline_domain::entities::item::ItemCollection;
use metadata_pipeline_domain::error::PipelineError;
use metadata_pipeline_domain::services::stage::Stage;

/// Ordered composition of stages over one item list.
pub struct Pipeline<T> {
    base: ComponentBase,
    stages: Vec<Box<dyn Stage<T>>>,
}

impl<T> Pipeline<T> {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self {
            base: ComponentBase::requiring_id(std::any::type_name::<Self>()),
            stages: Vec::new(),
        }
    }

    /// Replaces the stage list.
    pub fn set_stages(&mut self, stages: Vec<Box<dyn Stage<T>>>) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.stages = stages;
        Ok(())
    }

    /// Appends one stage.
    pub fn add_stage(&mut self, stage: Box<dyn Stage<T>>) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.stages.push(stage);
        Ok(())
    }

    /// Number of composed stages.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl<T> Default for Pipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Component for Pipeline<T> {
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

impl<T> Stage<T> for Pipeline<T> {
    fn do_execute(&self, items: &mut ItemCollection<T>) -> Result<(), PipelineError> {
        let pipeline_id = self.display_label();
        debug!(
            pipeline = %pipeline_id,
            stages = self.stages.len(),
            items = items.len(),
            "pipeline starting"
        );

        for stage in &self.stages {
            let stage_id = stage.display_label();
            let started = Instant::now();
            debug!(pipeline = %pipeline_id, stage = %stage_id, "executing stage");

            if let Err(err) = stage.execute(items) {
                error!(
                    pipeline = %pipeline_id,
                    stage = %stage_id,
                    error = %err,
                    "stage failed"
                );
                return Err(err);
            }

            debug!(
                pipeline = %pipeline_id,
                stage = %stage_id,
                items = items.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "stage completed"
            );
        }

        debug!(pipeline = %pipeline_id, items = items.len(), "pipeline completed");
        Ok(())
    }
}
