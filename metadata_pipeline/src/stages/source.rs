// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Static Item Source Stage
//!
//! [`StaticItemSourceStage`] appends deep copies of a configured item set to
//! the list. It is the standard way to head a pipeline - or a splitter
//! child - with a known collection: the stage keeps its own pristine copies,
//! so the same initialized stage can run any number of times and downstream
//! mutation never leaks back into the source set.

use metadata_pipeline_domain::component::{Component, ComponentBase};
use metadata_pipeline_domain::entities::item::{Item, ItemCollection};
use metadata_pipeline_domain::error::PipelineError;
use metadata_pipeline_domain::services::stage::Stage;

/// Stage that emits copies of a configured collection of items.
pub struct StaticItemSourceStage<T> {
    base: ComponentBase,
    source_items: Vec<Item<T>>,
}

impl<T> StaticItemSourceStage<T> {
    /// Creates a source with no items.
    pub fn new() -> Self {
        Self {
            base: ComponentBase::requiring_id(std::any::type_name::<Self>()),
            source_items: Vec::new(),
        }
    }

    /// Replaces the source collection.
    pub fn set_source_items(&mut self, items: Vec<Item<T>>) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.source_items = items;
        Ok(())
    }

    /// Number of configured source items.
    pub fn source_count(&self) -> usize {
        self.source_items.len()
    }
}

impl<T> Default for StaticItemSourceStage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Component for StaticItemSourceStage<T> {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }
}

impl<T: Clone + Send + Sync> Stage<T> for StaticItemSourceStage<T> {
    fn do_execute(&self, items: &mut ItemCollection<T>) -> Result<(), PipelineError> {
        items.extend(self.source_items.iter().map(Item::copy));
        Ok(())
    }
}
