// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Metadata Termination Stage
//!
//! [`ItemMetadataTerminationStage`] aborts the pipeline when any item
//! carries metadata of a chosen type - typically an error-severity status
//! recorded by an earlier stage. It is the gate between "findings
//! accumulate" and "this aggregate must not be published": place it after
//! the checks whose findings are fatal, with a predicate narrowing which
//! values count.

use std::marker::PhantomData;

use metadata_pipeline_domain::component::{Component, ComponentBase};
use metadata_pipeline_domain::entities::item::ItemCollection;
use metadata_pipeline_domain::entities::item_metadata::ItemMetadata;
use metadata_pipeline_domain::error::PipelineError;
use metadata_pipeline_domain::services::identification::ItemIdentificationStrategy;
use metadata_pipeline_domain::services::stage::Stage;

use crate::strategies::identification::FirstItemIdStrategy;

/// Narrows which metadata values trigger termination.
pub type MetadataPredicate<M> = Box<dyn Fn(&M) -> bool + Send + Sync>;

/// Stage that fails the pipeline when items carry metadata of type `M`.
pub struct ItemMetadataTerminationStage<T, M> {
    base: ComponentBase,
    predicate: Option<MetadataPredicate<M>>,
    identification_strategy: Box<dyn ItemIdentificationStrategy<T>>,
    _metadata: PhantomData<fn(M)>,
}

impl<T: 'static, M: ItemMetadata> ItemMetadataTerminationStage<T, M> {
    /// Creates a stage that terminates on any value of type `M`.
    pub fn new() -> Self {
        Self {
            base: ComponentBase::requiring_id(std::any::type_name::<Self>()),
            predicate: None,
            identification_strategy: Box::new(FirstItemIdStrategy::new()),
            _metadata: PhantomData,
        }
    }

    /// Restricts termination to values matching the predicate.
    pub fn set_predicate(&mut self, predicate: MetadataPredicate<M>) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.predicate = Some(predicate);
        Ok(())
    }

    /// Replaces the strategy used to name offending items. Pass it
    /// uninitialized; the stage drives its lifecycle.
    pub fn set_identification_strategy(
        &mut self,
        strategy: Box<dyn ItemIdentificationStrategy<T>>,
    ) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.identification_strategy = strategy;
        Ok(())
    }
}

impl<T: 'static, M: ItemMetadata> Default for ItemMetadataTerminationStage<T, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, M: ItemMetadata> Component for ItemMetadataTerminationStage<T, M> {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn do_initialize(&mut self) -> Result<(), PipelineError> {
        self.identification_strategy.initialize()
    }

    fn do_destroy(&mut self) {
        self.identification_strategy.destroy();
    }
}

impl<T, M: ItemMetadata> Stage<T> for ItemMetadataTerminationStage<T, M> {
    fn do_execute(&self, items: &mut ItemCollection<T>) -> Result<(), PipelineError> {
        let offending: Vec<String> = items
            .iter()
            .filter(|item| {
                item.metadata().values_of::<M>().any(|value| {
                    self.predicate
                        .as_ref()
                        .map_or(true, |predicate| predicate(value))
                })
            })
            .map(|item| self.identification_strategy.identify(item))
            .collect();

        if offending.is_empty() {
            return Ok(());
        }
        Err(PipelineError::stage_processing(
            self.ensure_id()?,
            format!(
                "{} item(s) carry {}: {}",
                offending.len(),
                std::any::type_name::<M>(),
                offending.join(", ")
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metadata_pipeline_domain::{Item, ItemId, Severity, StatusMetadata};

    fn stage_with_error_predicate(
    ) -> ItemMetadataTerminationStage<String, StatusMetadata> {
        let mut stage = ItemMetadataTerminationStage::new();
        stage.set_id("gate").unwrap();
        stage
            .set_predicate(Box::new(|status: &StatusMetadata| {
                status.severity() == Severity::Error
            }))
            .unwrap();
        stage.initialize().unwrap();
        stage
    }

    #[test]
    fn test_clean_items_pass() {
        let stage = stage_with_error_predicate();
        let mut items = vec![Item::new(String::new())];
        items[0].record_warning("check", "tolerable");
        assert!(stage.execute(&mut items).is_ok());
    }

    #[test]
    fn test_error_status_terminates_and_names_item() {
        let stage = stage_with_error_predicate();
        let mut items = vec![Item::new(String::new())];
        items[0].add_item_id(ItemId::new("urn:bad").unwrap());
        items[0].record_error("check", "fatal");

        let err = stage.execute(&mut items).unwrap_err();
        assert!(err.to_string().contains("gate"));
        assert!(err.to_string().contains("urn:bad"));
    }

    #[test]
    fn test_without_predicate_any_value_terminates() {
        let mut stage: ItemMetadataTerminationStage<String, StatusMetadata> =
            ItemMetadataTerminationStage::new();
        stage.set_id("gate").unwrap();
        stage.initialize().unwrap();

        let mut items = vec![Item::new(String::new())];
        items[0].record_info("check", "merely informational");
        assert!(stage.execute(&mut items).is_err());
    }
}
