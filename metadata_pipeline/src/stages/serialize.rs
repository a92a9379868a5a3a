// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Serialization Stages
//!
//! Two output shapes:
//!
//! - [`SerializationStage`] writes the whole collection to one destination,
//!   the shape used for the published aggregate.
//! - [`MultiOutputSerializationStage`] writes one destination per item,
//!   computed by a [`DestinationStrategy`] - the file-per-entity layout
//!   some relying parties fetch directly.
//!
//! Open, write, and close failures abort the pipeline, decorated with the
//! failing item's identification string so the operator log names the
//! entity and not just the path.

use tracing::debug;

use metadata_pipeline_domain::component::{Component, ComponentBase};
use metadata_pipeline_domain::entities::item::ItemCollection;
use metadata_pipeline_domain::error::PipelineError;
use metadata_pipeline_domain::services::destination::{Destination, DestinationStrategy};
use metadata_pipeline_domain::services::identification::ItemIdentificationStrategy;
use metadata_pipeline_domain::services::serialization::{
    ItemCollectionSerializer, ItemSerializer,
};
use metadata_pipeline_domain::services::stage::Stage;

use crate::strategies::identification::FirstItemIdStrategy;

/// Writes the whole item collection to one destination.
pub struct SerializationStage<T> {
    base: ComponentBase,
    serializer: Option<Box<dyn ItemCollectionSerializer<T>>>,
    destination: Option<Box<dyn Destination>>,
}

impl<T> SerializationStage<T> {
    pub fn new() -> Self {
        Self {
            base: ComponentBase::requiring_id(std::any::type_name::<Self>()),
            serializer: None,
            destination: None,
        }
    }

    /// Sets the collection serializer. Mandatory. Pass it uninitialized;
    /// the stage drives its lifecycle.
    pub fn set_serializer(
        &mut self,
        serializer: Box<dyn ItemCollectionSerializer<T>>,
    ) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.serializer = Some(serializer);
        Ok(())
    }

    /// Sets the output destination. Mandatory.
    pub fn set_destination(
        &mut self,
        destination: Box<dyn Destination>,
    ) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.destination = Some(destination);
        Ok(())
    }
}

impl<T> Default for SerializationStage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Component for SerializationStage<T> {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn do_initialize(&mut self) -> Result<(), PipelineError> {
        if self.destination.is_none() {
            return Err(PipelineError::initialization(
                "destination must be configured",
            ));
        }
        match self.serializer.as_mut() {
            Some(serializer) => serializer.initialize(),
            None => Err(PipelineError::initialization(
                "serializer must be configured",
            )),
        }
    }

    fn do_destroy(&mut self) {
        if let Some(serializer) = self.serializer.as_mut() {
            serializer.destroy();
        }
    }
}

impl<T: Send + Sync> Stage<T> for SerializationStage<T> {
    fn do_execute(&self, items: &mut ItemCollection<T>) -> Result<(), PipelineError> {
        let serializer = self.serializer.as_ref().ok_or_else(|| {
            PipelineError::initialization("serializer must be configured")
        })?;
        let destination = self.destination.as_ref().ok_or_else(|| {
            PipelineError::initialization("destination must be configured")
        })?;

        let mut stream = destination.open_stream()?;
        serializer.serialize_collection(items, &mut *stream)?;
        stream.close()?;

        debug!(
            stage = %self.display_label(),
            items = items.len(),
            destination = %destination.label(),
            "collection serialized"
        );
        Ok(())
    }
}

/// Writes each item to its own destination.
pub struct MultiOutputSerializationStage<T> {
    base: ComponentBase,
    serializer: Option<Box<dyn ItemSerializer<T>>>,
    destination_strategy: Option<Box<dyn DestinationStrategy<T>>>,
    identification_strategy: Box<dyn ItemIdentificationStrategy<T>>,
}

impl<T: 'static> MultiOutputSerializationStage<T> {
    pub fn new() -> Self {
        Self {
            base: ComponentBase::requiring_id(std::any::type_name::<Self>()),
            serializer: None,
            destination_strategy: None,
            identification_strategy: Box::new(FirstItemIdStrategy::new()),
        }
    }

    /// Sets the per-item serializer. Mandatory. Pass it uninitialized; the
    /// stage drives its lifecycle.
    pub fn set_serializer(
        &mut self,
        serializer: Box<dyn ItemSerializer<T>>,
    ) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.serializer = Some(serializer);
        Ok(())
    }

    /// Sets the destination strategy. Mandatory.
    pub fn set_destination_strategy(
        &mut self,
        strategy: Box<dyn DestinationStrategy<T>>,
    ) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.destination_strategy = Some(strategy);
        Ok(())
    }

    /// Replaces the strategy used to name items in error messages.
    pub fn set_identification_strategy(
        &mut self,
        strategy: Box<dyn ItemIdentificationStrategy<T>>,
    ) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.identification_strategy = strategy;
        Ok(())
    }
}

impl<T: 'static> Default for MultiOutputSerializationStage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Component for MultiOutputSerializationStage<T> {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn do_initialize(&mut self) -> Result<(), PipelineError> {
        match self.serializer.as_mut() {
            Some(serializer) => serializer.initialize()?,
            None => {
                return Err(PipelineError::initialization(
                    "serializer must be configured",
                ))
            }
        }
        match self.destination_strategy.as_mut() {
            Some(strategy) => strategy.initialize()?,
            None => {
                return Err(PipelineError::initialization(
                    "destination strategy must be configured",
                ))
            }
        }
        self.identification_strategy.initialize()
    }

    fn do_destroy(&mut self) {
        if let Some(serializer) = self.serializer.as_mut() {
            serializer.destroy();
        }
        if let Some(strategy) = self.destination_strategy.as_mut() {
            strategy.destroy();
        }
        self.identification_strategy.destroy();
    }
}

impl<T: Send + Sync> Stage<T> for MultiOutputSerializationStage<T> {
    fn do_execute(&self, items: &mut ItemCollection<T>) -> Result<(), PipelineError> {
        let serializer = self.serializer.as_ref().ok_or_else(|| {
            PipelineError::initialization("serializer must be configured")
        })?;
        let strategy = self.destination_strategy.as_ref().ok_or_else(|| {
            PipelineError::initialization("destination strategy must be configured")
        })?;

        for item in items.iter() {
            let label = self.identification_strategy.identify(item);
            let decorate = |err: PipelineError| {
                PipelineError::serialization_error(format!("item '{label}': {err}"))
            };

            let destination = strategy.destination_for(item).map_err(decorate)?;
            let mut stream = destination.open_stream().map_err(decorate)?;
            serializer
                .serialize_item(item, &mut *stream)
                .map_err(decorate)?;
            stream.close().map_err(decorate)?;
        }

        debug!(
            stage = %self.display_label(),
            items = items.len(),
            "items serialized to individual destinations"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::destination::{
        FileDestination, FilesInDirectoryDestinationStrategy,
    };
    use metadata_pipeline_domain::entities::item::Item;
    use metadata_pipeline_domain::ItemId;
    use std::io::Write;

    struct PayloadSerializer {
        base: ComponentBase,
    }

    impl PayloadSerializer {
        fn boxed() -> Box<dyn ItemSerializer<String>> {
            Box::new(Self {
                base: ComponentBase::new("PayloadSerializer"),
            })
        }
    }

    impl Component for PayloadSerializer {
        fn component(&self) -> &ComponentBase {
            &self.base
        }

        fn component_mut(&mut self) -> &mut ComponentBase {
            &mut self.base
        }
    }

    impl ItemSerializer<String> for PayloadSerializer {
        fn serialize_item(
            &self,
            item: &Item<String>,
            output: &mut dyn Write,
        ) -> Result<(), PipelineError> {
            output.write_all(item.payload().as_bytes())?;
            Ok(())
        }
    }

    fn identified(id: &str, payload: &str) -> Item<String> {
        let mut item = Item::new(payload.to_string());
        item.add_item_id(ItemId::new(id).unwrap());
        item
    }

    fn multi_output_stage(
        dir: &std::path::Path,
    ) -> MultiOutputSerializationStage<String> {
        let mut strategy = FilesInDirectoryDestinationStrategy::new();
        strategy.set_directory(dir).unwrap();
        strategy.set_prefix("p_").unwrap();
        strategy.set_suffix(".xml").unwrap();

        let mut stage = MultiOutputSerializationStage::new();
        stage.set_id("writer").unwrap();
        stage.set_serializer(PayloadSerializer::boxed()).unwrap();
        stage.set_destination_strategy(Box::new(strategy)).unwrap();
        stage.initialize().unwrap();
        stage
    }

    #[test]
    fn test_each_item_lands_in_its_own_file() {
        let dir = tempfile::tempdir().unwrap();
        let stage = multi_output_stage(dir.path());

        let mut items = vec![
            identified("foo", "<A/>"),
            identified("bar", "<B/>"),
        ];
        stage.execute(&mut items).unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("p_foo.xml")).unwrap(),
            "<A/>"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("p_bar.xml")).unwrap(),
            "<B/>"
        );
    }

    #[test]
    fn test_item_without_id_aborts_with_stage_error() {
        let dir = tempfile::tempdir().unwrap();
        let stage = multi_output_stage(dir.path());

        let mut items = vec![Item::new("<A/>".to_string())];
        let err = stage.execute(&mut items).unwrap_err();
        assert!(matches!(err, PipelineError::StageProcessing { .. }));
        assert!(err.to_string().contains("unidentified"));
    }

    #[test]
    fn test_single_destination_stage_writes_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aggregate.xml");

        let mut stage = SerializationStage::new();
        stage.set_id("aggregate-writer").unwrap();
        stage
            .set_serializer(Box::new(
                crate::serializers::SimpleItemCollectionSerializer::new(
                    PayloadSerializer::boxed(),
                ),
            ))
            .unwrap();
        stage
            .set_destination(Box::new(FileDestination::new(&path)))
            .unwrap();
        stage.initialize().unwrap();

        let mut items = vec![
            identified("foo", "<A/>"),
            identified("bar", "<B/>"),
        ];
        stage.execute(&mut items).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<A/><B/>");
    }

    #[test]
    fn test_missing_configuration_fails_initialize() {
        let mut stage: SerializationStage<String> = SerializationStage::new();
        stage.set_id("writer").unwrap();
        assert!(matches!(
            stage.initialize(),
            Err(PipelineError::Initialization(_))
        ));
    }
}
