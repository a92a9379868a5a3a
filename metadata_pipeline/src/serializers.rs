// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Collection serialization over a per-item serializer.
//!
//! Payload serializers come from collaborators (the XML layer supplies its
//! own); the framework only needs the obvious composition: write each item
//! in order to the one stream.

use std::io::Write;

use metadata_pipeline_domain::component::{Component, ComponentBase};
use metadata_pipeline_domain::entities::item::Item;
use metadata_pipeline_domain::error::PipelineError;
use metadata_pipeline_domain::services::serialization::{
    ItemCollectionSerializer, ItemSerializer,
};

/// Serializes a collection by concatenating an [`ItemSerializer`] in order.
pub struct SimpleItemCollectionSerializer<T> {
    base: ComponentBase,
    item_serializer: Box<dyn ItemSerializer<T>>,
}

impl<T> SimpleItemCollectionSerializer<T> {
    /// Creates the serializer over the given per-item serializer. Pass it
    /// uninitialized; lifecycle is driven from here.
    pub fn new(item_serializer: Box<dyn ItemSerializer<T>>) -> Self {
        Self {
            base: ComponentBase::new(std::any::type_name::<Self>()),
            item_serializer,
        }
    }
}

impl<T> Component for SimpleItemCollectionSerializer<T> {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn do_initialize(&mut self) -> Result<(), PipelineError> {
        self.item_serializer.initialize()
    }

    fn do_destroy(&mut self) {
        self.item_serializer.destroy();
    }
}

impl<T> ItemCollectionSerializer<T> for SimpleItemCollectionSerializer<T> {
    fn serialize_collection(
        &self,
        items: &[Item<T>],
        output: &mut dyn Write,
    ) -> Result<(), PipelineError> {
        self.ensure_initialized()?;
        for item in items {
            self.item_serializer.serialize_item(item, output)?;
        }
        Ok(())
    }
}
