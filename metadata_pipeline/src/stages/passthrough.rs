// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! No-op stage, useful as a placeholder in composed pipelines and in tests
//! that only care about bracketing behavior.

use std::marker::PhantomData;

use metadata_pipeline_domain::component::{Component, ComponentBase};
use metadata_pipeline_domain::entities::item::ItemCollection;
use metadata_pipeline_domain::error::PipelineError;
use metadata_pipeline_domain::services::stage::Stage;

/// Stage that leaves the item list untouched.
pub struct PassthroughStage<T> {
    base: ComponentBase,
    _payload: PhantomData<fn(T)>,
}

impl<T> PassthroughStage<T> {
    pub fn new() -> Self {
        Self {
            base: ComponentBase::requiring_id(std::any::type_name::<Self>()),
            _payload: PhantomData,
        }
    }
}

impl<T> Default for PassthroughStage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Component for PassthroughStage<T> {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }
}

impl<T> Stage<T> for PassthroughStage<T> {
    fn do_execute(&self, _items: &mut ItemCollection<T>) -> Result<(), PipelineError> {
        Ok(())
    }
}
