// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Filtering Stage
//!
//! [`FilteringStage`] adapts a per-item predicate into a stage: items whose
//! predicate returns `false` are removed from the list. The predicate may
//! mutate the item (typically to record a status explaining the removal)
//! before deciding. On a predicate error the stage aborts with the list
//! containing the surviving items, the failing item, and everything not yet
//! examined.

use std::marker::PhantomData;

use tracing::debug;

use metadata_pipeline_domain::component::{Component, ComponentBase};
use metadata_pipeline_domain::entities::item::{Item, ItemCollection};
use metadata_pipeline_domain::error::PipelineError;
use metadata_pipeline_domain::services::stage::Stage;

/// Per-item keep/remove decision plugged into a [`FilteringStage`].
///
/// Implemented for any `Fn(&mut Item<T>) -> Result<bool, PipelineError>`;
/// returning `false` removes the item.
pub trait ItemPredicate<T>: Send + Sync {
    fn test(&self, item: &mut Item<T>) -> Result<bool, PipelineError>;
}

impl<T, F> ItemPredicate<T> for F
where
    F: Fn(&mut Item<T>) -> Result<bool, PipelineError> + Send + Sync,
{
    fn test(&self, item: &mut Item<T>) -> Result<bool, PipelineError> {
        self(item)
    }
}

/// Stage that removes items failing an [`ItemPredicate`].
pub struct FilteringStage<T, P> {
    base: ComponentBase,
    predicate: P,
    _payload: PhantomData<fn(T)>,
}

impl<T, P: ItemPredicate<T>> FilteringStage<T, P> {
    /// Creates a filtering stage over the given predicate.
    pub fn new(predicate: P) -> Self {
        Self {
            base: ComponentBase::requiring_id(std::any::type_name::<Self>()),
            predicate,
            _payload: PhantomData,
        }
    }
}

impl<T, P: ItemPredicate<T>> Component for FilteringStage<T, P> {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }
}

impl<T: Send, P: ItemPredicate<T>> Stage<T> for FilteringStage<T, P> {
    fn do_execute(&self, items: &mut ItemCollection<T>) -> Result<(), PipelineError> {
        let before = items.len();
        let mut kept = Vec::with_capacity(before);
        let mut failure = None;

        for mut item in std::mem::take(items) {
            if failure.is_some() {
                kept.push(item);
                continue;
            }
            match self.predicate.test(&mut item) {
                Ok(true) => kept.push(item),
                Ok(false) => {}
                Err(err) => {
                    kept.push(item);
                    failure = Some(err);
                }
            }
        }

        *items = kept;
        if let Some(err) = failure {
            return Err(err);
        }

        debug!(
            stage = %self.display_label(),
            removed = before - items.len(),
            remaining = items.len(),
            "filtering complete"
        );
        Ok(())
    }
}
