// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Iterating Stage
//!
//! This module provides [`IteratingStage`], the adapter that turns a
//! per-item callback into a full stage.
//!
//! ## Overview
//!
//! Most stages touch items one at a time and never look at the list as a
//! whole. Instead of a template-method base class, the framework composes a
//! small [`ItemProcessor`] - any closure or struct with a
//! `process(&mut Item<T>)` - with the stage machinery (lifecycle, id,
//! bracketing).
//!
//! ## Sequential and parallel modes
//!
//! By default items are processed in list order and the stage stops at the
//! first failure; downstream items are left untouched. A stage whose
//! processor is independent per item - no shared mutable state outside the
//! item - may opt into parallel mode, where items are processed on rayon
//! workers. Under parallelism every item is attempted, completion order is
//! unspecified, and the error surfaced is the one for the lowest-index
//! failing item, keeping the outcome deterministic.

use std::marker::PhantomData;

use rayon::prelude::*;

use metadata_pipeline_domain::component::{Component, ComponentBase};
use metadata_pipeline_domain::entities::item::{Item, ItemCollection};
use metadata_pipeline_domain::error::PipelineError;
use metadata_pipeline_domain::services::stage::Stage;

/// Per-item work plugged into an [`IteratingStage`].
///
/// Implemented for any `Fn(&mut Item<T>) -> Result<(), PipelineError>`.
pub trait ItemProcessor<T>: Send + Sync {
    fn process(&self, item: &mut Item<T>) -> Result<(), PipelineError>;
}

impl<T, F> ItemProcessor<T> for F
where
    F: Fn(&mut Item<T>) -> Result<(), PipelineError> + Send + Sync,
{
    fn process(&self, item: &mut Item<T>) -> Result<(), PipelineError> {
        self(item)
    }
}

/// Stage that applies an [`ItemProcessor`] to each item.
pub struct IteratingStage<T, P> {
    base: ComponentBase,
    processor: P,
    parallel: bool,
    _payload: PhantomData<fn(T)>,
}

impl<T, P: ItemProcessor<T>> IteratingStage<T, P> {
    /// Creates a sequential iterating stage over the given processor.
    pub fn new(processor: P) -> Self {
        Self {
            base: ComponentBase::requiring_id(std::any::type_name::<Self>()),
            processor,
            parallel: false,
            _payload: PhantomData,
        }
    }

    /// Enables or disables parallel per-item processing. Only correct when
    /// the processor is free of shared mutable state outside each item.
    pub fn set_parallel_execution(&mut self, parallel: bool) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.parallel = parallel;
        Ok(())
    }
}

impl<T, P: ItemProcessor<T>> Component for IteratingStage<T, P> {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }
}

impl<T: Send, P: ItemProcessor<T>> Stage<T> for IteratingStage<T, P> {
    fn do_execute(&self, items: &mut ItemCollection<T>) -> Result<(), PipelineError> {
        if self.parallel {
            let first_failure = items
                .par_iter_mut()
                .enumerate()
                .filter_map(|(index, item)| self.processor.process(item).err().map(|e| (index, e)))
                .min_by_key(|(index, _)| *index);
            match first_failure {
                Some((_, err)) => Err(err),
                None => Ok(()),
            }
        } else {
            for item in items.iter_mut() {
                self.processor.process(item)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn stage<P: ItemProcessor<u32>>(processor: P) -> IteratingStage<u32, P> {
        let mut stage = IteratingStage::new(processor);
        stage.set_id("iter").unwrap();
        stage.initialize().unwrap();
        stage
    }

    #[test]
    fn test_processes_items_in_order() {
        let stage = stage(|item: &mut Item<u32>| {
            *item.payload_mut() += 1;
            Ok(())
        });
        let mut items = vec![Item::new(1), Item::new(2)];
        stage.execute(&mut items).unwrap();
        assert_eq!(*items[0].payload(), 2);
        assert_eq!(*items[1].payload(), 3);
    }

    #[test]
    fn test_stops_at_first_failure() {
        let calls = AtomicUsize::new(0);
        let stage = stage(move |item: &mut Item<u32>| {
            calls.fetch_add(1, Ordering::SeqCst);
            if *item.payload() == 2 {
                return Err(PipelineError::io_error("boom"));
            }
            *item.payload_mut() = 100;
            Ok(())
        });
        let mut items = vec![Item::new(1), Item::new(2), Item::new(3)];
        assert!(stage.execute(&mut items).is_err());
        // The third item was never visited.
        assert_eq!(*items[2].payload(), 3);
    }

    #[test]
    fn test_parallel_mode_processes_all_items() {
        let mut stage = IteratingStage::new(|item: &mut Item<u32>| {
            *item.payload_mut() *= 2;
            Ok(())
        });
        stage.set_id("iter").unwrap();
        stage.set_parallel_execution(true).unwrap();
        stage.initialize().unwrap();

        let mut items: Vec<Item<u32>> = (0..64).map(Item::new).collect();
        stage.execute(&mut items).unwrap();
        for (index, item) in items.iter().enumerate() {
            assert_eq!(*item.payload(), (index as u32) * 2);
        }
    }

    #[test]
    fn test_parallel_mode_surfaces_lowest_index_error() {
        let mut stage = IteratingStage::new(|item: &mut Item<u32>| {
            if *item.payload() % 2 == 1 {
                return Err(PipelineError::io_error(format!("odd {}", item.payload())));
            }
            Ok(())
        });
        stage.set_id("iter").unwrap();
        stage.set_parallel_execution(true).unwrap();
        stage.initialize().unwrap();

        let mut items: Vec<Item<u32>> = (0..16).map(Item::new).collect();
        let err = stage.execute(&mut items).unwrap_err();
        assert!(err.to_string().contains("odd 1"));
    }

    #[test]
    fn test_parallel_setter_guarded_after_initialize() {
        let mut stage = IteratingStage::new(|_: &mut Item<u32>| Ok(()));
        stage.set_id("iter").unwrap();
        stage.initialize().unwrap();
        assert!(stage.set_parallel_execution(true).is_err());
    }
}
