// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Splitter Stage
//!
//! This module provides [`PipelineSplitterStage`], the fan-out/join stage.
//!
//! ## Overview
//!
//! The splitter owns `N >= 0` child pipelines and a merge strategy. On
//! execution it:
//!
//! 1. Builds `N` fresh collections through the configured factory (empty
//!    `Vec` by default)
//! 2. Deep-copies every input item into each collection, so children see
//!    disjoint payloads and cannot observe each other's mutations
//! 3. Runs the children - on rayon workers by default, sequentially when
//!    configured - and joins: all children finish before anything else
//!    happens
//! 4. Surfaces the lowest-child-index error, if any
//! 5. Otherwise merges the child outputs into the original list on the
//!    splitter's thread, handing the merge strategy the outputs in child
//!    index order regardless of completion order
//!
//! Determinism falls out of the join discipline: for deterministic inputs
//! and children, the merged output is identical run to run.

use rayon::prelude::*;
use tracing::debug;

use metadata_pipeline_domain::component::{Component, ComponentBase};
use metadata_pipeline_domain::entities::item::{Item, ItemCollection};
use metadata_pipeline_domain::error::PipelineError;
use metadata_pipeline_domain::services::merge::CollectionMergeStrategy;
use metadata_pipeline_domain::services::stage::Stage;

use crate::pipeline::Pipeline;
use crate::strategies::merge::SimpleCollectionMergeStrategy;

/// Factory for the collections handed to child pipelines.
pub type CollectionFactory<T> = Box<dyn Fn() -> ItemCollection<T> + Send + Sync>;

/// Fan-out stage: copies the input to child pipelines and merges results.
pub struct PipelineSplitterStage<T> {
    base: ComponentBase,
    children: Vec<Pipeline<T>>,
    merge_strategy: Box<dyn CollectionMergeStrategy<T>>,
    collection_factory: CollectionFactory<T>,
    parallel: bool,
}

impl<T: 'static> PipelineSplitterStage<T> {
    /// Creates a splitter with no children, the simple concatenating merge,
    /// an empty-`Vec` collection factory, and parallel fan-out.
    pub fn new() -> Self {
        Self {
            base: ComponentBase::requiring_id(std::any::type_name::<Self>()),
            children: Vec::new(),
            merge_strategy: Box::new(SimpleCollectionMergeStrategy::new()),
            collection_factory: Box::new(Vec::new),
            parallel: true,
        }
    }

    /// Replaces the child pipelines.
    pub fn set_child_pipelines(&mut self, children: Vec<Pipeline<T>>) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.children = children;
        Ok(())
    }

    /// Appends one child pipeline.
    pub fn add_child_pipeline(&mut self, child: Pipeline<T>) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.children.push(child);
        Ok(())
    }

    /// Replaces the merge strategy.
    pub fn set_merge_strategy(
        &mut self,
        strategy: Box<dyn CollectionMergeStrategy<T>>,
    ) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.merge_strategy = strategy;
        Ok(())
    }

    /// Replaces the factory for child collections.
    pub fn set_collection_factory(
        &mut self,
        factory: CollectionFactory<T>,
    ) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.collection_factory = factory;
        Ok(())
    }

    /// Enables or disables parallel child execution.
    pub fn set_parallel_execution(&mut self, parallel: bool) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.parallel = parallel;
        Ok(())
    }

    /// Number of child pipelines.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

impl<T: 'static> Default for PipelineSplitterStage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Component for PipelineSplitterStage<T> {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn do_initialize(&mut self) -> Result<(), PipelineError> {
        for child in &mut self.children {
            child.initialize()?;
        }
        self.merge_strategy.initialize()
    }

    fn do_destroy(&mut self) {
        for child in &mut self.children {
            child.destroy();
        }
        self.merge_strategy.destroy();
    }
}

impl<T: Clone + Send> Stage<T> for PipelineSplitterStage<T> {
    fn do_execute(&self, items: &mut ItemCollection<T>) -> Result<(), PipelineError> {
        let mut collections: Vec<ItemCollection<T>> = Vec::with_capacity(self.children.len());
        for _ in 0..self.children.len() {
            let mut collection = (self.collection_factory)();
            collection.extend(items.iter().map(Item::copy));
            collections.push(collection);
        }

        debug!(
            stage = %self.display_label(),
            children = self.children.len(),
            items = items.len(),
            parallel = self.parallel,
            "fanning out to child pipelines"
        );

        // Join barrier: every child runs to completion before the first
        // error is surfaced or the merge begins.
        let results: Vec<(ItemCollection<T>, Result<(), PipelineError>)> =
            if self.parallel && self.children.len() > 1 {
                self.children
                    .par_iter()
                    .zip(collections.into_par_iter())
                    .map(|(child, mut collection)| {
                        let result = child.execute(&mut collection);
                        (collection, result)
                    })
                    .collect()
            } else {
                self.children
                    .iter()
                    .zip(collections)
                    .map(|(child, mut collection)| {
                        let result = child.execute(&mut collection);
                        (collection, result)
                    })
                    .collect()
            };

        let mut outputs = Vec::with_capacity(results.len());
        let mut first_error = None;
        for (collection, result) in results {
            if let Err(err) = result {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
            outputs.push(collection);
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        self.merge_strategy.merge(items, outputs)
    }
}
