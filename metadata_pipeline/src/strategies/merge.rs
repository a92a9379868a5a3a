// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Merge Strategies
//!
//! This module provides the two standard
//! [`CollectionMergeStrategy`] implementations used by the fan-out
//! splitter.
//!
//! ## Simple concatenation
//!
//! [`SimpleCollectionMergeStrategy`] appends each source collection to the
//! target in the order given. Duplicates are possible; use it when the
//! children partition the work and cannot overlap.
//!
//! ## Deduplication by ItemId
//!
//! [`DeduplicatingItemIdMergeStrategy`] admits each source item at most
//! once per identifier. The identifiers already present on the target seed
//! the seen-set; a source item with no identifiers is always admitted; an
//! item with identifiers is admitted only when none of them has been seen,
//! and admission claims *all* of its identifiers. The result is a stable,
//! order-preserving merge biased toward earlier sources - exactly the
//! behavior wanted when several upstream feeds republish the same entity.

use std::collections::HashSet;

use tracing::debug;

use metadata_pipeline_domain::component::{Component, ComponentBase};
use metadata_pipeline_domain::entities::item::ItemCollection;
use metadata_pipeline_domain::error::PipelineError;
use metadata_pipeline_domain::services::merge::CollectionMergeStrategy;
use metadata_pipeline_domain::value_objects::item_id::ItemId;

/// Appends every source item to the target, in order.
#[derive(Debug)]
pub struct SimpleCollectionMergeStrategy {
    base: ComponentBase,
}

impl SimpleCollectionMergeStrategy {
    pub fn new() -> Self {
        Self {
            base: ComponentBase::new(std::any::type_name::<Self>()),
        }
    }
}

impl Default for SimpleCollectionMergeStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for SimpleCollectionMergeStrategy {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }
}

impl<T> CollectionMergeStrategy<T> for SimpleCollectionMergeStrategy {
    fn merge(
        &self,
        target: &mut ItemCollection<T>,
        sources: Vec<ItemCollection<T>>,
    ) -> Result<(), PipelineError> {
        self.ensure_initialized()?;
        for source in sources {
            target.extend(source);
        }
        Ok(())
    }
}

/// Admits each source item once per [`ItemId`], biased toward earlier
/// sources.
#[derive(Debug)]
pub struct DeduplicatingItemIdMergeStrategy {
    base: ComponentBase,
}

impl DeduplicatingItemIdMergeStrategy {
    pub fn new() -> Self {
        Self {
            base: ComponentBase::new(std::any::type_name::<Self>()),
        }
    }
}

impl Default for DeduplicatingItemIdMergeStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for DeduplicatingItemIdMergeStrategy {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }
}

impl<T> CollectionMergeStrategy<T> for DeduplicatingItemIdMergeStrategy {
    fn merge(
        &self,
        target: &mut ItemCollection<T>,
        sources: Vec<ItemCollection<T>>,
    ) -> Result<(), PipelineError> {
        self.ensure_initialized()?;
        let mut seen: HashSet<ItemId> = target
            .iter()
            .flat_map(|item| item.item_ids().cloned())
            .collect();
        let mut skipped = 0usize;

        for source in sources {
            for item in source {
                let ids: Vec<ItemId> = item.item_ids().cloned().collect();
                if ids.is_empty() {
                    // An unidentified item can never collide.
                    target.push(item);
                    continue;
                }
                if ids.iter().any(|id| seen.contains(id)) {
                    skipped += 1;
                    continue;
                }
                seen.extend(ids);
                target.push(item);
            }
        }

        if skipped > 0 {
            debug!(skipped, "dropped duplicate items during merge");
        }
        Ok(())
    }
}
