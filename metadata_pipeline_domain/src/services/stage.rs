// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Trait
//!
//! This module defines the contract every pipeline processing stage
//! implements, whether built-in (fan-out, serialization, signing) or
//! supplied by a collaborator.
//!
//! ## Overview
//!
//! A stage is a component whose [`execute`](Stage::execute) is called once
//! per run with the pipeline's mutable item list. The stage may mutate items
//! in place, add or remove items, reorder the list, or attach metadata.
//! Execution is single-threaded from the caller's perspective; a stage may
//! parallelize internally over disjoint items.
//!
//! ## Bracketing
//!
//! Implementors write [`do_execute`](Stage::do_execute); the provided
//! `execute` wraps it in the entry/exit discipline every stage shares:
//!
//! 1. On entry, a fresh [`ComponentInfo`] with the stage's id and kind and
//!    the entry instant is attached to each item present.
//! 2. On normal exit, the completion instant is set on each of those
//!    records. Items the stage added are not back-filled.
//! 3. On failure, completions stay unset, an error-severity status carrying
//!    the stage id and the error message is appended to every entry item
//!    still in the list (items the stage removed are unaffected), and the
//!    error is surfaced as a
//!    [`StageProcessing`](PipelineError::StageProcessing) error naming the
//!    failing stage.
//!
//! ## Why one unified trait?
//!
//! The three standard shapes - general, iterating, filtering - are not a
//! type hierarchy. Iterating and filtering are adapter structs over per-item
//! callbacks in the framework crate; everything observable (bracketing,
//! error decoration, status accumulation) lives here, once.

use std::collections::HashSet;
use std::sync::Arc;

use crate::component::Component;
use crate::entities::item::ItemCollection;
use crate::error::PipelineError;
use crate::value_objects::component_info::ComponentInfo;

/// A component that transforms a list of items in one call.
///
/// Stages always require an id by initialization time; constructors use
/// [`ComponentBase::requiring_id`](crate::ComponentBase::requiring_id).
pub trait Stage<T>: Component + Send + Sync {
    /// The stage's work. Called by [`execute`](Stage::execute) with the
    /// bracket already open.
    fn do_execute(&self, items: &mut ItemCollection<T>) -> Result<(), PipelineError>;

    /// Runs the stage over the item list with entry/exit bracketing.
    fn execute(&self, items: &mut ItemCollection<T>) -> Result<(), PipelineError> {
        self.ensure_initialized()?;
        let stage_id = self.ensure_id()?.to_string();
        let kind = self.component().kind();

        let mut brackets: Vec<Arc<ComponentInfo>> = Vec::with_capacity(items.len());
        for item in items.iter_mut() {
            let info = Arc::new(ComponentInfo::started(&stage_id, kind));
            brackets.push(Arc::clone(&info));
            item.metadata_mut().add_shared(info);
        }

        match self.do_execute(items) {
            Ok(()) => {
                for info in &brackets {
                    info.mark_complete();
                }
                Ok(())
            }
            Err(err) => {
                let entry_records: HashSet<*const ComponentInfo> =
                    brackets.iter().map(|info| Arc::as_ptr(info)).collect();
                let message = err.to_string();
                for item in items.iter_mut() {
                    let present_at_entry = item
                        .metadata()
                        .values_of::<ComponentInfo>()
                        .any(|info| entry_records.contains(&(info as *const ComponentInfo)));
                    if present_at_entry {
                        item.record_error(&stage_id, message.clone());
                    }
                }
                Err(err.into_stage_error(&stage_id))
            }
        }
    }
}
