// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Metadata Pipeline Execution Framework
//!
//! This crate implements the execution framework over the contracts defined
//! in `metadata-pipeline-domain`: pipelines, the standard stage shapes,
//! fan-out with pluggable merging, the traversal substrate for payload
//! walks, multi-output serialization, and the signing adjunct.
//!
//! ## Overview
//!
//! A [`Pipeline`] runs an ordered list of stages over a mutable list of
//! items. Stages mutate items in place, add or remove items, or attach
//! metadata; per-item findings accumulate as status records rather than
//! aborting the run. The framework is synchronous: pipelines execute on the
//! caller's thread, and parallelism appears only inside stages that opt into
//! it (fan-out across child pipelines, per-item work in iterating stages,
//! per-item signing).
//!
//! ## Module Map
//!
//! - [`pipeline`] - ordered stage composition
//! - [`stages`] - iterating/filtering bases, fan-out splitter, item
//!   sources, serialization stages, composition helpers
//! - [`strategies`] - merge, identification, identifier-generation, and
//!   file destination strategies
//! - [`traversal`] - pre-order payload walks with deferred mutation
//! - [`validation`] - built-in validators
//! - [`serializers`] - collection serialization over an item serializer
//! - [`signing`] - configuration-snapshot signing over a pluggable backend
//!
//! ## Example
//!
//! Assembling and running a two-stage pipeline over string payloads:
//!
//! ```rust
//! use metadata_pipeline::pipeline::Pipeline;
//! use metadata_pipeline::stages::{IteratingStage, StaticItemSourceStage};
//! use metadata_pipeline_domain::services::stage::Stage;
//! use metadata_pipeline_domain::{Component, Item, ItemId, PipelineError};
//!
//! let mut source = StaticItemSourceStage::new();
//! source.set_id("source").unwrap();
//! let mut seed = Item::new("payload".to_string());
//! seed.add_item_id(ItemId::new("urn:example").unwrap());
//! source.set_source_items(vec![seed]).unwrap();
//!
//! let mut upper = IteratingStage::new(|item: &mut Item<String>| {
//!     let upper = item.payload().to_uppercase();
//!     item.replace_payload(upper);
//!     Ok(())
//! });
//! upper.set_id("uppercase").unwrap();
//!
//! let mut pipeline = Pipeline::new();
//! pipeline.set_id("demo").unwrap();
//! pipeline.add_stage(Box::new(source)).unwrap();
//! pipeline.add_stage(Box::new(upper)).unwrap();
//! pipeline.initialize().unwrap();
//!
//! let mut items = Vec::new();
//! pipeline.execute(&mut items).unwrap();
//! assert_eq!(items[0].payload(), "PAYLOAD");
//! # Ok::<(), PipelineError>(())
//! ```

pub mod pipeline;
pub mod serializers;
pub mod signing;
pub mod stages;
pub mod strategies;
pub mod traversal;
pub mod validation;

pub use metadata_pipeline_domain as domain;
pub use pipeline::Pipeline;
