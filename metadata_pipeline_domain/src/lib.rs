// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Metadata Pipeline Domain Layer
//!
//! Pure model and contracts for the metadata aggregation pipeline: the item
//! and metadata carrier types, the component lifecycle discipline, the status
//! and timing value objects, and the service traits the execution framework
//! implements.
//!
//! ## Overview
//!
//! The domain layer owns everything that does not require a runtime:
//!
//! - **Error taxonomy**: a single [`PipelineError`] covering configuration,
//!   lifecycle, and processing failures
//! - **Component lifecycle**: uninitialized → initialized → destroyed, with
//!   guarded setters ([`component`])
//! - **Items**: [`Item`] couples one payload with an insertion-ordered,
//!   type-indexed metadata multimap ([`ItemMetadataMap`])
//! - **Value objects**: [`ItemId`], [`StatusMetadata`], [`ComponentInfo`]
//! - **Service contracts**: stages, validators, identification strategies,
//!   serializers, destinations, and merge strategies ([`services`])
//!
//! ## Architecture
//!
//! Following the dependency-inversion split used throughout the workspace,
//! this crate defines interfaces and pure logic; the `metadata-pipeline`
//! crate supplies the executable framework (pipelines, fan-out, file output,
//! signing). Nothing here performs I/O, spawns threads, or logs.

pub mod component;
pub mod entities;
pub mod error;
pub mod services;
pub mod value_objects;

pub use component::{Component, ComponentBase, LifecycleState};
pub use entities::item::{Item, ItemCollection};
pub use entities::item_metadata::{ItemMetadata, ItemMetadataMap};
pub use error::PipelineError;
pub use value_objects::component_info::ComponentInfo;
pub use value_objects::item_id::ItemId;
pub use value_objects::status_metadata::{Severity, StatusMetadata};
