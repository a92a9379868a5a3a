// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Standard stage implementations.
//!
//! The general shape is the [`Stage`](metadata_pipeline_domain::services::stage::Stage)
//! trait itself; this module supplies the iterating and filtering adapters
//! over per-item callbacks, the fan-out splitter, item sources, composition
//! helpers, and the serialization stages.

pub mod composite;
pub mod filtering;
pub mod iterating;
pub mod passthrough;
pub mod serialize;
pub mod source;
pub mod splitter;
pub mod termination;

pub use composite::CompositeStage;
pub use filtering::{FilteringStage, ItemPredicate};
pub use iterating::{IteratingStage, ItemProcessor};
pub use passthrough::PassthroughStage;
pub use serialize::{MultiOutputSerializationStage, SerializationStage};
pub use source::StaticItemSourceStage;
pub use splitter::PipelineSplitterStage;
pub use termination::ItemMetadataTerminationStage;
