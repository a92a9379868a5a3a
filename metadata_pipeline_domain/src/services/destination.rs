// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Destination contracts for multi-output serialization.
//!
//! A [`Destination`] is an abstract target into which exactly one item is
//! serialized; a [`DestinationStrategy`] computes the destination for each
//! item. The stream returned by [`Destination::open_stream`] must be
//! [`close`](DestinationStream::close)d to finalize the output - dropping
//! it without closing abandons the write.

use std::fmt;
use std::io::Write;

use crate::component::Component;
use crate::entities::item::Item;
use crate::error::PipelineError;

/// An open stream writing to a destination.
pub trait DestinationStream: Write + Send {
    /// Finalizes the output. For file-backed destinations this is where the
    /// temporary file is persisted over the final path.
    fn close(self: Box<Self>) -> Result<(), PipelineError>;
}

/// An abstract, closable target for a single item.
pub trait Destination: Send + Sync + fmt::Debug {
    /// Opens the destination for writing.
    fn open_stream(&self) -> Result<Box<dyn DestinationStream>, PipelineError>;

    /// A human-readable name for the destination, used in error messages.
    fn label(&self) -> String;
}

/// Computes a destination for each item.
pub trait DestinationStrategy<T>: Component + Send + Sync {
    /// The destination the given item should be written to.
    fn destination_for(&self, item: &Item<T>) -> Result<Box<dyn Destination>, PipelineError>;
}
