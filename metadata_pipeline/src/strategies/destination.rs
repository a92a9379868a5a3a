// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # File Destinations
//!
//! This module provides the file-backed [`Destination`] and the
//! files-in-directory [`DestinationStrategy`] used for one-file-per-item
//! output.
//!
//! ## Write-then-persist
//!
//! [`FileDestination`] never writes the final path directly: the stream
//! writes a sibling temporary file, and [`DestinationStream::close`]
//! persists it over the final name. Where the host rename is atomic,
//! readers of the output directory never observe a half-written aggregate;
//! elsewhere the file is simply overwritten.
//!
//! ## Naming
//!
//! [`FilesInDirectoryDestinationStrategy`] derives each file name from the
//! item's first [`ItemId`](metadata_pipeline_domain::ItemId) as
//! `prefix + transform(id) + suffix`, inside a directory validated at
//! initialization time. Directories are never created by the strategy, and
//! an item without an identifier cannot be named - that is an error the
//! serialization stage surfaces with the item's identification string.

use std::io::{self, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::debug;

use metadata_pipeline_domain::component::{Component, ComponentBase};
use metadata_pipeline_domain::entities::item::Item;
use metadata_pipeline_domain::error::PipelineError;
use metadata_pipeline_domain::services::destination::{
    Destination, DestinationStrategy, DestinationStream,
};

/// A single file target, written via a sibling temporary file.
#[derive(Debug, Clone)]
pub struct FileDestination {
    path: PathBuf,
}

impl FileDestination {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The final path the destination persists to.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Destination for FileDestination {
    fn open_stream(&self) -> Result<Box<dyn DestinationStream>, PipelineError> {
        let parent = self.path.parent().ok_or_else(|| {
            PipelineError::io_error(format!(
                "destination '{}' has no parent directory",
                self.path.display()
            ))
        })?;
        let temp = NamedTempFile::new_in(parent).map_err(|err| {
            PipelineError::io_error(format!(
                "cannot open temporary file in '{}': {err}",
                parent.display()
            ))
        })?;
        Ok(Box::new(FileDestinationStream {
            temp,
            path: self.path.clone(),
        }))
    }

    fn label(&self) -> String {
        self.path.display().to_string()
    }
}

struct FileDestinationStream {
    temp: NamedTempFile,
    path: PathBuf,
}

impl Write for FileDestinationStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.temp.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.temp.flush()
    }
}

impl DestinationStream for FileDestinationStream {
    fn close(self: Box<Self>) -> Result<(), PipelineError> {
        let FileDestinationStream { mut temp, path } = *self;
        temp.flush()
            .map_err(|err| PipelineError::io_error(format!("flush failed: {err}")))?;
        temp.persist(&path).map_err(|err| {
            PipelineError::io_error(format!("cannot persist '{}': {}", path.display(), err.error))
        })?;
        debug!(path = %path.display(), "destination persisted");
        Ok(())
    }
}

/// Transforms an identifier value into a file-name fragment.
pub type FileNameTransform = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Chooses `directory/prefix + transform(first id) + suffix` per item.
pub struct FilesInDirectoryDestinationStrategy {
    base: ComponentBase,
    directory: Option<PathBuf>,
    prefix: String,
    suffix: String,
    name_transform: Option<FileNameTransform>,
}

impl FilesInDirectoryDestinationStrategy {
    pub fn new() -> Self {
        Self {
            base: ComponentBase::new(std::any::type_name::<Self>()),
            directory: None,
            prefix: String::new(),
            suffix: String::new(),
            name_transform: None,
        }
    }

    /// Sets the output directory. Mandatory; validated at initialization.
    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.directory = Some(directory.into());
        Ok(())
    }

    /// Sets the file-name prefix.
    pub fn set_prefix(&mut self, prefix: &str) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.prefix = prefix.to_string();
        Ok(())
    }

    /// Sets the file-name suffix.
    pub fn set_suffix(&mut self, suffix: &str) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.suffix = suffix.to_string();
        Ok(())
    }

    /// Sets the transform applied to the identifier value. Identity when
    /// unset.
    pub fn set_name_transform(
        &mut self,
        transform: FileNameTransform,
    ) -> Result<(), PipelineError> {
        self.check_setter_preconditions()?;
        self.name_transform = Some(transform);
        Ok(())
    }
}

impl Default for FilesInDirectoryDestinationStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for FilesInDirectoryDestinationStrategy {
    fn component(&self) -> &ComponentBase {
        &self.base
    }

    fn component_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn do_initialize(&mut self) -> Result<(), PipelineError> {
        let directory = self.directory.as_ref().ok_or_else(|| {
            PipelineError::initialization("output directory must be configured")
        })?;
        if !directory.is_dir() {
            return Err(PipelineError::initialization(format!(
                "'{}' is not an existing directory",
                directory.display()
            )));
        }
        // Probe writability up front; failing at initialize beats failing
        // per item mid-run.
        tempfile::tempfile_in(directory).map_err(|err| {
            PipelineError::initialization(format!(
                "directory '{}' is not writable: {err}",
                directory.display()
            ))
        })?;
        Ok(())
    }
}

impl<T> DestinationStrategy<T> for FilesInDirectoryDestinationStrategy {
    fn destination_for(&self, item: &Item<T>) -> Result<Box<dyn Destination>, PipelineError> {
        self.ensure_initialized()?;
        let directory = self.directory.as_ref().ok_or_else(|| {
            PipelineError::initialization("output directory must be configured")
        })?;
        let id = item.first_item_id().ok_or_else(|| {
            PipelineError::serialization_error(
                "item carries no ItemId to derive a file name from",
            )
        })?;
        let name = match &self.name_transform {
            Some(transform) => transform(id.as_str()),
            None => id.as_str().to_string(),
        };
        let file_name = format!("{}{}{}", self.prefix, name, self.suffix);
        Ok(Box::new(FileDestination::new(directory.join(file_name))))
    }
}
