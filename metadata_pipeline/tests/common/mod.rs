// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Shared helpers for the integration suites.

use metadata_pipeline::stages::{IteratingStage, StaticItemSourceStage};
use metadata_pipeline::Pipeline;
use metadata_pipeline_domain::services::stage::Stage;
use metadata_pipeline_domain::{Component, Item, ItemId, PipelineError};

/// Installs a test subscriber so `RUST_LOG`-style filtering works when a
/// suite is run with output enabled. Safe to call from every test.
#[allow(dead_code)]
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env(),
            )
            .with_test_writer()
            .try_init();
    });
}

/// An item with a string payload and the given identifiers attached.
#[allow(dead_code)]
pub fn identified_item(ids: &[&str]) -> Item<String> {
    let mut item = Item::new(String::new());
    for id in ids {
        item.add_item_id(ItemId::new(id).unwrap());
    }
    item
}

/// A stage that appends its id to every item's payload.
#[allow(dead_code)]
pub fn tagging_stage(id: &str) -> Box<dyn Stage<String>> {
    let tag = id.to_string();
    let mut stage = IteratingStage::new(move |item: &mut Item<String>| {
        item.payload_mut().push_str(&tag);
        item.payload_mut().push(';');
        Ok(())
    });
    stage.set_id(id).unwrap();
    Box::new(stage)
}

/// A pipeline whose only stage emits items carrying the given identifiers.
#[allow(dead_code)]
pub fn emitting_pipeline(pipeline_id: &str, ids: &[&str]) -> Pipeline<String> {
    let mut source = StaticItemSourceStage::new();
    source.set_id(&format!("{pipeline_id}-source")).unwrap();
    source
        .set_source_items(ids.iter().map(|id| identified_item(&[id])).collect())
        .unwrap();

    let mut pipeline = Pipeline::new();
    pipeline.set_id(pipeline_id).unwrap();
    pipeline.add_stage(Box::new(source)).unwrap();
    pipeline
}

/// A stage that fails with the given message when it reaches an item whose
/// first identifier matches `fail_on`.
#[allow(dead_code)]
pub fn failing_stage(id: &str, fail_on: &str, message: &str) -> Box<dyn Stage<String>> {
    let fail_on = fail_on.to_string();
    let message = message.to_string();
    let mut stage = IteratingStage::new(move |item: &mut Item<String>| {
        if item
            .first_item_id()
            .is_some_and(|item_id| item_id.as_str() == fail_on)
        {
            return Err(PipelineError::io_error(message.clone()));
        }
        item.payload_mut().push_str("processed");
        Ok(())
    });
    stage.set_id(id).unwrap();
    Box::new(stage)
}
