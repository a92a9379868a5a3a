// /////////////////////////////////////////////////////////////////////////////
// Metadata Pipeline RS
// Copyright (c) 2025 Metadata Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Execution Tests
//!
//! ## Test Coverage
//!
//! - **Ordering**: stages run in insertion order; an item removed
//!   mid-pipeline is invisible to later stages
//! - **Status bracketing**: timing records carry the stage id and ordered
//!   instants; failures leave the bracket open
//! - **Status monotonicity**: stage execution never removes findings
//! - **Failure isolation**: the first per-item failure aborts the run with
//!   the failing stage's id and message; downstream items are untouched

mod common;

use metadata_pipeline::stages::{FilteringStage, IteratingStage};
use metadata_pipeline::Pipeline;
use metadata_pipeline_domain::services::stage::Stage;
use metadata_pipeline_domain::value_objects::component_info::ComponentInfo;
use metadata_pipeline_domain::{Component, Item, PipelineError, Severity};

/// Stage order and mid-pipeline removal: `S2` drops the item `S3` would
/// otherwise see.
#[test]
fn test_removal_hides_item_from_later_stages() {
    common::init_tracing();

    let s1 = common::tagging_stage("s1");
    let mut s2 = FilteringStage::new(|item: &mut Item<String>| {
        Ok(item
            .first_item_id()
            .is_some_and(|id| id.as_str() != "urn:drop"))
    });
    s2.set_id("s2").unwrap();
    let s3 = common::tagging_stage("s3");

    let mut pipeline = Pipeline::new();
    pipeline.set_id("p").unwrap();
    pipeline
        .set_stages(vec![s1, Box::new(s2), s3])
        .unwrap();
    pipeline.initialize().unwrap();

    let mut items = vec![
        common::identified_item(&["urn:keep"]),
        common::identified_item(&["urn:drop"]),
    ];
    pipeline.execute(&mut items).unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].payload(), "s1;s3;");
}

/// Scenario: stage `"assembler"` brackets an item with ordered instants.
#[test]
fn test_component_info_bracketing() {
    let mut stage = IteratingStage::new(|_: &mut Item<String>| Ok(()));
    stage.set_id("assembler").unwrap();
    stage.initialize().unwrap();

    let mut items = vec![common::identified_item(&["x"])];
    stage.execute(&mut items).unwrap();

    let info = items[0]
        .metadata()
        .first_of::<ComponentInfo>()
        .expect("timing record attached");
    assert_eq!(info.component_id(), "assembler");
    assert!(info.component_kind().contains("IteratingStage"));
    let complete = info.complete().expect("bracket closed");
    assert!(complete >= info.start());
}

/// Status counts per severity never decrease across a stage execution.
#[test]
fn test_status_monotonicity() {
    let mut stage = IteratingStage::new(|item: &mut Item<String>| {
        item.record_info("annotator", "looked at item");
        Ok(())
    });
    stage.set_id("annotator").unwrap();
    stage.initialize().unwrap();

    let mut items = vec![common::identified_item(&["x"])];
    items[0].record_warning("earlier", "pre-existing finding");
    items[0].record_error("earlier", "pre-existing defect");

    let warnings_before = items[0].statuses_of(Severity::Warning).count();
    let errors_before = items[0].statuses_of(Severity::Error).count();
    let infos_before = items[0].statuses_of(Severity::Info).count();

    stage.execute(&mut items).unwrap();

    assert!(items[0].statuses_of(Severity::Warning).count() >= warnings_before);
    assert!(items[0].statuses_of(Severity::Error).count() >= errors_before);
    assert!(items[0].statuses_of(Severity::Info).count() > infos_before);
}

/// Scenario: iterating stage fails on the second of three items.
#[test]
fn test_failure_isolation() {
    let stage = common::failing_stage("s", "urn:i2", "boom");
    let mut pipeline = Pipeline::new();
    pipeline.set_id("p").unwrap();
    pipeline.add_stage(stage).unwrap();
    pipeline.initialize().unwrap();

    let mut items = vec![
        common::identified_item(&["urn:i1"]),
        common::identified_item(&["urn:i2"]),
        common::identified_item(&["urn:i3"]),
    ];
    let err = pipeline.execute(&mut items).unwrap_err();

    let rendered = err.to_string();
    assert!(rendered.contains("boom"));
    assert!(rendered.contains('s'));
    match err {
        PipelineError::StageProcessing { stage, message } => {
            assert_eq!(stage, "s");
            assert!(message.contains("boom"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // I1 was processed, I2 failed, I3 was never reached.
    assert_eq!(items[0].payload(), "processed");
    assert_eq!(items[1].payload(), "");
    assert_eq!(items[2].payload(), "");

    // Every item present at entry carries the failure as an error status
    // with an open bracket.
    for item in &items {
        assert!(item.has_error_status());
        let info = item.metadata().first_of::<ComponentInfo>().unwrap();
        assert!(!info.is_complete());
    }
}

/// Copies made before a failure keep their own status history.
#[test]
fn test_copy_before_failure_is_unaffected() {
    let stage = common::failing_stage("s", "urn:doomed", "boom");
    let mut pipeline = Pipeline::new();
    pipeline.set_id("p").unwrap();
    pipeline.add_stage(stage).unwrap();
    pipeline.initialize().unwrap();

    let original = common::identified_item(&["urn:doomed"]);
    let copy = original.copy();

    let mut items = vec![original];
    assert!(pipeline.execute(&mut items).is_err());

    assert!(items[0].has_error_status());
    assert!(!copy.has_error_status());
}
