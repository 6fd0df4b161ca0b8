use std::fs;

use labsweep_backends::{DataBackend, ScopeExit, SpyviewBackend};
use labsweep_core::{
    ColumnDescriptor, ColumnLayout, FixedSweep, ParamType, Station, Value, WaterfallContext,
};
use serde_json::json;

struct Fridge;

impl Station for Fridge {
    fn name(&self) -> &str {
        "fridge"
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({"dac": {"ch1": 0.25}})
    }
}

fn axis(name: &str, start: f64, stop: f64, npoints: usize) -> ColumnDescriptor {
    ColumnDescriptor::new(name, "V")
        .independent()
        .with_fixed_sweep(FixedSweep {
            start: Value::from(start),
            stop: Value::from(stop),
            npoints,
        })
}

fn grid_layout() -> ColumnLayout {
    ColumnLayout::new(vec![
        axis("bias", 0.0, 1.0, 2),
        axis("gate", -1.0, 1.0, 3),
        ColumnDescriptor::new("I", "A"),
    ])
    .expect("layout")
}

#[test]
fn spyview_writes_header_rows_blocks_and_meta() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let stem = tmp.path().join("run_001");
    let layout = grid_layout();
    let mut ctx = WaterfallContext::new();
    ctx.set_station(Fridge);

    let mut backend = SpyviewBackend::at(&stem);
    backend.setup(&layout, &ctx).expect("setup");
    backend.enter(&ctx).expect("enter");
    for bias in [0.0, 1.0] {
        for gate in [-1.0, 0.0, 1.0] {
            let row = layout
                .row(vec![
                    Value::from(bias),
                    Value::from(gate),
                    Value::from(bias * gate),
                ])
                .expect("row");
            backend.submit_row(&layout, &row).expect("row");
        }
        backend.commit_block().expect("block");
    }
    backend.exit(ScopeExit::Completed).expect("exit");

    let dat = fs::read_to_string(tmp.path().join("run_001.dat")).expect("dat");
    assert!(dat.starts_with("# Filename: run_001.dat\r\n# Timestamp: "));
    assert!(dat.contains("# Column 2:\r\n#\tname: gate (V)\r\n#\ttype: coordinate\r\n"));
    assert!(dat.contains("#\tsize: 3\r\n"));
    assert!(dat.contains("# Column 3:\r\n#\tname: I (A)\r\n#\ttype: value\r\n"));
    let data: Vec<&str> = dat
        .split("\r\n")
        .filter(|line| !line.starts_with('#'))
        .collect();
    assert!(data.contains(&"1\t-1\t-1"));
    assert_eq!(dat.matches("\r\n\r\n").count(), 4);

    let meta = fs::read_to_string(tmp.path().join("run_001.meta.txt")).expect("meta");
    let lines: Vec<&str> = meta.split("\r\n").collect();
    assert_eq!(&lines[..4], &["2", "0", "1", "bias (V)"]);
    // second column has start and end swapped
    assert_eq!(&lines[4..8], &["3", "1", "-1", "gate (V)"]);
    assert_eq!(&lines[8..10], &["3", "I (A)"]);

    let snapshot: serde_json::Value =
        serde_json::from_slice(&fs::read(tmp.path().join("run_001.json")).expect("json"))
            .expect("parse");
    assert_eq!(snapshot["dac"]["ch1"], json!(0.25));
}

#[test]
fn unset_slots_are_written_as_nan_and_persist() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let layout = grid_layout();
    let ctx = WaterfallContext::new();
    let mut backend = SpyviewBackend::at(tmp.path().join("partial"));
    backend.setup(&layout, &ctx).expect("setup");
    backend.enter(&ctx).expect("enter");
    backend.add_field("gate", &Value::from(0.5)).expect("field");
    backend.commit_row().expect("row");
    backend.add_field("I", &Value::from(2.0)).expect("field");
    backend.commit_row().expect("row");
    backend.exit(ScopeExit::Completed).expect("exit");

    let dat = fs::read_to_string(tmp.path().join("partial.dat")).expect("dat");
    assert!(dat.contains("nan\t0.5\tnan\r\n"));
    assert!(dat.contains("nan\t0.5\t2\r\n"));
    assert!(!tmp.path().join("partial.json").exists());
}

#[test]
fn non_numeric_columns_are_rejected() {
    let layout = ColumnLayout::new(vec![
        ColumnDescriptor::new("trace", "dBm").with_paramtype(ParamType::Array)
    ])
    .expect("layout");
    let mut backend = SpyviewBackend::at("unused");
    let err = backend
        .setup(&layout, &WaterfallContext::new())
        .expect_err("array column");
    assert_eq!(err.code(), "spyview-paramtype");
}

#[test]
fn unknown_field_is_a_backend_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let layout = grid_layout();
    let ctx = WaterfallContext::new();
    let mut backend = SpyviewBackend::at(tmp.path().join("unknown"));
    backend.setup(&layout, &ctx).expect("setup");
    backend.enter(&ctx).expect("enter");
    let err = backend
        .add_field("R", &Value::from(1.0))
        .expect_err("unknown");
    assert_eq!(err.code(), "spyview-unknown-column");
    backend.exit(ScopeExit::Failed(&err)).expect("exit");
}

#[test]
fn every_block_ends_in_one_blank_line() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let layout = grid_layout();
    let ctx = WaterfallContext::new();
    let mut backend = SpyviewBackend::at(tmp.path().join("blocks"));
    backend.setup(&layout, &ctx).expect("setup");
    backend.enter(&ctx).expect("enter");
    for bias in [0.0, 1.0] {
        let row = layout
            .row(vec![Value::from(bias), Value::from(0.5), Value::from(2.0)])
            .expect("row");
        backend.submit_row(&layout, &row).expect("row");
        backend.commit_block().expect("block");
    }
    backend.exit(ScopeExit::Completed).expect("exit");

    let dat = fs::read_to_string(tmp.path().join("blocks.dat")).expect("dat");
    let body = dat.rsplit_once("#\ttype: value\r\n\r\n").expect("header").1;
    assert_eq!(body, "0\t0.5\t2\r\n\r\n1\t0.5\t2\r\n\r\n");
}

#[test]
fn rows_outside_the_scope_are_rejected() {
    let layout = grid_layout();
    let mut backend = SpyviewBackend::at("unused");
    backend
        .setup(&layout, &WaterfallContext::new())
        .expect("setup");
    let err = backend.commit_block().expect_err("not entered");
    assert_eq!(err.code(), "spyview-not-entered");
}
