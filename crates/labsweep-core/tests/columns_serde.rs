use labsweep_core::{
    from_yaml_slice, ColumnDescriptor, ColumnLayout, FixedSweep, Independence, ParamType, Value,
};

#[test]
fn descriptors_round_trip_json() {
    let column = ColumnDescriptor::new("I", "A")
        .with_paramtype(ParamType::Array)
        .depends_on("gate")
        .depends_on("bias");
    let json = serde_json::to_string(&column).expect("serialize");
    let decoded: ColumnDescriptor = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, column);
    assert!(!json.contains("fixed_sweep"));
}

#[test]
fn descriptors_load_from_yaml_with_defaults() {
    let yaml = br#"
- name: gate
  unit: V
  independent: independent
  fixed_sweep:
    start: -1.0
    stop: 1.0
    npoints: 21
- name: I
  unit: A
"#;
    let columns: Vec<ColumnDescriptor> = from_yaml_slice(yaml).expect("yaml");
    assert_eq!(columns[0].independent, Independence::Independent);
    assert_eq!(
        columns[0].fixed_sweep,
        Some(FixedSweep {
            start: Value::from(-1.0),
            stop: Value::from(1.0),
            npoints: 21,
        })
    );
    assert_eq!(columns[1].paramtype, ParamType::Numeric);
    assert_eq!(columns[1].independent, Independence::Dependent);
    let layout = ColumnLayout::new(columns).expect("layout");
    assert_eq!(layout.setpoints_for(1), vec!["gate"]);
}
