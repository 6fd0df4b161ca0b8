use std::collections::BTreeSet;

use labsweep_core::{ColumnDescriptor, ColumnLayout, Value};
use proptest::prelude::*;

fn arb_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z]{1,6}", 1..12)
        .prop_map(|set: BTreeSet<String>| set.into_iter().collect())
        .prop_shuffle()
}

proptest! {
    #[test]
    fn unique_names_index_their_positions(names in arb_names()) {
        let columns: Vec<_> = names.iter().map(|n| ColumnDescriptor::new(n.clone(), "")).collect();
        let layout = ColumnLayout::new(columns).expect("layout");
        for (position, name) in names.iter().enumerate() {
            prop_assert_eq!(layout.index_of(name), Some(position));
        }
    }

    #[test]
    fn any_repeated_name_is_rejected(names in arb_names(), pick in any::<prop::sample::Index>()) {
        let mut columns: Vec<_> = names.iter().map(|n| ColumnDescriptor::new(n.clone(), "")).collect();
        let repeated = names[pick.index(names.len())].clone();
        columns.push(ColumnDescriptor::new(repeated, ""));
        prop_assert!(ColumnLayout::new(columns).is_err());
    }

    #[test]
    fn rows_reconstruct_values_by_name(names in arb_names()) {
        let columns: Vec<_> = names.iter().map(|n| ColumnDescriptor::new(n.clone(), "")).collect();
        let layout = ColumnLayout::new(columns).expect("layout");
        let values: Vec<Value> = (0..names.len()).map(Value::from).collect();
        let row = layout.row(values).expect("row");
        for (position, name) in names.iter().enumerate() {
            prop_assert_eq!(row.get(&layout, name), Some(&Value::from(position)));
        }
    }
}
