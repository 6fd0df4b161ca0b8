use labsweep_backends::ListBackend;
use labsweep_core::{ColumnDescriptor, Measurement, PointSource, Setter, Station, Value};
use labsweep_engine::{SweepAxis, SweepEngine, SweepRequest};
use proptest::prelude::*;

struct Bench;

impl Station for Bench {
    fn name(&self) -> &str {
        "bench"
    }
}

fn axis(name: &str, npoints: usize) -> SweepAxis {
    let key = name.to_string();
    SweepAxis::new(
        name,
        "",
        Setter::new(name, Vec::<ColumnDescriptor>::new(), move |value, ctx| {
            ctx.set(key.clone(), value.clone());
            Ok(Vec::new())
        }),
        PointSource::fixed(name, (0..npoints).map(|i| i as f64)),
    )
}

fn request(sizes: (usize, usize, usize)) -> SweepRequest {
    let measure = Measurement::new("sum", vec![("s", "")], |ctx| {
        let total: f64 = ["a", "b", "c"]
            .iter()
            .filter_map(|key| ctx.get_f64(key))
            .sum();
        Ok(vec![Value::from(total)])
    });
    SweepRequest::new(measure)
        .init(|ctx| {
            ctx.set_station(Bench);
            Ok(())
        })
        .axis1(axis("a", sizes.0))
        .axis2(axis("b", sizes.1))
        .axis3(axis("c", sizes.2))
}

proptest! {
    #[test]
    fn rows_and_blocks_follow_the_grid(sizes in (0usize..5, 0usize..5, 0usize..5)) {
        let mut backend = ListBackend::new();
        let summary = SweepEngine::default().run(&mut backend, request(sizes)).expect("run");
        prop_assert_eq!(summary.rows, sizes.0 * sizes.1 * sizes.2);
        prop_assert_eq!(summary.blocks, sizes.1 * sizes.2);
        prop_assert_eq!(backend.block_ends().len(), sizes.1 * sizes.2);
    }

    #[test]
    fn rows_are_in_nesting_order(sizes in (1usize..4, 1usize..4, 1usize..4)) {
        let mut backend = ListBackend::new();
        SweepEngine::default().run(&mut backend, request(sizes)).expect("run");
        let coords: Vec<(f64, f64, f64)> = backend
            .keyed_rows()
            .iter()
            .map(|row| {
                (
                    row["c"].as_f64().unwrap_or_default(),
                    row["b"].as_f64().unwrap_or_default(),
                    row["a"].as_f64().unwrap_or_default(),
                )
            })
            .collect();
        let mut sorted = coords.clone();
        sorted.sort_by(|x, y| x.partial_cmp(y).expect("finite"));
        prop_assert_eq!(coords, sorted);
    }

    #[test]
    fn column_layout_is_stable_across_runs(sizes in (1usize..4, 1usize..4, 1usize..4)) {
        let engine = SweepEngine::default();
        let first = engine.run(&mut ListBackend::new(), request(sizes)).expect("run");
        let second = engine.run(&mut ListBackend::new(), request(sizes)).expect("run");
        prop_assert_eq!(first.columns, second.columns);
        prop_assert_eq!(first.fingerprint, second.fingerprint);
    }
}
