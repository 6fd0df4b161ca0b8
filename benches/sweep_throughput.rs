use criterion::{criterion_group, criterion_main, Criterion};
use labsweep_backends::ListBackend;
use labsweep_core::{ColumnDescriptor, Measurement, PointSource, Setter, Value};
use labsweep_engine::{ProgressConfig, SweepAxis, SweepConfig, SweepEngine, SweepRequest};

fn make_request() -> SweepRequest {
    let inner = SweepAxis::new(
        "gate",
        "V",
        Setter::new("gate", Vec::<ColumnDescriptor>::new(), |value, ctx| {
            ctx.set("gate", value.clone());
            Ok(Vec::new())
        }),
        PointSource::fixed("gate", (0..100_i32).map(|i| f64::from(i) * 0.01)),
    );
    let outer = SweepAxis::new(
        "bias",
        "mV",
        Setter::noop("bias"),
        PointSource::fixed("bias", (0..20_i32).map(f64::from)),
    );
    let measure = Measurement::new("iv", vec![("I", "A"), ("R", "Ohm")], |ctx| {
        let gate = ctx.get_f64("gate").unwrap_or_default();
        Ok(vec![Value::from(gate * 1e-9), Value::from(1e9)])
    });
    SweepRequest::new(measure).axis1(inner).axis2(outer)
}

fn bench_sweep(c: &mut Criterion) {
    let engine = SweepEngine::new(SweepConfig {
        require_station: false,
        progress: ProgressConfig {
            enabled: false,
            ..ProgressConfig::default()
        },
    });
    c.bench_function("sweep_throughput", |b| {
        b.iter(|| {
            let mut backend = ListBackend::new();
            let summary = engine.run(&mut backend, make_request()).expect("sweep");
            assert_eq!(summary.rows, 2000);
        });
    });
}

criterion_group!(benches, bench_sweep);
criterion_main!(benches);
