//! Benchmarks for freezing, construction and member dispatch.
//!
//! ```bash
//! cargo bench --bench dispatch_benchmarks
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use objmodel::freeze_table;
use objmodel::prelude::*;
use std::hint::black_box;
use std::sync::Arc;

fn unit() -> Body {
    Body::new(|_| Ok(Value::Unit))
}

/// A linear chain `Level0 <- Level1 <- ... <- Level{depth-1}`, each level
/// overriding `work` and adding one initialized property.
fn chain(depth: usize) -> Vec<DeclEntry> {
    (0..depth)
        .map(|level| {
            let mut class = ClassDecl::new(format!("Level{level}"))
                .with_property(
                    MemberSlot::val(format!("p{level}"), TypeRef::Int),
                    Body::new(move |_| Ok(Value::from(level as i64))),
                );
            class = if level == 0 {
                class.with_member(MemberSlot::function("work", vec![], unit()).open())
            } else {
                class
                    .with_superclass(format!("Level{}", level - 1))
                    .with_member(MemberSlot::function("work", vec![], unit()).overriding())
            };
            if level + 1 < depth {
                class = class.open();
            }
            class.into()
        })
        .collect()
}

fn overloaded() -> Vec<DeclEntry> {
    let mut class = ClassDecl::new("Overloads");
    for ty in [TypeRef::Int, TypeRef::String, TypeRef::Float, TypeRef::Any] {
        class = class.with_member(MemberSlot::function(
            "take",
            vec![
                ParamDecl::new("value", ty),
                ParamDecl::new("extra", TypeRef::Int).with_default_value(0),
            ],
            unit(),
        ));
    }
    vec![class.into()]
}

fn bench_freeze(c: &mut Criterion) {
    let mut group = c.benchmark_group("table/freeze");
    for depth in [4, 16, 64] {
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(BenchmarkId::new("chain", depth), &depth, |b, &depth| {
            b.iter(|| black_box(freeze_table(chain(depth)).unwrap()));
        });
    }
    group.finish();
}

fn bench_construct(c: &mut Criterion) {
    let mut group = c.benchmark_group("runtime/construct");
    for depth in [4, 16, 64] {
        let table = freeze_table(chain(depth)).unwrap();
        let leaf = format!("Level{}", depth - 1);
        group.bench_with_input(BenchmarkId::new("chain", depth), &depth, |b, _| {
            let mut runtime = Runtime::new(
                Arc::clone(&table),
                RuntimeConfig::new().with_journal(false),
            )
            .unwrap();
            b.iter(|| {
                let handle = runtime.construct(&leaf, CallArgs::new()).unwrap();
                runtime.free(handle.as_object().unwrap());
            });
        });
    }
    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("runtime/dispatch");

    let mut runtime = Runtime::with_table(freeze_table(chain(16)).unwrap()).unwrap();
    let leaf = runtime
        .construct("Level15", CallArgs::new())
        .unwrap()
        .as_object()
        .unwrap();
    group.bench_function("virtual_depth_16", |b| {
        b.iter(|| black_box(runtime.invoke(leaf, "work", CallArgs::new()).unwrap()));
    });
    group.bench_function("static_depth_16", |b| {
        b.iter(|| {
            black_box(
                runtime
                    .invoke_as(leaf, "Level0", "work", CallArgs::new())
                    .unwrap(),
            )
        });
    });

    let mut runtime = Runtime::with_table(freeze_table(overloaded()).unwrap()).unwrap();
    let target = runtime
        .construct("Overloads", CallArgs::new())
        .unwrap()
        .as_object()
        .unwrap();
    group.bench_function("overload_4_candidates", |b| {
        b.iter(|| {
            black_box(
                runtime
                    .invoke(target, "take", CallArgs::new().positional("x"))
                    .unwrap(),
            )
        });
    });
    group.finish();
}

criterion_group!(benches, bench_freeze, bench_construct, bench_dispatch);
criterion_main!(benches);
