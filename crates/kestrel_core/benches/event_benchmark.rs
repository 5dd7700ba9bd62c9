//! # Event Bus Benchmark
//!
//! Dispatch cost by subscriber count, and nested sends.
//!
//! Run with: `cargo bench --package kestrel_core --bench event_benchmark`

#![allow(missing_docs)]

use std::cell::Cell;
use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kestrel_core::World;

struct PointerMoved {
    x: f32,
}

struct Hovered;

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    for subscribers in [1, 8, 64] {
        let mut world = World::new();
        let total = Rc::new(Cell::new(0.0_f32));
        for _ in 0..subscribers {
            let total = Rc::clone(&total);
            world.subscribe(move |_: &mut World, event: &PointerMoved| total.set(total.get() + event.x));
        }

        group.bench_with_input(BenchmarkId::from_parameter(subscribers), &subscribers, |b, _| {
            b.iter(|| world.send(black_box(PointerMoved { x: 1.0 })));
        });
    }

    group.finish();
}

fn bench_nested_dispatch(c: &mut Criterion) {
    let mut world = World::new();
    let hovers = Rc::new(Cell::new(0_u64));

    world.subscribe(|world: &mut World, _: &PointerMoved| world.send(Hovered));
    let counter = Rc::clone(&hovers);
    world.subscribe(move |_: &mut World, _: &Hovered| counter.set(counter.get() + 1));

    c.bench_function("nested_dispatch", |b| {
        b.iter(|| world.send(PointerMoved { x: 0.0 }));
    });
    black_box(hovers.get());
}

fn bench_no_subscribers(c: &mut Criterion) {
    let mut world = World::new();
    c.bench_function("dispatch_no_subscribers", |b| {
        b.iter(|| world.send(black_box(Hovered)));
    });
}

criterion_group!(benches, bench_dispatch, bench_nested_dispatch, bench_no_subscribers);
criterion_main!(benches);
