use codspeed_criterion_compat::{Criterion, black_box, criterion_group, criterion_main};
use conscell::printer::{display, repr};
use conscell::{NIL, Value, cons, keyword, list, pair, setcdr, symbol};
use std::time::Duration;

// ============================================================================
// Interning Benchmarks
// ============================================================================

fn bench_intern_hit(c: &mut Criterion) {
    // keep the atom alive so every lookup hits the table
    let _held = symbol("bench-hit");
    c.bench_function("intern existing symbol", |b| {
        b.iter(|| black_box(symbol(black_box("bench-hit"))))
    });
}

fn bench_intern_miss(c: &mut Criterion) {
    // nothing holds the atom, so each call creates and evicts it
    c.bench_function("intern and release symbol", |b| {
        b.iter(|| black_box(symbol(black_box("bench-miss"))))
    });
}

fn bench_keyword_normalize(c: &mut Criterion) {
    let _held = keyword("bench-kw");
    c.bench_function("intern keyword with colons", |b| {
        b.iter(|| black_box(keyword(black_box(":bench-kw:"))))
    });
}

fn bench_split(c: &mut Criterion) {
    let atom = symbol("pkg.module.submodule.name");
    c.bench_function("split symbol on dots", |b| {
        b.iter(|| black_box(atom.split(Some("."), None).unwrap()))
    });
}

// ============================================================================
// Pair Benchmarks
// ============================================================================

fn bench_pair_new(c: &mut Criterion) {
    c.bench_function("make pair", |b| {
        b.iter(|| black_box(pair(Value::Int(1), NIL)))
    });
}

fn bench_list_build(c: &mut Criterion) {
    c.bench_function("build list (1000 elements)", |b| {
        b.iter(|| black_box(list((0..1000).map(Value::Int).collect::<Vec<_>>())))
    });
}

fn bench_cons_recursive(c: &mut Criterion) {
    c.bench_function("build and unlink ring (100 elements)", |b| {
        b.iter(|| {
            let ring = cons((0..100).map(Value::Int).collect::<Vec<_>>(), true);
            setcdr(&ring, NIL).unwrap();
            black_box(ring)
        })
    });
}

fn bench_car_cdr_walk(c: &mut Criterion) {
    let l = list((0..1000).map(Value::Int).collect::<Vec<_>>());
    c.bench_function("walk list (1000 elements)", |b| {
        b.iter(|| {
            let mut sum = 0;
            let mut current = l.clone();
            while let Value::Pair(p) = current {
                if let Value::Int(n) = p.head() {
                    sum += n;
                }
                current = p.tail();
            }
            black_box(sum)
        })
    });
}

// ============================================================================
// Printer Benchmarks
// ============================================================================

fn bench_display_long_list(c: &mut Criterion) {
    let l = list((0..1000).map(Value::Int).collect::<Vec<_>>());
    c.bench_function("display list (1000 elements)", |b| {
        b.iter(|| black_box(display(&l)))
    });
}

fn bench_repr_long_list(c: &mut Criterion) {
    let l = list((0..1000).map(Value::Int).collect::<Vec<_>>());
    c.bench_function("repr list (1000 elements)", |b| {
        b.iter(|| black_box(repr(&l)))
    });
}

fn bench_repr_ring(c: &mut Criterion) {
    let ring = cons((0..1000).map(Value::Int).collect::<Vec<_>>(), true);
    c.bench_function("repr ring (1000 elements)", |b| {
        b.iter(|| black_box(repr(&ring)))
    });
    setcdr(&ring, NIL).unwrap();
}

fn bench_display_nested(c: &mut Criterion) {
    let mut nested = NIL;
    for i in 0..100 {
        nested = list(vec![Value::Int(i), nested]);
    }
    c.bench_function("display nested lists (100 levels)", |b| {
        b.iter(|| black_box(display(&nested)))
    });
}

criterion_group!(
    interning_benches,
    bench_intern_hit,
    bench_intern_miss,
    bench_keyword_normalize,
    bench_split
);

criterion_group!(
    pair_benches,
    bench_pair_new,
    bench_list_build,
    bench_cons_recursive,
    bench_car_cdr_walk
);

criterion_group! {
    name = printer_benches;
    config = Criterion::default()
        .sample_size(100)
        .measurement_time(Duration::from_secs(5));
    targets =
        bench_display_long_list,
        bench_repr_long_list,
        bench_repr_ring,
        bench_display_nested
}

criterion_main!(interning_benches, pair_benches, printer_benches);
