use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ldfa_core::ldfa::constructors;
use ldfa_core::shape::{PositionString, Shape};

fn counting_shape() -> Shape {
    Shape::new(vec![3; 20])
}

fn sample_strings(shape: &Shape, count: usize) -> Vec<PositionString> {
    (0..count)
        .map(|i| {
            let chars: Vec<u32> = (0..shape.dimension())
                .map(|k| ((i + k) % shape.layer_width(k) as usize) as u32)
                .collect();
            PositionString::from(chars)
        })
        .collect()
}

pub fn boolean_algebra(c: &mut Criterion) {
    let shape = counting_shape();
    let a = constructors::from_strings(&shape, &sample_strings(&shape, 200)).unwrap();
    let b = constructors::from_strings(&shape, &sample_strings(&shape, 200)).unwrap();

    c.bench_function("union", |b_| b_.iter(|| a.union(black_box(&b))));
    c.bench_function("intersection", |b_| b_.iter(|| a.intersection(black_box(&b))));
    c.bench_function("difference", |b_| b_.iter(|| a.difference(black_box(&b))));
    c.bench_function("complement", |b_| b_.iter(|| black_box(&a).complement()));
}

pub fn minimization(c: &mut Criterion) {
    let shape = counting_shape();
    let ldfa = constructors::from_strings(&shape, &sample_strings(&shape, 500)).unwrap();
    c.bench_function("minimize", |b| b.iter(|| black_box(&ldfa).minimize()));
}

pub fn counting_constructor(c: &mut Criterion) {
    let shape = Shape::new(vec![3; 64]);
    c.bench_function("count shape [3]^64", |b| {
        b.iter(|| constructors::count(black_box(shape.clone()), 0, 20))
    });
}

pub fn string_iteration(c: &mut Criterion) {
    let shape = Shape::new(vec![3; 12]);
    let ldfa = constructors::count(shape, 0, 4).unwrap();
    c.bench_function("iterate accepted strings", |b| {
        b.iter(|| black_box(&ldfa).iter().count())
    });
}

criterion_group!(
    benches,
    boolean_algebra,
    minimization,
    counting_constructor,
    string_iteration
);
criterion_main!(benches);
