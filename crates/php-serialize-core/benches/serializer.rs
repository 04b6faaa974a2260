//! Benchmarks for the PHP serialize writer.

use std::borrow::Cow;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use php_serialize_core::{to_bytes, ArrayKey, PhpValue};

fn user(id: i64, name: &str) -> PhpValue<'_> {
    PhpValue::Object {
        class_name: Cow::Borrowed("User"),
        properties: vec![
            (ArrayKey::from("id"), PhpValue::Int(id)),
            (ArrayKey::from("name"), PhpValue::from(name)),
            (ArrayKey::from("score"), PhpValue::Float(id as f64 * 1.5)),
        ],
    }
}

fn scalars(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_scalars");

    let int = PhpValue::Int(1_234_567_890);
    group.bench_function("int", |b| b.iter(|| to_bytes(black_box(&int))));

    let float = PhpValue::Float(3.141_592_653_589_793);
    group.bench_function("float", |b| b.iter(|| to_bytes(black_box(&float))));

    let text = "café한글".repeat(1_000);
    let string = PhpValue::from(text.as_str());
    group.bench_function("multibyte_string_10kb", |b| b.iter(|| to_bytes(black_box(&string))));

    group.finish();
}

fn composites(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_composites");

    let list = PhpValue::List((0..1000).map(PhpValue::Int).collect());
    group.bench_function("list_1000", |b| b.iter(|| to_bytes(black_box(&list))));

    let names: Vec<String> = (0..100).map(|i| format!("user_{}", i)).collect();
    let users = PhpValue::List(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| user(i as i64, name))
            .collect(),
    );
    group.bench_function("objects_100", |b| b.iter(|| to_bytes(black_box(&users))));

    // Every element after the first points back at it.
    let mut shared = vec![user(0, "shared")];
    shared.extend((0..100).map(|_| PhpValue::Reference(2)));
    let shared = PhpValue::List(shared);
    group.bench_function("references_100", |b| b.iter(|| to_bytes(black_box(&shared))));

    group.finish();
}

criterion_group!(benches, scalars, composites);
criterion_main!(benches);
