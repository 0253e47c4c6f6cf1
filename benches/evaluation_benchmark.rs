// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::hint::black_box;

use fieldrules::{Engine, Expr, Registry, Value};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

const IDENTITY: &str = r#"{
    "name": "identity",
    "fields": [
        {"field": "full_name", "transform": {"JOIN_PARTS": [
            {"CAPITALIZE": [{"SUBSTR": [0, 10, {"JSONPATH": ["$.first_name"]}]}]},
            " ",
            {"CAPITALIZE": [{"SUBSTR": [0, 7, {"JSONPATH": ["$.surname"]}]}]}
        ]}},
        {"field": "gst_details", "transform": {"GST_DETAILS_ALL": []}}
    ]
}"#;

fn applicant(records: usize) -> Value {
    let gst_records: Vec<_> = (0..records)
        .map(|i| json!({"gst_number": format!("29ABCDE{:04}F1Z5", i % 10000)}))
        .collect();
    json!({
        "first_name": "PAULSTALIN JOONIS EVANS",
        "surname": "GODFREY PREM KIRUBA SEKAR",
        "gst_records": gst_records,
    })
    .into()
}

fn path_resolution(c: &mut Criterion) {
    let doc = applicant(100);
    c.bench_function("resolve single member", |b| {
        let expr = Expr::path("$.first_name").unwrap();
        b.iter(|| fieldrules::evaluate(black_box(&expr), black_box(&doc)).unwrap())
    });

    c.bench_function("resolve deep descent", |b| {
        let expr = Expr::path("$..gst_number").unwrap();
        b.iter(|| fieldrules::evaluate(black_box(&expr), black_box(&doc)).unwrap())
    });
}

fn chained_stages(c: &mut Criterion) {
    let registry = Registry::builtin();
    let doc = applicant(1);
    let chain = fieldrules::pipe([
        Expr::path("$.first_name").unwrap(),
        registry
            .stage("SUBSTR", vec![Expr::literal(0i64), Expr::literal(10i64)])
            .unwrap(),
        registry.stage("CAPITALIZE", vec![]).unwrap(),
        registry.stage("TRIM", vec![]).unwrap(),
    ])
    .unwrap();

    c.bench_function("three stage chain", |b| {
        b.iter(|| fieldrules::evaluate(black_box(&chain), black_box(&doc)).unwrap())
    });
}

fn model_transform(c: &mut Criterion) {
    let mut engine = Engine::new();
    engine.add_model_from_json_str(IDENTITY).unwrap();

    let mut group = c.benchmark_group("identity model");
    for records in [1, 10, 100, 1000] {
        let doc = applicant(records);
        group.bench_with_input(BenchmarkId::from_parameter(records), &doc, |b, doc| {
            b.iter(|| engine.transform("identity", black_box(doc)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, path_resolution, chained_stages, model_transform);
criterion_main!(benches);
