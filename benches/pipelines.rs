use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use dashboard_data_engine::execution::{ExecutionEngine, ExecutionOptions};
use dashboard_data_engine::filter::{AdvancedFilter, FilterCondition, FilterLogic, FilterOperator, apply_filters};
use dashboard_data_engine::processing::{
    DataTransformation, DatePart, TransformParameters, TransformationKind, apply_transformations,
};
use dashboard_data_engine::types::{Column, DataSet, DataType, Schema, Value};

const ROWS: usize = 50_000;

fn sales(n: usize) -> DataSet {
    let schema = Schema::new(vec![
        Column::new("id", DataType::Int64),
        Column::new("region", DataType::Utf8),
        Column::new("order_date", DataType::Utf8),
        Column::new("revenue", DataType::Float64),
        Column::new("cost", DataType::Float64),
    ]);
    let rows = (0..n)
        .map(|i| {
            vec![
                Value::Int64(i as i64),
                Value::from(format!("Region{}", i % 12)),
                Value::from(format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1)),
                Value::Float64(i as f64 * 1.5),
                Value::Float64(i as f64 * 0.75),
            ]
        })
        .collect();
    DataSet::new(schema, rows).with_id("bench")
}

fn filters() -> Vec<AdvancedFilter> {
    vec![
        AdvancedFilter::new(
            "f1",
            "regions",
            FilterLogic::Or,
            vec![
                FilterCondition::new("region", FilterOperator::StartsWith, "region1"),
                FilterCondition::new("region", FilterOperator::Regex, r"Region[2-4]$"),
            ],
        ),
        AdvancedFilter::new(
            "f2",
            "mid revenue",
            FilterLogic::And,
            vec![FilterCondition::between("revenue", 1_000.0, 60_000.0)],
        ),
    ]
}

fn steps() -> Vec<DataTransformation> {
    vec![
        DataTransformation::new("margin", TransformationKind::CalculateField, "")
            .with_target("margin")
            .with_parameters(TransformParameters {
                formula: Some("(revenue - cost) / revenue * 100".to_string()),
                ..Default::default()
            }),
        DataTransformation::new("month", TransformationKind::DateExtract, "order_date").with_parameters(
            TransformParameters {
                part: Some(DatePart::Month),
                ..Default::default()
            },
        ),
        DataTransformation::new("pivot", TransformationKind::Pivot, "").with_parameters(TransformParameters {
            rows: vec!["region".to_string()],
            columns: vec!["order_date_month".to_string()],
            values: vec!["revenue".to_string()],
            ..Default::default()
        }),
    ]
}

fn benchmark_filters(c: &mut Criterion) {
    let ds = sales(ROWS);
    let filters = filters();
    let engine = ExecutionEngine::new(ExecutionOptions::default()).unwrap();

    let mut group = c.benchmark_group("filters");
    group.throughput(Throughput::Elements(ROWS as u64));
    group.bench_function("apply_filters", |b| {
        b.iter(|| std::hint::black_box(apply_filters(&ds, &filters).unwrap()))
    });
    group.bench_function("filter_parallel", |b| {
        b.iter(|| std::hint::black_box(engine.filter_parallel(&ds, &filters).unwrap()))
    });
    group.finish();
}

fn benchmark_pipeline(c: &mut Criterion) {
    let ds = sales(ROWS);
    let steps = steps();

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(ROWS as u64));
    group.bench_function("calculate_extract_pivot", |b| {
        b.iter(|| std::hint::black_box(apply_transformations(&ds, &steps).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, benchmark_filters, benchmark_pipeline);
criterion_main!(benches);
