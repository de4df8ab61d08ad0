use dashboard_data_engine::processing::{
    DataTransformation, DatePart, SortDirection, StepStatus, StringOperation, TransformParameters,
    TransformationKind, apply_step, apply_transformations,
};
use dashboard_data_engine::types::{Column, DataSet, DataType, Schema, Value};

fn orders() -> DataSet {
    let schema = Schema::new(vec![
        Column::new("region", DataType::Utf8),
        Column::new("product", DataType::Utf8),
        Column::new("order_date", DataType::Utf8),
        Column::nullable("price", DataType::Float64),
        Column::new("qty", DataType::Int64),
    ]);
    DataSet::new(
        schema,
        vec![
            vec![Value::from("East"), Value::from("widget"), Value::from("2024-01-15"), Value::Float64(2.5), Value::Int64(4)],
            vec![Value::from("West"), Value::from("gadget"), Value::from("2024-05-02"), Value::Float64(10.0), Value::Int64(0)],
            vec![Value::from("East"), Value::from("gadget"), Value::from("not a date"), Value::Null, Value::Int64(3)],
            vec![Value::from("North"), Value::from("widget"), Value::from("2024-11-30"), Value::Float64(4.0), Value::Int64(1)],
        ],
    )
    .with_id("orders")
}

fn step(id: &str, kind: TransformationKind, source: &str) -> DataTransformation {
    DataTransformation::new(id, kind, source)
}

fn params() -> TransformParameters {
    TransformParameters::default()
}

fn column(ds: &DataSet, name: &str) -> Vec<Value> {
    let idx = ds.schema.index_of(name).unwrap();
    ds.rows.iter().map(|r| r[idx].clone()).collect()
}

#[test]
fn grouped_sum_matches_worked_example() {
    let schema = Schema::new(vec![
        Column::new("g", DataType::Utf8),
        Column::new("v", DataType::Int64),
    ]);
    let ds = DataSet::new(
        schema,
        vec![
            vec![Value::from("a"), Value::Int64(1)],
            vec![Value::from("a"), Value::Int64(2)],
            vec![Value::from("b"), Value::Int64(5)],
        ],
    );
    let sum = step("s", TransformationKind::AggregateSum, "v").with_parameters(TransformParameters {
        group_by: Some("g".to_string()),
        ..params()
    });

    let out = apply_transformations(&ds, &[sum]).unwrap();
    assert_eq!(out.schema.field_names().collect::<Vec<_>>(), vec!["g", "v_sum"]);
    assert_eq!(
        out.rows,
        vec![
            vec![Value::from("a"), Value::Float64(3.0)],
            vec![Value::from("b"), Value::Float64(5.0)],
        ]
    );
}

#[test]
fn aggregates_without_grouping_produce_one_row() {
    let ds = orders();
    let expect = [
        (TransformationKind::AggregateAvg, "price_avg", Value::Float64(16.5 / 4.0)),
        (TransformationKind::AggregateMin, "price_min", Value::Float64(0.0)),
        (TransformationKind::AggregateMax, "price_max", Value::Float64(10.0)),
        (TransformationKind::AggregateCount, "count", Value::Int64(4)),
    ];
    for (kind, name, value) in expect {
        let out = apply_transformations(&ds, &[step("a", kind, "price")]).unwrap();
        assert_eq!(out.schema.field_names().collect::<Vec<_>>(), vec![name]);
        assert_eq!(out.rows, vec![vec![value]]);
    }
}

#[test]
fn sort_descending_is_stable() {
    let sort = step("s", TransformationKind::Sort, "region").with_parameters(TransformParameters {
        direction: Some(SortDirection::Desc),
        ..params()
    });
    let out = apply_transformations(&orders(), &[sort]).unwrap();
    assert_eq!(
        column(&out, "product"),
        vec![Value::from("gadget"), Value::from("widget"), Value::from("widget"), Value::from("gadget")]
    );
    assert_eq!(
        column(&out, "region"),
        vec![Value::from("West"), Value::from("North"), Value::from("East"), Value::from("East")]
    );
}

#[test]
fn partial_failures_stay_local_to_their_rows() {
    let steps = vec![
        step("rev", TransformationKind::CalculateField, "")
            .with_target("revenue")
            .with_parameters(TransformParameters {
                formula: Some("price * qty".to_string()),
                ..params()
            }),
        step("unit", TransformationKind::CalculateField, "")
            .with_target("per_unit")
            .with_parameters(TransformParameters {
                formula: Some("price / qty".to_string()),
                ..params()
            }),
        step("month", TransformationKind::DateExtract, "order_date").with_parameters(TransformParameters {
            part: Some(DatePart::Month),
            ..params()
        }),
    ];
    let out = apply_transformations(&orders(), &steps).unwrap();

    assert_eq!(
        column(&out, "revenue"),
        vec![Value::Float64(10.0), Value::Float64(0.0), Value::Float64(0.0), Value::Float64(4.0)]
    );
    assert_eq!(
        column(&out, "per_unit"),
        vec![Value::Float64(0.625), Value::Null, Value::Float64(0.0), Value::Float64(4.0)]
    );
    assert_eq!(
        column(&out, "order_date_month"),
        vec![Value::Int64(1), Value::Int64(5), Value::Null, Value::Int64(11)]
    );
    assert_eq!(out.row_count(), 4);
}

#[test]
fn currency_convert_leaves_source_unchanged() {
    let convert = step("fx", TransformationKind::CurrencyConvert, "price").with_parameters(TransformParameters {
        rate: Some(0.9),
        from_currency: Some("USD".to_string()),
        to_currency: Some("EUR".to_string()),
        ..params()
    });
    let ds = orders();
    let out = apply_transformations(&ds, &[convert]).unwrap();

    assert_eq!(column(&out, "price"), column(&ds, "price"));
    assert_eq!(
        column(&out, "price_EUR"),
        vec![Value::Float64(2.25), Value::Float64(9.0), Value::Null, Value::Float64(3.6)]
    );
}

#[test]
fn pivot_then_unpivot() {
    let pivot = step("p", TransformationKind::Pivot, "").with_parameters(TransformParameters {
        rows: vec!["region".to_string()],
        columns: vec!["product".to_string()],
        values: vec!["qty".to_string()],
        ..params()
    });
    let pivoted = apply_transformations(&orders(), &[pivot.clone()]).unwrap();
    assert_eq!(
        pivoted.schema.field_names().collect::<Vec<_>>(),
        vec!["region", "widget_qty", "gadget_qty"]
    );
    assert_eq!(
        pivoted.rows,
        vec![
            vec![Value::from("East"), Value::Float64(4.0), Value::Float64(3.0)],
            vec![Value::from("West"), Value::Null, Value::Float64(0.0)],
            vec![Value::from("North"), Value::Float64(1.0), Value::Null],
        ]
    );

    let unpivot = step("u", TransformationKind::Unpivot, "").with_parameters(TransformParameters {
        columns: vec!["widget_qty".to_string(), "gadget_qty".to_string()],
        variable_column: Some("product".to_string()),
        ..params()
    });
    let long = apply_transformations(&orders(), &[pivot, unpivot]).unwrap();
    assert_eq!(long.schema.field_names().collect::<Vec<_>>(), vec!["region", "product", "value"]);
    assert_eq!(long.row_count(), 6);
    assert_eq!(long.rows[1], vec![Value::from("East"), Value::from("gadget_qty"), Value::Float64(3.0)]);
}

#[test]
fn group_by_then_string_and_number_steps() {
    let steps = vec![
        step("g", TransformationKind::GroupBy, "").with_parameters(TransformParameters {
            columns: vec!["product".to_string()],
            ..params()
        }),
        step("upper", TransformationKind::StringManipulation, "product")
            .with_target("label")
            .with_parameters(TransformParameters {
                operation: Some(StringOperation::Substring),
                start: Some(0),
                end: Some(3),
                ..params()
            }),
        step("share", TransformationKind::CalculateField, "")
            .with_target("share")
            .with_parameters(TransformParameters {
                formula: Some("count / 3".to_string()),
                ..params()
            }),
        step("round", TransformationKind::NumberFormat, "share").with_parameters(TransformParameters {
            decimals: Some(1),
            ..params()
        }),
    ];
    let out = apply_transformations(&orders(), &steps).unwrap();
    assert_eq!(
        out.schema.field_names().collect::<Vec<_>>(),
        vec!["product", "count", "label", "share"]
    );
    assert_eq!(
        out.rows,
        vec![
            vec![Value::from("widget"), Value::Int64(2), Value::from("wid"), Value::Float64(0.7)],
            vec![Value::from("gadget"), Value::Int64(2), Value::from("gad"), Value::Float64(0.7)],
        ]
    );
}

#[test]
fn steps_are_applied_in_order() {
    let count = step("c", TransformationKind::AggregateCount, "qty").with_parameters(TransformParameters {
        group_by: Some("region".to_string()),
        ..params()
    });
    let sort = step("s", TransformationKind::Sort, "count").with_parameters(TransformParameters {
        direction: Some(SortDirection::Desc),
        ..params()
    });

    let count_then_sort = apply_transformations(&orders(), &[count.clone(), sort.clone()]).unwrap();
    assert_eq!(column(&count_then_sort, "count")[0], Value::Int64(2));

    // Sorting by a column that does not exist yet keeps the order; counting afterwards sees
    // regions in their original first-seen order.
    let sort_then_count = apply_transformations(&orders(), &[sort, count]).unwrap();
    assert_eq!(column(&sort_then_count, "region")[0], Value::from("East"));
    assert_eq!(sort_then_count.rows.len(), 3);
}

#[test]
fn unknown_and_incomplete_steps_pass_through() {
    let ds = orders();
    let unknown: DataTransformation =
        serde_json::from_str(r#"{"id": "x", "type": "rank_dense", "sourceColumn": "price"}"#).unwrap();
    let no_formula = step("f", TransformationKind::CalculateField, "").with_target("x");

    let out = apply_transformations(&ds, &[unknown.clone(), no_formula]).unwrap();
    assert_eq!(out.rows, ds.rows);
    assert_eq!(out.schema, ds.schema);
    assert!(matches!(apply_step(&ds, &unknown).status, StepStatus::Skipped { .. }));
}

#[test]
fn pipeline_is_deterministic_and_pure() {
    let ds = orders();
    let before = ds.clone();
    let steps = vec![
        step("m", TransformationKind::DateExtract, "order_date")
            .with_target("q")
            .with_parameters(TransformParameters {
                part: Some(DatePart::Quarter),
                ..params()
            }),
        step("s", TransformationKind::Sort, "q"),
    ];
    let a = apply_transformations(&ds, &steps).unwrap();
    let b = apply_transformations(&ds, &steps).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.id, "orders_transformed");
    assert_eq!(ds, before);
    assert_eq!(column(&a, "q"), vec![Value::Int64(1), Value::Int64(2), Value::Int64(4), Value::Null]);
}
