//! `pivot` (long to wide, summing) and `unpivot` (wide to long).

use std::collections::HashMap;

use indexmap::IndexSet;

use crate::types::{Column, DataSet, DataType, Schema, Value, cell};

use super::group::{Groups, distinct, group_key, key_value, push_unique};

/// Pivots `values` by the distinct combinations of `columns`, one output row per distinct
/// combination of `rows`.
///
/// Output fields are the `rows` columns (Utf8) followed by `{columnKey}_{value}` for every
/// column key in first-seen order and every value column. Cells are sums (non-numeric counts as
/// `0`); a row/column combination that never occurs is `Null`. Multi-column keys are joined with
/// `_`. Repeated `rows` entries count once, and a generated name that is already taken gets a
/// numeric suffix (`east_amount_2`).
pub fn pivot(dataset: &DataSet, rows: &[String], columns: &[String], values: &[String]) -> DataSet {
    let rows = distinct(rows);
    let schema = &dataset.schema;
    let row_idxs: Vec<Option<usize>> = rows.iter().map(|c| schema.index_of(c)).collect();
    let col_idxs: Vec<Option<usize>> = columns.iter().map(|c| schema.index_of(c)).collect();
    let val_idxs: Vec<Option<usize>> = values.iter().map(|c| schema.index_of(c)).collect();

    let mut column_keys: IndexSet<String> = IndexSet::new();
    let mut groups: Groups<(Vec<Value>, HashMap<usize, Vec<f64>>)> = Groups::default();

    for row in &dataset.rows {
        let label = col_idxs
            .iter()
            .map(|idx| cell(row, *idx).to_string())
            .collect::<Vec<_>>()
            .join("_");
        let (col_pos, _) = column_keys.insert_full(label);

        let (_, sums) = groups.entry(group_key(row, &row_idxs), || {
            (row_idxs.iter().map(|idx| key_value(cell(row, *idx))).collect(), HashMap::new())
        });
        let slot = sums.entry(col_pos).or_insert_with(|| vec![0.0; val_idxs.len()]);
        for (acc, idx) in slot.iter_mut().zip(&val_idxs) {
            *acc += cell(row, *idx).to_number_or_zero();
        }
    }

    let mut fields: Vec<Column> = rows
        .iter()
        .map(|c| Column::nullable(c.as_str(), DataType::Utf8))
        .collect();
    for key in &column_keys {
        for value in values {
            push_unique(&mut fields, Column::nullable(format!("{key}_{value}"), DataType::Float64));
        }
    }

    let out_rows = groups
        .into_values()
        .map(|(mut out, sums)| {
            for col_pos in 0..column_keys.len() {
                match sums.get(&col_pos) {
                    Some(slot) => out.extend(slot.iter().map(|v| Value::Float64(*v))),
                    None => out.extend(std::iter::repeat_n(Value::Null, values.len())),
                }
            }
            out
        })
        .collect();

    dataset.derive(Schema::new(fields), out_rows)
}

/// Melts `columns` into `variable_column` / `value_column` pairs.
///
/// Every other column is an identifier and is repeated on each output row. Each input row
/// produces one output row per melted column, in the order `columns` lists them; melted columns
/// that do not exist are skipped. The value column is Utf8 unless every melted column shares a
/// type. A variable or value column name that clashes with a kept column gets a numeric suffix.
pub fn unpivot(dataset: &DataSet, columns: &[String], variable_column: &str, value_column: &str) -> DataSet {
    let schema = &dataset.schema;
    let columns = distinct(columns);
    let melted: Vec<(usize, &str)> = columns
        .iter()
        .filter_map(|c| schema.index_of(c).map(|i| (i, c.as_str())))
        .collect();
    let id_idxs: Vec<usize> = (0..schema.fields.len())
        .filter(|i| !melted.iter().any(|(m, _)| m == i))
        .collect();

    let value_type = melted
        .iter()
        .map(|(i, _)| schema.fields[*i].data_type)
        .reduce(|a, b| if a == b { a } else { DataType::Utf8 })
        .unwrap_or(DataType::Utf8);

    let mut fields: Vec<Column> = id_idxs.iter().map(|i| schema.fields[*i].clone()).collect();
    push_unique(&mut fields, Column::new(variable_column, DataType::Utf8));
    push_unique(&mut fields, Column::nullable(value_column, value_type));

    let mut out_rows = Vec::with_capacity(dataset.rows.len() * melted.len());
    for row in &dataset.rows {
        for (idx, name) in &melted {
            let mut out: Vec<Value> = id_idxs.iter().map(|i| cell(row, Some(*i)).clone()).collect();
            out.push(Value::from(*name));
            out.push(cell(row, Some(*idx)).clone());
            out_rows.push(out);
        }
    }

    dataset.derive(Schema::new(fields), out_rows)
}

#[cfg(test)]
mod tests {
    use super::{pivot, unpivot};
    use crate::types::{Column, DataSet, DataType, Schema, Value};

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    fn sales() -> DataSet {
        let schema = Schema::new(vec![
            Column::new("region", DataType::Utf8),
            Column::new("quarter", DataType::Utf8),
            Column::new("amount", DataType::Float64),
        ]);
        DataSet::new(
            schema,
            vec![
                vec![Value::from("east"), Value::from("Q1"), Value::Float64(10.0)],
                vec![Value::from("east"), Value::from("Q2"), Value::Float64(5.0)],
                vec![Value::from("west"), Value::from("Q1"), Value::Float64(7.0)],
                vec![Value::from("east"), Value::from("Q1"), Value::Float64(1.0)],
            ],
        )
    }

    #[test]
    fn pivot_sums_and_nulls_missing_cells() {
        let out = pivot(&sales(), &s(&["region"]), &s(&["quarter"]), &s(&["amount"]));
        assert_eq!(
            out.schema.field_names().collect::<Vec<_>>(),
            vec!["region", "Q1_amount", "Q2_amount"]
        );
        assert_eq!(
            out.rows,
            vec![
                vec![Value::from("east"), Value::Float64(11.0), Value::Float64(5.0)],
                vec![Value::from("west"), Value::Float64(7.0), Value::Null],
            ]
        );
    }

    #[test]
    fn pivot_joins_multi_column_keys() {
        let out = pivot(&sales(), &s(&["quarter"]), &s(&["region", "quarter"]), &s(&["amount"]));
        assert_eq!(
            out.schema.field_names().collect::<Vec<_>>(),
            vec!["quarter", "east_Q1_amount", "east_Q2_amount", "west_Q1_amount"]
        );
        assert_eq!(
            out.rows[0],
            vec![Value::from("Q1"), Value::Float64(11.0), Value::Null, Value::Float64(7.0)]
        );
    }

    #[test]
    fn pivot_renames_generated_columns_that_clash() {
        let schema = Schema::new(vec![
            Column::new("Q1_amount", DataType::Utf8),
            Column::new("quarter", DataType::Utf8),
            Column::new("amount", DataType::Float64),
        ]);
        let ds = DataSet::new(
            schema,
            vec![vec![Value::from("east"), Value::from("Q1"), Value::Float64(3.0)]],
        );
        let out = pivot(&ds, &s(&["Q1_amount", "Q1_amount"]), &s(&["quarter"]), &s(&["amount"]));
        assert_eq!(
            out.schema.field_names().collect::<Vec<_>>(),
            vec!["Q1_amount", "Q1_amount_2"]
        );
        assert_eq!(out.rows, vec![vec![Value::from("east"), Value::Float64(3.0)]]);
        assert!(out.validate().is_ok());
    }

    #[test]
    fn unpivot_renames_clashing_output_columns() {
        let schema = Schema::new(vec![
            Column::new("value", DataType::Int64),
            Column::new("jan", DataType::Float64),
        ]);
        let ds = DataSet::new(schema, vec![vec![Value::Int64(7), Value::Float64(3.0)]]);
        let out = unpivot(&ds, &s(&["jan"]), "value", "value");
        assert_eq!(
            out.schema.field_names().collect::<Vec<_>>(),
            vec!["value", "value_2", "value_3"]
        );
        assert_eq!(
            out.rows,
            vec![vec![Value::Int64(7), Value::from("jan"), Value::Float64(3.0)]]
        );
        assert!(out.validate().is_ok());
    }

    #[test]
    fn unpivot_melts_listed_columns() {
        let schema = Schema::new(vec![
            Column::new("id", DataType::Int64),
            Column::new("jan", DataType::Float64),
            Column::new("feb", DataType::Float64),
        ]);
        let ds = DataSet::new(
            schema,
            vec![vec![Value::Int64(1), Value::Float64(3.0), Value::Float64(4.0)]],
        );
        let out = unpivot(&ds, &s(&["jan", "feb", "mar"]), "month", "sales");
        assert_eq!(out.schema.field_names().collect::<Vec<_>>(), vec!["id", "month", "sales"]);
        assert_eq!(out.schema.fields[2].data_type, DataType::Float64);
        assert_eq!(
            out.rows,
            vec![
                vec![Value::Int64(1), Value::from("jan"), Value::Float64(3.0)],
                vec![Value::Int64(1), Value::from("feb"), Value::Float64(4.0)],
            ]
        );
    }
}
