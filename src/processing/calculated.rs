//! `calculate_field`: a Float64 column computed from an arithmetic formula.

use crate::formula::Formula;
use crate::types::{Column, DataSet, DataType, Value};

/// Evaluates `formula` for every row into `target`.
///
/// Column references resolve against the dataset's own columns; their values coerce to numbers
/// with non-numeric and missing cells reading as `0`. A row whose evaluation fails (division by
/// zero, non-finite result) gets `Null`. A formula that does not parse yields `Null` in every row.
///
/// Returns the new dataset and the number of rows that came out `Null`.
pub fn calculate_field(dataset: &DataSet, formula: &str, target: &str) -> (DataSet, usize) {
    let names: Vec<&str> = dataset.schema.field_names().collect();
    let parsed = Formula::parse(formula, &names);
    let mut failed = 0usize;

    let out = dataset.with_column(Column::nullable(target, DataType::Float64), |row| {
        let result = parsed.as_ref().map_err(Clone::clone).and_then(|f| {
            f.evaluate(|idx| row.get(idx).map_or(0.0, Value::to_number_or_zero))
        });
        match result {
            Ok(v) => Value::Float64(v),
            Err(_) => {
                failed += 1;
                Value::Null
            }
        }
    });
    (out, failed)
}
