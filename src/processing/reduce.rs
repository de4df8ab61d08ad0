//! Aggregations (`aggregate_sum`, `aggregate_avg`, `aggregate_count`, `aggregate_min`,
//! `aggregate_max`), optionally per group.

use crate::types::{Column, DataSet, DataType, Schema, Value, cell};

use super::group::{Groups, group_key, key_value, push_unique};

/// Built-in reduction operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count all rows (including nulls).
    Count,
    /// Sum of values; non-numeric values count as `0`.
    Sum,
    /// Mean of values; non-numeric values count as `0`.
    Avg,
    /// Minimum value; non-numeric values count as `0`.
    Min,
    /// Maximum value; non-numeric values count as `0`.
    Max,
}

impl ReduceOp {
    /// Name of the column an aggregation over `source` produces.
    pub fn output_column(self, source: &str) -> String {
        match self {
            ReduceOp::Count => "count".to_string(),
            ReduceOp::Sum => format!("{source}_sum"),
            ReduceOp::Avg => format!("{source}_avg"),
            ReduceOp::Min => format!("{source}_min"),
            ReduceOp::Max => format!("{source}_max"),
        }
    }

    fn output_type(self) -> DataType {
        match self {
            ReduceOp::Count => DataType::Int64,
            _ => DataType::Float64,
        }
    }
}

/// Single-pass accumulator shared by every op.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    count: usize,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Accumulator {
    fn push(&mut self, v: &Value) {
        let n = v.to_number_or_zero();
        self.count += 1;
        self.sum += n;
        self.min = Some(self.min.map_or(n, |m| m.min(n)));
        self.max = Some(self.max.map_or(n, |m| m.max(n)));
    }

    fn finish(&self, op: ReduceOp) -> Value {
        match op {
            ReduceOp::Count => Value::Int64(self.count as i64),
            ReduceOp::Sum => Value::Float64(self.sum),
            ReduceOp::Avg if self.count == 0 => Value::Null,
            ReduceOp::Avg => Value::Float64(self.sum / self.count as f64),
            ReduceOp::Min => self.min.map_or(Value::Null, Value::Float64),
            ReduceOp::Max => self.max.map_or(Value::Null, Value::Float64),
        }
    }
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// - Returns `None` if `column` does not exist in the schema.
/// - Non-numeric and null values are coerced to `0` rather than skipped.
/// - On an empty dataset `Sum` is `0`, `Count` is `0`, and `Avg`/`Min`/`Max` are `Null`.
pub fn reduce(dataset: &DataSet, column: &str, op: ReduceOp) -> Option<Value> {
    let idx = dataset.schema.index_of(column)?;
    let acc = dataset.reduce_rows(Accumulator::default(), |mut acc, row| {
        acc.push(cell(row, Some(idx)));
        acc
    });
    Some(acc.finish(op))
}

/// Aggregates `source` into a new dataset whose only columns are the optional group column and
/// the aggregate column (see [`ReduceOp::output_column`]).
///
/// Without `group_by` the result has exactly one row. With `group_by`, one row per distinct group
/// key (compared as strings) in first-seen order. A `source` missing from the schema aggregates
/// as all zeros. If the aggregate column's name equals the group column's, it gets a `_2` suffix.
pub fn aggregate(dataset: &DataSet, source: &str, op: ReduceOp, group_by: Option<&str>) -> DataSet {
    let src = dataset.schema.index_of(source);
    let out_col = Column::nullable(op.output_column(source), op.output_type());

    let Some(group_col) = group_by else {
        let mut acc = Accumulator::default();
        for row in &dataset.rows {
            acc.push(cell(row, src));
        }
        return dataset.derive(Schema::new(vec![out_col]), vec![vec![acc.finish(op)]]);
    };

    let key_idx = [dataset.schema.index_of(group_col)];
    let mut groups: Groups<(Value, Accumulator)> = Groups::default();
    for row in &dataset.rows {
        let (_, acc) = groups.entry(group_key(row, &key_idx), || {
            (key_value(cell(row, key_idx[0])), Accumulator::default())
        });
        acc.push(cell(row, src));
    }

    let rows = groups
        .into_values()
        .map(|(key, acc)| vec![key, acc.finish(op)])
        .collect();
    let mut fields = vec![Column::nullable(group_col, DataType::Utf8)];
    push_unique(&mut fields, out_col);
    dataset.derive(Schema::new(fields), rows)
}
