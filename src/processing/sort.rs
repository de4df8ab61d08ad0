//! Stable single-column sort.

use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::types::{DataSet, DataType, Value, cell};

use super::dates::parse_date;
use super::transformation::SortDirection;

/// Precomputed comparison key for one cell.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Date(NaiveDateTime),
    Text(String),
    /// Null, NaN or unparsable: after every present value when ascending.
    Missing,
}

impl SortKey {
    fn for_value(v: &Value, data_type: Option<DataType>) -> Self {
        if v.is_null() {
            return SortKey::Missing;
        }
        match data_type {
            Some(t) if t.is_numeric() => {
                let n = v.to_number();
                if n.is_nan() { SortKey::Missing } else { SortKey::Number(n) }
            }
            Some(DataType::Date) => parse_date(v).map_or(SortKey::Missing, SortKey::Date),
            _ => SortKey::Text(v.to_string().to_lowercase()),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
            (SortKey::Missing, _) => Ordering::Greater,
            (_, SortKey::Missing) => Ordering::Less,
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            // Keys for one column share a variant; keep this total anyway.
            _ => Ordering::Equal,
        }
    }
}

/// Sorts rows by `column`.
///
/// Columns declared `Int64`/`Float64` sort numerically, `Date` columns chronologically, and
/// everything else by case-insensitive text. Nulls sort last in ascending order (first in
/// descending). Ties keep their original relative order in both directions.
pub fn sort(dataset: &DataSet, column: &str, direction: SortDirection) -> DataSet {
    let idx = dataset.schema.index_of(column);
    let data_type = idx.map(|i| dataset.schema.fields[i].data_type);

    let mut keyed: Vec<(SortKey, &Vec<Value>)> = dataset
        .rows
        .iter()
        .map(|row| (SortKey::for_value(cell(row, idx), data_type), row))
        .collect();

    // `sort_by` is stable; reversing the comparator (not the output) keeps ties in input order.
    keyed.sort_by(|(a, _), (b, _)| match direction {
        SortDirection::Asc => a.compare(b),
        SortDirection::Desc => b.compare(a),
    });

    let rows = keyed.into_iter().map(|(_, row)| row.clone()).collect();
    dataset.derive(dataset.schema.clone(), rows)
}
