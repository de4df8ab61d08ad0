//! Grouping: the string group key shared by every grouping step, and the `group_by` step itself.

use indexmap::{IndexMap, IndexSet};

use crate::types::{Column, DataSet, DataType, Schema, Value, cell};

// Unit separator: cannot collide with anything a user types into a cell.
const KEY_SEPARATOR: char = '\u{1f}';
// Cell tags inside a key, so `Null` and `""` land in different groups.
const NULL_TAG: char = '\u{0}';
const VALUE_TAG: char = '\u{2}';

/// Buckets keyed by group key, iterated in first-seen order.
#[derive(Debug)]
pub(crate) struct Groups<T> {
    buckets: IndexMap<String, T>,
}

impl<T> Default for Groups<T> {
    fn default() -> Self {
        Self {
            buckets: IndexMap::new(),
        }
    }
}

impl<T> Groups<T> {
    pub(crate) fn entry<F>(&mut self, key: String, init: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        self.buckets.entry(key).or_insert_with(init)
    }

    pub(crate) fn into_values(self) -> impl Iterator<Item = T> {
        self.buckets.into_values()
    }
}

/// Joins the display strings of the cells at `columns`. Values compare as strings; `Null` is
/// its own key.
pub(crate) fn group_key(row: &[Value], columns: &[Option<usize>]) -> String {
    let mut key = String::new();
    for (i, idx) in columns.iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        match cell(row, *idx) {
            Value::Null => key.push(NULL_TAG),
            v => {
                key.push(VALUE_TAG);
                key.push_str(&v.to_string());
            }
        }
    }
    key
}

/// Appends `column`, renaming it `{name}_2`, `{name}_3`, ... if the name is already taken.
pub(crate) fn push_unique(fields: &mut Vec<Column>, mut column: Column) {
    let taken = |name: &str| fields.iter().any(|f| f.name == name);
    if taken(&column.name) {
        let base = column.name.clone();
        let mut n = 2usize;
        while taken(&format!("{base}_{n}")) {
            n += 1;
        }
        column.name = format!("{base}_{n}");
    }
    fields.push(column);
}

/// `names` with repeats removed, first occurrence kept.
pub(crate) fn distinct(names: &[String]) -> Vec<String> {
    names.iter().cloned().collect::<IndexSet<_>>().into_iter().collect()
}

/// The value emitted for a group column: the key as a string, or `Null` for a null group.
pub(crate) fn key_value(v: &Value) -> Value {
    match v {
        Value::Null => Value::Null,
        other => Value::Utf8(other.to_string()),
    }
}

/// One row per distinct combination of `columns`, holding the grouping values as strings plus a
/// `count` column.
///
/// A column listed twice groups once. If a grouping column is itself called `count`, the count
/// column becomes `count_2`.
pub fn group_by(dataset: &DataSet, columns: &[String]) -> DataSet {
    let columns = distinct(columns);
    let idxs: Vec<Option<usize>> = columns.iter().map(|c| dataset.schema.index_of(c)).collect();

    let mut groups: Groups<(Vec<Value>, i64)> = Groups::default();
    for row in &dataset.rows {
        let (_, count) = groups.entry(group_key(row, &idxs), || {
            (idxs.iter().map(|idx| key_value(cell(row, *idx))).collect(), 0)
        });
        *count += 1;
    }

    let mut fields: Vec<Column> = columns
        .iter()
        .map(|c| Column::nullable(c.as_str(), DataType::Utf8))
        .collect();
    push_unique(&mut fields, Column::new("count", DataType::Int64));

    let rows = groups
        .into_values()
        .map(|(mut values, count)| {
            values.push(Value::Int64(count));
            values
        })
        .collect();
    dataset.derive(Schema::new(fields), rows)
}
