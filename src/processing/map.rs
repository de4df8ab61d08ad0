//! Column-wise value mapping: `currency_convert`, `number_format` and `string_manipulation`.
//!
//! Each step computes one column from one source column with [`DataSet::with_column`], so the
//! source dataset is never touched and the output keeps every input row in order.

use crate::types::{Column, DataSet, DataType, Value, cell};

use super::transformation::StringOperation;

/// Multiplies `source` by `rate` into a new Float64 column `target`. Non-numeric cells become
/// `Null`. Returns the dataset and the number of non-null cells that were not numeric.
pub fn currency_convert(dataset: &DataSet, source: &str, target: &str, rate: f64) -> (DataSet, usize) {
    map_numeric(dataset, source, target, |n| n * rate)
}

/// Rounds `source` half away from zero to `decimals` places into `target` (Float64).
pub fn number_format(dataset: &DataSet, source: &str, target: &str, decimals: u32) -> (DataSet, usize) {
    let factor = 10f64.powi(decimals.min(15) as i32);
    map_numeric(dataset, source, target, |n| (n * factor).round() / factor)
}

fn map_numeric<F>(dataset: &DataSet, source: &str, target: &str, f: F) -> (DataSet, usize)
where
    F: Fn(f64) -> f64,
{
    let idx = dataset.schema.index_of(source);
    let mut skipped = 0usize;
    let out = dataset.with_column(Column::nullable(target, DataType::Float64), |row| {
        let v = cell(row, idx);
        let n = v.to_number();
        if n.is_finite() {
            Value::Float64(f(n))
        } else {
            if !v.is_null() {
                skipped += 1;
            }
            Value::Null
        }
    });
    (out, skipped)
}

/// Text edits applied by `string_manipulation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringEdit {
    Uppercase,
    Lowercase,
    Trim,
    /// Replace every occurrence of `find`. An empty `find` leaves the text unchanged.
    Replace { find: String, replace_with: String },
    /// Characters `start..end`, clamped to the text; `end: None` runs to the end.
    Substring { start: usize, end: Option<usize> },
}

impl StringEdit {
    /// Builds the edit for a configured operation; `None` for [`StringOperation::Unknown`].
    pub fn from_operation(
        op: StringOperation,
        find: Option<&str>,
        replace_with: Option<&str>,
        start: Option<usize>,
        end: Option<usize>,
    ) -> Option<Self> {
        Some(match op {
            StringOperation::Uppercase => StringEdit::Uppercase,
            StringOperation::Lowercase => StringEdit::Lowercase,
            StringOperation::Trim => StringEdit::Trim,
            StringOperation::Replace => StringEdit::Replace {
                find: find.unwrap_or_default().to_string(),
                replace_with: replace_with.unwrap_or_default().to_string(),
            },
            StringOperation::Substring => StringEdit::Substring {
                start: start.unwrap_or(0),
                end,
            },
            StringOperation::Unknown => return None,
        })
    }

    pub fn apply(&self, s: &str) -> String {
        match self {
            StringEdit::Uppercase => s.to_uppercase(),
            StringEdit::Lowercase => s.to_lowercase(),
            StringEdit::Trim => s.trim().to_string(),
            StringEdit::Replace { find, .. } if find.is_empty() => s.to_string(),
            StringEdit::Replace { find, replace_with } => s.replace(find.as_str(), replace_with),
            StringEdit::Substring { start, end } => {
                let take = end.map_or(usize::MAX, |e| e.saturating_sub(*start));
                s.chars().skip(*start).take(take).collect()
            }
        }
    }
}

/// Applies `edit` to the display string of every `source` cell, writing Utf8 into `target`.
/// `Null` stays `Null`.
pub fn string_manipulation(dataset: &DataSet, source: &str, target: &str, edit: &StringEdit) -> DataSet {
    let idx = dataset.schema.index_of(source);
    dataset.with_column(Column::nullable(target, DataType::Utf8), |row| match cell(row, idx) {
        Value::Null => Value::Null,
        v => Value::Utf8(edit.apply(&v.to_string())),
    })
}

#[cfg(test)]
mod tests {
    use super::{StringEdit, currency_convert, number_format, string_manipulation};
    use crate::processing::StringOperation;
    use crate::types::{Column, DataSet, DataType, Schema, Value};

    fn prices() -> DataSet {
        let schema = Schema::new(vec![
            Column::nullable("price", DataType::Float64),
            Column::nullable("label", DataType::Utf8),
        ]);
        DataSet::new(
            schema,
            vec![
                vec![Value::Float64(10.0), Value::from("  Red Shirt ")],
                vec![Value::from("12.5"), Value::Null],
                vec![Value::from("free"), Value::from("Hat")],
                vec![Value::Null, Value::from("Ünïcode")],
            ],
        )
    }

    #[test]
    fn currency_convert_leaves_source_untouched() {
        let ds = prices();
        let (out, skipped) = currency_convert(&ds, "price", "price_EUR", 0.5);
        assert_eq!(skipped, 1);
        assert_eq!(out.schema.field_names().collect::<Vec<_>>(), vec!["price", "label", "price_EUR"]);
        let converted: Vec<Value> = out.rows.iter().map(|r| r[2].clone()).collect();
        assert_eq!(
            converted,
            vec![Value::Float64(5.0), Value::Float64(6.25), Value::Null, Value::Null]
        );
        for (before, after) in ds.rows.iter().zip(&out.rows) {
            assert_eq!(before[0], after[0]);
        }
    }

    #[test]
    fn number_format_rounds_half_away_from_zero() {
        let schema = Schema::new(vec![Column::new("x", DataType::Float64)]);
        let ds = DataSet::new(
            schema,
            vec![vec![Value::Float64(1.005_1)], vec![Value::Float64(-2.345)], vec![Value::Float64(7.0)]],
        );
        let (out, _) = number_format(&ds, "x", "x", 1);
        assert_eq!(out.schema.fields.len(), 1);
        assert_eq!(
            out.rows,
            vec![vec![Value::Float64(1.0)], vec![Value::Float64(-2.3)], vec![Value::Float64(7.0)]]
        );
    }

    #[test]
    fn string_edits() {
        assert_eq!(StringEdit::Uppercase.apply("abc"), "ABC");
        assert_eq!(StringEdit::Trim.apply("  a b "), "a b");
        let replace = StringEdit::from_operation(StringOperation::Replace, Some("-"), Some("/"), None, None).unwrap();
        assert_eq!(replace.apply("2024-01-02"), "2024/01/02");
        let noop = StringEdit::from_operation(StringOperation::Replace, None, None, None, None).unwrap();
        assert_eq!(noop.apply("abc"), "abc");

        let sub = StringEdit::Substring { start: 1, end: Some(4) };
        assert_eq!(sub.apply("Ünïcode"), "nïc");
        assert_eq!(sub.apply("ab"), "b");
        assert_eq!(StringEdit::Substring { start: 3, end: None }.apply("abcdef"), "def");
        assert_eq!(StringEdit::Substring { start: 4, end: Some(2) }.apply("abcdef"), "");
        assert!(StringEdit::from_operation(StringOperation::Unknown, None, None, None, None).is_none());
    }

    #[test]
    fn string_manipulation_keeps_nulls() {
        let out = string_manipulation(&prices(), "label", "label_clean", &StringEdit::Trim);
        let cleaned: Vec<Value> = out.rows.iter().map(|r| r[2].clone()).collect();
        assert_eq!(
            cleaned,
            vec![Value::from("Red Shirt"), Value::Null, Value::from("Hat"), Value::from("Ünïcode")]
        );
    }
}
