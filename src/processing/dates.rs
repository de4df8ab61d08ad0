//! Date parsing and the `date_extract` step.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::types::{Column, DataSet, DataType, Value, cell};

use super::transformation::DatePart;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Interprets a cell as a point in time.
///
/// Accepts `Date` values, RFC 3339 timestamps (normalised to UTC), the ISO-like layouts in
/// `DATETIME_FORMATS`/`DATE_FORMATS`, and numbers as epoch milliseconds. Anything else is `None`.
pub fn parse_date(v: &Value) -> Option<NaiveDateTime> {
    match v {
        Value::Date(d) => d.and_hms_opt(0, 0, 0),
        Value::Int64(ms) => DateTime::from_timestamp_millis(*ms).map(|d| d.naive_utc()),
        Value::Float64(ms) if ms.is_finite() => {
            DateTime::from_timestamp_millis(*ms as i64).map(|d| d.naive_utc())
        }
        Value::Utf8(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Extracts `part` from `dt`; `None` only for [`DatePart::Unknown`].
pub fn extract(dt: &NaiveDateTime, part: DatePart) -> Option<i64> {
    let v = match part {
        DatePart::Year => i64::from(dt.year()),
        DatePart::Month => i64::from(dt.month()),
        DatePart::Day => i64::from(dt.day()),
        DatePart::Quarter => i64::from((dt.month() - 1) / 3 + 1),
        DatePart::DayOfWeek => i64::from(dt.weekday().num_days_from_sunday()),
        DatePart::WeekOfYear => i64::from(dt.iso_week().week()),
        DatePart::Unknown => return None,
    };
    Some(v)
}

/// Writes `part` of every `source` date into `target` (`Int64`). Returns the new dataset and the
/// number of non-null cells that could not be parsed as dates (those become `Null`).
pub(crate) fn date_extract(
    dataset: &DataSet,
    source: &str,
    target: &str,
    part: DatePart,
) -> (DataSet, usize) {
    let idx = dataset.schema.index_of(source);
    let mut unparsable = 0usize;
    let out = dataset.with_column(Column::nullable(target, DataType::Int64), |row| {
        let v = cell(row, idx);
        match parse_date(v).and_then(|dt| extract(&dt, part)) {
            Some(n) => Value::Int64(n),
            None => {
                if !v.is_null() {
                    unparsable += 1;
                }
                Value::Null
            }
        }
    });
    (out, unparsable)
}
