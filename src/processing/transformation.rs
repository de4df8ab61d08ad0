//! Transformation step configuration.
//!
//! Field names follow the JSON the dashboard persists (`type`, `sourceColumn`, `groupBy`, ...).
//! Unrecognised step types, date parts and string operations deserialize to an `Unknown`
//! variant so a stale configuration still loads; such steps are skipped when applied.

use serde::{Deserialize, Serialize};

/// The kind of a [`DataTransformation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformationKind {
    AggregateSum,
    AggregateAvg,
    AggregateCount,
    AggregateMin,
    AggregateMax,
    GroupBy,
    Sort,
    Pivot,
    Unpivot,
    CalculateField,
    DateExtract,
    CurrencyConvert,
    StringManipulation,
    NumberFormat,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "ascending")]
    Asc,
    #[serde(alias = "descending")]
    Desc,
}

/// Component pulled out of a date by `date_extract`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatePart {
    Year,
    /// 1–12.
    Month,
    Day,
    /// 1–4.
    Quarter,
    /// 0–6, 0 = Sunday.
    DayOfWeek,
    /// ISO-8601 week number.
    WeekOfYear,
    #[serde(other)]
    Unknown,
}

impl DatePart {
    pub(crate) fn label(self) -> &'static str {
        match self {
            DatePart::Year => "year",
            DatePart::Month => "month",
            DatePart::Day => "day",
            DatePart::Quarter => "quarter",
            DatePart::DayOfWeek => "dayOfWeek",
            DatePart::WeekOfYear => "weekOfYear",
            DatePart::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringOperation {
    Uppercase,
    Lowercase,
    Trim,
    Replace,
    Substring,
    #[serde(other)]
    Unknown,
}

/// Step-specific options. Each step reads only the fields it needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformParameters {
    /// Aggregations: column to group by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    /// `sort`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
    /// `group_by` keys, `pivot` column keys, `unpivot` melted columns.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    /// `pivot` row keys.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<String>,
    /// `pivot` summed columns.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    /// `calculate_field`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    /// `date_extract`.
    #[serde(alias = "component", skip_serializing_if = "Option::is_none")]
    pub part: Option<DatePart>,
    /// `currency_convert`: multiplier from the source currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_currency: Option<String>,
    /// `string_manipulation`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<StringOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub find: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_with: Option<String>,
    /// Substring bounds, in characters; `end` is exclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
    /// `number_format`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    /// `unpivot` output column names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_column: Option<String>,
}

/// One configured pipeline step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTransformation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransformationKind,
    #[serde(default)]
    pub source_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_column: Option<String>,
    #[serde(default)]
    pub parameters: TransformParameters,
}

impl DataTransformation {
    pub fn new(id: impl Into<String>, kind: TransformationKind, source_column: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            source_column: source_column.into(),
            target_column: None,
            parameters: TransformParameters::default(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_column = Some(target.into());
        self
    }

    pub fn with_parameters(mut self, parameters: TransformParameters) -> Self {
        self.parameters = parameters;
        self
    }
}
