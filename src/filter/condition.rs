//! Condition model and per-operator evaluation.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{Schema, Value, cell};

/// Comparison operator of a [`FilterCondition`].
///
/// Each operator applies one explicit coercion rule:
///
/// - `Equals` / `NotEquals`: [`Value::loose_eq`] (numeric when both sides are numeric, else
///   exact display-string comparison; `Null` only equals `Null`).
/// - `GreaterThan`, `LessThan`, `GreaterEqual`, `LessEqual`, `Between`: both sides through
///   [`Value::to_number`]; any `NaN` makes the comparison false.
/// - `Contains`, `NotContains`, `StartsWith`, `EndsWith`: case-insensitive on display strings.
/// - `In` / `NotIn`: [`Value::strict_eq`] membership in a list operand.
/// - `IsNull` / `IsNotNull`: [`Value::is_blank`].
/// - `Regex`: case-sensitive match on the display string.
///
/// Operator names that this version does not recognise deserialize to `Unknown`, which lets
/// every row through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Between,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    Regex,
    #[serde(other)]
    Unknown,
}

/// Right-hand side of a condition: a single value, or a list for `in` / `not_in`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    List(Vec<Value>),
    Scalar(Value),
}

impl Operand {
    fn scalar(&self) -> Option<&Value> {
        match self {
            Operand::Scalar(v) => Some(v),
            Operand::List(_) => None,
        }
    }

    fn number(&self) -> f64 {
        self.scalar().map_or(f64::NAN, Value::to_number)
    }

    fn text(&self) -> String {
        self.scalar().map(Value::to_string).unwrap_or_default()
    }
}

impl Default for Operand {
    fn default() -> Self {
        Operand::Scalar(Value::Null)
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Scalar(v)
    }
}

macro_rules! scalar_operand_from {
    ($($t:ty),*) => {
        $(impl From<$t> for Operand {
            fn from(v: $t) -> Self {
                Operand::Scalar(Value::from(v))
            }
        })*
    };
}

scalar_operand_from!(i32, i64, f64, bool, &str, String);

impl From<Vec<Value>> for Operand {
    fn from(v: Vec<Value>) -> Self {
        Operand::List(v)
    }
}

/// A single `field <operator> value` test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    /// Column name the condition reads.
    pub field: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: Operand,
    /// Upper bound for `between`; ignored by every other operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_value: Option<Operand>,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<Operand>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            second_value: None,
        }
    }

    /// Inclusive `low <= field <= high` condition.
    pub fn between(field: impl Into<String>, low: impl Into<Operand>, high: impl Into<Operand>) -> Self {
        Self {
            second_value: Some(high.into()),
            ..Self::new(field, FilterOperator::Between, low)
        }
    }
}

/// A condition resolved against a schema: column index looked up and regex compiled once.
#[derive(Debug)]
pub(crate) struct CompiledCondition<'a> {
    condition: &'a FilterCondition,
    column: Option<usize>,
    // `None` for a malformed pattern; only populated for `Regex`.
    pattern: Option<Regex>,
}

impl<'a> CompiledCondition<'a> {
    pub(crate) fn compile(schema: &Schema, condition: &'a FilterCondition) -> Self {
        let pattern = match condition.operator {
            FilterOperator::Regex => condition
                .value
                .scalar()
                .and_then(|v| Regex::new(&v.to_string()).ok()),
            _ => None,
        };
        Self {
            condition,
            column: schema.index_of(&condition.field),
            pattern,
        }
    }

    pub(crate) fn matches(&self, row: &[Value]) -> bool {
        let field = cell(row, self.column);
        let value = &self.condition.value;

        match self.condition.operator {
            FilterOperator::Equals => value.scalar().is_some_and(|v| field.loose_eq(v)),
            FilterOperator::NotEquals => !value.scalar().is_some_and(|v| field.loose_eq(v)),
            FilterOperator::GreaterThan => field.to_number() > value.number(),
            FilterOperator::LessThan => field.to_number() < value.number(),
            FilterOperator::GreaterEqual => field.to_number() >= value.number(),
            FilterOperator::LessEqual => field.to_number() <= value.number(),
            FilterOperator::Contains => lower(field).contains(&value.text().to_lowercase()),
            FilterOperator::NotContains => !lower(field).contains(&value.text().to_lowercase()),
            FilterOperator::StartsWith => lower(field).starts_with(&value.text().to_lowercase()),
            FilterOperator::EndsWith => lower(field).ends_with(&value.text().to_lowercase()),
            FilterOperator::Between => {
                let n = field.to_number();
                let high = self
                    .condition
                    .second_value
                    .as_ref()
                    .map_or(f64::NAN, Operand::number);
                value.number() <= n && n <= high
            }
            FilterOperator::In => is_member(field, value),
            FilterOperator::NotIn => !is_member(field, value),
            FilterOperator::IsNull => field.is_blank(),
            FilterOperator::IsNotNull => !field.is_blank(),
            FilterOperator::Regex => self
                .pattern
                .as_ref()
                .is_some_and(|re| re.is_match(&field.to_string())),
            FilterOperator::Unknown => true,
        }
    }
}

fn lower(v: &Value) -> String {
    v.to_string().to_lowercase()
}

fn is_member(field: &Value, operand: &Operand) -> bool {
    match operand {
        Operand::List(items) => items.iter().any(|item| item.strict_eq(field)),
        Operand::Scalar(_) => false,
    }
}

/// Evaluates a single condition against `row`, interpreted through `schema`.
///
/// Never panics: an unknown operator passes, a malformed regex fails.
pub fn evaluate_condition(schema: &Schema, row: &[Value], condition: &FilterCondition) -> bool {
    CompiledCondition::compile(schema, condition).matches(row)
}
