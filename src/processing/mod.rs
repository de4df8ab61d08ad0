//! The transformation pipeline.
//!
//! [`apply_transformations`] threads a [`DataSet`] through an ordered list of
//! [`DataTransformation`] steps. Every step borrows its input and returns a new dataset, so the
//! caller's rows are never modified and each intermediate result can be inspected on its own
//! with [`apply_step`].
//!
//! Steps degrade locally instead of failing: a formula that cannot be evaluated yields `Null`
//! for that row, an unparsable date yields `Null`, and a step that is missing a required
//! parameter (or has an unrecognised type) passes its input through unchanged. The only error
//! is a structurally invalid input dataset.
//!
//! The step implementations are also exposed as plain functions ([`aggregate`], [`group_by`],
//! [`sort`], [`pivot`], ...) for callers that build pipelines in code.
//!
//! ## Example: aggregate by group, then sort
//!
//! ```rust
//! use dashboard_data_engine::processing::{
//!     apply_transformations, DataTransformation, SortDirection, TransformParameters,
//!     TransformationKind,
//! };
//! use dashboard_data_engine::types::{Column, DataSet, DataType, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Column::new("g", DataType::Utf8),
//!     Column::new("v", DataType::Int64),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::from("a"), Value::Int64(1)],
//!         vec![Value::from("a"), Value::Int64(2)],
//!         vec![Value::from("b"), Value::Int64(5)],
//!     ],
//! )
//! .with_id("orders");
//!
//! let steps = vec![
//!     DataTransformation::new("sum", TransformationKind::AggregateSum, "v").with_parameters(
//!         TransformParameters {
//!             group_by: Some("g".to_string()),
//!             ..Default::default()
//!         },
//!     ),
//!     DataTransformation::new("order", TransformationKind::Sort, "v_sum").with_parameters(
//!         TransformParameters {
//!             direction: Some(SortDirection::Desc),
//!             ..Default::default()
//!         },
//!     ),
//! ];
//!
//! let out = apply_transformations(&ds, &steps).unwrap();
//! assert_eq!(out.id, "orders_transformed");
//! assert_eq!(
//!     out.rows,
//!     vec![
//!         vec![Value::from("b"), Value::Float64(5.0)],
//!         vec![Value::from("a"), Value::Float64(3.0)],
//!     ]
//! );
//! ```

pub mod calculated;
pub mod dates;
pub mod group;
pub mod map;
pub mod pivot;
pub mod reduce;
pub mod sort;
pub mod transformation;

pub use calculated::calculate_field;
pub use dates::{extract as extract_date_part, parse_date};
pub use group::group_by;
pub use map::{StringEdit, currency_convert, number_format, string_manipulation};
pub use pivot::{pivot, unpivot};
pub use reduce::{ReduceOp, aggregate, reduce};
pub use sort::sort;
pub use transformation::{
    DataTransformation, DatePart, SortDirection, StringOperation, TransformParameters,
    TransformationKind,
};

use crate::error::EngineResult;
use crate::types::DataSet;

const DEFAULT_DECIMALS: u32 = 2;
const DEFAULT_TO_CURRENCY: &str = "converted";
const DEFAULT_VARIABLE_COLUMN: &str = "variable";
const DEFAULT_VALUE_COLUMN: &str = "value";

/// What happened when a single step ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// The step ran. `degraded_rows` counts rows whose computed cell fell back to `Null`
    /// (failed formula, unparsable date, non-numeric amount).
    Applied { degraded_rows: usize },
    /// The step passed its input through unchanged.
    Skipped { reason: String },
}

/// Result of [`apply_step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    pub dataset: DataSet,
    pub status: StepStatus,
}

impl StepOutput {
    fn applied(dataset: DataSet, degraded_rows: usize) -> Self {
        Self {
            dataset,
            status: StepStatus::Applied { degraded_rows },
        }
    }

    fn skipped(dataset: &DataSet, reason: impl Into<String>) -> Self {
        Self {
            dataset: dataset.clone(),
            status: StepStatus::Skipped {
                reason: reason.into(),
            },
        }
    }
}

/// Runs one step against `dataset`.
///
/// Never fails: misconfigured steps, and inputs that fail [`DataSet::validate`], are reported as
/// [`StepStatus::Skipped`] and return a copy of their input.
pub fn apply_step(dataset: &DataSet, step: &DataTransformation) -> StepOutput {
    use TransformationKind as K;

    if let Err(e) = dataset.validate() {
        return StepOutput::skipped(dataset, e.to_string());
    }

    let params = &step.parameters;
    let source = step.source_column.as_str();
    let target = step.target_column.as_deref();

    match step.kind {
        K::AggregateSum | K::AggregateAvg | K::AggregateCount | K::AggregateMin | K::AggregateMax => {
            let op = match step.kind {
                K::AggregateSum => ReduceOp::Sum,
                K::AggregateAvg => ReduceOp::Avg,
                K::AggregateMin => ReduceOp::Min,
                K::AggregateMax => ReduceOp::Max,
                _ => ReduceOp::Count,
            };
            let out = aggregate(dataset, source, op, params.group_by.as_deref());
            StepOutput::applied(out, 0)
        }
        K::GroupBy => {
            if params.columns.is_empty() {
                return StepOutput::skipped(dataset, "group_by requires parameters.columns");
            }
            StepOutput::applied(group_by(dataset, &params.columns), 0)
        }
        K::Sort => {
            let direction = params.direction.unwrap_or_default();
            StepOutput::applied(sort(dataset, source, direction), 0)
        }
        K::Pivot => {
            if params.values.is_empty() {
                return StepOutput::skipped(dataset, "pivot requires parameters.values");
            }
            let out = pivot(dataset, &params.rows, &params.columns, &params.values);
            StepOutput::applied(out, 0)
        }
        K::Unpivot => {
            if params.columns.is_empty() {
                return StepOutput::skipped(dataset, "unpivot requires parameters.columns");
            }
            let out = unpivot(
                dataset,
                &params.columns,
                params.variable_column.as_deref().unwrap_or(DEFAULT_VARIABLE_COLUMN),
                params.value_column.as_deref().unwrap_or(DEFAULT_VALUE_COLUMN),
            );
            StepOutput::applied(out, 0)
        }
        K::CalculateField => {
            let (Some(formula), Some(target)) = (params.formula.as_deref(), target) else {
                return StepOutput::skipped(dataset, "calculate_field requires a formula and a target column");
            };
            let (out, failed) = calculate_field(dataset, formula, target);
            StepOutput::applied(out, failed)
        }
        K::DateExtract => {
            let part = params.part.unwrap_or(DatePart::Unknown);
            if part == DatePart::Unknown {
                return StepOutput::skipped(dataset, "date_extract requires a known date part");
            }
            let target = target.map_or_else(|| format!("{source}_{}", part.label()), str::to_string);
            let (out, unparsable) = dates::date_extract(dataset, source, &target, part);
            StepOutput::applied(out, unparsable)
        }
        K::CurrencyConvert => {
            let Some(rate) = params.rate.filter(|r| r.is_finite()) else {
                return StepOutput::skipped(dataset, "currency_convert requires a finite rate");
            };
            let target = target.map_or_else(
                || {
                    let currency = params.to_currency.as_deref().unwrap_or(DEFAULT_TO_CURRENCY);
                    format!("{source}_{currency}")
                },
                str::to_string,
            );
            let (out, skipped) = currency_convert(dataset, source, &target, rate);
            StepOutput::applied(out, skipped)
        }
        K::StringManipulation => {
            let edit = params.operation.and_then(|op| {
                StringEdit::from_operation(
                    op,
                    params.find.as_deref(),
                    params.replace_with.as_deref(),
                    params.start,
                    params.end,
                )
            });
            let Some(edit) = edit else {
                return StepOutput::skipped(dataset, "string_manipulation requires a known operation");
            };
            let out = string_manipulation(dataset, source, target.unwrap_or(source), &edit);
            StepOutput::applied(out, 0)
        }
        K::NumberFormat => {
            let decimals = params.decimals.unwrap_or(DEFAULT_DECIMALS);
            let (out, skipped) = number_format(dataset, source, target.unwrap_or(source), decimals);
            StepOutput::applied(out, skipped)
        }
        K::Unknown => StepOutput::skipped(dataset, format!("step '{}' has an unrecognised type", step.id)),
    }
}

/// Applies `steps` in order and returns the final dataset, whose id carries a `_transformed`
/// suffix.
///
/// Fails only if `dataset` is structurally invalid (see [`DataSet::validate`]); nothing is
/// computed in that case.
pub fn apply_transformations(dataset: &DataSet, steps: &[DataTransformation]) -> EngineResult<DataSet> {
    dataset.validate()?;
    let mut current = dataset.clone();
    for step in steps {
        current = apply_step(&current, step).dataset;
    }
    Ok(transformed_dataset(current))
}

pub(crate) fn transformed_dataset(mut dataset: DataSet) -> DataSet {
    dataset.id = format!("{}_transformed", dataset.id);
    dataset
}
