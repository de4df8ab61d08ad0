//! Filter engine: named AND/OR condition groups evaluated against every row.
//!
//! A dataset passes through a list of [`AdvancedFilter`]s one after another; a row survives only
//! if every filter accepts it. Surviving rows keep their original order and the input dataset is
//! never modified.
//!
//! ```rust
//! use dashboard_data_engine::filter::{
//!     apply_filters, AdvancedFilter, FilterCondition, FilterLogic, FilterOperator,
//! };
//! use dashboard_data_engine::types::{Column, DataSet, DataType, Schema, Value};
//!
//! let ds = DataSet::new(
//!     Schema::new(vec![Column::new("amount", DataType::Float64)]),
//!     vec![vec![Value::Float64(5.0)], vec![Value::Float64(12.0)], vec![Value::Float64(20.0)]],
//! )
//! .with_id("orders");
//!
//! let mid = AdvancedFilter::new(
//!     "f1",
//!     "mid-sized orders",
//!     FilterLogic::And,
//!     vec![FilterCondition::between("amount", 10, 20)],
//! );
//! let out = apply_filters(&ds, &[mid]).unwrap();
//! assert_eq!(out.id, "orders_filtered");
//! assert_eq!(out.row_count(), 2);
//! ```

mod condition;

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::types::{DataSet, Schema, Value};

pub use condition::{FilterCondition, FilterOperator, Operand, evaluate_condition};

use condition::CompiledCondition;

/// How the conditions inside one filter combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterLogic {
    /// Every condition must hold.
    #[default]
    And,
    /// At least one condition must hold.
    Or,
}

/// A named group of conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedFilter {
    pub id: String,
    pub name: String,
    pub conditions: Vec<FilterCondition>,
    #[serde(default)]
    pub logic: FilterLogic,
}

impl AdvancedFilter {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        logic: FilterLogic,
        conditions: Vec<FilterCondition>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            conditions,
            logic,
        }
    }
}

/// Filters compiled against one schema. Shared by the sequential and parallel paths.
#[derive(Debug)]
pub(crate) struct CompiledFilters<'a> {
    filters: Vec<(FilterLogic, Vec<CompiledCondition<'a>>)>,
}

impl<'a> CompiledFilters<'a> {
    pub(crate) fn compile(schema: &Schema, filters: &'a [AdvancedFilter]) -> Self {
        let filters = filters
            .iter()
            .map(|f| {
                let conditions = f
                    .conditions
                    .iter()
                    .map(|c| CompiledCondition::compile(schema, c))
                    .collect();
                (f.logic, conditions)
            })
            .collect();
        Self { filters }
    }

    /// `true` if `row` passes every filter.
    pub(crate) fn accepts(&self, row: &[Value]) -> bool {
        self.filters.iter().all(|(logic, conditions)| {
            if conditions.is_empty() {
                // Vacuous truth for AND, vacuous falsity for OR.
                return *logic == FilterLogic::And;
            }
            match logic {
                FilterLogic::And => conditions.iter().all(|c| c.matches(row)),
                FilterLogic::Or => conditions.iter().any(|c| c.matches(row)),
            }
        })
    }
}

/// Builds the result dataset of a filter run: same schema, id suffixed with `_filtered`.
pub(crate) fn filtered_dataset(dataset: &DataSet, rows: Vec<Vec<Value>>) -> DataSet {
    let mut out = dataset.derive(dataset.schema.clone(), rows);
    out.id = format!("{}_filtered", dataset.id);
    out
}

/// Returns the rows of `dataset` that satisfy all `filters`, in their original order.
///
/// Fails only with [`crate::EngineError::InvalidInput`] when `dataset` itself is malformed.
pub fn apply_filters(dataset: &DataSet, filters: &[AdvancedFilter]) -> EngineResult<DataSet> {
    dataset.validate()?;
    let compiled = CompiledFilters::compile(&dataset.schema, filters);
    let rows = dataset
        .rows
        .iter()
        .filter(|row| compiled.accepts(row))
        .cloned()
        .collect();
    Ok(filtered_dataset(dataset, rows))
}

#[cfg(test)]
mod tests {
    use super::{AdvancedFilter, FilterCondition, FilterLogic, FilterOperator, apply_filters};
    use crate::types::{Column, DataSet, DataType, Schema, Value};

    fn sample_dataset() -> DataSet {
        let schema = Schema::new(vec![
            Column::new("region", DataType::Utf8),
            Column::new("sales", DataType::Int64),
        ]);
        let rows = vec![
            vec![Value::from("east"), Value::Int64(5)],
            vec![Value::from("west"), Value::Int64(50)],
            vec![Value::from("east"), Value::Int64(500)],
            vec![Value::from("north"), Value::Int64(7)],
        ];
        DataSet::new(schema, rows).with_id("sales")
    }

    fn regions(ds: &DataSet) -> Vec<String> {
        ds.rows.iter().map(|r| r[0].to_string()).collect()
    }

    #[test]
    fn and_requires_every_condition() {
        let ds = sample_dataset();
        let f = AdvancedFilter::new(
            "f1",
            "east big",
            FilterLogic::And,
            vec![
                FilterCondition::new("region", FilterOperator::Equals, "east"),
                FilterCondition::new("sales", FilterOperator::GreaterThan, 10),
            ],
        );
        let out = apply_filters(&ds, &[f]).unwrap();
        assert_eq!(out.rows, vec![vec![Value::from("east"), Value::Int64(500)]]);
        assert_eq!(out.id, "sales_filtered");
        assert_eq!(out.schema, ds.schema);
    }

    #[test]
    fn or_requires_any_condition() {
        let ds = sample_dataset();
        let f = AdvancedFilter::new(
            "f1",
            "west or tiny",
            FilterLogic::Or,
            vec![
                FilterCondition::new("region", FilterOperator::Equals, "west"),
                FilterCondition::new("sales", FilterOperator::LessThan, 6),
            ],
        );
        let out = apply_filters(&ds, &[f]).unwrap();
        assert_eq!(regions(&out), vec!["east", "west"]);
    }

    #[test]
    fn multiple_filters_are_anded_and_order_is_kept() {
        let ds = sample_dataset();
        let not_west = AdvancedFilter::new(
            "a",
            "not west",
            FilterLogic::And,
            vec![FilterCondition::new("region", FilterOperator::NotEquals, "west")],
        );
        let small = AdvancedFilter::new(
            "b",
            "small",
            FilterLogic::And,
            vec![FilterCondition::new("sales", FilterOperator::LessEqual, 100)],
        );
        let out = apply_filters(&ds, &[not_west, small]).unwrap();
        assert_eq!(regions(&out), vec!["east", "north"]);
    }

    #[test]
    fn empty_condition_lists_are_explicit() {
        let ds = sample_dataset();
        let all = AdvancedFilter::new("a", "empty and", FilterLogic::And, vec![]);
        let none = AdvancedFilter::new("o", "empty or", FilterLogic::Or, vec![]);
        assert_eq!(apply_filters(&ds, &[all]).unwrap().row_count(), 4);
        assert_eq!(apply_filters(&ds, &[none]).unwrap().row_count(), 0);
    }

    #[test]
    fn no_filters_keeps_everything() {
        let ds = sample_dataset();
        let out = apply_filters(&ds, &[]).unwrap();
        assert_eq!(out.rows, ds.rows);
    }

    #[test]
    fn malformed_dataset_is_rejected() {
        let mut ds = sample_dataset();
        ds.rows[1].pop();
        let err = apply_filters(&ds, &[]).unwrap_err();
        assert!(err.to_string().contains("invalid input"));
    }

    #[test]
    fn filter_json_uses_dashboard_field_names() {
        let json = r#"{
            "id": "f1",
            "name": "mid range",
            "logic": "OR",
            "conditions": [
                {"field": "sales", "operator": "between", "value": 5, "secondValue": 7},
                {"field": "region", "operator": "in", "value": ["west"]}
            ]
        }"#;
        let f: AdvancedFilter = serde_json::from_str(json).unwrap();
        assert_eq!(f.logic, FilterLogic::Or);
        let out = apply_filters(&sample_dataset(), &[f]).unwrap();
        assert_eq!(regions(&out), vec!["east", "west", "north"]);
    }
}
