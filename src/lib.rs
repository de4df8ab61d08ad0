//! `dashboard-data-engine` is the data core of a business-intelligence dashboard: a filter
//! engine and a transformation pipeline over an in-memory [`types::DataSet`].
//!
//! Data arrives from an upload or a remote fetcher as a [`types::DataSet`] (ordered columns plus
//! rows of [`types::Value`]s). The caller then:
//!
//! 1. narrows it with named, composable filters ([`filter::apply_filters`]), and
//! 2. reshapes it with an ordered list of steps ([`processing::apply_transformations`]):
//!    aggregations, grouping, sorting, pivot/unpivot, calculated fields, date-part extraction,
//!    currency conversion, string edits and number formatting.
//!
//! Both are pure functions of their inputs: the input dataset is borrowed and never modified,
//! and the same input always yields the same output. Bad data degrades locally (an unparsable
//! date or a failing formula becomes `Null` for that row, an unknown step is skipped); only a
//! structurally invalid dataset is reported as an [`EngineError`].
//!
//! ## Filter, then transform
//!
//! ```rust
//! use dashboard_data_engine::filter::{apply_filters, AdvancedFilter, FilterCondition, FilterLogic, FilterOperator};
//! use dashboard_data_engine::processing::{apply_transformations, DataTransformation, TransformParameters, TransformationKind};
//! use dashboard_data_engine::types::{Column, DataSet, DataType, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Column::new("region", DataType::Utf8),
//!     Column::new("revenue", DataType::Float64),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::from("east"), Value::Float64(120.0)],
//!         vec![Value::from("west"), Value::Float64(40.0)],
//!         vec![Value::from("east"), Value::Float64(80.0)],
//!     ],
//! )
//! .with_id("sales");
//!
//! let filters = vec![AdvancedFilter::new(
//!     "f1",
//!     "Meaningful orders",
//!     FilterLogic::And,
//!     vec![FilterCondition::new("revenue", FilterOperator::GreaterEqual, 50)],
//! )];
//! let filtered = apply_filters(&ds, &filters).unwrap();
//! assert_eq!(filtered.id, "sales_filtered");
//! assert_eq!(filtered.row_count(), 2);
//!
//! let steps = vec![DataTransformation::new("t1", TransformationKind::AggregateSum, "revenue")
//!     .with_parameters(TransformParameters {
//!         group_by: Some("region".to_string()),
//!         ..Default::default()
//!     })];
//! let totals = apply_transformations(&filtered, &steps).unwrap();
//! assert_eq!(totals.rows, vec![vec![Value::from("east"), Value::Float64(200.0)]]);
//! ```
//!
//! ## Modules
//!
//! - [`types`]: schema, values and the dataset type
//! - [`filter`]: conditions, operators and filter composition
//! - [`processing`]: the transformation pipeline and its steps
//! - [`formula`]: the arithmetic formula language used by calculated fields
//! - [`metrics`]: headline financial figures (revenue, profit, margin, growth)
//! - [`config`]: saved filter/transformation configuration (JSON)
//! - [`ingestion`]: CSV/JSON ingestion producing datasets, with observer hooks
//! - [`execution`]: a rayon-backed engine for parallel filtering and observed pipeline runs
//! - [`error`]: the crate error type

pub mod config;
pub mod error;
pub mod execution;
pub mod filter;
pub mod formula;
pub mod ingestion;
pub mod metrics;
pub mod processing;
pub mod types;

pub use config::PipelineConfig;
pub use error::{EngineError, EngineResult};
pub use filter::apply_filters;
pub use metrics::{FinancialMetrics, calculate_financial_metrics};
pub use processing::apply_transformations;
