//! Headline financial figures for a dataset.
//!
//! Columns are located by name: the first column, in schema order, whose lower-cased name
//! contains any of the candidate words listed below.

use serde::Serialize;

use crate::processing::parse_date;
use crate::types::{DataSet, DataType, Schema, cell};

const REVENUE_CANDIDATES: &[&str] = &["revenue", "sales", "income", "amount", "total"];
const PROFIT_CANDIDATES: &[&str] = &["profit", "earnings", "net"];
const DATE_CANDIDATES: &[&str] = &["date", "time", "period", "month", "day", "year"];

/// Summary figures; a field is `None` when the column it needs cannot be found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetrics {
    pub total_revenue: Option<f64>,
    pub avg_revenue: Option<f64>,
    pub total_profit: Option<f64>,
    /// Percent of revenue; `0` when revenue is `0`.
    pub profit_margin: Option<f64>,
    /// Percent change from the earliest to the latest revenue by date; `0` when the earliest is
    /// `0` or fewer than two dated rows exist.
    pub growth_rate: Option<f64>,
}

fn find_column(schema: &Schema, candidates: &[&str]) -> Option<usize> {
    schema.field_names().position(|name| {
        let name = name.to_lowercase();
        candidates.iter().any(|c| name.contains(c))
    })
}

fn find_date_column(schema: &Schema) -> Option<usize> {
    find_column(schema, DATE_CANDIDATES)
        .or_else(|| schema.fields.iter().position(|f| f.data_type == DataType::Date))
}

/// Computes revenue, profit, margin and growth. Non-numeric cells count as `0`.
pub fn calculate_financial_metrics(dataset: &DataSet) -> FinancialMetrics {
    let schema = &dataset.schema;
    let revenue_idx = find_column(schema, REVENUE_CANDIDATES);
    let profit_idx = find_column(schema, PROFIT_CANDIDATES);

    let column_sum =
        |idx: usize| -> f64 { dataset.rows.iter().map(|r| cell(r, Some(idx)).to_number_or_zero()).sum() };

    let mut metrics = FinancialMetrics::default();

    if let Some(idx) = revenue_idx {
        let total = column_sum(idx);
        metrics.total_revenue = Some(total);
        metrics.avg_revenue = Some(if dataset.rows.is_empty() {
            0.0
        } else {
            total / dataset.rows.len() as f64
        });
        if let Some(date_idx) = find_date_column(schema) {
            metrics.growth_rate = Some(growth_rate(dataset, idx, date_idx));
        }
    }

    if let Some(idx) = profit_idx {
        let profit = column_sum(idx);
        metrics.total_profit = Some(profit);
        if let Some(revenue) = metrics.total_revenue {
            metrics.profit_margin = Some(if revenue == 0.0 { 0.0 } else { profit / revenue * 100.0 });
        }
    }

    metrics
}

fn growth_rate(dataset: &DataSet, revenue_idx: usize, date_idx: usize) -> f64 {
    let mut dated: Vec<_> = dataset
        .rows
        .iter()
        .filter_map(|r| {
            parse_date(cell(r, Some(date_idx)))
                .map(|d| (d, cell(r, Some(revenue_idx)).to_number_or_zero()))
        })
        .collect();
    if dated.len() < 2 {
        return 0.0;
    }
    dated.sort_by_key(|(d, _)| *d);

    let first = dated[0].1;
    let last = dated[dated.len() - 1].1;
    if first == 0.0 {
        0.0
    } else {
        (last - first) / first * 100.0
    }
}
