//! Saved filter and transformation configuration.
//!
//! The dashboard persists a dataset's filters and pipeline steps as one JSON document. Field
//! names are camelCase (`secondValue`, `sourceColumn`, `groupBy`, ...) and both lists are
//! optional:
//!
//! ```json
//! {
//!   "filters": [
//!     {"id": "f1", "name": "Big orders", "logic": "AND",
//!      "conditions": [{"field": "amount", "operator": "greater_than", "value": 100}]}
//!   ],
//!   "transformations": [
//!     {"id": "t1", "type": "aggregate_sum", "sourceColumn": "amount",
//!      "parameters": {"groupBy": "region"}}
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::filter::{AdvancedFilter, apply_filters};
use crate::processing::{DataTransformation, apply_transformations};
use crate::types::DataSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub filters: Vec<AdvancedFilter>,
    pub transformations: Vec<DataTransformation>,
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> EngineResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Filters `dataset`, then runs the transformations over the filtered rows.
    ///
    /// With no transformations the filtered dataset is returned as is (id suffixed
    /// `_filtered` only).
    pub fn apply(&self, dataset: &DataSet) -> EngineResult<DataSet> {
        let filtered = apply_filters(dataset, &self.filters)?;
        if self.transformations.is_empty() {
            return Ok(filtered);
        }
        apply_transformations(&filtered, &self.transformations)
    }
}
