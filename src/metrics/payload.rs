// src/metrics/payload.rs
use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::metrics::schema::{BASINS_KEY, CATEGORIES, NOT_FOUND};

/// Canonical extraction result for one filing. Created once by the extraction
/// engine, immutable thereafter; the export sinks only read it.
///
/// Invariant: every field the schema defines is present, holding either a
/// formatted "value + unit" string or the [`NOT_FOUND`] sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPayload {
    pub time_period: String,
    pub quarter: String,
    pub year: String,
    /// category key -> field key -> formatted value.
    pub categories: BTreeMap<String, BTreeMap<String, String>>,
    /// basin name -> field key -> formatted value. Open-ended: whatever basin
    /// names the model reported are kept as-is.
    pub basins: BTreeMap<String, BTreeMap<String, String>>,
}

impl MetricPayload {
    /// Value of one fixed-category field; the sentinel when a category or
    /// field is somehow absent.
    pub fn field(&self, category: &str, key: &str) -> &str {
        self.categories
            .get(category)
            .and_then(|fields| fields.get(key))
            .map(String::as_str)
            .unwrap_or(NOT_FOUND)
    }

    /// Value of one basin field; the sentinel when absent.
    pub fn basin_field(&self, basin: &str, key: &str) -> &str {
        self.basins
            .get(basin)
            .and_then(|fields| fields.get(key))
            .map(String::as_str)
            .unwrap_or(NOT_FOUND)
    }

    /// JSON rendering of the payload, grouped by category with the basin
    /// mapping nested under its own key.
    pub fn to_json(&self) -> Value {
        let mut root = serde_json::Map::new();
        root.insert("time_period".to_string(), json!(self.time_period));
        root.insert("quarter".to_string(), json!(self.quarter));
        root.insert("year".to_string(), json!(self.year));

        for category in CATEGORIES {
            let mut fields = serde_json::Map::new();
            for field in category.fields {
                fields.insert(
                    field.key.to_string(),
                    json!(self.field(category.key, field.key)),
                );
            }
            root.insert(category.key.to_string(), Value::Object(fields));
        }

        let mut basins = serde_json::Map::new();
        for (name, basin_fields) in &self.basins {
            let mut fields = serde_json::Map::new();
            for (key, value) in basin_fields {
                fields.insert(key.clone(), json!(value));
            }
            basins.insert(name.clone(), Value::Object(fields));
        }
        root.insert(BASINS_KEY.to_string(), Value::Object(basins));

        Value::Object(root)
    }
}
