// src/metrics/parse.rs
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::metrics::payload::MetricPayload;
use crate::metrics::schema::{FieldSpec, BASINS_KEY, BASIN_FIELDS, CATEGORIES, NOT_FOUND};
use crate::utils::error::ReplyParseError;

// Models sometimes wrap the JSON in a markdown code fence.
static JSON_FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("Failed to compile JSON_FENCE_RE")
});

/// Parses a model reply into a JSON object.
///
/// Tries the reply as-is first; on failure makes one recovery pass that
/// strips code fences or surrounding prose and re-parses. A reply that still
/// cannot be recovered fails with the raw text attached for diagnostics. No
/// payload is ever fabricated from an unparseable reply.
pub fn parse_model_reply(reply: &str) -> Result<Value, ReplyParseError> {
    let trimmed = reply.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() {
            return Ok(value);
        }
    }

    // Recovery pass 1: content of a markdown code fence.
    if let Some(captures) = JSON_FENCE_RE.captures(trimmed) {
        let fenced = captures.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        if let Ok(value) = serde_json::from_str::<Value>(fenced) {
            if value.is_object() {
                tracing::debug!("Recovered JSON object from code fence");
                return Ok(value);
            }
        }
    }

    // Recovery pass 2: outermost braces, dropping leading/trailing prose.
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                if value.is_object() {
                    tracing::debug!("Recovered JSON object from wrapped reply");
                    return Ok(value);
                }
            }
        }
    }

    Err(ReplyParseError {
        message: "no JSON object found after recovery pass".to_string(),
        raw_reply: reply.to_string(),
    })
}

/// Walks the schema over a parsed reply and produces a fully-populated
/// payload: every defined field present, absences filled with the sentinel,
/// present values passed through as strings without reinterpretation.
pub fn coerce_payload(value: &Value) -> MetricPayload {
    let mut categories = BTreeMap::new();
    for category in CATEGORIES {
        let group = value.get(category.key);
        let mut fields = BTreeMap::new();
        for field in category.fields {
            let field_value = group.and_then(|g| g.get(field.key));
            fields.insert(field.key.to_string(), coerce_value(field_value));
        }
        categories.insert(category.key.to_string(), fields);
    }

    // Basin names are open: copy whatever the model reported, back-filling
    // the expected production fields and keeping any extra string fields.
    let mut basins = BTreeMap::new();
    if let Some(reported) = value.get(BASINS_KEY).and_then(Value::as_object) {
        for (name, sub_record) in reported {
            basins.insert(name.clone(), coerce_basin(sub_record, BASIN_FIELDS));
        }
    }

    MetricPayload {
        time_period: coerce_value(value.get("time_period")),
        quarter: coerce_value(value.get("quarter")),
        year: coerce_value(value.get("year")),
        categories,
        basins,
    }
}

fn coerce_basin(sub_record: &Value, fields: &[FieldSpec]) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for field in fields {
        out.insert(
            field.key.to_string(),
            coerce_value(sub_record.get(field.key)),
        );
    }
    if let Some(extra) = sub_record.as_object() {
        for (key, value) in extra {
            out.entry(key.clone()).or_insert_with(|| coerce_value(Some(value)));
        }
    }
    out
}

/// Passes strings through untouched; formats stray scalars instead of
/// reinterpreting them; everything else becomes the sentinel.
fn coerce_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => NOT_FOUND.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_json_object() {
        let value = parse_model_reply(r#"{"production": {"oil_production_mbbl_per_day": "148.4 MBbl/d"}}"#)
            .unwrap();
        assert!(value.get("production").is_some());
    }

    #[test]
    fn test_parse_recovers_from_code_fence() {
        let reply = "```json\n{\"quarter\": \"Q2\"}\n```";
        let value = parse_model_reply(reply).unwrap();
        assert_eq!(value.get("quarter").and_then(Value::as_str), Some("Q2"));
    }

    #[test]
    fn test_parse_recovers_from_surrounding_prose() {
        let reply = "Here is the JSON: {\"production\": {\"oil_production_mbbl_per_day\": \"148.4 MBbl/d\"}} Thanks!";
        let value = parse_model_reply(reply).unwrap();
        assert_eq!(
            value
                .pointer("/production/oil_production_mbbl_per_day")
                .and_then(Value::as_str),
            Some("148.4 MBbl/d")
        );
    }

    #[test]
    fn test_parse_rejects_non_object_reply() {
        let result = parse_model_reply("[1, 2, 3]");
        assert!(result.is_err());
    }

    #[test]
    fn test_unrecoverable_reply_keeps_raw_text() {
        let reply = "The filing does not disclose production data.";
        let err = parse_model_reply(reply).unwrap_err();
        assert_eq!(err.raw_reply, reply);
    }

    #[test]
    fn test_coerce_fills_missing_category_with_sentinel() {
        // Reply missing the whole activity category.
        let value = json!({
            "time_period": "Three months ended June 30, 2025",
            "production": {"oil_production_mbbl_per_day": "148.4 MBbl/d"}
        });
        let payload = coerce_payload(&value);

        assert_eq!(
            payload.field("production", "oil_production_mbbl_per_day"),
            "148.4 MBbl/d"
        );
        for field in crate::metrics::schema::ACTIVITY_FIELDS {
            assert_eq!(payload.field("activity", field.key), NOT_FOUND);
        }
    }

    #[test]
    fn test_coerce_formats_stray_numbers() {
        let value = json!({"activity": {"drilling_rigs": 19}});
        let payload = coerce_payload(&value);
        assert_eq!(payload.field("activity", "drilling_rigs"), "19");
    }

    #[test]
    fn test_coerce_keeps_unknown_basins_verbatim() {
        let value = json!({
            "basins": {
                "Delaware Basin": {"oil_production_mbbl_per_day": "216 MBbl/d"},
                "Uinta": {"oil_production_mbbl_per_day": "12 MBbl/d", "rig_note": "2 rigs running"}
            }
        });
        let payload = coerce_payload(&value);

        assert_eq!(payload.basins.len(), 2);
        assert_eq!(
            payload.basin_field("Delaware Basin", "oil_production_mbbl_per_day"),
            "216 MBbl/d"
        );
        // Missing basin fields are back-filled.
        assert_eq!(
            payload.basin_field("Delaware Basin", "gas_production_mmcf_per_day"),
            NOT_FOUND
        );
        // Extra fields inside a basin sub-record survive.
        assert_eq!(payload.basin_field("Uinta", "rig_note"), "2 rigs running");
    }

    #[test]
    fn test_coerce_empty_reply_is_all_sentinels() {
        let payload = coerce_payload(&json!({}));
        for category in CATEGORIES {
            for field in category.fields {
                assert_eq!(payload.field(category.key, field.key), NOT_FOUND);
            }
        }
        assert_eq!(payload.time_period, NOT_FOUND);
        assert!(payload.basins.is_empty());
    }

    #[test]
    fn test_non_sentinel_values_are_non_empty() {
        let value = json!({"revenue": {"oil_revenue": "   ", "gas_revenue": "$1,499 million"}});
        let payload = coerce_payload(&value);
        // Whitespace-only strings collapse to the sentinel.
        assert_eq!(payload.field("revenue", "oil_revenue"), NOT_FOUND);
        assert_eq!(payload.field("revenue", "gas_revenue"), "$1,499 million");
    }
}
