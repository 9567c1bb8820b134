// src/metrics/prompt.rs
use serde_json::{json, Value};

use crate::metrics::schema::{BASINS_KEY, BASIN_FIELDS, CATEGORIES, NOT_FOUND, PERIOD_FIELDS};
use crate::rag::Chunk;

const PRINCIPLES: &str = "\
You are a financial data extraction specialist for SEC 10-Q and 10-K filings.

RULES:
1. Extract ONLY factual numeric data explicitly stated in the context.
2. NEVER infer, calculate, or approximate values.
3. Combine value and unit into a SINGLE string (e.g. \"148.4 MBbl/d\", \"$1,234 million\").
4. Use the literal string \"Not found\" for any field that cannot be determined from the context.
5. Return exactly one JSON object matching the schema below. No other text.

UNITS:
- Production: MBbl/d, MMBbl, MMcf/d, Bcf, MBoe/d, MMBoe
- Revenue: \"$X million\"; per-unit prices: $/Bbl, $/Mcf, $/BOE
- Costs: $/BOE or \"$X million\" for capital expenditures
- Activity: \"X rigs\", \"X wells\", \"X feet\", \"X%\"
- Match the document's scale; do not convert between scales.

BASINS:
- Report the same production metrics broken down by basin or segment, using
  the exact basin names the document uses (e.g. Delaware Basin, Midland Basin,
  Eagle Ford, Anadarko, Marcellus, Uinta). Include every basin that has data;
  use \"Not found\" for a basin's missing metrics.";

/// Builds the single extraction prompt: fixed instruction block with the full
/// schema skeleton, the retrieved chunks in retrieval order, and the task
/// directive.
pub fn build_extraction_prompt(chunks: &[&Chunk], form_type: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(PRINCIPLES);
    prompt.push_str("\n\nOUTPUT JSON SCHEMA (example values show the expected format):\n");
    prompt.push_str(
        &serde_json::to_string_pretty(&schema_skeleton())
            .expect("schema skeleton always serializes"),
    );

    prompt.push_str("\n\nCONTEXT:\n");
    for chunk in chunks {
        prompt.push_str("---\n");
        prompt.push_str(&chunk.text);
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "\nTASK:\nExtract all oil & gas operational and financial metrics from this {} filing \
         using the context above. Return a single JSON object matching the schema exactly, \
         with \"{}\" for anything the context does not state.\n",
        form_type, NOT_FOUND
    ));

    prompt
}

/// JSON skeleton generated from the schema so the prompt always names every
/// category and field the coercion pass expects.
fn schema_skeleton() -> Value {
    let mut root = serde_json::Map::new();

    for field in PERIOD_FIELDS {
        root.insert(field.key.to_string(), json!(field.example));
    }

    for category in CATEGORIES {
        let mut fields = serde_json::Map::new();
        for field in category.fields {
            fields.insert(field.key.to_string(), json!(field.example));
        }
        root.insert(category.key.to_string(), Value::Object(fields));
    }

    // One worked basin plus one all-sentinel basin, mirroring real output.
    let mut example_basin = serde_json::Map::new();
    let mut empty_basin = serde_json::Map::new();
    for field in BASIN_FIELDS {
        example_basin.insert(field.key.to_string(), json!(field.example));
        empty_basin.insert(field.key.to_string(), json!(NOT_FOUND));
    }
    root.insert(
        BASINS_KEY.to_string(),
        json!({
            "Delaware Basin": Value::Object(example_basin),
            "Midland Basin": Value::Object(empty_basin),
        }),
    );

    Value::Object(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, offset: usize) -> Chunk {
        Chunk {
            text: text.to_string(),
            offset,
        }
    }

    #[test]
    fn test_prompt_names_every_schema_field() {
        let prompt = build_extraction_prompt(&[], "10-Q");
        for category in CATEGORIES {
            assert!(prompt.contains(category.key), "missing category {}", category.key);
            for field in category.fields {
                assert!(prompt.contains(field.key), "missing field {}", field.key);
            }
        }
        assert!(prompt.contains("time_period"));
        assert!(prompt.contains(BASINS_KEY));
    }

    #[test]
    fn test_prompt_contains_chunks_in_order() {
        let first = chunk("first chunk about oil production", 0);
        let second = chunk("second chunk about capital expenditures", 100);
        let prompt = build_extraction_prompt(&[&first, &second], "10-K");

        let a = prompt.find("first chunk about oil production").unwrap();
        let b = prompt.find("second chunk about capital expenditures").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_prompt_carries_sentinel_directive_and_form() {
        let prompt = build_extraction_prompt(&[], "10-K");
        assert!(prompt.contains(NOT_FOUND));
        assert!(prompt.contains("10-K filing"));
        assert!(prompt.contains("single JSON object"));
    }
}
