// src/export/json.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;

use crate::edgar::FilingRecord;
use crate::metrics::MetricPayload;
use crate::utils::error::ExportError;

/// Writes the canonical per-filing JSON file: filing identity, extraction
/// timestamp, and the full metric payload. This is the interchange format
/// other tools should target.
pub struct JsonWriter {
    output_dir: PathBuf,
}

impl JsonWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self, ExportError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Persists one filing's payload. The file name is derived from the
    /// (company, form, date) identity, so re-submission of the same filing
    /// replaces the previous file instead of duplicating it.
    pub fn write(
        &self,
        record: &FilingRecord,
        payload: &MetricPayload,
    ) -> Result<PathBuf, ExportError> {
        let document = json!({
            "companyName": record.ticker,
            "companyFullName": record.company_name,
            "cik": record.cik,
            "fileType": record.form_type,
            "secFilingDate": record.filing_date,
            "accessionNumber": record.accession_number,
            "documentUrl": record.primary_doc_url(),
            "extractionDate": chrono::Utc::now().to_rfc3339(),
            "data": payload.to_json(),
        });

        let path = self.output_dir.join(format!("{}.json", record.file_stem()));
        let serialized = serde_json::to_string_pretty(&document)
            .map_err(|e| ExportError::Serialization(e.to_string()))?;
        fs::write(&path, serialized)?;

        tracing::info!("Saved metric payload to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::parse::coerce_payload;
    use crate::metrics::schema::CATEGORIES;
    use serde_json::Value;

    fn test_record() -> FilingRecord {
        FilingRecord {
            ticker: "FANG".to_string(),
            cik: "0001539838".to_string(),
            company_name: "Diamondback Energy".to_string(),
            form_type: "10-Q".to_string(),
            filing_date: "2025-08-04".to_string(),
            accession_number: "0001539838-25-000123".to_string(),
            primary_doc: "fang-20250630.htm".to_string(),
        }
    }

    #[test]
    fn test_written_file_carries_identity_and_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let writer = JsonWriter::new(dir.path()).unwrap();
        let payload = coerce_payload(&serde_json::json!({
            "production": {"oil_production_mbbl_per_day": "148.4 MBbl/d"}
        }));

        let path = writer.write(&test_record(), &payload).unwrap();
        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(written["companyName"], "FANG");
        assert_eq!(written["fileType"], "10-Q");
        assert_eq!(written["secFilingDate"], "2025-08-04");
        assert!(written["extractionDate"].as_str().is_some());
        assert_eq!(
            written["data"]["production"]["oil_production_mbbl_per_day"],
            "148.4 MBbl/d"
        );
        for category in CATEGORIES {
            assert!(written["data"][category.key].is_object());
        }
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let writer = JsonWriter::new(dir.path()).unwrap();
        let payload = coerce_payload(&serde_json::json!({}));

        let first = writer.write(&test_record(), &payload).unwrap();
        let second = writer.write(&test_record(), &payload).unwrap();
        assert_eq!(first, second);

        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }
}
