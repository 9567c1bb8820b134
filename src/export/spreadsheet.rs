// src/export/spreadsheet.rs
use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Workbook, Worksheet};

use crate::edgar::FilingRecord;
use crate::metrics::schema::{CategorySpec, FieldSpec, BASIN_FIELDS, CATEGORIES};
use crate::metrics::MetricPayload;
use crate::utils::error::ExportError;

const IDENTITY_HEADERS: &[&str] = &["Ticker", "Company Name", "Filing Type", "Filing Date"];

/// Writes one workbook per filing: a worksheet per metric category, a
/// per-basin breakdown sheet, and a company summary sheet.
pub struct WorkbookWriter {
    output_dir: PathBuf,
}

impl WorkbookWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self, ExportError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Builds and saves the workbook. The deterministic file name makes
    /// re-submission of the same filing a rewrite, never a duplicate.
    pub fn write(
        &self,
        record: &FilingRecord,
        payload: &MetricPayload,
    ) -> Result<PathBuf, ExportError> {
        let mut workbook = Workbook::new();

        for category in CATEGORIES {
            let sheet = workbook.add_worksheet();
            sheet.set_name(sheet_name(category))?;
            write_category_sheet(sheet, category, record, payload)?;
        }

        let basin_sheet = workbook.add_worksheet();
        basin_sheet.set_name("Basin Production")?;
        write_basin_sheet(basin_sheet, record, payload)?;

        let summary = workbook.add_worksheet();
        summary.set_name("Company Summary")?;
        write_summary_sheet(summary, record, payload)?;

        let path = self.output_dir.join(format!("{}.xlsx", record.file_stem()));
        workbook.save(&path)?;

        tracing::info!("Saved workbook to {}", path.display());
        Ok(path)
    }
}

fn sheet_name(category: &CategorySpec) -> &'static str {
    match category.key {
        "production" => "Production Data",
        "activity" => "Activity & Wells",
        "revenue" => "Revenue",
        "prices" => "Realized Prices",
        "costs" => "Costs",
        other => other,
    }
}

fn write_header_row(sheet: &mut Worksheet, headers: &[String]) -> Result<(), ExportError> {
    for (col, header) in headers.iter().enumerate() {
        let col = col as u16;
        sheet.write_string(0, col, header.as_str())?;
        // Minimum 15, padded to the header, capped so one long label does
        // not blow up the layout.
        let width = (header.len() + 3).clamp(15, 60) as f64;
        sheet.set_column_width(col, width)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn identity_cells(record: &FilingRecord) -> Vec<String> {
    vec![
        record.ticker.clone(),
        record.company_name.clone(),
        record.form_type.clone(),
        record.filing_date.clone(),
    ]
}

fn write_category_sheet(
    sheet: &mut Worksheet,
    category: &CategorySpec,
    record: &FilingRecord,
    payload: &MetricPayload,
) -> Result<(), ExportError> {
    let mut headers: Vec<String> = IDENTITY_HEADERS.iter().map(|h| h.to_string()).collect();
    headers.push("Quarter".to_string());
    headers.push("Year".to_string());
    headers.extend(category.fields.iter().map(|f| f.label.to_string()));
    write_header_row(sheet, &headers)?;

    let mut row = identity_cells(record);
    row.push(payload.quarter.clone());
    row.push(payload.year.clone());
    for field in category.fields {
        row.push(payload.field(category.key, field.key).to_string());
    }
    write_data_row(sheet, 1, &row)?;
    Ok(())
}

fn write_basin_sheet(
    sheet: &mut Worksheet,
    record: &FilingRecord,
    payload: &MetricPayload,
) -> Result<(), ExportError> {
    let mut headers: Vec<String> = IDENTITY_HEADERS.iter().map(|h| h.to_string()).collect();
    headers.push("Basin Name".to_string());
    headers.extend(BASIN_FIELDS.iter().map(|f: &FieldSpec| f.label.to_string()));
    write_header_row(sheet, &headers)?;

    for (row_idx, basin_name) in payload.basins.keys().enumerate() {
        let mut row = identity_cells(record);
        row.push(basin_name.clone());
        for field in BASIN_FIELDS {
            row.push(payload.basin_field(basin_name, field.key).to_string());
        }
        write_data_row(sheet, (row_idx + 1) as u32, &row)?;
    }
    Ok(())
}

fn write_summary_sheet(
    sheet: &mut Worksheet,
    record: &FilingRecord,
    payload: &MetricPayload,
) -> Result<(), ExportError> {
    let headers = vec![
        "Ticker".to_string(),
        "CIK".to_string(),
        "Company Name".to_string(),
        "Filing Type".to_string(),
        "Filing Date".to_string(),
        "Time Period".to_string(),
    ];
    write_header_row(sheet, &headers)?;

    let row = vec![
        record.ticker.clone(),
        record.cik.clone(),
        record.company_name.clone(),
        record.form_type.clone(),
        record.filing_date.clone(),
        payload.time_period.clone(),
    ];
    write_data_row(sheet, 1, &row)?;
    Ok(())
}

fn write_data_row(sheet: &mut Worksheet, row: u32, cells: &[String]) -> Result<(), ExportError> {
    for (col, cell) in cells.iter().enumerate() {
        sheet.write_string(row, col as u16, cell.as_str())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::parse::coerce_payload;
    use serde_json::json;

    fn test_record() -> FilingRecord {
        FilingRecord {
            ticker: "EOG".to_string(),
            cik: "0000821189".to_string(),
            company_name: "EOG Resources".to_string(),
            form_type: "10-K".to_string(),
            filing_date: "2025-02-27".to_string(),
            accession_number: "0000821189-25-000005".to_string(),
            primary_doc: "eog-20241231.htm".to_string(),
        }
    }

    #[test]
    fn test_workbook_is_written_once_per_filing() {
        let dir = tempfile::tempdir().unwrap();
        let writer = WorkbookWriter::new(dir.path()).unwrap();
        let payload = coerce_payload(&json!({
            "quarter": "Q4",
            "year": "2024",
            "production": {"oil_production_mbbl_per_day": "490.7 MBbl/d"},
            "basins": {
                "Delaware Basin": {"oil_production_mbbl_per_day": "216 MBbl/d"},
                "Eagle Ford": {"oil_production_mbbl_per_day": "160 MBbl/d"}
            }
        }));

        let first = writer.write(&test_record(), &payload).unwrap();
        assert!(first.exists());

        // Same filing again: same path, still exactly one file.
        let second = writer.write(&test_record(), &payload).unwrap();
        assert_eq!(first, second);
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }
}
