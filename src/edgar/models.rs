// src/edgar/models.rs
use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed catalog of covered oil & gas companies: (ticker, company name, CIK).
/// CIKs are zero-padded to the 10 digits the submissions API expects.
pub const COMPANY_CATALOG: &[(&str, &str, &str)] = &[
    ("FANG", "Diamondback Energy", "0001539838"),
    ("PR", "Permian Resources", "0001658566"),
    ("DVN", "Devon Energy", "0001090012"),
    ("OVV", "Ovintiv", "0001792580"),
    ("CTRA", "Coterra Energy", "0000858470"),
    ("EOG", "EOG Resources", "0000821189"),
    ("SM", "SM Energy", "0000893538"),
    ("VTLE", "Vital Energy", "0001528129"),
    ("MTDR", "Matador Resources", "0001520006"),
    ("OXY", "Occidental Petroleum", "0000797468"),
    ("XOM", "Exxon Mobil", "0000034088"),
];

/// Looks up a catalog company by ticker, returning (company name, CIK).
pub fn catalog_lookup(ticker: &str) -> Option<(&'static str, &'static str)> {
    let ticker = ticker.to_uppercase();
    COMPANY_CATALOG
        .iter()
        .find(|(t, _, _)| *t == ticker)
        .map(|(_, name, cik)| (*name, *cik))
}

/// The two periodic filing forms this pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FilingType {
    #[value(name = "10-q")]
    TenQ,
    #[value(name = "10-k")]
    TenK,
}

impl FilingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilingType::TenQ => "10-Q",
            FilingType::TenK => "10-K",
        }
    }
}

impl fmt::Display for FilingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subset of the EDGAR company submission index this pipeline consumes.
/// Example: https://data.sec.gov/submissions/CIK0000320193.json
#[derive(Debug, Deserialize)]
pub struct CompanySubmission {
    pub name: String,
    pub filings: Filings,
}

#[derive(Debug, Deserialize)]
pub struct Filings {
    pub recent: RecentFilings,
}

/// EDGAR serves the recent-filings index as parallel arrays; entry `i` of each
/// array describes the same filing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFilings {
    pub accession_number: Vec<String>,
    pub filing_date: Vec<String>,
    pub form: Vec<String>,
    pub primary_document: Vec<String>,
}

/// One filing selected for processing. Immutable once built from the index;
/// identifies the single source document the rest of the pipeline works on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingRecord {
    pub ticker: String,
    pub cik: String,
    pub company_name: String,
    pub form_type: String,
    pub filing_date: String,
    pub accession_number: String,
    pub primary_doc: String,
}

impl FilingRecord {
    /// Constructs the URL of the primary document of this filing.
    pub fn primary_doc_url(&self) -> String {
        let acc_no_dashes = self.accession_number.replace('-', "");
        format!(
            "https://www.sec.gov/Archives/edgar/data/{}/{}/{}",
            self.cik, acc_no_dashes, self.primary_doc
        )
    }

    /// Filename-safe stem identifying this filing, e.g. `DiamondbackEnergy_10-Q_2025-08-04`.
    pub fn file_stem(&self) -> String {
        let clean_name: String = self
            .company_name
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '-')
            .collect();
        format!("{}_{}_{}", clean_name, self.form_type, self.filing_date)
    }

    /// Human-readable label used in logs and the end-of-run summary.
    pub fn label(&self) -> String {
        format!("{} {} ({})", self.ticker, self.form_type, self.filing_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_doc_url_strips_accession_dashes() {
        let record = FilingRecord {
            ticker: "FANG".to_string(),
            cik: "0001539838".to_string(),
            company_name: "Diamondback Energy".to_string(),
            form_type: "10-Q".to_string(),
            filing_date: "2025-08-04".to_string(),
            accession_number: "0001539838-25-000123".to_string(),
            primary_doc: "fang-20250630.htm".to_string(),
        };

        assert_eq!(
            record.primary_doc_url(),
            "https://www.sec.gov/Archives/edgar/data/0001539838/000153983825000123/fang-20250630.htm"
        );
    }

    #[test]
    fn test_file_stem_drops_punctuation() {
        let record = FilingRecord {
            ticker: "XOM".to_string(),
            cik: "0000034088".to_string(),
            company_name: "Exxon Mobil Corp.".to_string(),
            form_type: "10-K".to_string(),
            filing_date: "2025-02-26".to_string(),
            accession_number: "0000034088-25-000010".to_string(),
            primary_doc: "xom-20241231.htm".to_string(),
        };

        assert_eq!(record.file_stem(), "ExxonMobilCorp_10-K_2025-02-26");
    }

    #[test]
    fn test_catalog_lookup_case_insensitive() {
        let (name, cik) = catalog_lookup("fang").expect("FANG should be in the catalog");
        assert_eq!(name, "Diamondback Energy");
        assert_eq!(cik, "0001539838");
        assert!(catalog_lookup("ZZZZ").is_none());
    }

    #[test]
    fn test_catalog_ciks_are_ten_digits() {
        for (ticker, _, cik) in COMPANY_CATALOG {
            assert_eq!(cik.len(), 10, "CIK for {} is not zero-padded", ticker);
        }
    }
}
