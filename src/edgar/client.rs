// src/edgar/client.rs
use std::time::Duration;

use reqwest::header;

use crate::config::EdgarConfig;
use crate::edgar::models::{catalog_lookup, CompanySubmission, FilingRecord, FilingType};
use crate::utils::error::EdgarError;

// SEC asks for 10 requests/second max. Be conservative. >100ms delay.
const EDGAR_REQUEST_DELAY_MS: u64 = 150;
// Index queries and document fetches are bounded well below the model call.
const FETCH_TIMEOUT_SECS: u64 = 60;

/// Client for the SEC EDGAR filing index and document archive. Holds one
/// configured reqwest client; the mandatory User-Agent comes from config.
pub struct EdgarClient {
    http: reqwest::Client,
}

impl EdgarClient {
    pub fn new(config: &EdgarConfig) -> Result<Self, EdgarError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;
        Ok(Self { http })
    }

    async fn throttle(&self) {
        tokio::time::sleep(Duration::from_millis(EDGAR_REQUEST_DELAY_MS)).await;
    }

    /// Gets the 10-digit CIK for a ticker symbol. Catalog companies resolve
    /// locally; anything else goes through the public ticker index.
    pub async fn cik_for_ticker(&self, ticker: &str) -> Result<String, EdgarError> {
        if let Some((_, cik)) = catalog_lookup(ticker) {
            return Ok(cik.to_string());
        }

        let ticker = ticker.to_uppercase();
        let url = "https://www.sec.gov/files/company_tickers.json";

        self.throttle().await;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(EdgarError::Http(response.status()));
        }

        let json: serde_json::Value = response.json().await?;
        let companies = json
            .as_object()
            .ok_or_else(|| EdgarError::Parse("Invalid ticker index structure".to_string()))?;

        for company in companies.values() {
            let company_ticker = company
                .get("ticker")
                .and_then(|t| t.as_str())
                .unwrap_or_default();
            if company_ticker.to_uppercase() == ticker {
                let cik = company
                    .get("cik_str")
                    .and_then(|c| c.as_u64())
                    .ok_or_else(|| EdgarError::Parse("Invalid CIK format".to_string()))?;
                // Format CIK with leading zeros to 10 digits
                return Ok(format!("{:010}", cik));
            }
        }

        Err(EdgarError::UnknownTicker(ticker))
    }

    /// Fetches the company submission index for a given CIK.
    pub async fn company_submissions(&self, cik: &str) -> Result<CompanySubmission, EdgarError> {
        let url = format!("https://data.sec.gov/submissions/CIK{}.json", cik);

        self.throttle().await;
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(EdgarError::Http(response.status()));
        }

        let submission: CompanySubmission = response.json().await?;
        Ok(submission)
    }

    /// Finds recent filings of the given form for a ticker, newest first.
    pub async fn find_filings(
        &self,
        ticker: &str,
        form_type: FilingType,
        limit: usize,
    ) -> Result<Vec<FilingRecord>, EdgarError> {
        let cik = self.cik_for_ticker(ticker).await?;
        let submissions = self.company_submissions(&cik).await?;
        let recent = &submissions.filings.recent;

        let mut filings = Vec::new();
        for i in 0..recent.accession_number.len() {
            let form = recent
                .form
                .get(i)
                .ok_or_else(|| EdgarError::Parse("Missing form type".to_string()))?;
            if form != form_type.as_str() {
                continue;
            }

            let filing_date = recent
                .filing_date
                .get(i)
                .ok_or_else(|| EdgarError::Parse("Missing filing date".to_string()))?;
            let accession = recent
                .accession_number
                .get(i)
                .ok_or_else(|| EdgarError::Parse("Missing accession number".to_string()))?;
            let primary_doc = recent
                .primary_document
                .get(i)
                .ok_or_else(|| EdgarError::Parse("Missing primary document".to_string()))?;

            filings.push(FilingRecord {
                ticker: ticker.to_uppercase(),
                cik: cik.clone(),
                company_name: submissions.name.clone(),
                form_type: form_type.as_str().to_string(),
                filing_date: filing_date.clone(),
                accession_number: accession.clone(),
                primary_doc: primary_doc.clone(),
            });
        }

        // ISO dates sort lexicographically; newest first.
        filings.sort_by(|a, b| b.filing_date.cmp(&a.filing_date));
        filings.truncate(limit);

        Ok(filings)
    }

    /// Downloads a filing document from its URL.
    /// Includes the mandatory User-Agent and basic rate limiting.
    pub async fn download_document(&self, url: &str) -> Result<String, EdgarError> {
        let url = rewrite_inline_viewer_url(url);
        tracing::info!("Downloading document from: {}", url);

        self.throttle().await;
        let response = self
            .http
            .get(&url)
            // SEC uses various content types, but often text/html for filings
            .header(header::ACCEPT, "application/xml,text/html,text/plain,*/*")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            if status == reqwest::StatusCode::FORBIDDEN {
                tracing::warn!("Received 403 Forbidden - check User-Agent and rate limits.");
                return Err(EdgarError::RateLimited);
            }
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(EdgarError::DocumentNotFound(url));
            }
            return Err(EdgarError::Http(status));
        }

        let body = response.text().await?;
        tracing::debug!("Downloaded {} bytes from {}", body.len(), url);

        Ok(body)
    }
}

/// Rewrites inline-XBRL viewer links (`/ix?doc=/Archives/...`) to the plain
/// document path the viewer wraps.
pub fn rewrite_inline_viewer_url(url: &str) -> String {
    if let Some(idx) = url.find("/ix?doc=") {
        let doc_path = &url[idx + "/ix?doc=".len()..];
        if doc_path.starts_with('/') {
            return format!("https://www.sec.gov{}", doc_path);
        }
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_inline_viewer_url() {
        let wrapped = "https://www.sec.gov/ix?doc=/Archives/edgar/data/1539838/000153983825000123/fang-20250630.htm";
        assert_eq!(
            rewrite_inline_viewer_url(wrapped),
            "https://www.sec.gov/Archives/edgar/data/1539838/000153983825000123/fang-20250630.htm"
        );
    }

    #[test]
    fn test_rewrite_leaves_plain_urls_alone() {
        let plain = "https://www.sec.gov/Archives/edgar/data/1539838/doc.htm";
        assert_eq!(rewrite_inline_viewer_url(plain), plain);
    }
}
