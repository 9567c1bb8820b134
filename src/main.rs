// src/main.rs
mod config;
mod edgar;
mod export;
mod extractors;
mod llm;
mod metrics;
mod rag;
mod utils;

use clap::Parser;

use config::AppConfig;
use edgar::models::COMPANY_CATALOG;
use edgar::{EdgarClient, FilingRecord, FilingType};
use export::{JsonWriter, MetricsDb, WorkbookWriter};
use extractors::TextExtractor;
use llm::OpenAiClient;
use metrics::MetricExtractor;
use rag::{ChunkIndex, METRICS_QUERY, RETRIEVAL_K};
use utils::error::{AppError, FilingError};

/// Command Line Interface for the oil & gas filing metrics extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ticker symbol of the company
    #[arg(short, long, required_unless_present = "list_companies")]
    ticker: Option<String>,

    /// Filing form to process; omit to process both 10-Q and 10-K
    #[arg(short, long, value_enum)]
    filing_type: Option<FilingType>,

    /// Number of most-recent filings to process per form
    #[arg(short, long, default_value_t = 1)]
    count: usize,

    /// Output directory for JSON and spreadsheet exports
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// SQLite database URL; falls back to DATABASE_URL, omit both to skip the database sink
    #[arg(long)]
    database_url: Option<String>,

    /// List the built-in company catalog and exit
    #[arg(long)]
    list_companies: bool,

    /// Debug mode - keep the normalized document text next to the exports
    #[arg(short, long)]
    debug: bool,
}

/// Per-filing result for the end-of-run summary.
enum Outcome {
    Succeeded,
    Skipped(String),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    if args.list_companies {
        println!("Available companies:");
        for (ticker, name, cik) in COMPANY_CATALOG {
            println!("  {:6} {:30} CIK {}", ticker, name, cik);
        }
        return Ok(());
    }
    let ticker = match args.ticker {
        Some(ref t) => t.clone(),
        None => return Err(AppError::Config("--ticker is required".to_string())),
    };

    // 3. Build configuration and collaborators once; everything downstream
    //    borrows them.
    let config = AppConfig::from_env(&args.output_dir, args.database_url.clone(), args.debug)?;

    let edgar_client = EdgarClient::new(&config.edgar)?;
    let text_extractor = TextExtractor::new();
    let model = OpenAiClient::new(&config.model)
        .map_err(|e| AppError::Config(format!("Failed to build model client: {}", e)))?;
    let metric_extractor = MetricExtractor::new(model);

    let json_writer = JsonWriter::new(&config.output_dir)?;
    let workbook_writer = WorkbookWriter::new(&config.output_dir)?;
    let db = match &config.database_url {
        Some(url) => {
            let db = MetricsDb::connect(url).await?;
            db.init_schema().await?;
            Some(db)
        }
        None => {
            tracing::info!("No database URL configured; skipping the database sink");
            None
        }
    };

    // 4. Discovery. A failure here means no filings are processed for the
    //    company at all.
    let forms = match args.filing_type {
        Some(form) => vec![form],
        None => vec![FilingType::TenQ, FilingType::TenK],
    };

    let mut filings = Vec::new();
    for form in &forms {
        tracing::info!("Finding {} filings for ticker: {}", form, ticker);
        let found = edgar_client.find_filings(&ticker, *form, args.count).await?;
        tracing::info!("Found {} {} filing(s)", found.len(), form);
        filings.extend(found);
    }

    if filings.is_empty() {
        return Err(AppError::Processing(format!(
            "No filings found for ticker {} with the selected form types",
            ticker
        )));
    }

    // 5. Process each filing sequentially. Stage failures skip the filing,
    //    never the run.
    let mut outcomes: Vec<(String, Outcome)> = Vec::new();
    for filing in &filings {
        tracing::info!("Processing {}", filing.label());

        let outcome = match process_filing(
            filing,
            &edgar_client,
            &text_extractor,
            &metric_extractor,
            &json_writer,
            &workbook_writer,
            db.as_ref(),
            &config,
        )
        .await
        {
            Ok(()) => {
                tracing::info!("Finished {}", filing.label());
                Outcome::Succeeded
            }
            Err(e) => {
                tracing::error!("Skipping {}: {}", filing.label(), e);
                Outcome::Skipped(e.to_string())
            }
        };
        outcomes.push((filing.label(), outcome));
    }

    // 6. Per-filing outcome summary. No failure is silently swallowed.
    let succeeded: Vec<&String> = outcomes
        .iter()
        .filter(|(_, o)| matches!(o, Outcome::Succeeded))
        .map(|(label, _)| label)
        .collect();
    let skipped: Vec<(&String, &String)> = outcomes
        .iter()
        .filter_map(|(label, o)| match o {
            Outcome::Skipped(reason) => Some((label, reason)),
            Outcome::Succeeded => None,
        })
        .collect();

    tracing::info!(
        "Processing finished. Succeeded: {}, Skipped: {}",
        succeeded.len(),
        skipped.len()
    );
    for label in &succeeded {
        tracing::info!("  ok      {}", label);
    }
    for (label, reason) in &skipped {
        tracing::warn!("  skipped {} ({})", label, reason);
    }

    if succeeded.is_empty() {
        return Err(AppError::Processing(format!(
            "All {} selected filings were skipped",
            outcomes.len()
        )));
    }

    Ok(())
}

/// Runs one filing through fetch, text extraction, retrieval, metric
/// extraction, and the three export sinks.
#[allow(clippy::too_many_arguments)]
async fn process_filing(
    record: &FilingRecord,
    edgar_client: &EdgarClient,
    text_extractor: &TextExtractor,
    metric_extractor: &MetricExtractor<OpenAiClient>,
    json_writer: &JsonWriter,
    workbook_writer: &WorkbookWriter,
    db: Option<&MetricsDb>,
    config: &AppConfig,
) -> Result<(), FilingError> {
    let url = record.primary_doc_url();
    let html = edgar_client.download_document(&url).await?;
    tracing::info!("Downloaded document ({} bytes)", html.len());

    let text = text_extractor.extract_text(&html)?;
    if config.debug {
        if let Err(e) = export::write_debug_text(&config.output_dir, record, &text) {
            tracing::warn!("Failed to save debug text: {}", e);
        }
    }

    let index = ChunkIndex::build(&text)?;
    let chunks = index.retrieve(METRICS_QUERY, RETRIEVAL_K);
    tracing::info!("Retrieved {} of {} chunks for extraction", chunks.len(), index.len());

    let payload = match metric_extractor.extract(&chunks, &record.form_type).await {
        Ok(payload) => payload,
        Err(FilingError::Parse(parse_err)) => {
            // Keep the raw reply around for diagnosis before skipping.
            if let Err(e) = export::write_raw_reply(&config.output_dir, record, &parse_err.raw_reply)
            {
                tracing::error!("Failed to save raw model reply: {}", e);
            }
            return Err(FilingError::Parse(parse_err));
        }
        Err(other) => return Err(other),
    };

    json_writer.write(record, &payload)?;
    workbook_writer.write(record, &payload)?;
    if let Some(db) = db {
        db.upsert_filing(record, &payload).await?;
    }

    Ok(())
}
