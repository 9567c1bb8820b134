// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum EdgarError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode), // e.g., 404 Not Found, 403 Forbidden

    #[error("SEC rate limit likely exceeded")]
    RateLimited,

    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    #[error("Could not find filing document: {0}")]
    DocumentNotFound(String),

    #[error("Failed to parse EDGAR response: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Document too short to process: {len} characters (minimum {min})")]
    InsufficientContent { len: usize, min: usize },
}

/// Failures of the hosted-model call. Timeouts are kept separate from other
/// transport failures because they must never be retried.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model call exceeded the {0}s time limit")]
    Timeout(u64),

    #[error("Model transport failure: {0}")]
    Transport(String),

    #[error("Model HTTP error {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Unexpected model response shape: {0}")]
    InvalidResponse(String),
}

/// The model replied, but the reply could not be recovered to a JSON object.
/// The raw reply is carried along so the driver can persist it for diagnosis.
#[derive(Error, Debug)]
#[error("Model reply was not parseable JSON: {message}")]
pub struct ReplyParseError {
    pub message: String,
    pub raw_reply: String,
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One filing's failure, attributed to the stage that produced it. Stage-local
/// failures skip the filing; the run-level driver keeps going.
#[derive(Error, Debug)]
pub enum FilingError {
    #[error("document fetch failed: {0}")]
    Fetch(#[from] EdgarError),

    #[error("text extraction failed: {0}")]
    Content(#[from] ExtractError),

    #[error("model call failed: {0}")]
    Model(#[from] ModelError),

    #[error("reply parsing failed: {0}")]
    Parse(#[from] ReplyParseError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("EDGAR interaction failed: {0}")]
    Edgar(#[from] EdgarError),

    #[error("Export setup failed: {0}")]
    Export(#[from] ExportError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
