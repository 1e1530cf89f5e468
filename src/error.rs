use std::path::PathBuf;
use thiserror::Error;

/// Failures while opening or reading a source workbook.
///
/// These never escape [`crate::extractor::extract_items`]; they are turned
/// into a diagnostic string at that boundary.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("cannot open workbook {path}: {reason}")]
    Open { path: PathBuf, reason: String },
    #[error("workbook has no worksheets")]
    NoWorksheet,
    #[error("worksheet '{0}' not found")]
    MissingSheet(String),
    #[error("cannot read worksheet: {0}")]
    Sheet(String),
    #[error("column '{0}' not found in header row")]
    MissingColumn(String),
}

/// Errors raised while recording user input into a session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown inspection item: {0}")]
    UnknownItem(String),
    #[error("photo for {0} is empty")]
    EmptyPhoto(String),
}

/// Report construction failures. When one of these is returned no document
/// exists and the caller must not proceed to dispatch.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("operator and reviewer must both be selected")]
    MissingOperator,
    #[error("cannot open template {path}: {reason}")]
    Template { path: PathBuf, reason: String },
    #[error("template workbook has no worksheets")]
    EmptyTemplate,
    #[error("invalid cell address: {0}")]
    CellAddress(String),
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("template write error: {0}")]
    TemplateWrite(String),
}

/// Errors around the persisted configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("environment variable {name} has an invalid value: {value}")]
    InvalidVar { name: &'static str, value: String },
}

/// Mail construction and transport errors.
#[derive(Error, Debug)]
pub enum MailError {
    #[error("no recipients selected")]
    NoRecipients,
    #[error("invalid address '{0}'")]
    Address(String),
    #[error("message build error: {0}")]
    Build(String),
    #[error("SMTP error: {0}")]
    Transport(String),
}
