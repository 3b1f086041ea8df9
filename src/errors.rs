//! Error taxonomy for the scrape pipeline.
//!
//! Per-page failures ([`PageFailure`]) are absorbed by the scheduler and
//! never abort a session. [`DateError`] is surfaced per-article so a bad
//! date skips one record. [`OutputWriteError`] is the only fatal case:
//! the session's work is lost and no retry is attempted.

use thiserror::Error;

/// A date string that could not be normalized.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    /// The month token is not present in the site's month table.
    #[error("unrecognized month name {0:?}")]
    UnrecognizedMonth(String),
    /// The string does not split into `day monthname year` with numeric
    /// day and year.
    #[error("malformed date string {0:?}")]
    MalformedDate(String),
}

/// Why a single page produced no articles.
#[derive(Debug, Error)]
pub enum PageFailure {
    /// Request, HTTP-status, or body-read failure.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The body carried markup, but none of it matched the result
    /// structure. Usually means the endpoint changed its escaping or
    /// layout rather than that results ran out.
    #[error("search payload did not match the expected result structure")]
    ParseMismatch,
}

/// Failure of the single terminal output write.
#[derive(Debug, Error)]
#[error("failed to write output to {path}: {source}")]
pub struct OutputWriteError {
    pub path: String,
    #[source]
    pub source: std::io::Error,
}
