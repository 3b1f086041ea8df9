//! Terminal JSON output for a finalized session.
//!
//! One all-or-nothing write: the scrape holds everything in memory and
//! serializes once at the end, so a crash mid-session leaves no partial
//! file behind. The output is pretty-printed UTF-8 because the
//! downstream analysis scripts (and their authors) read it directly.

use crate::errors::OutputWriteError;
use crate::models::ScrapeReport;
use tokio::fs;
use tracing::{info, instrument};

/// Serialize `report` and write it to `path` in a single shot.
///
/// Failure here is fatal to the session: there is no checkpoint to
/// resume from and no retry.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn write_report(report: &ScrapeReport, path: &str) -> Result<(), OutputWriteError> {
    let json = serde_json::to_string_pretty(report).map_err(|e| OutputWriteError {
        path: path.to_string(),
        source: e.into(),
    })?;

    fs::write(path, json).await.map_err(|e| OutputWriteError {
        path: path.to_string(),
        source: e,
    })?;

    info!(
        articles = report.total_articles,
        path, "Wrote scrape report"
    );
    Ok(())
}
