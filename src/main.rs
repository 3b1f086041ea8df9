//! # rus_news_search
//!
//! Scrapes a Russian news site's paginated search endpoint for a search
//! term and writes one deduplicated JSON article set, in the shape the
//! downstream sentiment-analysis scripts consume.
//!
//! ## Usage
//!
//! ```sh
//! rus_news_search -s "выборы" -o data/pervyi_kanal/выборы.json
//! ```
//!
//! ## Architecture
//!
//! One scrape is one session:
//! 1. **Dispatch**: batches of concurrent page fetches at consecutive
//!    offsets of the search endpoint
//! 2. **Extract**: DOM parsing of the escaped `search.js` payload,
//!    date normalization, URL dedup
//! 3. **Exhaustion**: the session ends when an entire batch yields no
//!    previously-unseen article (or a defensive ceiling fires)
//! 4. **Output**: a single terminal JSON write

use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod dates;
mod errors;
mod fetcher;
mod models;
mod outputs;
mod scheduler;
mod sites;
mod utils;

use cli::Cli;
use fetcher::HttpPageFetcher;
use models::ScrapeReport;
use scheduler::{run_scrape, ScrapeConfig, StopReason};
use sites::Site;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");
    info!(search_term = %args.search_term, site = %args.site, "rus_news_search starting up");

    let Some(site) = Site::by_slug(&args.site) else {
        let known = Site::known_slugs().join(", ");
        error!(site = %args.site, %known, "Unknown site slug");
        return Err(format!("unknown site {:?}; known sites: {known}", args.site).into());
    };

    // Early check: the terminal write is the whole point, so fail fast
    // if the report cannot land where requested.
    let output_path = Path::new(&args.output);
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = ensure_writable_dir(parent).await {
            error!(
                path = %parent.display(),
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let config = ScrapeConfig {
        batch_size: args.batch_size,
        offset_step: site.offset_step,
        fetch_delay: Duration::from_millis(args.fetch_delay_ms),
        batch_delay: Duration::from_millis(args.batch_delay_ms),
        max_batches: args.max_batches,
        deadline: Duration::from_secs(args.timeout_secs),
    };

    // ---- Run the session to exhaustion ----
    let fetcher = HttpPageFetcher::new(site, &args.search_term);
    let session = run_scrape(&fetcher, &config).await;

    match session.stop_reason {
        StopReason::Exhausted => info!(
            articles = session.articles.len(),
            batches = session.batches_dispatched,
            "Session exhausted normally"
        ),
        StopReason::MaxBatches | StopReason::DeadlineExceeded => warn!(
            articles = session.articles.len(),
            batches = session.batches_dispatched,
            reason = ?session.stop_reason,
            "Session stopped at a ceiling; results may be incomplete"
        ),
    }
    info!(
        exhausted = session.is_exhausted(),
        productive_pages = session.stats.productive,
        empty_pages = session.stats.empty,
        parse_mismatches = session.stats.parse_mismatches,
        network_failures = session.stats.network_failures,
        seen_urls = session.seen.len(),
        "Page outcome totals"
    );

    // ---- Terminal write ----
    let report = ScrapeReport::new(site.name, &args.search_term, session.articles);
    outputs::json::write_report(&report, &args.output).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        total_articles = report.total_articles,
        "Execution complete"
    );

    Ok(())
}
