//! Batch scheduling and exhaustion detection for a scrape session.
//!
//! The scheduler drives a [`PageSource`] through consecutive offsets in
//! fixed-size concurrent batches and decides termination at the batch
//! level: a single empty page proves nothing, because pages in a batch
//! race past where content actually ends and any one of them can fail
//! transiently. Only a whole batch contributing zero previously-unseen
//! articles flips the session from `Active` to `Exhausted`.
//!
//! Two defensive ceilings (batch count and wall clock) guarantee
//! termination even against an endpoint that never stops returning
//! results; hitting one is logged distinctly from genuine exhaustion.

use crate::errors::PageFailure;
use crate::fetcher::{admit_new, PageOutcome, PageSource, SeenUrls};
use crate::models::Article;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};

/// Scheduling knobs for one scrape session.
///
/// The pacing delays are policy, not correctness: they keep the request
/// rate under the endpoint's tolerance. The ceilings are correctness:
/// they bound the session when exhaustion never arrives.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Concurrent page fetches per batch.
    pub batch_size: usize,
    /// Offset advance per page (from the site configuration).
    pub offset_step: u32,
    /// Stagger between dispatching individual fetches within a batch.
    pub fetch_delay: Duration,
    /// Pause between batches.
    pub batch_delay: Duration,
    /// Hard ceiling on dispatched batches.
    pub max_batches: usize,
    /// Overall wall-clock ceiling, checked between batches.
    pub deadline: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            offset_step: 1,
            fetch_delay: Duration::from_millis(200),
            batch_delay: Duration::from_millis(500),
            max_batches: 200,
            deadline: Duration::from_secs(900),
        }
    }
}

/// Lifecycle state of a session. There is no path back from
/// `Exhausted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Exhausted,
}

/// Why the session stopped dispatching batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// An entire batch yielded no previously-unseen articles.
    Exhausted,
    /// The batch-count ceiling was hit first.
    MaxBatches,
    /// The wall-clock ceiling was hit first.
    DeadlineExceeded,
}

/// Per-page outcome tallies, kept so "stopped because exhausted" can be
/// told apart from "stopped because every page broke" after the fact.
#[derive(Debug, Default, Clone, Copy)]
pub struct PageStats {
    pub productive: usize,
    pub empty: usize,
    pub parse_mismatches: usize,
    pub network_failures: usize,
}

/// One complete scrape run for a single search term.
#[derive(Debug)]
pub struct ScrapeSession {
    pub state: SessionState,
    pub stop_reason: StopReason,
    /// Next offset to dispatch.
    pub offset: u32,
    /// Shared dedup registry for all in-flight fetches of this session.
    pub seen: SeenUrls,
    /// Accumulated articles, in fetch-completion order.
    pub articles: Vec<Article>,
    pub batches_dispatched: usize,
    pub stats: PageStats,
}

impl ScrapeSession {
    fn new() -> Self {
        Self {
            state: SessionState::Active,
            stop_reason: StopReason::Exhausted,
            offset: 0,
            seen: SeenUrls::new(),
            articles: Vec::new(),
            batches_dispatched: 0,
            stats: PageStats::default(),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == SessionState::Exhausted
    }
}

/// Page result after the dedup filter has been applied.
enum BatchPage {
    New(Vec<Article>),
    Empty,
    Mismatch,
    NetworkFailed,
}

/// Drive `source` from offset 0 until exhaustion or a ceiling.
///
/// Articles are appended in whatever order their fetches complete, not
/// in offset order; order within one page is preserved. Consumers that
/// need chronological order sort afterward.
#[instrument(level = "info", skip_all, fields(batch_size = config.batch_size))]
pub async fn run_scrape<S: PageSource>(source: &S, config: &ScrapeConfig) -> ScrapeSession {
    let started = Instant::now();
    let mut session = ScrapeSession::new();

    loop {
        if started.elapsed() >= config.deadline {
            warn!(
                batches = session.batches_dispatched,
                deadline_secs = config.deadline.as_secs(),
                "Wall-clock ceiling reached before exhaustion; stopping"
            );
            session.stop_reason = StopReason::DeadlineExceeded;
            break;
        }
        if session.batches_dispatched >= config.max_batches {
            warn!(
                batches = session.batches_dispatched,
                "Batch ceiling reached before exhaustion; stopping"
            );
            session.stop_reason = StopReason::MaxBatches;
            break;
        }
        if session.batches_dispatched > 0 {
            sleep(config.batch_delay).await;
        }

        let offsets: Vec<u32> = (0..config.batch_size)
            .map(|i| session.offset + i as u32 * config.offset_step)
            .collect();
        debug!(?offsets, "Dispatching batch");

        let seen = &session.seen;
        let fetch_delay = config.fetch_delay;
        let pages: Vec<BatchPage> = stream::iter(offsets.into_iter().enumerate())
            .map(|(i, offset)| async move {
                // Stagger starts inside the batch; buffer_unordered
                // would otherwise fire all requests at once.
                if i > 0 {
                    sleep(fetch_delay * i as u32).await;
                }
                match source.fetch_page(offset).await {
                    PageOutcome::Results(articles) => BatchPage::New(admit_new(articles, seen)),
                    PageOutcome::Empty => BatchPage::Empty,
                    PageOutcome::Failed(PageFailure::ParseMismatch) => BatchPage::Mismatch,
                    PageOutcome::Failed(PageFailure::Network(_)) => BatchPage::NetworkFailed,
                }
            })
            .buffer_unordered(config.batch_size)
            .collect()
            .await;

        session.batches_dispatched += 1;
        session.offset += config.batch_size as u32 * config.offset_step;

        let mut new_in_batch = 0usize;
        let mut mismatches_in_batch = 0usize;
        for page in pages {
            match page {
                BatchPage::New(articles) if !articles.is_empty() => {
                    session.stats.productive += 1;
                    new_in_batch += articles.len();
                    session.articles.extend(articles);
                }
                // A page of nothing but already-seen URLs counts as
                // empty for exhaustion purposes.
                BatchPage::New(_) => session.stats.empty += 1,
                BatchPage::Empty => session.stats.empty += 1,
                BatchPage::Mismatch => {
                    session.stats.parse_mismatches += 1;
                    mismatches_in_batch += 1;
                }
                BatchPage::NetworkFailed => session.stats.network_failures += 1,
            }
        }
        info!(
            batch = session.batches_dispatched,
            new_articles = new_in_batch,
            total = session.articles.len(),
            "Batch complete"
        );

        if new_in_batch == 0 {
            session.state = SessionState::Exhausted;
            session.stop_reason = StopReason::Exhausted;
            if mismatches_in_batch > 0 {
                warn!(
                    mismatches_in_batch,
                    "Terminal batch contained parse mismatches; apparent exhaustion may be a markup change"
                );
            }
            info!(
                total = session.articles.len(),
                batches = session.batches_dispatched,
                "Search exhausted"
            );
            break;
        }
    }

    session
}
