//! Page fetching and result extraction.
//!
//! The search endpoint returns a JavaScript fragment whose string
//! payload carries backslash-escaped HTML (`<a class=\"result\" ...>`).
//! Instead of pattern-matching the escaped text directly, the payload is
//! unescaped and parsed as a DOM fragment, and results are extracted
//! with CSS selectors. That keeps extraction tolerant of attribute
//! reordering and lets a page whose markup changed be reported as a
//! parse mismatch instead of silently looking like the end of results.
//!
//! [`PageSource`] is the seam between the scheduler and the network:
//! the real [`HttpPageFetcher`] implements it over `reqwest`, and the
//! scheduler's tests implement it over canned pages.

use crate::errors::PageFailure;
use crate::models::Article;
use crate::sites::Site;
use crate::{dates, utils::truncate_for_log};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

static RESULT_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a.result").unwrap());
static SHOW_NAME_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse(".show-name").unwrap());
static DATE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse(".date").unwrap());
static LEAD_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse(".lead").unwrap());

/// Structural probe used when the result selector finds nothing: any
/// anchor at all in the unescaped payload means the markup is there but
/// no longer matches, i.e. a mismatch rather than genuine emptiness.
static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<a[\s>]").unwrap());

/// What one page request produced.
#[derive(Debug)]
pub enum PageOutcome {
    /// Extracted articles, pre-dedup, in payload order.
    Results(Vec<Article>),
    /// Well-formed payload with no result anchors.
    Empty,
    /// Network failure or unrecognizable markup. Counts as zero new
    /// articles; never aborts the session.
    Failed(PageFailure),
}

/// One page fetch at one offset. Implemented by [`HttpPageFetcher`] for
/// the real endpoint and by test stubs for the scheduler's state-machine
/// tests.
pub trait PageSource {
    async fn fetch_page(&self, offset: u32) -> PageOutcome;
}

/// Session-owned registry of URLs already admitted to the article list.
///
/// Concurrent page fetches race to admit the same URL; the check and the
/// insert happen under one lock so exactly one of them wins.
#[derive(Debug, Default)]
pub struct SeenUrls {
    inner: Mutex<HashSet<String>>,
}

impl SeenUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `url` if absent. Returns `true` when this call admitted
    /// the URL, `false` when it was already present.
    pub fn insert_if_absent(&self, url: &str) -> bool {
        let mut set = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        set.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Filter a page's extracted articles down to those not seen before,
/// admitting each survivor's URL into `seen` atomically with the check.
pub fn admit_new(articles: Vec<Article>, seen: &SeenUrls) -> Vec<Article> {
    articles
        .into_iter()
        .filter(|article| seen.insert_if_absent(&article.url))
        .collect()
}

/// Fetches search pages from a configured site over a shared HTTP client.
#[derive(Debug)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
    site: &'static Site,
    term: String,
}

impl HttpPageFetcher {
    pub fn new(site: &'static Site, term: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            site,
            term: term.to_string(),
        }
    }

    async fn get_body(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        response.text().await
    }
}

impl PageSource for HttpPageFetcher {
    async fn fetch_page(&self, offset: u32) -> PageOutcome {
        let url = self.site.search_url(&self.term, offset);
        debug!(%url, offset, "Fetching search page");

        let body = match self.get_body(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(%url, offset, error = %e, "Search page fetch failed; treating as empty");
                return PageOutcome::Failed(e.into());
            }
        };

        let outcome = extract_articles(self.site, &body);
        if let PageOutcome::Failed(PageFailure::ParseMismatch) = outcome {
            warn!(
                %url,
                offset,
                body_preview = %truncate_for_log(&body, 200),
                "Payload has anchors but none match the result structure; possible markup change"
            );
        }
        outcome
    }
}

/// Extract result articles from a raw `search.js` response body.
///
/// Articles whose date fails to normalize are skipped individually with
/// a warning; they never fail the page. When zero result anchors match,
/// the outcome is [`PageOutcome::Empty`] for an anchor-free payload and
/// a [`PageFailure::ParseMismatch`] otherwise.
pub fn extract_articles(site: &Site, body: &str) -> PageOutcome {
    let payload = unescape_payload(body);
    let fragment = Html::parse_fragment(&payload);

    let mut articles = Vec::new();
    let mut anchors_seen = 0usize;
    for anchor in fragment.select(&RESULT_SELECTOR) {
        anchors_seen += 1;
        let Some(href) = anchor.value().attr("href") else {
            warn!("Result anchor has no href; skipping");
            continue;
        };
        let Some(url) = site.resolve_url(href) else {
            continue;
        };

        let title = select_text(&anchor, &SHOW_NAME_SELECTOR);
        let raw_date = select_text(&anchor, &DATE_SELECTOR);
        let lead = select_text(&anchor, &LEAD_SELECTOR);
        let (Some(title), Some(raw_date)) = (title, raw_date) else {
            warn!(%url, "Result anchor missing show-name or date; skipping");
            continue;
        };

        let date = match dates::convert_date(&raw_date, site.months) {
            Ok(date) => date,
            Err(e) => {
                warn!(%url, %raw_date, error = %e, "Skipping article with unrecognized date");
                continue;
            }
        };

        articles.push(Article::new(&title, lead.as_deref().unwrap_or(""), &date, &url));
    }

    if !articles.is_empty() {
        return PageOutcome::Results(articles);
    }
    if anchors_seen > 0 || ANCHOR_RE.is_match(&payload) {
        PageOutcome::Failed(PageFailure::ParseMismatch)
    } else {
        PageOutcome::Empty
    }
}

fn select_text(anchor: &ElementRef, selector: &Selector) -> Option<String> {
    anchor
        .select(selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string())
}

/// Undo the JavaScript string escaping of the search payload, turning
/// `<a class=\"result\" href=\"\/news\/...\">` back into plain HTML.
/// Handles `\uXXXX` escapes, including surrogate pairs; an invalid
/// escape becomes U+FFFD rather than aborting extraction.
fn unescape_payload(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('"') => {
                chars.next();
                out.push('"');
            }
            Some('/') => {
                chars.next();
                out.push('/');
            }
            Some('\\') => {
                chars.next();
                out.push('\\');
            }
            Some('n') => {
                chars.next();
                out.push('\n');
            }
            Some('t') => {
                chars.next();
                out.push('\t');
            }
            Some('u') => {
                chars.next();
                out.push(read_unicode_escape(&mut chars).unwrap_or('\u{FFFD}'));
            }
            _ => out.push('\\'),
        }
    }
    out
}

fn read_unicode_escape(chars: &mut Peekable<Chars>) -> Option<char> {
    let first = read_hex4(chars)?;
    if !(0xD800..0xDC00).contains(&first) {
        return char::from_u32(first);
    }
    // High surrogate: only valid when immediately followed by an
    // escaped low surrogate.
    let mut lookahead = chars.clone();
    if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
        if let Some(low) = read_hex4(&mut lookahead) {
            if (0xDC00..0xE000).contains(&low) {
                *chars = lookahead;
                let combined = 0x10000 + ((first - 0xD800) << 10) + (low - 0xDC00);
                return char::from_u32(combined);
            }
        }
    }
    None
}

fn read_hex4(chars: &mut Peekable<Chars>) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..4 {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}
