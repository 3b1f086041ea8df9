//! Output writers for finalized scrape sessions.

pub mod json;
