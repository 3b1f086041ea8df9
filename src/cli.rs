//! Command-line interface definitions.
//!
//! All knobs default to the values tuned against the live endpoint:
//! five concurrent fetches with 200 ms stagger and a 500 ms pause
//! between batches stays under its rate tolerance. The ceilings exist
//! so a misbehaving endpoint cannot keep a session alive forever.

use clap::Parser;

/// Command-line arguments for one scrape session.
///
/// # Examples
///
/// ```sh
/// rus_news_search -s "выборы" -o data/pervyi_kanal/выборы.json
/// rus_news_search -s путин -o putin.json --batch-size 8 --max-batches 50
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Search term to query; Russian text is fine, it is URL-encoded
    /// into the request
    #[arg(short, long)]
    pub search_term: String,

    /// Path of the JSON report to write
    #[arg(short, long)]
    pub output: String,

    /// Which configured news site to scrape
    #[arg(long, default_value = "pervyi-kanal")]
    pub site: String,

    /// Concurrent page fetches per batch
    #[arg(long, default_value_t = 5)]
    pub batch_size: usize,

    /// Stagger between individual fetches within a batch, in milliseconds
    #[arg(long, default_value_t = 200)]
    pub fetch_delay_ms: u64,

    /// Pause between batches, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub batch_delay_ms: u64,

    /// Hard ceiling on dispatched batches
    #[arg(long, default_value_t = 200)]
    pub max_batches: usize,

    /// Overall wall-clock ceiling for the scrape, in seconds
    #[arg(long, default_value_t = 900)]
    pub timeout_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_defaults() {
        let cli = Cli::parse_from(&[
            "rus_news_search",
            "--search-term",
            "выборы",
            "--output",
            "./out.json",
        ]);

        assert_eq!(cli.search_term, "выборы");
        assert_eq!(cli.output, "./out.json");
        assert_eq!(cli.site, "pervyi-kanal");
        assert_eq!(cli.batch_size, 5);
        assert_eq!(cli.fetch_delay_ms, 200);
        assert_eq!(cli.batch_delay_ms, 500);
        assert_eq!(cli.max_batches, 200);
        assert_eq!(cli.timeout_secs, 900);
    }

    #[test]
    fn test_cli_short_flags_and_overrides() {
        let cli = Cli::parse_from(&[
            "rus_news_search",
            "-s",
            "протест",
            "-o",
            "/tmp/протест.json",
            "--batch-size",
            "8",
            "--max-batches",
            "10",
        ]);

        assert_eq!(cli.search_term, "протест");
        assert_eq!(cli.output, "/tmp/протест.json");
        assert_eq!(cli.batch_size, 8);
        assert_eq!(cli.max_batches, 10);
    }
}
