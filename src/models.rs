//! Data models for scraped articles and the terminal report.
//!
//! The serialized key names (`news site`, `search term`, `total articles`,
//! `articles`) are a contract with the downstream sentiment-aggregation
//! scripts and must not be renamed. Per-article sentiment labels that
//! those scripts attach later (keyed by model name, e.g.
//! `"RuSentiment Model"`) are preserved through a flattened map so a
//! produced file can be read back without dropping them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One deduplicated search result.
///
/// `url` is the dedup key: the final collection never holds two articles
/// with the same URL. `date` is already normalized to `mm/dd/yyyy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Headline, taken from the result's show-name label.
    pub title: String,
    /// Lead text of the result.
    pub subtitle: String,
    /// Publication date, normalized to `mm/dd/yyyy`.
    pub date: String,
    /// Absolute article URL.
    pub url: String,
    /// Sentiment-label fields attached by downstream analysis, keyed by
    /// model name. Empty for freshly scraped articles and omitted from
    /// output in that case.
    #[serde(flatten, default)]
    pub sentiment_labels: BTreeMap<String, serde_json::Value>,
}

impl Article {
    pub fn new(title: &str, subtitle: &str, date: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            date: date.to_string(),
            url: url.to_string(),
            sentiment_labels: BTreeMap::new(),
        }
    }
}

/// The terminal output record for one scrape session.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScrapeReport {
    /// Human-readable site name, e.g. `"pervyi kanal"`.
    #[serde(rename = "news site")]
    pub news_site: String,
    /// The search term the session was run for.
    #[serde(rename = "search term")]
    pub search_term: String,
    /// Always equal to `articles.len()`.
    #[serde(rename = "total articles")]
    pub total_articles: usize,
    /// Accumulated articles, in the order fetches completed.
    pub articles: Vec<Article>,
}

impl ScrapeReport {
    /// Build a report from a finalized article list. The count is derived
    /// from the list, never passed in, so the two cannot disagree.
    pub fn new(news_site: &str, search_term: &str, articles: Vec<Article>) -> Self {
        Self {
            news_site: news_site.to_string(),
            search_term: search_term.to_string(),
            total_articles: articles.len(),
            articles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_shape_with_zero_articles() {
        let report = ScrapeReport::new("pervyi kanal", "выборы", Vec::new());
        let json = serde_json::to_string(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["news site"], "pervyi kanal");
        assert_eq!(value["search term"], "выборы");
        assert_eq!(value["total articles"], 0);
        assert!(value["articles"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_report_total_matches_len() {
        let articles = vec![
            Article::new("a", "b", "01/02/2020", "https://www.1tv.ru/n/1"),
            Article::new("c", "d", "01/03/2020", "https://www.1tv.ru/n/2"),
        ];
        let report = ScrapeReport::new("pervyi kanal", "протест", articles);
        assert_eq!(report.total_articles, report.articles.len());
        assert_eq!(report.total_articles, 2);
    }

    #[test]
    fn test_fresh_article_omits_sentiment_keys() {
        let article = Article::new("t", "s", "05/09/2021", "https://www.1tv.ru/n/9");
        let value = serde_json::to_value(&article).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["date", "subtitle", "title", "url"]);
    }

    #[test]
    fn test_sentiment_labels_round_trip() {
        let json = r#"{
            "title": "Заголовок",
            "subtitle": "Лид",
            "date": "03/15/2020",
            "url": "https://www.1tv.ru/news/some-article",
            "RuSentiment Model": {"label": "NEGATIVE", "score": 0.87},
            "Kaggle News Model": {"label": "NEUTRAL", "score": 0.55}
        }"#;

        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.sentiment_labels.len(), 2);
        assert_eq!(
            article.sentiment_labels["RuSentiment Model"]["label"],
            "NEGATIVE"
        );

        let back = serde_json::to_value(&article).unwrap();
        assert_eq!(back["Kaggle News Model"]["label"], "NEUTRAL");
        assert_eq!(back["title"], "Заголовок");
    }

    #[test]
    fn test_report_deserializes_produced_file_shape() {
        let json = r#"{
            "news site": "pervyi kanal",
            "search term": "навальный",
            "total articles": 1,
            "articles": [
                {"title": "t", "subtitle": "s", "date": "01/01/2019", "url": "https://www.1tv.ru/n/1"}
            ]
        }"#;

        let report: ScrapeReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.news_site, "pervyi kanal");
        assert_eq!(report.total_articles, 1);
        assert_eq!(report.articles[0].url, "https://www.1tv.ru/n/1");
    }
}
