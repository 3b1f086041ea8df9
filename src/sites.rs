//! Site configuration for the parameterized search fetcher.
//!
//! Earlier iterations of this project carried a near-identical scraper
//! per site, and the copies drifted. Everything site-specific now lives
//! in one [`Site`] value: base URL, search path, pagination unit, and
//! the month table used to normalize result dates. Adding a site means
//! adding a registry entry, not another module.

use crate::dates::{self, MonthTable};
use tracing::warn;
use url::Url;

/// Static configuration for one scrapeable news site.
#[derive(Debug)]
pub struct Site {
    /// Name used in the output record, e.g. `"pervyi kanal"`.
    pub name: &'static str,
    /// CLI identifier, e.g. `pervyi-kanal`.
    pub slug: &'static str,
    /// Scheme + host, used both for the search endpoint and to resolve
    /// relative result hrefs.
    pub base: &'static str,
    /// Path of the search endpoint on `base`.
    pub search_path: &'static str,
    /// `limit` query parameter sent with every page request.
    pub page_limit: u32,
    /// How much the offset advances per page. The `1tv.ru` endpoint
    /// treats `offset` as a page index, so the step is 1 there even
    /// though `limit` is 100; a site paginating by result count would
    /// set this to `page_limit`.
    pub offset_step: u32,
    /// Month-name table for [`dates::convert_date`].
    pub months: MonthTable,
}

impl Site {
    /// Build the search URL for one page offset. The term is
    /// percent-encoded into the endpoint's `q=text:{term}` filter.
    pub fn search_url(&self, term: &str, offset: u32) -> String {
        format!(
            "{}{}?limit={}&offset={}&q=text%3A{}",
            self.base,
            self.search_path,
            self.page_limit,
            offset,
            urlencoding::encode(term)
        )
    }

    /// Resolve a result href against the site base. Hrefs in the search
    /// payload are site-relative (`/news/...`); absolute hrefs pass
    /// through unchanged.
    pub fn resolve_url(&self, href: &str) -> Option<String> {
        let base = match Url::parse(self.base) {
            Ok(base) => base,
            Err(e) => {
                warn!(base = self.base, error = %e, "Site base URL does not parse");
                return None;
            }
        };
        match base.join(href) {
            Ok(resolved) => Some(resolved.to_string()),
            Err(e) => {
                warn!(%href, error = %e, "Skipping unresolvable result href");
                None
            }
        }
    }

    /// Look up a configured site by its CLI slug.
    pub fn by_slug(slug: &str) -> Option<&'static Site> {
        REGISTRY.iter().copied().find(|site| site.slug == slug)
    }

    /// Slugs of all configured sites, for CLI error messages.
    pub fn known_slugs() -> Vec<&'static str> {
        REGISTRY.iter().map(|site| site.slug).collect()
    }
}

/// Channel One (Первый канал) search endpoint.
pub static PERVYI_KANAL: Site = Site {
    name: "pervyi kanal",
    slug: "pervyi-kanal",
    base: "https://www.1tv.ru",
    search_path: "/search.js",
    page_limit: 100,
    offset_step: 1,
    months: dates::RUSSIAN_MONTHS,
};

static REGISTRY: &[&Site] = &[&PERVYI_KANAL];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_term() {
        let url = PERVYI_KANAL.search_url("выборы 2018", 7);
        assert_eq!(
            url,
            "https://www.1tv.ru/search.js?limit=100&offset=7&q=text%3A%D0%B2%D1%8B%D0%B1%D0%BE%D1%80%D1%8B%202018"
        );
    }

    #[test]
    fn test_resolve_relative_href() {
        assert_eq!(
            PERVYI_KANAL.resolve_url("/news/2020-03-15/article-slug").as_deref(),
            Some("https://www.1tv.ru/news/2020-03-15/article-slug")
        );
    }

    #[test]
    fn test_resolve_absolute_href_passes_through() {
        assert_eq!(
            PERVYI_KANAL
                .resolve_url("https://www.1tv.ru/shows/vremya/x")
                .as_deref(),
            Some("https://www.1tv.ru/shows/vremya/x")
        );
    }

    #[test]
    fn test_registry_lookup() {
        assert_eq!(Site::by_slug("pervyi-kanal").unwrap().name, "pervyi kanal");
        assert!(Site::by_slug("vesti").is_none());
        assert_eq!(Site::known_slugs(), vec!["pervyi-kanal"]);
    }
}
