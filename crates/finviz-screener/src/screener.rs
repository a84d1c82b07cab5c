use crate::config::ScreenerConfig;
use crate::error::Result;
use crate::extract::{Extract, HtmlExtractor, PageResults};
use crate::fetch::{Fetch, HttpFetcher};
use crate::filter::{FilterBuilder, Query};
use crate::limiter::RateLimiter;

/// FinViz screener client.
///
/// Filters are set with the [`FilterBuilder`] methods and persist across
/// scans, each [`scan`](Screener::scan) walks the result pages and returns
/// the tickers found.
///
/// ```no_run
/// # async fn run() -> finviz_screener::Result<()> {
/// use finviz_screener::{FilterBuilder, Screener, ScreenerConfig};
///
/// let tickers = Screener::new(ScreenerConfig::default())?
///     .average_volume("Over 2M")
///     .sector("Technology")
///     .price("Over $50")
///     .scan()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Screener<F = HttpFetcher, E = HtmlExtractor> {
    config: ScreenerConfig,
    query: Query,
    limiter: RateLimiter,
    fetcher: F,
    extractor: E,
}

impl Screener {
    pub fn new(config: ScreenerConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        let extractor = HtmlExtractor::new(&config.selectors)?;
        Ok(Self::with_collaborators(config, fetcher, extractor))
    }
}

impl<F, E> Screener<F, E>
where
    F: Fetch,
    E: Extract,
{
    pub fn with_collaborators(config: ScreenerConfig, fetcher: F, extractor: E) -> Self {
        let limiter = RateLimiter::new(config.request_interval());
        Self {
            config,
            query: Query::default(),
            limiter,
            fetcher,
            extractor,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches result pages until the last one or until `page_limit` pages
    /// were fetched, and returns their tickers in page order.
    ///
    /// Requests are spaced by the configured interval, including across
    /// successive scans. Any failure aborts the scan and the tickers of the
    /// pages already fetched are discarded.
    pub async fn scan(&mut self) -> Result<Vec<String>> {
        let params = self.query.to_params(&self.config.view);
        let page_limit = self.config.page_limit;

        let mut tickers = vec![];
        let mut next_page: Option<String> = None;
        let mut pages = 0;

        loop {
            pages += 1;
            let last_allowed = page_limit != 0 && pages >= page_limit;

            self.limiter.acquire().await;
            let page = self
                .fetcher
                .fetch(next_page.as_deref().unwrap_or_default(), &params)
                .await?;
            let PageResults {
                tickers: found,
                next_page: next,
            } = self.extractor.extract(&page)?;

            log::debug!("Page {pages} ({}): {} tickers", page.url, found.len());
            tickers.extend(found);
            next_page = next;

            if next_page.is_none() || last_allowed {
                break;
            }
        }

        log::info!("Scan found {} tickers in {pages} pages", tickers.len());
        Ok(tickers)
    }
}

impl<F, E> FilterBuilder for Screener<F, E> {
    fn query_mut(&mut self) -> &mut Query {
        &mut self.query
    }
}
