use scraper::{Html, Selector};

use crate::config::Selectors;
use crate::error::{ParseError, Result, ScanError};
use crate::fetch::Page;

/// What a single results page yields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResults {
    pub tickers: Vec<String>,
    /// Reference to the following results page, `None` on the last one
    pub next_page: Option<String>,
}

pub trait Extract {
    fn extract(&self, page: &Page) -> Result<PageResults>;
}

#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    selectors: Selectors,
    results: Selector,
    ticker: Selector,
    next_page: Selector,
}

impl HtmlExtractor {
    pub fn new(selectors: &Selectors) -> Result<Self> {
        Ok(Self {
            selectors: selectors.clone(),
            results: parse_selector(&selectors.results)?,
            ticker: parse_selector(&selectors.ticker)?,
            next_page: parse_selector(&selectors.next_page)?,
        })
    }

    /// Trimmed text of every ticker cell, in document order.
    pub fn tickers(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.ticker)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .filter(|ticker| !ticker.is_empty())
            .collect()
    }

    pub fn next_page(&self, document: &Html) -> Option<String> {
        let link = document.select(&self.next_page).next()?;
        match link.value().attr("href") {
            Some(href) if !href.trim().is_empty() => Some(href.trim().to_string()),
            _ => {
                log::warn!("Ignoring next page link without href");
                None
            }
        }
    }
}

impl Extract for HtmlExtractor {
    fn extract(&self, page: &Page) -> Result<PageResults> {
        let document = Html::parse_document(&page.body);

        if document.select(&self.results).next().is_none() {
            return Err(ParseError::MissingResults {
                url: page.url.clone(),
                selector: self.selectors.results.clone(),
            }
            .into());
        }

        Ok(PageResults {
            tickers: self.tickers(&document),
            next_page: self.next_page(&document),
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScanError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"
        <html><body>
        <table><tbody>
            <tr id="screener-table"><td><table><tbody><tr><td>
                <table><tbody>
                    <tr><td>No.</td><td>Ticker</td><td>Company</td></tr>
                    <tr><td>1</td><td><a class="screener-link-primary">AAPL</a></td><td>Apple Inc.</td></tr>
                    <tr><td>2</td><td><a class="screener-link-primary"> MSFT </a></td><td>Microsoft</td></tr>
                    <tr><td>3</td><td><a class="screener-link-primary">IBM</a></td><td>IBM</td></tr>
                </tbody></table>
            </td></tr></tbody></table></td></tr>
        </tbody></table>
        <div class="screener_pagination">
            <a class="tab-link is-selected" href="screener.ashx?v=111&amp;r=1">1</a>
            <a class="tab-link" href="screener.ashx?v=111&amp;r=21">2</a>
            <a class="tab-link is-next" href="screener.ashx?v=111&amp;r=21">next</a>
        </div>
        </body></html>
    "#;

    const LAST_PAGE: &str = r#"
        <html><body>
        <table><tbody>
            <tr id="screener-table"><td><table><tbody><tr><td>
                <table><tbody>
                    <tr><td>No.</td><td>Ticker</td><td>Company</td></tr>
                    <tr><td>21</td><td><a>ORCL</a></td><td>Oracle</td></tr>
                </tbody></table>
            </td></tr></tbody></table></td></tr>
        </tbody></table>
        <div class="screener_pagination">
            <a class="tab-link is-prev" href="screener.ashx?v=111&amp;r=1">prev</a>
        </div>
        </body></html>
    "#;

    fn page(body: &str) -> Page {
        Page {
            body: body.to_string(),
            url: "https://finviz.com/screener.ashx?v=111".to_string(),
        }
    }

    fn extractor() -> HtmlExtractor {
        HtmlExtractor::new(&Selectors::default()).unwrap()
    }

    #[test]
    fn extract_tickers_and_next_page() {
        let results = extractor().extract(&page(RESULTS_PAGE)).unwrap();
        assert_eq!(vec!["AAPL", "MSFT", "IBM"], results.tickers);
        assert_eq!(
            Some("screener.ashx?v=111&r=21".to_string()),
            results.next_page
        );
    }

    #[test]
    fn last_page_has_no_next() {
        let results = extractor().extract(&page(LAST_PAGE)).unwrap();
        assert_eq!(vec!["ORCL"], results.tickers);
        assert_eq!(None, results.next_page);
    }

    #[test]
    fn next_link_without_href() {
        let body = LAST_PAGE.replace(
            r#"<a class="tab-link is-prev" href="screener.ashx?v=111&amp;r=1">prev</a>"#,
            r#"<a class="tab-link is-next">next</a>"#,
        );
        assert!(body.contains("is-next"));

        let results = extractor().extract(&page(&body)).unwrap();
        assert_eq!(vec!["ORCL"], results.tickers);
        assert_eq!(None, results.next_page);
    }

    #[test]
    fn missing_results_is_an_error() {
        let err = extractor()
            .extract(&page("<html><body><p>Too many requests</p></body></html>"))
            .unwrap_err();
        assert!(matches!(
            err,
            ScanError::Parse(ParseError::MissingResults { .. })
        ));
    }

    #[test]
    fn invalid_selector() {
        let selectors = Selectors {
            ticker: "td:nth-child(".to_string(),
            ..Default::default()
        };
        let err = HtmlExtractor::new(&selectors).unwrap_err();
        assert!(matches!(err, ScanError::InvalidSelector { .. }));
    }
}
