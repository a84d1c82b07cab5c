use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerConfig {
    /// Maximum number of result pages fetched per scan, `0` means no limit
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,

    /// Minimum delay in milliseconds between two requests
    #[serde(default = "default_request_interval", alias = "requestTimeout")]
    pub request_interval: u64,

    /// HTTP timeout in seconds for a single request
    #[serde(default = "default_http_timeout")]
    pub http_timeout: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Screener view, sent as the `v` query parameter
    #[serde(default = "default_view")]
    pub view: String,

    #[serde(default)]
    pub selectors: Selectors,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
            request_interval: default_request_interval(),
            http_timeout: default_http_timeout(),
            user_agent: default_user_agent(),
            base_url: default_base_url(),
            view: default_view(),
            selectors: Selectors::default(),
        }
    }
}

impl ScreenerConfig {
    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }
}

fn default_page_limit() -> usize {
    1
}

fn default_request_interval() -> u64 {
    1000
}

fn default_http_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    String::from("Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0")
}

fn default_base_url() -> String {
    String::from("https://finviz.com/screener.ashx")
}

fn default_view() -> String {
    String::from("111")
}

/// CSS selectors matching the screener result pages markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selectors {
    /// Container that is present on every results page, even without matches
    #[serde(default = "default_results_selector")]
    pub results: String,

    #[serde(default = "default_ticker_selector")]
    pub ticker: String,

    #[serde(default = "default_next_page_selector")]
    pub next_page: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            results: default_results_selector(),
            ticker: default_ticker_selector(),
            next_page: default_next_page_selector(),
        }
    }
}

fn default_results_selector() -> String {
    String::from("#screener-table")
}

fn default_ticker_selector() -> String {
    String::from(
        "#screener-table > td > table > tbody > tr > td > table > tbody \
         > tr:not(:first-child) > td:nth-child(2)",
    )
}

fn default_next_page_selector() -> String {
    String::from(".screener_pagination a.tab-link.is-next")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let conf = ScreenerConfig::default();
        assert_eq!(1, conf.page_limit);
        assert_eq!(Duration::from_millis(1000), conf.request_interval());
        assert_eq!("111", conf.view);
        assert_eq!(Selectors::default(), conf.selectors);
    }

    #[test]
    fn partial_yaml() {
        let conf: ScreenerConfig = serde_yaml::from_str(
            "pageLimit: 0\nrequestTimeout: 200\nselectors:\n  nextPage: a.next\n",
        )
        .unwrap();
        assert_eq!(0, conf.page_limit);
        assert_eq!(Duration::from_millis(200), conf.request_interval());
        assert_eq!("a.next", conf.selectors.next_page);
        assert_eq!("#screener-table", conf.selectors.results);
        assert_eq!(default_base_url(), conf.base_url);
    }
}
