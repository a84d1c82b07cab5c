use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use url::Url;

use crate::config::ScreenerConfig;
use crate::error::{Result, ScanError, TransportError};

#[derive(Debug, Clone)]
pub struct Page {
    pub body: String,
    /// Where the page was fetched from
    pub url: String,
}

#[async_trait]
pub trait Fetch {
    /// Fetches `path`, relative to the screener base URL (an empty path is
    /// the base URL itself), with `params` set in its query string.
    async fn fetch(&self, path: &str, params: &[(String, String)]) -> Result<Page>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Url,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(config: &ScreenerConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|source| TransportError::InvalidUrl {
            url: config.base_url.clone(),
            source,
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ScanError::Config(format!(
                "baseUrl must be an http(s) URL, got: {base_url}"
            )));
        }
        if config.http_timeout == 0 {
            return Err(ScanError::Config("httpTimeout must be positive".into()));
        }

        let client = reqwest::ClientBuilder::new()
            .gzip(true)
            .deflate(true)
            .timeout(config.http_timeout())
            .build()
            .map_err(|source| TransportError::Request {
                url: config.base_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            base_url,
            user_agent: config.user_agent.clone(),
        })
    }

    /// Resolves `path` against the base URL, `params` replace any query
    /// pair of the same name already present in `path`.
    pub fn url_for(&self, path: &str, params: &[(String, String)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|source| TransportError::InvalidUrl {
                url: path.to_string(),
                source,
            })?;

        let kept = url
            .query_pairs()
            .filter(|(name, _)| !params.iter().any(|(param, _)| param == name))
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect::<Vec<_>>();

        if kept.is_empty() && params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(kept.iter().chain(params.iter()));
        }

        Ok(url)
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, path: &str, params: &[(String, String)]) -> Result<Page> {
        let url = self.url_for(path, params)?;
        log::debug!("GET {url}");

        let resp = self
            .client
            .get(url.clone())
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = resp.text().await.map_err(|source| TransportError::Request {
            url: url.to_string(),
            source,
        })?;

        Ok(Page {
            body,
            url: url.to_string(),
        })
    }
}
