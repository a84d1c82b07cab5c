mod config;
mod error;
mod extract;
mod fetch;
mod filter;
mod limiter;
mod screener;

pub use config::{ScreenerConfig, Selectors};
pub use error::{ParseError, Result, ScanError, TransportError};
pub use extract::{Extract, HtmlExtractor, PageResults};
pub use fetch::{Fetch, HttpFetcher, Page};
pub use filter::{Dimension, Filter, FilterBuilder, Order, Query, UnknownDimension};
pub use limiter::RateLimiter;
pub use screener::Screener;

pub use async_trait::async_trait;
