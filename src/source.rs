//! The data source capability: the swappable seam between the pipeline and
//! one uncontrolled external site.
//!
//! Everything the rest of the crate knows about the outside world is
//! [`DataSource::raw_fields`]: code in, untyped field-value mapping out. The
//! live implementation scrapes kabutan; tests substitute in-memory fakes
//! without touching any fetcher or pipeline logic.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::FetchError;
use crate::fetch::{BasicClient, HttpClient, fetch_document};
use crate::metrics::Metric;
use crate::parser;

/// Raw field values for one identifier, prior to numeric resolution.
#[derive(Debug, Clone, Default)]
pub struct RawFields {
    /// Instrument display name.
    pub name: String,
    /// Field text as rendered by the source, unit markers and all.
    pub values: HashMap<Metric, String>,
}

/// Provides the raw field-value mapping for a security code.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn raw_fields(&self, code: &str) -> Result<RawFields, FetchError>;
}

/// Live source backed by the kabutan finance page.
pub struct KabutanSource<C = BasicClient> {
    client: C,
}

impl KabutanSource<BasicClient> {
    pub fn new() -> Self {
        Self {
            client: BasicClient::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: BasicClient::with_timeout(timeout),
        }
    }
}

impl Default for KabutanSource<BasicClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: HttpClient> KabutanSource<C> {
    /// Wraps an arbitrary [`HttpClient`], mainly for tests.
    pub fn with_client(client: C) -> Self {
        Self { client }
    }

    fn finance_url(code: &str) -> String {
        format!("https://kabutan.jp/stock/finance?code={code}")
    }
}

#[async_trait]
impl<C: HttpClient> DataSource for KabutanSource<C> {
    #[tracing::instrument(skip(self))]
    async fn raw_fields(&self, code: &str) -> Result<RawFields, FetchError> {
        let url = Self::finance_url(code);
        let html = fetch_document(&self.client, &url).await?;
        debug!(bytes = html.len(), "document received, extracting fields");
        parser::extract_fields(&html, code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finance_url() {
        assert_eq!(
            KabutanSource::<BasicClient>::finance_url("9432"),
            "https://kabutan.jp/stock/finance?code=9432"
        );
    }
}
