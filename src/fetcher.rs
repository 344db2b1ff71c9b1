//! Identifier validation plus source lookup plus resolution, as one call.

use crate::error::FetchError;
use crate::metrics::{self, MetricRecord};
use crate::source::DataSource;

/// Turns one security code into a fully resolved [`MetricRecord`], or a typed
/// failure. One source read per call; retry is a batch-level concern that
/// deliberately does not live here.
pub struct Fetcher<S> {
    source: S,
}

impl<S: DataSource> Fetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn fetch(&self, code: &str) -> Result<MetricRecord, FetchError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(FetchError::validation("empty code"));
        }

        let raw = self.source.raw_fields(code).await?;
        metrics::resolve(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RawFields;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct EmptySource;

    #[async_trait]
    impl DataSource for EmptySource {
        async fn raw_fields(&self, _code: &str) -> Result<RawFields, FetchError> {
            Ok(RawFields {
                name: "空データ".to_string(),
                values: HashMap::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_empty_code_is_validation_failure() {
        let fetcher = Fetcher::new(EmptySource);
        let err = fetcher.fetch("   ").await.unwrap_err();
        assert!(matches!(err, FetchError::Validation(_)));
    }

    #[tokio::test]
    async fn test_source_without_required_fields_is_parse_failure() {
        let fetcher = Fetcher::new(EmptySource);
        let err = fetcher.fetch("9432").await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }
}
