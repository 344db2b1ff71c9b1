use std::time::Duration;

use super::client::HttpClient;
use async_trait::async_trait;

/// User-Agent sent with every request; kabutan serves an error page to
/// clients without a browser-like agent string.
const USER_AGENT: &str = "Mozilla/5.0";

pub struct BasicClient(reqwest::Client);

impl BasicClient {
    /// Builds a client with the default 30s request / 10s connect timeouts.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Builds a client with a caller-supplied total request timeout. The wait
    /// must be bounded so one unresponsive code cannot stall a whole batch.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self(client)
    }
}

impl Default for BasicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
