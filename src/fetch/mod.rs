mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::error::FetchError;

/// Issues a single GET and returns the response body as text.
///
/// A non-success status is a [`FetchError::Network`]; the external source
/// answers lookups for unknown codes with an error page, so status checking
/// here is the first line of defense against scoring garbage.
pub async fn fetch_document<C: HttpClient>(client: &C, url: &str) -> Result<String, FetchError> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse()
            .map_err(|e| FetchError::network(format!("bad url {url}: {e}")))?,
    );

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::network(format!("HTTP status {status}")));
    }

    Ok(resp.text().await?)
}
