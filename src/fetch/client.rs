use async_trait::async_trait;
use reqwest::{Method, Request, Response, Url};

/// Transport used to download the source tables.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;

    /// GETs `url` and returns the body, failing on any non-2xx status.
    async fn get_bytes(&self, url: Url) -> reqwest::Result<Vec<u8>> {
        let resp = self
            .execute(Request::new(Method::GET, url))
            .await?
            .error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }
}
