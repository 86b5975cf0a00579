//! HTTP transport abstraction for testability.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::header::CONTENT_DISPOSITION;

use crate::config::CatalogConfig;
use crate::error::{Error, Result};

/// A streamed file response.
pub struct FileBody {
    /// Raw `Content-Disposition` header value, if the server sent one.
    pub content_disposition: Option<String>,
    /// Body chunks as they arrive.
    pub body: BoxStream<'static, Result<Bytes>>,
}

/// GET-only access to the catalog service.
///
/// Paths are relative to the service root (`/api/...`).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a GET and returns the full response body.
    async fn get_json(&self, path: &str, query: &[(&'static str, String)]) -> Result<Bytes>;

    /// Performs a streamed GET for a binary document.
    async fn get_file(&self, path: &str) -> Result<FileBody>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get_json(&self, path: &str, query: &[(&'static str, String)]) -> Result<Bytes> {
        (**self).get_json(path, query).await
    }

    async fn get_file(&self, path: &str) -> Result<FileBody> {
        (**self).get_file(path).await
    }
}

/// Builds a configured HTTP client for catalog requests.
fn build_http_client(user_agent: &str) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .pool_idle_timeout(Duration::from_secs(60))
        .pool_max_idle_per_host(8)
        .tcp_keepalive(Duration::from_secs(30))
        .build()
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport for the configured catalog host.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (e.g. TLS backend failure).
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(&config.user_agent)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: String) -> Result<reqwest::Response> {
        log::debug!("GET {url}");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            log::warn!("GET {url} returned {status}");
            return Err(Error::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, path: &str, query: &[(&'static str, String)]) -> Result<Bytes> {
        let url = self.url(path);
        let request = self.client.get(&url).query(query);
        let response = self.send(request, url).await?;
        Ok(response.bytes().await?)
    }

    async fn get_file(&self, path: &str) -> Result<FileBody> {
        let url = self.url(path);
        let request = self.client.get(&url);
        let response = self.send(request, url).await?;
        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(Error::from))
            .boxed();
        Ok(FileBody {
            content_disposition,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_path() {
        let config = CatalogConfig::new().with_base_url("https://example.org/");
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(
            transport.url("/api/mountainregions"),
            "https://example.org/api/mountainregions"
        );
    }

    #[test]
    fn http_transport_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpTransport>();
    }
}
