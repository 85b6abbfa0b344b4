//! Remote asset fetching

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Why an asset could not be fetched
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with something other than 200 OK
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// DNS, connect, TLS or timeout failure before a response arrived
    #[error("GET {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response started but the body could not be read
    #[error("failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// True when the request failed in flight, so a later retry might succeed
    ///
    /// An HTTP status or a URL the client refuses to build a request from
    /// will fail the same way again.
    pub fn is_transport(&self) -> bool {
        match self {
            FetchError::Status { .. } => false,
            FetchError::Transport { source, .. } => !source.is_builder(),
            FetchError::Body { .. } => true,
        }
    }
}

/// Retrieves a byte payload from a URL
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// Plain HTTP GET fetcher
#[derive(Clone)]
pub struct HttpFetcher {
    http_client: Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http_client))
    }

    pub fn with_client(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        debug!("Fetching asset: {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return its URL
    async fn serve_once(response: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/asset", addr)
    }

    fn fetcher() -> HttpFetcher {
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        HttpFetcher::with_client(client)
    }

    #[tokio::test]
    async fn test_fetch_ok() {
        let url = serve_once(
            b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
        )
        .await;

        let bytes = fetcher().fetch(&url).await.unwrap();
        assert_eq!(&bytes[..], b"hello");
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let url = serve_once(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn test_fetch_rejects_other_success_codes() {
        let url = serve_once(
            b"HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n",
        )
        .await;

        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 204, .. }));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher()
            .fetch(&format!("http://{}/asset", addr))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_is_not_transient() {
        let err = fetcher().fetch("").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(!err.is_transport());

        let err = fetcher().fetch("not a url").await.unwrap_err();
        assert!(!err.is_transport());
    }
}
