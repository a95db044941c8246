//! REST client for the downstream symbol service.
//!
//! Issues a single `GET` against the configured endpoint and decodes a JSON
//! array of [`SourceSymbol`]. A `null` body is treated as an empty universe,
//! matching the downstream contract.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, StatusCode, Url};

use super::traits::SymbolSource;
use crate::errors::SourceError;
use crate::models::SourceSymbol;

/// Source ID constant
pub const SOURCE_ID: &str = "DOWNSTREAM";

/// Default downstream endpoint
pub const DEFAULT_ENDPOINT: &str = "http://downstream-service/api/symbols";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`HttpSymbolSource`].
#[derive(Clone, Debug)]
pub struct HttpSourceConfig {
    /// Full URL of the "fetch all symbols" endpoint.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

/// Downstream symbol service client.
///
/// # Example
///
/// ```ignore
/// use xref_source::{HttpSourceConfig, HttpSymbolSource};
///
/// let source = HttpSymbolSource::new(HttpSourceConfig::default())?;
/// ```
pub struct HttpSymbolSource {
    client: Client,
    endpoint: Url,
}

impl HttpSymbolSource {
    /// Create a new client. Fails if the endpoint is not an absolute URL.
    pub fn new(config: HttpSourceConfig) -> Result<Self, SourceError> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            SourceError::Configuration(format!("invalid endpoint '{}': {}", config.endpoint, e))
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self { client, endpoint })
    }

    /// The endpoint this client fetches from.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn transport_error(e: reqwest::Error) -> SourceError {
        if e.is_timeout() {
            SourceError::Timeout {
                source_id: SOURCE_ID.to_string(),
            }
        } else {
            SourceError::Network(e)
        }
    }
}

#[async_trait]
impl SymbolSource for HttpSymbolSource {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    async fn fetch_all_symbols(&self) -> Result<Vec<SourceSymbol>, SourceError> {
        info!("Fetching symbols from downstream: {}", self.endpoint);

        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited {
                source_id: SOURCE_ID.to_string(),
            });
        }
        if !status.is_success() {
            return Err(SourceError::Unavailable {
                source_id: SOURCE_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let body = response.text().await.map_err(Self::transport_error)?;
        let symbols: Option<Vec<SourceSymbol>> =
            serde_json::from_str(&body).map_err(|e| SourceError::InvalidPayload {
                source_id: SOURCE_ID.to_string(),
                message: e.to_string(),
            })?;

        let symbols = symbols.unwrap_or_default();
        debug!("Downstream returned {} symbols", symbols.len());
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response on an ephemeral port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/api/symbols", addr)
    }

    fn source_for(endpoint: String) -> HttpSymbolSource {
        HttpSymbolSource::new(HttpSourceConfig {
            endpoint,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_relative_endpoint() {
        let result = HttpSymbolSource::new(HttpSourceConfig {
            endpoint: "/api/symbols".to_string(),
            timeout: Duration::from_secs(1),
        });
        assert!(matches!(result, Err(SourceError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_fetch_decodes_symbols() {
        let endpoint = serve_once(
            "200 OK",
            r#"[{"symbolId":"S1","ticker":"ABC"},{"symbolId":"S2","isin":"US0378331005"}]"#,
        )
        .await;

        let symbols = source_for(endpoint).fetch_all_symbols().await.unwrap();
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].ticker.as_deref(), Some("ABC"));
    }

    #[tokio::test]
    async fn test_null_body_is_empty_snapshot() {
        let endpoint = serve_once("200 OK", "null").await;

        let symbols = source_for(endpoint).fetch_all_symbols().await.unwrap();
        assert!(symbols.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let endpoint = serve_once("503 Service Unavailable", "").await;

        let err = source_for(endpoint).fetch_all_symbols().await.unwrap_err();
        assert!(matches!(err, SourceError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_too_many_requests_is_rate_limited() {
        let endpoint = serve_once("429 Too Many Requests", "").await;

        let err = source_for(endpoint).fetch_all_symbols().await.unwrap_err();
        assert!(matches!(err, SourceError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_garbage_body_is_invalid_payload() {
        let endpoint = serve_once("200 OK", r#"{"not":"an array"}"#).await;

        let err = source_for(endpoint).fetch_all_symbols().await.unwrap_err();
        assert!(matches!(err, SourceError::InvalidPayload { .. }));
    }
}
