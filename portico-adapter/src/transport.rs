//! Transport dispatcher
//!
//! Executes exactly one HTTP request per call. Non-2xx statuses are data for
//! the parsers, never transport errors. Timeouts and TLS handshake failures
//! come back as a [`ConnectionStatus`] on the raw response so the caller can
//! branch on them.

use crate::{types::HttpMethod, Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Minimum TLS library able to negotiate TLS 1.2 with the processor
pub const MIN_TLS_LIBRARY: &str = "OpenSSL 1.0.1";

/// [`MIN_TLS_LIBRARY`] as a comparable version triple
pub const MIN_TLS_LIBRARY_VERSION: (u32, u32, u32) = (1, 0, 1);

/// Outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Verb
    pub method: HttpMethod,
    /// Absolute URL
    pub url: String,
    /// Headers
    pub headers: Vec<(String, String)>,
    /// Body (always `None` for GET)
    pub body: Option<String>,
}

impl HttpRequest {
    /// Build a request; a body given with GET is dropped
    pub fn new(
        method: HttpMethod,
        url: impl Into<String>,
        headers: Vec<(String, String)>,
        body: Option<String>,
    ) -> Self {
        let body = match method {
            HttpMethod::Get => None,
            _ => body,
        };
        Self {
            method,
            url: url.into(),
            headers,
            body,
        }
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// How the connection ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// A full HTTP response was received
    Completed,
    /// Connect or response timeout expired
    OperationTimedOut,
    /// TLS handshake failed
    TlsHandshakeFailed {
        /// Underlying error text
        detail: String,
        /// Local TLS library version, when the backend reports one
        library_version: Option<(u32, u32, u32)>,
    },
}

/// Raw transport outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status (0 when no response was received)
    pub status: u16,
    /// Body text
    pub body: String,
    /// Connection outcome
    pub connection: ConnectionStatus,
}

impl RawResponse {
    /// Completed exchange
    pub fn completed(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            connection: ConnectionStatus::Completed,
        }
    }

    /// Timed out before a response arrived
    pub fn timed_out() -> Self {
        Self {
            status: 0,
            body: String::new(),
            connection: ConnectionStatus::OperationTimedOut,
        }
    }

    /// TLS handshake failure
    pub fn tls_failed(detail: impl Into<String>, library_version: Option<(u32, u32, u32)>) -> Self {
        Self {
            status: 0,
            body: String::new(),
            connection: ConnectionStatus::TlsHandshakeFailed {
                detail: detail.into(),
                library_version,
            },
        }
    }
}

/// Fixed TLS 1.2 handshake message, with an upgrade hint when the local
/// library is known to be older than [`MIN_TLS_LIBRARY`].
///
/// The hint only appears for transports that report an OpenSSL version;
/// [`ReqwestTransport`] runs on rustls and reports none.
pub fn tls_handshake_message(library_version: Option<(u32, u32, u32)>) -> String {
    let mut message = format!(
        "Error establishing a TLS 1.2 connection with the gateway. TLS 1.2 requires {} or later.",
        MIN_TLS_LIBRARY
    );

    if let Some((major, minor, patch)) = library_version {
        if (major, minor, patch) < MIN_TLS_LIBRARY_VERSION {
            message.push_str(&format!(
                " The local TLS library reports version {}.{}.{}; upgrade it before retrying.",
                major, minor, patch
            ));
        }
    }

    message
}

/// HTTP transport seam
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute one request
    async fn execute(&self, request: HttpRequest) -> Result<RawResponse>;
}

/// reqwest-backed transport (rustls, TLS 1.2 minimum)
pub struct ReqwestTransport {
    client: Client,
}

/// Builder for [`ReqwestTransport`]
#[derive(Debug, Clone)]
pub struct ReqwestTransportBuilder {
    timeout: Duration,
    allow_plaintext: bool,
}

impl ReqwestTransportBuilder {
    /// Connect and total response timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Permit `http://` targets. Only for local stub servers.
    pub fn allow_plaintext(mut self, allow: bool) -> Self {
        self.allow_plaintext = allow;
        self
    }

    /// Build the transport
    pub fn build(self) -> Result<ReqwestTransport> {
        let client = Client::builder()
            .use_rustls_tls()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .https_only(!self.allow_plaintext)
            .connect_timeout(self.timeout)
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(ReqwestTransport { client })
    }
}

impl ReqwestTransport {
    /// Builder with the default timeout
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder {
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECONDS),
            allow_plaintext: false,
        }
    }

    /// HTTPS-only transport with the given timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::builder().timeout(timeout).build()
    }
}

fn is_tls_failure(err: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        let text = e.to_string().to_lowercase();
        if text.contains("tls") || text.contains("handshake") || text.contains("certificate") {
            return true;
        }
        source = e.source();
    }
    false
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<RawResponse> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        debug!("{} {}", request.method, request.url);

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.method != HttpMethod::Get {
            if let Some(body) = request.body {
                builder = builder.body(body);
            }
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!("Request to {} timed out", request.url);
                return Ok(RawResponse::timed_out());
            }
            Err(e) if is_tls_failure(&e) => {
                warn!("TLS handshake with {} failed: {}", request.url, e);
                return Ok(RawResponse::tls_failed(e.to_string(), None));
            }
            Err(e) => return Err(Error::InvalidRequest(e.to_string())),
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => Ok(RawResponse::completed(status, body)),
            Err(e) if e.is_timeout() => Ok(RawResponse::timed_out()),
            Err(e) => Err(Error::InvalidRequest(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_drops_body() {
        let request = HttpRequest::new(
            HttpMethod::Get,
            "https://example.test",
            vec![],
            Some("{}".to_string()),
        );
        assert_eq!(request.body, None);

        let request = HttpRequest::new(
            HttpMethod::Delete,
            "https://example.test",
            vec![],
            Some("{}".to_string()),
        );
        assert_eq!(request.body.as_deref(), Some("{}"));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = HttpRequest::new(
            HttpMethod::Post,
            "https://example.test",
            vec![("Content-Type".to_string(), "text/xml".to_string())],
            None,
        );
        assert_eq!(request.header("content-type"), Some("text/xml"));
    }

    #[test]
    fn test_tls_message_hint() {
        let base = tls_handshake_message(None);
        assert!(base.contains("TLS 1.2"));
        assert!(base.contains(MIN_TLS_LIBRARY));
        assert!(!base.contains("upgrade"));

        assert!(tls_handshake_message(Some((0, 9, 8))).contains("upgrade"));
        assert!(!tls_handshake_message(Some((1, 1, 1))).contains("upgrade"));
    }

    #[test]
    fn test_default_transport_builds() {
        let transport = ReqwestTransport::new(Duration::from_secs(1));
        assert!(transport.is_ok());
    }
}
