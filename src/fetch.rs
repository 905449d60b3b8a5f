use reqwest::blocking::Client as HttpClient;
use serde_json::{Map, Value};
use std::time::Duration;

/// Loosely-typed JSON object returned by the API.
pub type Payload = Map<String, Value>;

/// Every way a fetch can fail.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("could not build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("could not connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("response from {url} is not valid JSON")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response from {url} is a JSON {kind}, expected an object")]
    NotAnObject { url: String, kind: &'static str },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs the GET behind [`fetch_with`].
pub trait Transport {
    fn get(&self, url: &str, timeout: Duration) -> Result<RawResponse, FetchError>;
}

/// Blocking reqwest transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    /// Build a client identifying itself as this package.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
    }

    fn with_user_agent(user_agent: &str) -> Result<Self, FetchError> {
        let http = HttpClient::builder()
            .user_agent(user_agent)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, timeout: Duration) -> Result<RawResponse, FetchError> {
        let classify = |err: reqwest::Error| {
            let url = url.to_string();
            if err.is_timeout() {
                FetchError::Timeout { url, timeout }
            } else if err.is_connect() {
                FetchError::Connect {
                    url,
                    message: err.to_string(),
                }
            } else {
                FetchError::Request {
                    url,
                    message: err.to_string(),
                }
            }
        };

        let resp = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(classify)?;
        let status = resp.status().as_u16();
        let body = resp.bytes().map_err(classify)?.to_vec();
        Ok(RawResponse { status, body })
    }
}

/// GET `url` through `transport` and decode the body as a JSON object.
///
/// The status is checked before the body is decoded. Errors are logged at
/// error level and returned unchanged.
pub fn fetch_with<T: Transport + ?Sized>(
    transport: &T,
    url: &str,
    timeout: Duration,
) -> Result<Payload, FetchError> {
    tracing::debug!(url, timeout_secs = timeout.as_secs_f64(), "fetch start");
    let result = transport
        .get(url, timeout)
        .and_then(|resp| decode(url, resp));
    match &result {
        Ok(payload) => tracing::debug!(url, keys = payload.len(), "fetch ok"),
        Err(err) => tracing::error!(url, error = %err, "fetch failed"),
    }
    result
}

/// [`fetch_with`] over a fresh [`HttpTransport`].
pub fn fetch(url: &str, timeout: Duration) -> Result<Payload, FetchError> {
    let transport = HttpTransport::new().inspect_err(|err| {
        tracing::error!(url, error = %err, "fetch failed");
    })?;
    fetch_with(&transport, url, timeout)
}

fn decode(url: &str, resp: RawResponse) -> Result<Payload, FetchError> {
    if !resp.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: resp.status,
        });
    }
    let value: Value = serde_json::from_slice(&resp.body).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(FetchError::NotAnObject {
            url: url.to_string(),
            kind: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
