//! Document retrieval.
//!
//! HTTP requests go through a blocking `reqwest` client. The async entry
//! points move that work onto smol's blocking thread pool, so a caller awaits
//! a plain future and the parser itself never blocks on I/O.
//!
//! Timeouts and TLS are whatever the client below is configured with; there
//! is no retry.

use std::string::FromUtf8Error;
use std::time::Duration;

use base64::Engine;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info};

/// User-Agent header sent with all requests.
const USER_AGENT: &str = concat!("twig/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Why a document could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// The request could not be sent or no response arrived.
    #[error("request to {url} failed: {source}")]
    Request {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("HTTP error {status} from {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status.
        status: StatusCode,
    },
    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
    /// A `data:` URL was malformed.
    #[error("invalid data URL: {0}")]
    DataUrl(String),
    /// The bytes retrieved are not UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    Decode(#[from] FromUtf8Error),
}

/// A `data:` URL whose payload can be decoded locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// The full raw `data:` URL string (e.g. `data:text/html;base64,...`).
    pub raw_data: String,
}

impl DataUrl {
    /// Wrap a raw data URL string.
    #[must_use]
    pub const fn new(raw_data: String) -> Self {
        Self { raw_data }
    }

    /// Decode the payload into raw bytes.
    ///
    /// Payloads marked `;base64` are base64-decoded; anything else is taken
    /// as the literal bytes after the comma. Percent-encoding is not undone.
    ///
    /// # Errors
    ///
    /// Fails if the comma separator is missing or base64 decoding fails.
    pub fn decode(&self) -> Result<Vec<u8>, FetchError> {
        let data_url = self.raw_data.trim_start_matches("data:");
        let Some((metadata, data)) = data_url.split_once(',') else {
            return Err(FetchError::DataUrl("missing comma".to_string()));
        };

        if metadata.ends_with(";base64") {
            base64::engine::general_purpose::STANDARD
                .decode(data)
                .map_err(|e| FetchError::DataUrl(format!("base64 decode error: {e}")))
        } else {
            Ok(data.as_bytes().to_vec())
        }
    }
}

/// Fetch `url` and return its body, blocking the current thread.
///
/// `data:` URLs are decoded without touching the network.
///
/// # Errors
///
/// See [`FetchError`].
pub fn fetch_bytes_blocking(url: &str) -> Result<Vec<u8>, FetchError> {
    if url.starts_with("data:") {
        debug!("decoding data URL");
        return DataUrl::new(url.to_string()).decode();
    }

    info!(%url, "fetching document");
    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(FetchError::Client)?;

    let response = client
        .get(url)
        .send()
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response.bytes().map_err(FetchError::Body)?;
    debug!(bytes = body.len(), %status, "received document");
    Ok(body.to_vec())
}

/// Fetch `url` as an asynchronous task.
///
/// The request runs on smol's blocking pool; the returned future can be
/// driven by any executor (e.g. `smol::block_on`).
///
/// # Errors
///
/// See [`FetchError`].
pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, FetchError> {
    let url = url.to_string();
    smol::unblock(move || fetch_bytes_blocking(&url)).await
}

/// Fetch `url` and decode the body as UTF-8.
///
/// # Errors
///
/// See [`FetchError`]; invalid UTF-8 yields [`FetchError::Decode`].
pub async fn fetch_text(url: &str) -> Result<String, FetchError> {
    decode_text(fetch_bytes(url).await?)
}

/// Decode fetched bytes as UTF-8 text.
///
/// # Errors
///
/// Returns [`FetchError::Decode`] if the bytes are not valid UTF-8.
pub fn decode_text(bytes: Vec<u8>) -> Result<String, FetchError> {
    Ok(String::from_utf8(bytes)?)
}
