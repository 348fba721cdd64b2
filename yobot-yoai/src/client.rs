//! HTTP transport for the YoAI bot API. Implements [`yobot_core::Transport`] over reqwest.

use std::error::Error as StdError;
use std::io;
use std::path::Path;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use yobot_core::{
    FetchResponse, RawUpdate, Result, Transport, TransportError, TransportErrorKind, YobotError,
};

/// Public bot API base URL.
pub const DEFAULT_API_URL: &str = "https://yoai.yophone.com/api/pub";

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "x-yoai-api-key";

#[derive(Serialize)]
struct SendMessageBody<'a> {
    to: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct UpdatesEnvelope {
    #[serde(default)]
    data: Vec<Value>,
}

impl UpdatesEnvelope {
    /// Converts each element on its own; elements that do not parse are logged and skipped.
    fn into_updates(self) -> Vec<RawUpdate> {
        self.data
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value::<RawUpdate>(item) {
                Ok(update) => Some(update),
                Err(e) => {
                    warn!(index, error = %e, "skipping malformed update");
                    None
                }
            })
            .collect()
    }
}

/// YoAI API client. The API key is set once at construction and sent as a default header.
#[derive(Clone)]
pub struct YoAiClient {
    http: reqwest::Client,
    base_url: String,
}

impl YoAiClient {
    /// Client against [`DEFAULT_API_URL`].
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_API_URL)
    }

    /// Client against a custom base URL (self-hosted gateway, tests).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self> {
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| YobotError::Config(format!("Invalid API key header value: {}", e)))?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| YobotError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Fails with the body text when `response` is not 2xx.
    async fn ensure_success(response: reqwest::Response) -> std::result::Result<(), TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::from_status(status.as_u16(), &body))
    }
}

/// Maps a reqwest failure to the transport error class the update loop retries on.
pub fn classify_error(err: reqwest::Error) -> TransportError {
    let kind = if err.is_decode() || err.is_body() {
        TransportErrorKind::BadResponse
    } else if is_connection_reset(&err) {
        TransportErrorKind::ConnectionReset
    } else {
        TransportErrorKind::Other
    };
    TransportError::new(kind, err.to_string())
}

fn is_connection_reset(err: &(dyn StdError + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(e) = source {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::ConnectionReset {
                return true;
            }
        }
        source = e.source();
    }
    false
}

#[async_trait]
impl Transport for YoAiClient {
    #[instrument(skip(self, text))]
    async fn send_text(&self, to: &str, text: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url("sendMessage"))
            .json(&SendMessageBody { to, text })
            .send()
            .await
            .map_err(classify_error)?;
        Self::ensure_success(response).await?;
        debug!(to = %to, "sendMessage done");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_media(&self, to: &str, caption: &str, file: &Path) -> Result<()> {
        let is_file = tokio::fs::metadata(file)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(YobotError::FileNotFound(file.to_path_buf()));
        }
        let bytes = tokio::fs::read(file).await?;
        let size = bytes.len();
        let part = Part::bytes(bytes).file_name(file.display().to_string());
        let form = Form::new()
            .text("to", to.to_string())
            .text("text", caption.to_string())
            .part("file", part);

        let response = self
            .http
            .post(self.url("sendMessage"))
            .multipart(form)
            .send()
            .await
            .map_err(classify_error)?;
        Self::ensure_success(response).await?;
        debug!(to = %to, size, "sendMessage (file) done");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_updates(&self) -> std::result::Result<FetchResponse, TransportError> {
        let response = self
            .http
            .post(self.url("getUpdates"))
            .send()
            .await
            .map_err(classify_error)?;
        let status = response.status().as_u16();
        if status != 200 {
            return Ok(FetchResponse::empty(status));
        }
        let envelope: UpdatesEnvelope = response.json().await.map_err(classify_error)?;
        Ok(FetchResponse::new(status, envelope.into_updates()))
    }
}
