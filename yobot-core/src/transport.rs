//! Transport abstraction for the messaging platform.
//!
//! [`Transport`] is platform-agnostic; `yobot-yoai` implements it over HTTP. Tests substitute
//! in-memory implementations.

use std::path::Path;

use async_trait::async_trait;

use crate::error::{Result, TransportError};
use crate::types::FetchResponse;

/// Outbound sends and the single inbound fetch. Credentials belong to the implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a text message to the given recipient.
    async fn send_text(&self, to: &str, text: &str) -> Result<()>;

    /// Uploads the file at `file` with a caption. Fails with
    /// [`YobotError::FileNotFound`](crate::YobotError::FileNotFound) if the path does not exist.
    async fn send_media(&self, to: &str, caption: &str, file: &Path) -> Result<()>;

    /// Fetches pending updates. Non-success statuses are returned in the response, not as errors.
    async fn fetch_updates(&self) -> std::result::Result<FetchResponse, TransportError>;
}
