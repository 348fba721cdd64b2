//! Per-update context threaded through the middleware chain.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::decode::decode_content;
use crate::error::{Result, YobotError};
use crate::transport::Transport;
use crate::types::{RawUpdate, Sender};

/// Caption attached to photos sent with [`Context::reply_with_photo`].
pub const PHOTO_CAPTION: &str = "photo";

/// Decoded message plus reply helpers bound to its sender.
///
/// Clones share the received update and the transport, so handing a copy to each middleware is cheap.
#[derive(Clone)]
pub struct Context {
    update: Arc<RawUpdate>,
    content: String,
    sender: Sender,
    transport: Arc<dyn Transport>,
}

impl Context {
    /// Decodes `update.text` and binds the sender for replies.
    pub fn from_update(update: RawUpdate, transport: Arc<dyn Transport>) -> Self {
        let content = decode_content(&update.text);
        Self::new(update, content, transport)
    }

    /// Builds a context with already-decoded content.
    pub fn new(update: RawUpdate, content: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        let sender = update.sender.clone();
        Self {
            update: Arc::new(update),
            content: content.into(),
            sender,
            transport,
        }
    }

    /// The update as received.
    pub fn update(&self) -> &RawUpdate {
        &self.update
    }

    /// Decoded message text; empty if the update carried none.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Sends `text` back to the sender. One send, no retry.
    #[instrument(skip(self, text), fields(sender_id = %self.sender.id))]
    pub async fn reply(&self, text: &str) -> Result<()> {
        debug!(reply_len = text.len(), "sending reply");
        self.transport.send_text(&self.sender.id, text).await
    }

    /// Sends the file at `path` to the sender with the caption `"photo"`.
    ///
    /// Fails with [`YobotError::FileNotFound`] before any network call if `path` is not a file.
    #[instrument(skip(self, path), fields(sender_id = %self.sender.id))]
    pub async fn reply_with_photo(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let is_file = tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(YobotError::FileNotFound(path.to_path_buf()));
        }
        debug!(path = %path.display(), "sending photo reply");
        self.transport
            .send_media(&self.sender.id, PHOTO_CAPTION, path)
            .await
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("content", &self.content)
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}
