//! Middleware for logging and an optional sender allowlist.

use std::collections::HashSet;

use async_trait::async_trait;
use handler_chain::{Middleware, Next};
use tracing::{debug, error, info, instrument};
use yobot_core::{Context, Result, YobotError};

/// Logs each message before the rest of the chain and when it finishes; always continues.
pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    #[instrument(skip(self, ctx, next))]
    async fn handle(&self, ctx: Context, next: Next) -> Result<()> {
        let sender_id = ctx.sender().id.clone();
        info!(
            sender_id = %sender_id,
            message_content = %ctx.content(),
            "Received message"
        );
        let result = next.run(ctx).await;
        debug!(sender_id = %sender_id, ok = result.is_ok(), "Processed message");
        result
    }
}

/// Stops the chain with [`YobotError::Unauthorized`] if the sender id is not in the allowlist.
pub struct AllowlistMiddleware {
    allowed_senders: HashSet<String>,
}

impl AllowlistMiddleware {
    /// Creates a middleware that lets only the given sender ids through.
    pub fn new<I, S>(allowed_senders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_senders: allowed_senders.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_allowed(&self, sender_id: &str) -> bool {
        self.allowed_senders.contains(sender_id)
    }
}

#[async_trait]
impl Middleware for AllowlistMiddleware {
    #[instrument(skip(self, ctx, next))]
    async fn handle(&self, ctx: Context, next: Next) -> Result<()> {
        let sender_id = ctx.sender().id.clone();
        if !self.is_allowed(&sender_id) {
            error!(sender_id = %sender_id, "Unauthorized access attempt");
            return Err(YobotError::Unauthorized(sender_id));
        }
        debug!(sender_id = %sender_id, "Sender authorized");
        next.run(ctx).await
    }
}
