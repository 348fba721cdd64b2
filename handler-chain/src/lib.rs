//! # Handler chain
//!
//! Ordered, continuation-controlled middleware dispatch for each update. Every middleware gets the
//! [`Context`] and a [`Next`]; awaiting `next.run(ctx)` resumes the rest of the chain, not calling it
//! stops the chain there. [`HandlerChain::command`] and [`HandlerChain::on`] always continue, so a
//! message runs every matching handler rather than only the first.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::{debug, instrument};
use yobot_core::{Context, Result};

/// A step in the chain. Call `next.run(ctx)` to hand the update to the remaining middleware.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, ctx: Context, next: Next) -> Result<()>;
}

/// Continuation over the rest of the chain, bound to the index after the current middleware.
///
/// Cloneable; running it more than once runs the remainder more than once.
#[derive(Clone)]
pub struct Next {
    middleware: Arc<Vec<Arc<dyn Middleware>>>,
    index: usize,
}

impl Next {
    /// Runs the middleware at this position; resolves immediately once the chain is exhausted.
    pub fn run(self, ctx: Context) -> BoxFuture<'static, Result<()>> {
        Box::pin(async move {
            let Some(mw) = self.middleware.get(self.index).cloned() else {
                return Ok(());
            };
            let next = Next {
                middleware: self.middleware,
                index: self.index + 1,
            };
            mw.handle(ctx, next).await
        })
    }

    /// Number of middleware this continuation would still run.
    pub fn remaining(&self) -> usize {
        self.middleware.len().saturating_sub(self.index)
    }
}

/// Raw middleware from a closure `(ctx, next) -> future`.
pub struct FnMiddleware<F>(pub F);

#[async_trait]
impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(Context, Next) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    async fn handle(&self, ctx: Context, next: Next) -> Result<()> {
        (self.0)(ctx, next).await
    }
}

/// Returns the command name if `content` is a command: leading `/` stripped, whitespace trimmed.
pub fn command_name(content: &str) -> Option<&str> {
    content.strip_prefix('/').map(str::trim)
}

/// Runs `handler` when the content is exactly `/<name>` (surrounding whitespace ignored), then
/// continues the chain whether or not it matched.
pub struct CommandMiddleware<F> {
    name: String,
    handler: F,
}

impl<F> CommandMiddleware<F> {
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

#[async_trait]
impl<F, Fut> Middleware for CommandMiddleware<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    async fn handle(&self, ctx: Context, next: Next) -> Result<()> {
        if command_name(ctx.content()) == Some(self.name.as_str()) {
            debug!(command = %self.name, sender_id = %ctx.sender().id, "step: command matched");
            (self.handler)(ctx.clone()).await?;
        }
        next.run(ctx).await
    }
}

/// Runs `handler` for any non-empty, non-command message, then continues the chain.
///
/// The event label is only used in logs; every listener matches the same messages.
pub struct ListenerMiddleware<F> {
    event: String,
    handler: F,
}

impl<F> ListenerMiddleware<F> {
    pub fn new(event: impl Into<String>, handler: F) -> Self {
        Self {
            event: event.into(),
            handler,
        }
    }
}

#[async_trait]
impl<F, Fut> Middleware for ListenerMiddleware<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    async fn handle(&self, ctx: Context, next: Next) -> Result<()> {
        let content = ctx.content();
        if !content.is_empty() && !content.starts_with('/') {
            debug!(event = %self.event, sender_id = %ctx.sender().id, "step: listener fired");
            (self.handler)(ctx.clone()).await?;
        }
        next.run(ctx).await
    }
}

/// Ordered middleware list. Built with the by-value methods below, then shared (cheap clone) by
/// every dispatch; the list is never mutated while dispatching.
#[derive(Clone, Default)]
pub struct HandlerChain {
    middleware: Arc<Vec<Arc<dyn Middleware>>>,
}

impl HandlerChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware. No validation; the same middleware may be added twice.
    pub fn use_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        Arc::make_mut(&mut self.middleware).push(middleware);
        self
    }

    /// Appends a closure middleware `(ctx, next) -> future`.
    pub fn use_fn<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.use_middleware(Arc::new(FnMiddleware(f)))
    }

    /// Appends a command middleware for `/<name>`.
    pub fn command<F, Fut>(self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.use_middleware(Arc::new(CommandMiddleware::new(name, handler)))
    }

    /// Appends a listener for non-command messages. `event` does not filter anything.
    pub fn on<F, Fut>(self, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.use_middleware(Arc::new(ListenerMiddleware::new(event, handler)))
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Runs the chain from the first middleware. An error from any middleware stops the chain and
    /// is returned.
    #[instrument(skip(self, ctx), fields(sender_id = %ctx.sender().id))]
    pub async fn dispatch(&self, ctx: Context) -> Result<()> {
        debug!(middleware_count = self.middleware.len(), "step: dispatch started");
        let next = Next {
            middleware: self.middleware.clone(),
            index: 0,
        };
        next.run(ctx).await?;
        debug!("step: dispatch finished");
        Ok(())
    }
}
