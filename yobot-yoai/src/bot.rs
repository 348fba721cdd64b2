//! Bot facade: owns the handler chain, the transport and the poll policy.

use std::future::Future;
use std::sync::Arc;

use handler_chain::{HandlerChain, Middleware, Next};
use tracing::{info, instrument};
use yobot_core::{Context, RawUpdate, Result, Transport};

use crate::client::YoAiClient;
use crate::config::YoAiConfig;
use crate::policy::PollPolicy;
use crate::runner::UpdateLoop;

/// A bot: register middleware with the builder methods, then [`start`](Bot::start) polling.
pub struct Bot {
    chain: HandlerChain,
    transport: Arc<dyn Transport>,
    policy: PollPolicy,
}

impl Bot {
    /// Bot talking to the public YoAI API with the given key.
    pub fn new(api_key: &str) -> Result<Self> {
        Ok(Self::with_transport(Arc::new(YoAiClient::new(api_key)?)))
    }

    /// Bot built from config: API URL and poll policy included.
    pub fn from_config(config: &YoAiConfig) -> Result<Self> {
        let client = YoAiClient::with_base_url(&config.api_key, config.api_url())?;
        Ok(Self::with_transport(Arc::new(client)).with_policy(config.poll_policy()))
    }

    /// Bot over any transport (tests, alternative gateways).
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            chain: HandlerChain::new(),
            transport,
            policy: PollPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn use_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.chain = self.chain.use_middleware(middleware);
        self
    }

    pub fn use_fn<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.chain = self.chain.use_fn(f);
        self
    }

    pub fn command<F, Fut>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.chain = self.chain.command(name, handler);
        self
    }

    pub fn on<F, Fut>(mut self, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.chain = self.chain.on(event, handler);
        self
    }

    pub fn chain(&self) -> &HandlerChain {
        &self.chain
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Decodes one update and runs it through the chain (awaited; for tests and custom loops).
    pub async fn handle_update(&self, update: RawUpdate) -> Result<()> {
        let ctx = Context::from_update(update, self.transport.clone());
        self.chain.dispatch(ctx).await
    }

    /// Polls until the policy halts. There is no stop handle.
    #[instrument(skip(self))]
    pub async fn start(self) {
        info!(policy = ?self.policy, "Bot started");
        UpdateLoop::new(self.transport, self.chain, self.policy)
            .run()
            .await;
    }
}
