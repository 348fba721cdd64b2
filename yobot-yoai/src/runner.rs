//! Polling runner: fetches updates, hands each batch to the handler chain on a spawned task, and
//! follows [`PollPolicy`] to decide when to poll again.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use handler_chain::HandlerChain;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};
use yobot_core::{Context, RawUpdate, Transport};

use crate::policy::{NextAction, PollOutcome, PollPolicy};

/// Unbounded polling loop over a [`Transport`].
pub struct UpdateLoop {
    transport: Arc<dyn Transport>,
    chain: HandlerChain,
    policy: PollPolicy,
}

impl UpdateLoop {
    pub fn new(transport: Arc<dyn Transport>, chain: HandlerChain, policy: PollPolicy) -> Self {
        Self {
            transport,
            chain,
            policy,
        }
    }

    /// Polls until the policy halts. Batches are not awaited before the next poll; on halt the
    /// loop waits for batches still in flight, then returns.
    #[instrument(skip(self))]
    pub async fn run(self) {
        let mut in_flight = JoinSet::new();
        info!(middleware_count = self.chain.len(), "step: update loop started");

        loop {
            while let Some(finished) = in_flight.try_join_next() {
                log_batch_result(finished);
            }

            let outcome = match self.transport.fetch_updates().await {
                Ok(response) => {
                    debug!(
                        status = response.status,
                        batch_len = response.updates.len(),
                        "getUpdates returned"
                    );
                    if response.status == 200 && !response.updates.is_empty() {
                        let chain = self.chain.clone();
                        let transport = self.transport.clone();
                        in_flight.spawn(dispatch_batch(chain, transport, response.updates));
                    }
                    PollOutcome::Status(response.status)
                }
                Err(err) => {
                    warn!(error = %err, kind = %err.kind, "getUpdates failed");
                    PollOutcome::Failed(err.kind)
                }
            };

            log_status(outcome);

            match self.policy.next_action(outcome) {
                NextAction::PollNow => {}
                NextAction::PollAfter(delay) => {
                    debug!(delay_ms = delay.as_millis() as u64, "waiting before next poll");
                    tokio::time::sleep(delay).await;
                }
                NextAction::Halt { after } => {
                    if let Some(delay) = after {
                        tokio::time::sleep(delay).await;
                    }
                    warn!(?outcome, "polling halted; restart the bot to resume");
                    break;
                }
            }
        }

        while let Some(finished) = in_flight.join_next().await {
            log_batch_result(finished);
        }
        info!("step: update loop finished");
    }
}

/// Decodes and dispatches a batch in order. A failing or panicking update is logged and does not
/// stop the rest.
pub async fn dispatch_batch(
    chain: HandlerChain,
    transport: Arc<dyn Transport>,
    updates: Vec<RawUpdate>,
) {
    for update in updates {
        let ctx = Context::from_update(update, transport.clone());
        let sender_id = ctx.sender().id.clone();
        debug!(sender_id = %sender_id, "step: processing update (handler chain started)");
        match AssertUnwindSafe(chain.dispatch(ctx)).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, sender_id = %sender_id, "Handler chain failed"),
            Err(panic) => error!(
                panic = panic_message(panic.as_ref()),
                sender_id = %sender_id,
                "Handler chain panicked"
            ),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

fn log_status(outcome: PollOutcome) {
    match outcome {
        PollOutcome::Status(200 | 204) | PollOutcome::Failed(_) => {}
        PollOutcome::Status(429) => error!(status = 429, "Rate limit reached"),
        PollOutcome::Status(status) if status >= 500 => {
            warn!(status, "Server error from getUpdates")
        }
        PollOutcome::Status(status) => error!(status, "Service unavailable"),
    }
}

fn log_batch_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "Update batch task failed");
    }
}
