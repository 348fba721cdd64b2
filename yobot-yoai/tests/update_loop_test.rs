//! Integration tests for the update loop and [`yobot_yoai::Bot`].
//!
//! Uses a scripted in-memory transport: each `fetch_updates` call pops the next scripted result;
//! once the script is exhausted it answers 429, which halts the loop under the default policy.
//! Time is paused so retry delays are observed without waiting.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use handler_chain::HandlerChain;
use tokio::time::Instant;
use yobot_core::{
    FetchResponse, RawUpdate, Sender, Transport, TransportError, TransportErrorKind, YobotError,
};
use yobot_yoai::{Bot, PollPolicy, UpdateLoop};

type FetchResult = Result<FetchResponse, TransportError>;

struct ScriptedTransport {
    script: Mutex<VecDeque<FetchResult>>,
    fetch_times: Mutex<Vec<Instant>>,
    sent: Mutex<Vec<(String, String)>>,
}

impl ScriptedTransport {
    fn new(script: Vec<FetchResult>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fetch_times: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn fetch_count(&self) -> usize {
        self.fetch_times.lock().unwrap().len()
    }

    /// Delay between the first and the n-th fetch.
    fn gap(&self, n: usize) -> Duration {
        let times = self.fetch_times.lock().unwrap();
        times[n] - times[0]
    }

    fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_text(&self, to: &str, text: &str) -> yobot_core::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), text.to_string()));
        Ok(())
    }

    async fn send_media(&self, _to: &str, _caption: &str, _file: &Path) -> yobot_core::Result<()> {
        Ok(())
    }

    async fn fetch_updates(&self) -> FetchResult {
        self.fetch_times.lock().unwrap().push(Instant::now());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(FetchResponse::empty(429)))
    }
}

fn update(body: &str, sender_id: &str) -> RawUpdate {
    RawUpdate::new(STANDARD.encode(body), Sender::new(sender_id))
}

fn envelope(content: &str) -> String {
    serde_json::json!({ "content": { "content": content } }).to_string()
}

/// Chain recording the content of every dispatched context.
fn recording_chain(seen: &Arc<Mutex<Vec<String>>>) -> HandlerChain {
    let seen = seen.clone();
    HandlerChain::new().use_fn(move |ctx, next| {
        seen.lock().unwrap().push(ctx.content().to_string());
        next.run(ctx)
    })
}

/// **Test: A 200 batch dispatches one context per update, in batch order.**
#[tokio::test(start_paused = true)]
async fn test_batch_dispatched_in_order() {
    let transport = ScriptedTransport::new(vec![Ok(FetchResponse::new(
        200,
        vec![
            update(&envelope("first"), "u-1"),
            update("second", "u-2"),
            update(&envelope("/third"), "u-3"),
        ],
    ))]);
    let seen = Arc::new(Mutex::new(Vec::new()));

    UpdateLoop::new(transport.clone(), recording_chain(&seen), PollPolicy::default())
        .run()
        .await;

    assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "/third"]);
    assert_eq!(transport.fetch_count(), 2);
}

/// **Test: 200 and 204 re-poll immediately.**
#[tokio::test(start_paused = true)]
async fn test_success_statuses_poll_without_delay() {
    let transport = ScriptedTransport::new(vec![
        Ok(FetchResponse::empty(204)),
        Ok(FetchResponse::new(200, vec![])),
        Ok(FetchResponse::empty(204)),
    ]);

    UpdateLoop::new(transport.clone(), HandlerChain::new(), PollPolicy::default())
        .run()
        .await;

    assert_eq!(transport.fetch_count(), 4);
    assert_eq!(transport.gap(3), Duration::ZERO);
}

/// **Test: A 500 waits the retry delay, then halts under the default policy.**
#[tokio::test(start_paused = true)]
async fn test_server_error_waits_then_halts() {
    let transport = ScriptedTransport::new(vec![Ok(FetchResponse::empty(500))]);
    let started = Instant::now();

    UpdateLoop::new(transport.clone(), HandlerChain::new(), PollPolicy::default())
        .run()
        .await;

    assert_eq!(transport.fetch_count(), 1);
    assert!(started.elapsed() >= Duration::from_millis(5000));
}

/// **Test: With keep_polling, a 500 re-polls after at least 5 s.**
#[tokio::test(start_paused = true)]
async fn test_server_error_resumes_with_keep_polling() {
    let transport = ScriptedTransport::new(vec![
        Ok(FetchResponse::empty(503)),
        Ok(FetchResponse::empty(400)),
    ]);
    let policy = PollPolicy {
        on_unexpected_status: yobot_yoai::StatusAction::Halt,
        ..PollPolicy::keep_polling()
    };

    UpdateLoop::new(transport.clone(), HandlerChain::new(), policy)
        .run()
        .await;

    assert_eq!(transport.fetch_count(), 2);
    assert!(transport.gap(1) >= Duration::from_millis(5000));
}

/// **Test: 429 and unexpected statuses halt immediately under the default policy.**
#[tokio::test(start_paused = true)]
async fn test_rate_limit_halts_immediately() {
    for status in [429, 401] {
        let transport = ScriptedTransport::new(vec![
            Ok(FetchResponse::empty(204)),
            Ok(FetchResponse::empty(status)),
            Ok(FetchResponse::empty(204)),
        ]);
        let started = Instant::now();

        UpdateLoop::new(transport.clone(), HandlerChain::new(), PollPolicy::default())
            .run()
            .await;

        assert_eq!(transport.fetch_count(), 2, "status {status}");
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}

/// **Test: Connection resets and bad responses re-poll at once; other failures wait.**
#[tokio::test(start_paused = true)]
async fn test_transport_failures_retry() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportError::new(TransportErrorKind::ConnectionReset, "reset")),
        Err(TransportError::new(TransportErrorKind::BadResponse, "garbled")),
        Err(TransportError::new(TransportErrorKind::Other, "dns")),
    ]);

    UpdateLoop::new(transport.clone(), HandlerChain::new(), PollPolicy::default())
        .run()
        .await;

    assert_eq!(transport.fetch_count(), 4);
    assert_eq!(transport.gap(2), Duration::ZERO);
    assert!(transport.gap(3) >= Duration::from_millis(5000));
}

/// **Test: A failing update does not stop its siblings or the loop.**
#[tokio::test(start_paused = true)]
async fn test_dispatch_error_is_isolated() {
    let transport = ScriptedTransport::new(vec![
        Ok(FetchResponse::new(
            200,
            vec![update("/fail", "u-1"), update("/ping", "u-2")],
        )),
        Ok(FetchResponse::new(200, vec![update("/ping", "u-3")])),
    ]);
    let chain = HandlerChain::new()
        .command("fail", |_ctx| async {
            Err(YobotError::Handler("handler exploded".to_string()))
        })
        .command("ping", |ctx| async move { ctx.reply("pong").await });

    UpdateLoop::new(transport.clone(), chain, PollPolicy::default())
        .run()
        .await;

    let mut sent = transport.sent();
    sent.sort();
    assert_eq!(
        sent,
        vec![
            ("u-2".to_string(), "pong".to_string()),
            ("u-3".to_string(), "pong".to_string()),
        ]
    );
    assert_eq!(transport.fetch_count(), 3);
}

/// **Test: A handler that panics on one update does not stop the rest of its batch.**
#[tokio::test(start_paused = true)]
async fn test_dispatch_panic_is_isolated() {
    let transport = ScriptedTransport::new(vec![Ok(FetchResponse::new(
        200,
        vec![update("/boom", "u-1"), update("/ping", "u-2")],
    ))]);
    let chain = HandlerChain::new()
        .command("boom", |_ctx| async {
            let empty: Vec<u8> = Vec::new();
            let _first: u8 = empty[0];
            Ok(())
        })
        .command("ping", |ctx| async move { ctx.reply("pong").await });

    UpdateLoop::new(transport.clone(), chain, PollPolicy::default())
        .run()
        .await;

    assert_eq!(
        transport.sent(),
        vec![("u-2".to_string(), "pong".to_string())]
    );
    assert_eq!(transport.fetch_count(), 2);
}

/// **Test: End to end, /ping produces exactly one "pong" to the sender.**
#[tokio::test(start_paused = true)]
async fn test_bot_ping_pong() {
    let transport = ScriptedTransport::new(vec![Ok(FetchResponse::new(
        200,
        vec![update(&envelope("/ping"), "sender-77")],
    ))]);

    Bot::with_transport(transport.clone())
        .command("ping", |ctx| async move { ctx.reply("pong").await })
        .on("text", |ctx| async move { ctx.reply("not a command").await })
        .start()
        .await;

    assert_eq!(
        transport.sent(),
        vec![("sender-77".to_string(), "pong".to_string())]
    );
}

/// **Test: Bot::handle_update decodes and dispatches a single update.**
#[tokio::test]
async fn test_bot_handle_update() {
    let transport = ScriptedTransport::new(vec![]);
    let bot = Bot::with_transport(transport.clone())
        .on("text", |ctx| async move {
            let echo = format!("echo: {}", ctx.content());
            ctx.reply(&echo).await
        });

    bot.handle_update(update("plain hello", "u-5")).await.unwrap();

    assert_eq!(
        transport.sent(),
        vec![("u-5".to_string(), "echo: plain hello".to_string())]
    );
    assert_eq!(transport.fetch_count(), 0);
}
