//! Demo bot: /start, /ping, /photo and an echo listener, behind logging and an optional allowlist.

use std::path::PathBuf;
use std::sync::Arc;

use middleware::{AllowlistMiddleware, LoggingMiddleware};
use tracing::warn;
use yobot_core::YobotError;
use yobot_yoai::Bot;

/// Photo sent in reply to /photo when no path is configured.
pub const DEFAULT_PHOTO_PATH: &str = "assets/photo.png";

/// Registers the demo middleware on `bot`.
pub fn build_demo_bot(bot: Bot, allowed_senders: Vec<String>, photo: Option<PathBuf>) -> Bot {
    let photo = Arc::new(photo.unwrap_or_else(|| PathBuf::from(DEFAULT_PHOTO_PATH)));

    let mut bot = bot.use_middleware(Arc::new(LoggingMiddleware));
    if !allowed_senders.is_empty() {
        bot = bot.use_middleware(Arc::new(AllowlistMiddleware::new(allowed_senders)));
    }

    bot.command("start", |ctx| async move {
        ctx.reply("Hi! Send /ping, /photo, or any text.").await
    })
    .command("ping", |ctx| async move { ctx.reply("pong").await })
    .command("photo", move |ctx| {
        let photo = photo.clone();
        async move {
            match ctx.reply_with_photo(photo.as_path()).await {
                Err(YobotError::FileNotFound(path)) => {
                    warn!(path = %path.display(), "photo missing");
                    ctx.reply("Sorry, no photo available.").await
                }
                other => other,
            }
        }
    })
    .on("text", |ctx| async move {
        let echo = format!("You said: {}", ctx.content());
        ctx.reply(&echo).await
    })
}
