//! Minimal framework config: API key, API URL, log path, and polling behaviour.
//! Loaded from the environment: YOAI_API_KEY, YOAI_API_URL, LOG_FILE, YOAI_RETRY_DELAY_MS,
//! YOAI_KEEP_POLLING.

use std::env;
use std::time::Duration;

use anyhow::Result;

use crate::client::DEFAULT_API_URL;
use crate::policy::{PollPolicy, DEFAULT_RETRY_DELAY};

/// YoAI bot framework config (platform access, logging, polling).
#[derive(Debug, Clone)]
pub struct YoAiConfig {
    /// YOAI_API_KEY
    pub api_key: String,
    /// YOAI_API_URL; [`DEFAULT_API_URL`] when unset
    pub api_url: Option<String>,
    /// LOG_FILE; stdout only when unset
    pub log_file: Option<String>,
    /// YOAI_RETRY_DELAY_MS
    pub retry_delay_ms: u64,
    /// YOAI_KEEP_POLLING: resume instead of halting on 429, >= 500 and unexpected statuses
    pub keep_polling: bool,
}

impl YoAiConfig {
    /// Load from environment variables: YOAI_API_KEY required, the rest optional.
    pub fn from_env() -> Result<Self> {
        let api_key =
            env::var("YOAI_API_KEY").map_err(|_| anyhow::anyhow!("YOAI_API_KEY not set"))?;
        Self::from_env_with_key(api_key)
    }

    /// Like [`from_env`](Self::from_env), but `token` overrides YOAI_API_KEY when given.
    pub fn load(token: Option<String>) -> Result<Self> {
        match token {
            Some(api_key) => Self::from_env_with_key(api_key),
            None => Self::from_env(),
        }
    }

    fn from_env_with_key(api_key: String) -> Result<Self> {
        let api_url = env::var("YOAI_API_URL").ok();
        let log_file = env::var("LOG_FILE").ok();
        let retry_delay_ms = match env::var("YOAI_RETRY_DELAY_MS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("YOAI_RETRY_DELAY_MS is not a number: {}", raw))?,
            Err(_) => DEFAULT_RETRY_DELAY.as_millis() as u64,
        };
        let keep_polling = env::var("YOAI_KEEP_POLLING")
            .map(|v| parse_bool(&v))
            .unwrap_or(false);

        Ok(Self {
            api_key,
            api_url,
            log_file,
            retry_delay_ms,
            keep_polling,
        })
    }

    /// Build with the given key; everything else at its default.
    pub fn with_token(api_key: String) -> Self {
        Self {
            api_key,
            api_url: None,
            log_file: None,
            retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
            keep_polling: false,
        }
    }

    /// Rejects an empty key and an API URL that does not parse.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            anyhow::bail!("YOAI_API_KEY is empty");
        }
        if let Some(ref url_str) = self.api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!("YOAI_API_URL is set but not a valid URL: {}", url_str);
            }
        }
        Ok(())
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        let policy = if self.keep_polling {
            PollPolicy::keep_polling()
        } else {
            PollPolicy::default()
        };
        policy.with_retry_delay(Duration::from_millis(self.retry_delay_ms))
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
