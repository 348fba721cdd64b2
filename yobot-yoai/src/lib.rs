//! # yobot-yoai
//!
//! YoAI bot framework layer: HTTP [`Transport`](yobot_core::Transport) implementation, minimal
//! config, poll policy, update loop, and the [`Bot`] facade.
//! Handles only platform connectivity and handler-chain execution; no persistence.

mod bot;
mod client;
mod config;
mod policy;
mod runner;

pub use bot::Bot;
pub use client::{classify_error, YoAiClient, API_KEY_HEADER, DEFAULT_API_URL};
pub use config::YoAiConfig;
pub use policy::{NextAction, PollOutcome, PollPolicy, StatusAction, DEFAULT_RETRY_DELAY};
pub use runner::{dispatch_batch, UpdateLoop};
