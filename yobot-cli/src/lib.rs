//! # yobot-cli
//!
//! Base CLI foundation: argument parsing, config loading, and the demo bot wiring.

pub mod cli;
pub mod demo;

pub use cli::{load_config, Cli, Commands};
pub use demo::{build_demo_bot, DEFAULT_PHOTO_PATH};
pub use yobot_yoai::YoAiConfig;
