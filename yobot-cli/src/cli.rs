//! CLI parser and config loading.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use yobot_yoai::YoAiConfig;

#[derive(Parser, Debug)]
#[command(name = "yobot")]
#[command(about = "YoAI bot CLI", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the demo bot (config from env; token can override YOAI_API_KEY).
    Run {
        #[arg(short, long)]
        token: Option<String>,
        /// Only answer these sender ids (repeatable). Everyone is answered when omitted.
        #[arg(long = "allow")]
        allowed_senders: Vec<String>,
        /// File sent in reply to /photo.
        #[arg(long)]
        photo: Option<PathBuf>,
    },
}

/// Load YoAiConfig from environment. If `token` is provided it overrides YOAI_API_KEY.
pub fn load_config(token: Option<String>) -> Result<YoAiConfig> {
    let config = YoAiConfig::load(token)?;
    config.validate()?;
    Ok(config)
}
