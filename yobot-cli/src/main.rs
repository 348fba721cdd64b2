//! yobot CLI: run the demo bot. Config from env and optional CLI args.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use yobot_cli::{build_demo_bot, load_config, Cli, Commands};
use yobot_yoai::Bot;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            token,
            allowed_senders,
            photo,
        } => {
            let config = load_config(token)?;
            if let Some(dir) = config
                .log_file
                .as_deref()
                .and_then(|f| std::path::Path::new(f).parent())
                .filter(|d| !d.as_os_str().is_empty())
            {
                std::fs::create_dir_all(dir)?;
            }
            yobot_core::init_tracing(config.log_file.as_deref())?;

            info!(
                api_url = %config.api_url(),
                keep_polling = config.keep_polling,
                retry_delay_ms = config.retry_delay_ms,
                "Initializing bot"
            );

            let bot = build_demo_bot(Bot::from_config(&config)?, allowed_senders, photo);
            bot.start().await;
            Ok(())
        }
    }
}
