use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use weixin_notice::server;
use weixin_notice::utils::config_loader;
use weixin_notice::utils::logging::{self, LogLevel};
use weixin_notice::{NoticeDispatcher, NoticeRequest};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "weixin-notice.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve `POST /notice` (default)
    Serve,
    /// Send a single notice and print the provider outcome
    Send {
        #[arg(long)]
        platform: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        jump_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level).await?;

    // -------------------------------
    // 2. Provider client, credential cache, dispatcher
    // -------------------------------

    let dispatcher = Arc::new(NoticeDispatcher::from_config(&service_config)?);
    info!(
        app_id = %service_config.provider.app_id,
        validation = ?dispatcher.policy(),
        "notice dispatcher ready"
    );

    // -------------------------------
    // 3. Run
    // -------------------------------

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => server::server::start(&service_config.settings, dispatcher).await,
        Command::Send { platform, subject, description, jump_url } => {
            let request = NoticeRequest::new(platform, subject, description, jump_url);
            let response = dispatcher.send_notice(Some(request)).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            if !response.success() {
                bail!("provider rejected notice");
            }
            Ok(())
        }
    }
}
