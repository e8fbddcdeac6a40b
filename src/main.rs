use clap::Parser;
use rego_chat::{
    config::{initialize_config, validate_config},
    logging, repl, ui, App, ChatWidget,
};
use std::path::PathBuf;

/// Terminal client for a Rego policy chatbot server.
#[derive(Parser, Debug)]
#[command(name = "rego-chat", version, about)]
struct Args {
    /// Base URL of the chat server (overrides config and environment).
    #[arg(long)]
    server: Option<String>,

    /// Path to the JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use a plain line prompt instead of the full-screen UI.
    #[arg(long)]
    plain: bool,

    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut config = initialize_config(args.config.as_deref())?;
    config.apply_env_overrides();
    if let Some(server) = args.server {
        config.server_url = server;
    }
    if let Some(level) = args.log_level {
        config.log_level = level.to_lowercase();
    }
    validate_config(&config)?;

    let _logger = logging::init(&config)?;
    log::info!("chatting with {}", config.chat_endpoint());

    if args.plain {
        let mut widget = ChatWidget::from_config(&config)?;
        widget.initialize();
        repl::run_repl(widget).await?;
    } else {
        ui::run_ui(App::new(&config)?).await?;
    }

    log::info!("session ended");
    Ok(())
}
