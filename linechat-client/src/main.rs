//! linechat - terminal client for line-oriented TCP chat servers
//!
//! Connects to a chat server, shows incoming lines in a bordered log and
//! sends whatever the user types on Enter. Ctrl+Q quits.

use std::process::ExitCode;

use linechat_utils::{init_logging_with_config, LogConfig, Result};

mod chat;
mod cli;
mod config;
mod connection;
mod input;
mod ui;

use cli::Args;
use config::ClientConfig;
use ui::App;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command-line arguments first (before terminal setup)
    let args = Args::parse_args();

    // Log to file, the terminal belongs to the UI
    if let Err(e) = init_logging(&args) {
        println!("{}", e);
        return ExitCode::FAILURE;
    }
    tracing::info!("linechat client starting");
    tracing::debug!("CLI args: {:?}", args);

    // The terminal is restored by the time run_app returns
    match run_app(args).await {
        Ok(()) => {
            tracing::info!("linechat client exiting normally");
            println!("Goodbye!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("linechat client error: {}", e);
            println!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let mut config = LogConfig::client();
    if let Some(filter) = &args.log_level {
        config = config.with_filter(filter.as_str());
    }
    init_logging_with_config(config)
}

async fn run_app(args: Args) -> Result<()> {
    let mut config = ClientConfig::load(args.config.as_deref())?;
    if let Some(ms) = args.render_interval_ms {
        config.render_interval_ms = ms;
    }
    config.validate()?;

    let mut app = App::from_config(&config, args.addr.as_deref());
    tracing::info!(addr = app.address(), "Starting chat client");

    app.run().await
}
