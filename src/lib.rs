pub mod cli;
pub mod config;
pub mod fallback;
pub mod logging;
pub mod model;
pub mod providers;
pub mod repl;
pub mod session;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;

use cli::Cli;
use config::Config;
use fallback::send_with_fallback;
use model::HttpChatBackend;
use repl::run_repl;
use session::ChatSession;

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let args = Cli::parse();
    let cfg = Config::from_cli(&args)?;
    let client = Client::builder()
        .build()
        .context("Failed to initialize HTTP client")?;
    let backend = HttpChatBackend;

    match &args.prompt {
        Some(prompt) => {
            let session = ChatSession::new(&cfg.model);
            let (_session, answer) =
                send_with_fallback(&client, &cfg, &backend, session, prompt).await?;
            println!("{answer}");
            Ok(())
        }
        None => run_repl(&client, &cfg, &backend).await,
    }
}
