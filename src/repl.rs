use std::io::{self, Write};

use anyhow::{Context, Result};
use reqwest::Client;

use crate::config::Config;
use crate::fallback::send_with_fallback;
use crate::model::ChatBackend;
use crate::session::ChatSession;

/// Interactive loop: read a line, dispatch it as a prompt, print the
/// reply. The dispatcher may swap the session out under us when the
/// configured model turns out not to be served. Any error it does not
/// recover from is fatal for the whole process.
pub async fn run_repl<B: ChatBackend>(client: &Client, cfg: &Config, backend: &B) -> Result<()> {
    let mut session = ChatSession::new(&cfg.model);

    println!("Gemini REPL. Type 'exit' or 'quit' to stop.");
    println!("model: {}", cfg.model);

    loop {
        print!("\n> ");
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .context("Failed to read stdin")?;
        if read == 0 {
            println!();
            break;
        }

        let prompt = input.trim();
        if prompt.is_empty() {
            continue;
        }
        if prompt.eq_ignore_ascii_case("exit") || prompt.eq_ignore_ascii_case("quit") {
            break;
        }

        let (next_session, answer) =
            send_with_fallback(client, cfg, backend, session, prompt).await?;
        session = next_session;
        println!("{answer}");
    }

    Ok(())
}
