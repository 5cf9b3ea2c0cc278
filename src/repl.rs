use anyhow::{Context, Result};
use reqwest::Client;
use std::io::{self, Write};

use crate::config::Config;
use crate::gate::{self, AccessState};
use crate::gateway::{Gateway, GenerationOutcome};
use crate::validate;

pub async fn run_repl(client: &Client, cfg: &Config) -> Result<()> {
    let gateway = Gateway::new(client, cfg);
    let mut access = AccessState {
        authenticated: cfg.access_secret.is_none(),
    };
    let mut language = cfg.default_language().to_string();

    println!("askme chatbot");
    println!("model: {}", cfg.model_id);
    println!(
        "type a question, '/language <name>' to switch languages, '/logout' to lock the session, or 'exit' to quit"
    );

    loop {
        if !access.authenticated {
            let Some(submitted) = prompt_line("password: ")? else {
                break;
            };
            let secret = cfg.access_secret.as_deref().unwrap_or_default();
            access = gate::check_access(access, Some(submitted.trim()), secret);
            if !access.authenticated {
                println!("Incorrect password.\n");
            }
            continue;
        }

        let Some(input) = prompt_line("> ")? else {
            break;
        };
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }
        if let Some(rest) = input.strip_prefix("/language") {
            let requested = rest.trim();
            if cfg.supports_language(requested) {
                language = requested.to_lowercase();
                println!("language set to {language}\n");
            } else {
                println!("supported languages: {}\n", cfg.languages.join(", "));
            }
            continue;
        }
        if input.eq_ignore_ascii_case("/logout") {
            if cfg.access_secret.is_some() {
                access = gate::logout(access);
                println!("session locked\n");
            } else {
                println!("no password is configured\n");
            }
            continue;
        }

        let question = match validate::validate(input, &cfg.validation) {
            Ok(question) => question,
            Err(err) => {
                println!("{err}\n");
                continue;
            }
        };

        match gateway.ask(&language, &question).await {
            GenerationOutcome::Answer(text) => println!("{}\n", text.trim()),
            GenerationOutcome::Failure { message, .. } => println!("{message}\n"),
        }
    }

    Ok(())
}

pub(crate) fn prompt_line(prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Failed to read stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input))
}
