pub mod config;
pub mod gate;
pub mod gateway;
pub mod health;
pub mod logging;
pub mod model;
pub mod providers;
pub mod repl;
pub mod validate;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use std::env;
use std::time::Duration;
use tracing::info;

use config::Config;
use gate::AccessState;
use gateway::{Gateway, GenerationOutcome};
use repl::run_repl;

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let cfg = Config::from_env();
    info!(
        model = %cfg.model_id,
        envelope = cfg.envelope.as_str(),
        region = %cfg.region,
        "loaded runtime configuration"
    );

    let args: Vec<String> = env::args().skip(1).collect();
    if health::is_health_check(health::parse_query_pairs(&args)) {
        println!("OK");
        return Ok(());
    }

    let client = Client::builder()
        .connect_timeout(Duration::from_secs(cfg.retry.connect_timeout_secs))
        .timeout(Duration::from_secs(cfg.retry.read_timeout_secs))
        .build()
        .context("Failed to initialize HTTP client")?;

    if args.is_empty() {
        run_repl(&client, &cfg).await
    } else {
        ask_once(&client, &cfg, &args).await
    }
}

async fn ask_once(client: &Client, cfg: &Config, args: &[String]) -> Result<()> {
    let (language, question_args) = match args.split_first() {
        Some((first, rest)) if cfg.supports_language(first) && !rest.is_empty() => {
            (first.to_lowercase(), rest)
        }
        _ => (cfg.default_language().to_string(), args),
    };
    let question = question_args.join(" ");

    if let Some(secret) = cfg.access_secret.as_deref() {
        let submitted = repl::prompt_line("password: ")?;
        let state = gate::check_access(
            AccessState::default(),
            submitted.as_deref().map(str::trim),
            secret,
        );
        if !state.authenticated {
            bail!("Incorrect password.");
        }
    }

    let question = validate::validate(&question, &cfg.validation)?;
    match Gateway::new(client, cfg).ask(&language, &question).await {
        GenerationOutcome::Answer(text) => {
            println!("{}", text.trim());
            Ok(())
        }
        GenerationOutcome::Failure { message, .. } => bail!(message),
    }
}
