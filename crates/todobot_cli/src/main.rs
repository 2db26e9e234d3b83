use clap::Parser;
use clap::error::ErrorKind;
use log::{info, warn};
use std::sync::Arc;
use todobot_cli::cli::Cli;
use todobot_cli::console::{ConsoleSink, route_line};
use todobot_core::bot::{BotSettings, TodoBot};
use todobot_core::config::{
    Config, load_config_from_path, load_config_with_fallback, merge_overrides,
};
use todobot_core::error::AppError;
use todobot_core::schedule::TokioScheduler;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn load_settings(cli: &Cli) -> Result<Config, AppError> {
    let (base, fallback_error) = match cli.config.as_deref() {
        Some(path) => (load_config_from_path(path)?, None),
        None => {
            let loaded = load_config_with_fallback();
            (loaded.config, loaded.error)
        }
    };

    let overrides = cli.overrides().map_err(AppError::invalid_input)?;
    let config = merge_overrides(&base, &overrides);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    if let Some(err) = fallback_error {
        warn!("using default configuration: {err}");
    }

    Ok(config)
}

async fn run_interactive(cli: &Cli, config: &Config) -> Result<(), AppError> {
    // Resolved before tokio starts blocking threads for stdin.
    let settings = BotSettings::from_config(config)?;
    let sink = Arc::new(ConsoleSink);
    let scheduler = TokioScheduler::new(Handle::current(), sink.clone());
    let mut bot = TodoBot::new(settings, scheduler, sink);
    info!(
        "listening for '{}' commands on stdin",
        config.command_prefix
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(input) = lines
        .next_line()
        .await
        .map_err(|err| AppError::io(err.to_string()))?
    {
        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        let inbound = route_line(line, &cli.user, cli.default_chat());
        bot.handle_message(&inbound.user, &inbound.chat, inbound.text);
    }

    let scheduler = bot.scheduler();
    if cli.wait {
        info!("waiting for {} reminder(s)", scheduler.pending());
        scheduler.wait_all().await;
    } else {
        scheduler.wait_for_due().await;
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let result = match load_settings(&cli) {
        Ok(config) => run_interactive(&cli, &config).await,
        Err(err) => Err(err),
    };
    if let Err(err) = result {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
