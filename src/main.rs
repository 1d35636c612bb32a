//! PagePilot - structured page capture and verified page actions.
//!
//! `capture` and `selector-map` work on HTML files offline; `act` drives a
//! live Chromium tab over the DevTools protocol.

mod cli;
mod cmd_act;
mod cmd_capture;
mod cmd_config;
mod settings;

use std::path::Path;

use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use pagepilot_config::{ConfigLoader, LoggingConfig};

use cli::{Cli, Commands};
use cmd_capture::CaptureArgs;

fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    // stdout carries command output, so the console layer writes to stderr.
    let console = fmt::layer()
        .with_target(true)
        .with_ansi(true)
        .with_writer(std::io::stderr);

    let file = match &logging.file_dir {
        Some(dir) => {
            let log_dir = Path::new(dir);
            std::fs::create_dir_all(log_dir)?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("pagepilot")
                .filename_suffix("log")
                .max_log_files(30)
                .build(log_dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // Flushes pending lines on exit.
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = ConfigLoader::load_or_default(cli.config.as_deref())?;
    init_tracing(&config.logging)?;

    match cli.command {
        Commands::Capture {
            file,
            base_url,
            max_controls,
            max_headings,
            include_values,
            pretty,
        } => {
            let args = CaptureArgs {
                base_url,
                max_controls,
                max_headings,
                include_values,
            };
            cmd_capture::run_capture(&config, &file, args, pretty).await
        }
        Commands::SelectorMap {
            file,
            base_url,
            pretty,
        } => cmd_capture::run_selector_map(&config, &file, base_url, pretty).await,
        Commands::Act {
            action,
            endpoint,
            target,
            pretty,
        } => cmd_act::run_act(&config, &action, endpoint, target, pretty).await,
        Commands::ConfigCheck => cmd_config::run_config_check(&config),
    }
}
