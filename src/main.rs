//! CLI entry point for the locshare tool.

use std::io;
use std::process;

use clap::Parser;
use locshare_core::{Credentials, Driver, ProcessExit, ReqwestTransport, run_with_watchdog_since};
use tokio::time::Instant;
use tracing::{debug, error, info};

mod app_config;
mod cli;

use app_config::{RunSettings, VerbositySetting, load_default_file_config};
use cli::Args;

#[tokio::main]
async fn main() {
    process::exit(run().await.code());
}

async fn run() -> ProcessExit {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(parse_error) => {
            let _ = parse_error.print();
            return if Args::is_informational(&parse_error) {
                ProcessExit::Success
            } else {
                ProcessExit::ArgumentError
            };
        }
    };
    // The run deadline counts from here, config loading and client setup included.
    let started = Instant::now();

    let loaded = match load_default_file_config() {
        Ok(loaded) => loaded,
        Err(config_error) => {
            eprintln!("Error: {config_error:#}");
            return ProcessExit::Failure;
        }
    };
    let settings = RunSettings::resolve(&args, loaded.config.as_ref());

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config verbosity > info
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(
        config_path = ?loaded.path,
        config_loaded = loaded.config.is_some(),
        config_verbosity = loaded
            .config
            .as_ref()
            .and_then(|config| config.verbosity)
            .map(VerbositySetting::as_str),
        deadline_secs = settings.deadline.as_secs(),
        logout = settings.driver.logout,
        format = ?settings.driver.format,
        "Settings resolved"
    );
    info!("locshare starting");

    let endpoints = settings.endpoints();
    let credentials = Credentials::new(args.email, args.password);
    let options = settings.driver;

    let exit = run_with_watchdog_since(started, settings.deadline, async {
        let transport = match ReqwestTransport::new() {
            Ok(transport) => transport,
            Err(client_error) => {
                error!(error = %client_error, "Failed to create HTTP client");
                return ProcessExit::Failure;
            }
        };
        let driver = Driver::new(&transport, &endpoints, options);
        let mut stdout = io::stdout().lock();
        driver.run(&credentials, &mut stdout).await
    })
    .await;
    debug!(code = exit.code(), "Run finished");
    exit
}
