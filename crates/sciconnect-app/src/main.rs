//! SciConnect binary: composition root and interactive shell.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Initialize tracing
//! 3. Build the app (catalog, conversations, media, donations)
//! 4. Read commands from stdin until quit, EOF or Ctrl-C

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use sciconnect_app::cli::CliArgs;
use sciconnect_app::{App, Command, Flow};
use sciconnect_core::config::SciConnectConfig;
use sciconnect_donation::MockPaymentProvider;
use sciconnect_media::{DevicePolicy, MockMediaDevices};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliArgs::parse();

    // Config.
    let config_file = cli.resolve_config_path();
    let mut config = SciConnectConfig::load_or_default(&config_file);
    cli.apply_overrides(&mut config);

    // Tracing.
    let level = cli.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting SciConnect v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    let policy = if cli.deny_media {
        DevicePolicy::Deny
    } else {
        DevicePolicy::Grant
    };
    let devices = MockMediaDevices::new(policy);
    let payments = Arc::new(MockPaymentProvider::from_config(&config.donation));

    let mut app = match App::from_config(config, devices, payments) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load catalog");
            return Err(e.into());
        }
    };

    println!("{}", app.render());
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let pending = app.call_pending();
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                None
            }
            Some(_) = app.call_settled(), if pending => {
                println!("{}", app.render());
                continue;
            }
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        match app.dispatch(command).await {
            Flow::Continue(out) => println!("{out}"),
            Flow::Quit => break,
        }
    }

    app.shutdown();
    tracing::info!("SciConnect stopped");
    Ok(())
}
