//! Greeter server
//!
//! Usage:
//!   greeter                                   # Serve on 127.0.0.1:9000
//!   greeter --addr 0.0.0.0:8080               # Custom address
//!   GREETER_SECRET=... greeter --verbose      # Secret from env, debug logs

use clap::Parser;
use std::process::ExitCode;

use greeter::config::AppConfig;
use greeter::core::run_server;

#[tokio::main]
async fn main() -> ExitCode {
    let config = AppConfig::parse();

    let filter = match config.env_filter() {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("greeter: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::debug!(?config, "starting");
    if config.secret == greeter::DEFAULT_SECRET {
        tracing::warn!("using the development session secret; set GREETER_SECRET");
    }

    match run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}
