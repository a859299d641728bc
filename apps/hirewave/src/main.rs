use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hirewave::api_client::HireWaveClient;
use hirewave::cli::Cli;
use hirewave::commands::{self, Context};
use hirewave::config::Config;
use hirewave::errors::ClientError;
use hirewave::session::{FileStore, Session};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<ClientError>() {
            Some(client_error) => eprintln!("Error: {}", client_error.user_message()),
            None => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;

    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!(
        "hirewave v{} against {} (session file {})",
        env!("CARGO_PKG_VERSION"),
        config.api_url,
        config.session_file.display()
    );

    let session = Session::new(Arc::new(FileStore::new(&config.session_file)));
    let client = HireWaveClient::new(&config.api_url, config.request_timeout, session.clone())?;

    let ctx = Context {
        config,
        session,
        client,
    };
    commands::dispatch(cli.command, &ctx).await
}
