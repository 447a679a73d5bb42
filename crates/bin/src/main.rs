use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Health(args)) => commands::health::run(&args).await,
        Some(Commands::Serve(args)) => {
            init_tracing()?;
            commands::serve::run(&args).await
        }
        None => {
            init_tracing()?;
            commands::serve::run(&cli.serve).await
        }
    }
}

/// Logs to stderr, filtered by `RUST_LOG` with `docstash=info` as the default.
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("docstash=info".parse()?))
        .init();
    Ok(())
}
