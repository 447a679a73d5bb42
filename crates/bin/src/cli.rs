//! CLI argument definitions for the docstash binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Path-addressable JSON document server
#[derive(Parser, Debug)]
#[command(name = "docstash")]
#[command(about = "docstash: a single JSON document, read and written by path over HTTP")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Serve arguments used when no subcommand is given
    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the document server
    Serve(ServeArgs),
    /// Check health of a running docstash server
    Health(HealthArgs),
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080, env = "PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "DOCSTASH_HOST")]
    pub host: String,

    /// JSON file holding the document. Created as `{}` if absent.
    #[arg(
        short = 'f',
        long,
        default_value = "data.json",
        env = "DOCSTASH_DATA_FILE"
    )]
    pub data_file: PathBuf,

    /// Keep the document in memory only; nothing is written to disk
    #[arg(long)]
    pub ephemeral: bool,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Port of the server to check
    #[arg(short, long, default_value_t = 8080, env = "PORT")]
    pub port: u16,

    /// Host of the server to check
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}
