// Copyright 2026 Sketchtab Contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use url::Url;

use sketchtab::cli::{self, config_cmd::ConfigAction};

#[derive(Parser)]
#[command(
    name = "sketchtab",
    about = "Sketchtab — a rotating sketch feed for your new tab",
    version,
    after_help = "Run 'sketchtab <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Override the store file location
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Override the content API endpoint
    #[arg(long, global = true, value_name = "URL")]
    endpoint: Option<Url>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the next sketch, honoring the configured cadence
    Next,
    /// Fetch a fresh sketch regardless of cadence
    Refresh,
    /// Show the most recently fetched sketch without any network call
    Last,
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Show acquisition state
    Status,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "sketchtab=debug" } else { "sketchtab=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "sketchtab", &mut std::io::stdout());
        return Ok(());
    }

    let ctx = cli::Context::build(cli.json, cli.store, cli.endpoint).await?;

    match cli.command {
        Commands::Next => cli::next_cmd::run(&ctx, false).await,
        Commands::Refresh => cli::next_cmd::run(&ctx, true).await,
        Commands::Last => cli::last_cmd::run(&ctx).await,
        Commands::Config { action } => cli::config_cmd::run(&ctx, action).await,
        Commands::Status => cli::status_cmd::run(&ctx).await,
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}
