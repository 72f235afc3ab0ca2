// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LtcScope - long-term-contributor dataset builder.
//!
//! Binary entry point: parse the command line, load configuration, install
//! logging and run the requested stage.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use ltcscope::{GithubSources, Pipeline, StageName};
use tracing::error;

/// LtcScope - build long-term-contributor research tables.
#[derive(Parser, Debug)]
#[command(name = "ltcscope", version, about, long_about = None)]
struct Cli {
    /// Configuration file; defaults to the XDG lookup.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, Copy)]
enum Commands {
    /// Search for popular repositories and replace the repository list.
    Discover,
    /// Download the API dumps of every listed repository.
    Download,
    /// Qualify contributors and compute their retention flags.
    Filter,
    /// Build the developer profile tables.
    DeveloperProfile,
    /// Build the developer monthly activity tables.
    DeveloperActivity,
    /// Build the repository profile and monthly activity tables.
    RepositoryTables,
    /// Score comment sentiment and rebuild the summary.
    Sentiment,
    /// Merge per-repository tables into one file per family.
    Merge,
    /// Run every stage from download to merge.
    Run,
}

impl Commands {
    fn stage(self) -> Option<StageName> {
        match self {
            Commands::Discover => Some(StageName::Discover),
            Commands::Download => Some(StageName::Download),
            Commands::Filter => Some(StageName::Filter),
            Commands::DeveloperProfile => Some(StageName::DeveloperProfile),
            Commands::DeveloperActivity => Some(StageName::DeveloperActivity),
            Commands::RepositoryTables => Some(StageName::RepositoryTables),
            Commands::Sentiment => Some(StageName::Sentiment),
            Commands::Merge => Some(StageName::Merge),
            Commands::Run => None,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ltcscope_config::load_and_validate(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            ltcscope_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.pipeline.log_level);

    let sources = Arc::new(GithubSources::new(config.clone()));
    let pipeline = Pipeline::new(config, sources);
    let result = match cli.command.stage() {
        Some(stage) => pipeline.run(stage).await.map(|_| ()),
        None => pipeline.run_all().await,
    };
    if let Err(e) = result {
        error!(error = %e, "stage aborted");
        std::process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ltcscope={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn commands_map_to_stages() {
        let cli = Cli::parse_from(["ltcscope", "--config", "x.toml", "repository-tables"]);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert_eq!(cli.command.stage(), Some(StageName::RepositoryTables));
        assert_eq!(Cli::parse_from(["ltcscope", "run"]).command.stage(), None);
        assert_eq!(
            Cli::parse_from(["ltcscope", "discover"]).command.stage(),
            Some(StageName::Discover)
        );
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config =
            ltcscope_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.pipeline.workers, 3);
    }
}
