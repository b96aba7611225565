//! Command-line interface

pub mod commands;
pub mod progress;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::config::AppConfig;
use crate::cxsheets::CxSheets;
use commands::entities::EntitiesCommands;
use commands::intents::IntentsCommands;
use commands::sheet::SheetCommands;

#[derive(Debug, Parser)]
#[command(
    name = "cxsheet",
    version,
    about = "Build Dialogflow CX intents and entity types from spreadsheets"
)]
pub struct Cli {
    /// Service-account JSON key (default: config file, then GOOGLE_APPLICATION_CREDENTIALS)
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Config file (default: <config dir>/cxsheet/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create, update or export intents
    #[command(subcommand)]
    Intents(IntentsCommands),
    /// Create, update or export entity types
    #[command(subcommand)]
    Entities(EntitiesCommands),
    /// Move tables between CSV, XLSX and Google Sheets
    #[command(subcommand)]
    Sheet(SheetCommands),
}

/// `info` by default, `RUST_LOG` overrides, `-v` turns on debug for this crate
pub fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_module("cxsheet", LevelFilter::Debug);
    }
    builder.format_timestamp_secs().init();
}

/// Settings every command handler needs
pub struct AppContext {
    pub config: AppConfig,
    credentials: Option<PathBuf>,
}

impl AppContext {
    pub fn load(config: Option<PathBuf>, credentials: Option<PathBuf>) -> Result<Self> {
        let config = match config {
            Some(path) => AppConfig::load_from(&path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?,
            None => AppConfig::load().context("Failed to load config file")?,
        };
        Ok(Self {
            config,
            credentials,
        })
    }

    pub fn agent(&self, flag: Option<&str>) -> Result<String> {
        Ok(self.config.agent(flag)?)
    }

    /// Clients for the agent and for Google Sheets
    pub fn connect(&self) -> Result<CxSheets> {
        let credentials = self.config.credentials_path(self.credentials.as_deref())?;
        CxSheets::from_credentials(&credentials, &self.config).with_context(|| {
            format!("Failed to load credentials from {}", credentials.display())
        })
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let ctx = AppContext::load(cli.config, cli.credentials)?;

    match cli.command {
        Commands::Intents(cmd) => commands::intents::handle_intents_command(cmd, &ctx).await,
        Commands::Entities(cmd) => commands::entities::handle_entities_command(cmd, &ctx).await,
        Commands::Sheet(cmd) => commands::sheet::handle_sheet_command(cmd, &ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::TableLocation;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_intents_create() {
        let cli = Cli::try_parse_from([
            "cxsheet",
            "intents",
            "create",
            "--agent",
            "projects/p/locations/global/agents/a",
            "--phrases",
            "phrases.xlsx#train",
            "--params",
            "gsheet://Agent Data#params",
            "--mode",
            "advanced",
            "--commit",
            "-y",
        ])
        .unwrap();

        match cli.command {
            Commands::Intents(IntentsCommands::Create(args)) => {
                assert_eq!(args.mode, "advanced");
                assert!(args.submit.commit && args.submit.yes);
                assert!(matches!(args.phrases, TableLocation::Xlsx { .. }));
                assert!(matches!(args.params, Some(TableLocation::GoogleSheet { .. })));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_bad_table_location_is_rejected_by_parser() {
        let result = Cli::try_parse_from([
            "cxsheet", "entities", "create", "--values", "values.txt",
        ]);
        assert!(result.is_err());
    }
}
