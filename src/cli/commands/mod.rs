//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod analyze;
mod assets;
mod building;
mod helpers;
mod init;
mod ocr_check;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "blociq")]
#[command(about = "Compliance document intake for residential block management")]
#[command(version)]
pub struct Cli {
    /// Data directory or database file (overrides config file).
    #[arg(long, short = 'd', global = true)]
    data: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Start the JSON API server
    Serve {
        /// Address to bind: port, host, or host:port
        #[arg(default_value = "127.0.0.1:3030")]
        bind: String,
    },

    /// Manage buildings and units
    Building {
        #[command(subcommand)]
        command: BuildingCommands,
    },

    /// Extract and summarize a compliance document
    Analyze {
        /// Document to analyze
        file: PathBuf,
        /// Building the document belongs to
        #[arg(short, long)]
        building: Option<String>,
        /// Commit the summary against --building without prompting
        #[arg(long, conflicts_with = "decline")]
        confirm: bool,
        /// Reject the summary
        #[arg(long)]
        decline: bool,
    },

    /// Confirm or decline a previously analyzed document
    Decide {
        /// Document job ID
        job_id: String,
        /// Commit the summary
        #[arg(long, conflicts_with = "decline", required_unless_present = "decline")]
        confirm: bool,
        /// Reject the summary
        #[arg(long)]
        decline: bool,
        /// Building to commit against
        #[arg(short, long, conflicts_with = "decline")]
        building: Option<String>,
        /// Reason recorded with a decline
        #[arg(long, conflicts_with = "confirm")]
        reason: Option<String>,
    },

    /// Manage tracked compliance assets
    Assets {
        #[command(subcommand)]
        command: AssetCommands,
    },

    /// Check which extraction tools and strategies are available
    OcrCheck,
}

#[derive(Subcommand)]
enum BuildingCommands {
    /// Register a building
    Add {
        name: String,
        #[arg(long)]
        address: Option<String>,
        /// High-risk building (adds safety case obligations)
        #[arg(long)]
        hrb: bool,
        /// Start tracking every mandatory asset type
        #[arg(long)]
        track_mandatory: bool,
    },
    /// List buildings
    List,
    /// List units in a building
    Units { building_id: String },
    /// Add a unit to a building
    AddUnit {
        building_id: String,
        unit_number: String,
        #[arg(long)]
        floor: Option<String>,
        #[arg(long)]
        leaseholder: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Subcommand)]
enum AssetCommands {
    /// Show the asset type catalogue
    Types,
    /// Show a building's compliance assets and open alerts
    List { building_id: String },
    /// Start tracking asset types for a building
    Add {
        building_id: String,
        /// Asset type keys (see `assets types`)
        #[arg(required = true)]
        asset_types: Vec<String>,
    },
    /// Stop tracking an asset
    Remove { asset_id: String },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
        data: cli.data,
    };
    let (settings, config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Init => init::cmd_init(&settings, &config).await,
        Commands::Serve { bind } => serve::cmd_serve(&settings, &config, &bind).await,
        Commands::Building { command } => match command {
            BuildingCommands::Add {
                name,
                address,
                hrb,
                track_mandatory,
            } => {
                building::cmd_building_add(&settings, &name, address, hrb, track_mandatory).await
            }
            BuildingCommands::List => building::cmd_building_list(&settings).await,
            BuildingCommands::Units { building_id } => {
                building::cmd_building_units(&settings, &building_id).await
            }
            BuildingCommands::AddUnit {
                building_id,
                unit_number,
                floor,
                leaseholder,
                email,
            } => {
                building::cmd_building_add_unit(
                    &settings,
                    &building_id,
                    &unit_number,
                    floor,
                    leaseholder,
                    email,
                )
                .await
            }
        },
        Commands::Analyze {
            file,
            building,
            confirm,
            decline,
        } => {
            let decision = analyze::CliDecision::from_flags(confirm, decline);
            analyze::cmd_analyze(&settings, &config, &file, building.as_deref(), decision).await
        }
        Commands::Decide {
            job_id,
            confirm,
            decline: _,
            building,
            reason,
        } => {
            let decision = if confirm {
                analyze::CliDecision::Confirm
            } else {
                analyze::CliDecision::Decline
            };
            analyze::cmd_decide(
                &settings,
                &config,
                &job_id,
                decision,
                building.as_deref(),
                reason.as_deref(),
            )
            .await
        }
        Commands::Assets { command } => match command {
            AssetCommands::Types => assets::cmd_assets_types(),
            AssetCommands::List { building_id } => {
                assets::cmd_assets_list(&settings, &building_id).await
            }
            AssetCommands::Add {
                building_id,
                asset_types,
            } => assets::cmd_assets_add(&settings, &building_id, &asset_types).await,
            AssetCommands::Remove { asset_id } => {
                assets::cmd_assets_remove(&settings, &asset_id).await
            }
        },
        Commands::OcrCheck => ocr_check::cmd_ocr_check(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_decide_requires_a_choice() {
        assert!(Cli::try_parse_from(["blociq", "decide", "job-1"]).is_err());
        assert!(Cli::try_parse_from(["blociq", "decide", "job-1", "--confirm", "--decline"]).is_err());
        assert!(Cli::try_parse_from(["blociq", "decide", "job-1", "--decline", "--building", "b1"]).is_err());
        assert!(Cli::try_parse_from(["blociq", "decide", "job-1", "--confirm", "-b", "b1", "--reason", "x"]).is_err());
        assert!(Cli::try_parse_from(["blociq", "decide", "job-1", "--confirm", "-b", "b1"]).is_ok());
        assert!(Cli::try_parse_from(["blociq", "decide", "job-1", "--decline", "--reason", "wrong flat"]).is_ok());
    }

    #[test]
    fn test_analyze_flags_conflict() {
        assert!(Cli::try_parse_from(["blociq", "analyze", "a.pdf", "--confirm", "--decline"]).is_err());
        assert!(Cli::try_parse_from(["blociq", "analyze", "a.pdf", "-b", "b1", "--confirm"]).is_ok());
    }
}
