//! Initialize command.

use console::style;

use crate::config::{Config, Settings};
use crate::repository::util::display_database_url;

use super::helpers::open_db;

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    open_db(settings).await?;

    match &config.source_path {
        Some(path) => println!("  {} Using config {}", style("✓").green(), path.display()),
        None => println!(
            "  {} No blociq config file found, using defaults",
            style("!").yellow()
        ),
    }
    println!(
        "  {} Database {}",
        style("✓").green(),
        display_database_url(&settings.database_url())
    );
    if !config.llm.enabled {
        println!(
            "  {} Language model disabled; summaries will use keyword detection",
            style("!").yellow()
        );
    }

    println!(
        "{} Initialized BlocIQ in {}",
        style("✓").green(),
        settings.data_dir.display()
    );

    Ok(())
}
