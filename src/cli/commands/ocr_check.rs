//! Extraction tool check command.

use console::style;

use crate::config::Config;
use crate::extraction::{tools::check_tools, ExtractionChain};

/// Report installed tools and which strategies the configured chain can use.
pub fn cmd_ocr_check(config: &Config) -> anyhow::Result<()> {
    println!("\n{}", style("Extraction Tool Status").bold());
    println!("{}", "-".repeat(50));

    println!("\n{}", style("External tools:").cyan());
    let mut missing = Vec::new();
    for (tool, package, available) in check_tools() {
        let status = if available {
            style("✓ found").green()
        } else {
            missing.push((tool, package));
            style("✗ not found").red()
        };
        println!("  {:<15} {}", tool, status);
    }

    println!("\n{}", style("Strategies (in order):").cyan());
    let chain = ExtractionChain::from_config(&config.extraction);
    for (kind, available, hint) in chain.availability() {
        let status = if available {
            style("✓ available").green()
        } else {
            style("○ unavailable").yellow()
        };
        println!("  {:<15} {}", kind.as_str(), status);
        if !available {
            println!("                  {}", style(hint).dim());
        }
    }

    println!();
    if missing.is_empty() {
        println!("{} All extraction tools are available", style("✓").green());
    } else {
        println!(
            "{} Some tools are missing. Install them for full extraction support:",
            style("!").yellow()
        );
        for (tool, package) in missing {
            println!("  - {}: {} package", tool, package);
        }
    }

    Ok(())
}
