//! Shared setup and output formatting for CLI commands.

use chrono::Utc;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{Config, Settings};
use crate::extraction::ExtractionFailure;
use crate::models::{AssetStatus, BuildingComplianceSnapshot, StructuredSummary};
use crate::repository::DbContext;
use crate::workflow::{CommitOutcome, Workflow};

/// Open the database, creating tables if needed.
pub async fn open_db(settings: &Settings) -> anyhow::Result<DbContext> {
    settings.ensure_directories()?;
    let ctx = settings.create_db_context();
    ctx.init_schema().await?;
    Ok(ctx)
}

/// Assemble the full workflow against an initialized database.
pub async fn open_workflow(settings: &Settings, config: &Config) -> anyhow::Result<Workflow> {
    open_db(settings).await?;
    Ok(Workflow::from_config(settings, config))
}

pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(template);
    }
    pb.set_message(message.into());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn status_style(status: AssetStatus) -> console::StyledObject<&'static str> {
    match status {
        AssetStatus::Compliant => style(status.as_str()).green(),
        AssetStatus::DueSoon => style(status.as_str()).yellow(),
        AssetStatus::Overdue => style(status.as_str()).red(),
        AssetStatus::Pending => style(status.as_str()).dim(),
    }
}

pub fn print_summary(summary: &StructuredSummary) {
    println!(
        "  {:<18} {}",
        "Document type:",
        summary.document_type.as_deref().unwrap_or("unknown")
    );
    println!(
        "  {:<18} {}",
        "Status:",
        summary.compliance_status.as_deref().unwrap_or("unknown")
    );
    println!("  {:<18} {}", "Confidence:", summary.confidence.as_str());
    if let Some(date) = summary.inspection_date() {
        println!("  {:<18} {}", "Inspected:", date);
    }
    if let Some(due) = summary.next_inspection_due() {
        println!("  {:<18} {}", "Next due:", due);
    }
    if let Some(cert) = summary.certificate_number() {
        println!("  {:<18} {}", "Certificate:", cert);
    }
    if let Some(text) = &summary.summary {
        println!("\n  {}", text);
    }

    let lines = summary.key_findings.lines();
    if !lines.is_empty() {
        println!("\n  {}", style("Findings:").bold());
        let urgent = summary.key_findings.urgent().len();
        for line in lines {
            println!("    - {}", line);
        }
        if urgent > 0 {
            println!(
                "  {} {} urgent finding(s) will raise alerts on confirmation",
                style("!").yellow(),
                urgent
            );
        }
    }
    for rec in &summary.recommendations {
        println!("    {} {}", style("→").cyan(), rec.action);
    }
    if summary.fallback {
        println!(
            "\n  {} Automatic analysis failed; review the document manually",
            style("!").yellow()
        );
    }
}

pub fn print_failure(failure: &ExtractionFailure) {
    eprintln!("{} {}", style("✗").red(), failure.message);
    for suggestion in &failure.suggestions {
        eprintln!("  - {}", suggestion);
    }
}

pub fn print_outcome(outcome: &CommitOutcome) {
    let verb = if outcome.created { "Created" } else { "Updated" };
    println!(
        "{} {} {} asset (next due {})",
        style("✓").green(),
        verb,
        outcome.asset_type,
        outcome.next_inspection_due
    );
    if outcome.urgent_findings_count > 0 {
        println!(
            "  {} Raised {} alert(s)",
            style("!").yellow(),
            outcome.urgent_findings_count
        );
    }
    if outcome.reminder_created {
        println!("  {} Calendar reminder created", style("✓").green());
    } else {
        println!("  {} No calendar reminder created", style("!").yellow());
    }
}

pub fn print_snapshot(snapshot: &BuildingComplianceSnapshot) {
    let today = Utc::now().date_naive();
    println!(
        "\n{} {}",
        style(&snapshot.building.name).bold(),
        style(&snapshot.building.id).dim()
    );

    if snapshot.assets.is_empty() {
        println!("  No compliance assets tracked");
    }
    for asset in &snapshot.assets {
        let due = asset
            .next_due_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<42} {:<10} {:<11} {}",
            asset.display_name(),
            status_style(asset.effective_status(today)),
            due,
            style(&asset.id).dim()
        );
    }

    if !snapshot.open_alerts.is_empty() {
        println!("\n  {}", style("Open alerts:").bold());
        for alert in &snapshot.open_alerts {
            println!("    {} [{}] {}", style("!").red(), alert.priority, alert.message);
        }
    }
}
