//! Document analysis and confirmation commands.

use std::path::Path;

use console::style;

use crate::config::{Config, Settings};
use crate::models::DocumentJob;
use crate::workflow::{GateState, IngestError, Workflow};

use super::helpers::{open_workflow, print_failure, print_outcome, print_summary, spinner};

/// What to do with a presented summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliDecision {
    Confirm,
    Decline,
    /// Leave the job presented for a later `decide`.
    Defer,
}

impl CliDecision {
    pub fn from_flags(confirm: bool, decline: bool) -> Self {
        match (confirm, decline) {
            (true, _) => Self::Confirm,
            (_, true) => Self::Decline,
            _ => Self::Defer,
        }
    }
}

/// Extract and summarize a file, then optionally decide on it.
pub async fn cmd_analyze(
    settings: &Settings,
    config: &Config,
    file: &Path,
    building_id: Option<&str>,
    decision: CliDecision,
) -> anyhow::Result<()> {
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", file.display()))?;
    let bytes = tokio::fs::read(file)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?;

    let workflow = open_workflow(settings, config).await?;

    let pb = spinner(format!("Analyzing {}...", filename));
    let result = workflow.pipeline.ingest(filename, bytes, building_id).await;
    pb.finish_and_clear();

    let analyzed = match result {
        Ok(analyzed) => analyzed,
        Err(IngestError::Extraction { job_id, failure }) => {
            print_failure(&failure);
            if let Some(id) = job_id {
                eprintln!("  Job: {}", style(id).dim());
            }
            anyhow::bail!("Could not extract text from {}", filename);
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "{} Extracted {} words via {} ({} confidence)",
        style("✓").green(),
        analyzed.extraction.word_count,
        analyzed.extraction.method,
        analyzed.extraction.confidence.as_str()
    );
    if let Some(summary) = &analyzed.job.summary {
        print_summary(summary);
    }

    let building_id = building_id
        .map(str::to_string)
        .or_else(|| analyzed.suggested_building.as_ref().map(|b| b.id.clone()));
    if let Some(building) = &analyzed.suggested_building {
        println!("\n  Building: {} ({})", building.name, style(&building.id).dim());
    }

    decide(&workflow, &analyzed.job, decision, building_id.as_deref(), None).await
}

/// Confirm or decline a job analyzed earlier.
pub async fn cmd_decide(
    settings: &Settings,
    config: &Config,
    job_id: &str,
    decision: CliDecision,
    building_id: Option<&str>,
    reason: Option<&str>,
) -> anyhow::Result<()> {
    let workflow = open_workflow(settings, config).await?;
    let job = workflow
        .db
        .documents()
        .get(job_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Document not found: {}", job_id))?;

    decide(&workflow, &job, decision, building_id, reason).await
}

async fn decide(
    workflow: &Workflow,
    job: &DocumentJob,
    decision: CliDecision,
    building_id: Option<&str>,
    reason: Option<&str>,
) -> anyhow::Result<()> {
    match decision {
        CliDecision::Confirm => {
            let outcome = workflow.gate.confirm(job, building_id).await?;
            print_outcome(&outcome);
        }
        CliDecision::Decline => {
            // Wait for the background log so the process doesn't exit first.
            workflow.gate.decline(job, reason).await?.await?;
            println!("{} Declined {}", style("✓").green(), job.filename);
        }
        CliDecision::Defer => {
            if GateState::of(job) == Some(GateState::Presented) {
                println!(
                    "\n{} Awaiting decision. Run: blociq decide {} --confirm --building <id>",
                    style("→").cyan(),
                    job.id
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_from_flags() {
        assert_eq!(CliDecision::from_flags(true, false), CliDecision::Confirm);
        assert_eq!(CliDecision::from_flags(false, true), CliDecision::Decline);
        assert_eq!(CliDecision::from_flags(false, false), CliDecision::Defer);
    }
}
