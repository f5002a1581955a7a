//! The document-to-compliance workflow.
//!
//! [`DocumentPipeline`] takes an upload to a presented summary,
//! [`ConfirmationGate`] records the human decision, and a [`CommitSink`]
//! persists confirmed summaries. Manual asset tracking lives in
//! [`track_assets`] and friends.

mod assets;
mod gate;
mod pipeline;
mod sink;

pub use assets::{
    mandatory_selection, register_building, track_assets, untrack_asset, AssetError,
};
pub use gate::{ConfirmationGate, GateError, GateState};
pub use pipeline::{AnalyzedDocument, DocumentPipeline, IngestError};
pub use sink::{
    compliance_snapshot, inspection_write, CommitOutcome, CommitSink, PersistenceSink, SinkError,
};

use std::path::PathBuf;
use std::sync::Arc;

use crate::calendar::{calendar_from_config, CalendarClient};
use crate::config::{Config, Settings};
use crate::extraction::ExtractionChain;
use crate::llm::{LlmClient, TextGenerator};
use crate::repository::DbContext;
use crate::summarizer::Summarizer;

/// The assembled workflow sharing one database.
#[derive(Clone)]
pub struct Workflow {
    pub db: DbContext,
    pub pipeline: Arc<DocumentPipeline>,
    pub gate: Arc<ConfirmationGate>,
}

impl Workflow {
    /// Wire up the workflow from configuration.
    pub fn from_config(settings: &Settings, config: &Config) -> Self {
        let generator: Arc<dyn TextGenerator> = Arc::new(LlmClient::new(config.llm.clone()));
        let summarizer = Summarizer::new(generator, config.llm.max_content_chars);
        let summarizer = match &config.llm.summary_prompt {
            Some(prompt) => summarizer.with_prompt(prompt),
            None => summarizer,
        };

        Self::assemble(
            settings.create_db_context(),
            ExtractionChain::from_config(&config.extraction),
            summarizer,
            calendar_from_config(&config.calendar),
            config,
            Some(settings.documents_dir.clone()),
        )
    }

    /// Wire up the workflow from explicit parts.
    pub fn assemble(
        db: DbContext,
        chain: ExtractionChain,
        summarizer: Summarizer,
        calendar: Arc<dyn CalendarClient>,
        config: &Config,
        documents_dir: Option<PathBuf>,
    ) -> Self {
        let pipeline = DocumentPipeline::new(
            db.clone(),
            Arc::new(chain),
            Arc::new(summarizer),
            config.extraction.max_upload_bytes,
        );
        let pipeline = match documents_dir {
            Some(dir) => pipeline.with_documents_dir(dir),
            None => pipeline,
        };
        let sink = PersistenceSink::new(db.clone(), calendar, config.calendar.clone());
        let gate = ConfirmationGate::new(Arc::new(sink), db.clone());

        Self {
            db,
            pipeline: Arc::new(pipeline),
            gate: Arc::new(gate),
        }
    }
}
