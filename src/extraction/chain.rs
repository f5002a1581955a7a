//! Ordered extraction strategies with early exit.
//!
//! Strategies run in priority order. The first one whose trimmed output is
//! longer than `min_chars` wins and later strategies are never invoked.
//! Every strategy error is recorded and the chain moves on.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::config::ExtractionConfig;
use super::hosted::HostedOcrStrategy;
use super::local_ocr::LocalOcrStrategy;
use super::native::NativeStrategy;
use super::quality::{assess_text_quality, QualityReport};
use super::strategy::{ExtractionStrategy, StrategyKind};
use super::upload::{SourceFile, ValidationError};
use crate::models::Confidence;

/// What happened when the chain reached a strategy.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Skipped { reason: String },
    InsufficientText { chars: usize },
    Failed { error: String },
    Accepted { chars: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyAttempt {
    pub strategy: StrategyKind,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

/// Successful extraction.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    #[serde(skip_serializing)]
    pub text: String,
    pub method: StrategyKind,
    pub confidence: Confidence,
    pub page_count: Option<u32>,
    pub char_count: usize,
    pub word_count: usize,
    pub quality: QualityReport,
    pub attempts: Vec<StrategyAttempt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The upload was rejected before any strategy ran.
    Validation,
    /// Strategies ran but none produced enough text.
    NoText,
    /// Strategies errored and none produced any text at all.
    Exception,
}

/// Extraction failure with user-facing guidance.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{message}")]
pub struct ExtractionFailure {
    pub kind: FailureKind,
    pub message: String,
    pub suggestions: Vec<String>,
    pub attempts: Vec<StrategyAttempt>,
}

impl ExtractionFailure {
    fn no_text(filename: &str, attempts: Vec<StrategyAttempt>) -> Self {
        Self {
            kind: FailureKind::NoText,
            message: format!("No readable text could be extracted from {}", filename),
            suggestions: vec![
                "This may be a scanned document - try OCR processing".to_string(),
                "Upload a text-based version of the document".to_string(),
                "Convert to a searchable PDF format".to_string(),
            ],
            attempts,
        }
    }

    fn exception(last_error: &str, attempts: Vec<StrategyAttempt>) -> Self {
        Self {
            kind: FailureKind::Exception,
            message: format!("Text extraction failed: {}", last_error),
            suggestions: vec![
                "Check that the file is not corrupted".to_string(),
                "Try uploading the file again".to_string(),
                "Contact support if the problem persists".to_string(),
            ],
            attempts,
        }
    }
}

impl From<ValidationError> for ExtractionFailure {
    fn from(err: ValidationError) -> Self {
        Self {
            kind: FailureKind::Validation,
            suggestions: err.suggestions(),
            message: err.to_string(),
            attempts: Vec::new(),
        }
    }
}

pub struct ExtractionChain {
    strategies: Vec<Arc<dyn ExtractionStrategy>>,
    min_chars: usize,
}

impl ExtractionChain {
    /// Build the chain from configured strategy names.
    ///
    /// Unknown names are logged and ignored. Unavailable strategies stay in
    /// the chain so their absence shows up in the attempt list.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let mut strategies: Vec<Arc<dyn ExtractionStrategy>> = Vec::new();

        for name in &config.strategies {
            match Self::create_strategy(name, config) {
                Some(strategy) => {
                    if !strategy.is_available() {
                        debug!(
                            "Extraction chain: {} not available ({})",
                            name,
                            strategy.availability_hint()
                        );
                    }
                    strategies.push(strategy);
                }
                None => warn!("Extraction chain: unknown strategy '{}'", name),
            }
        }

        info!(
            "Extraction chain initialized with {} strategies",
            strategies.len()
        );

        Self {
            strategies,
            min_chars: config.min_text_chars,
        }
    }

    /// Build a chain from explicit strategies.
    pub fn with_strategies(strategies: Vec<Arc<dyn ExtractionStrategy>>, min_chars: usize) -> Self {
        Self {
            strategies,
            min_chars,
        }
    }

    fn create_strategy(name: &str, config: &ExtractionConfig) -> Option<Arc<dyn ExtractionStrategy>> {
        match StrategyKind::from_str(name)? {
            StrategyKind::Native => Some(Arc::new(NativeStrategy::new())),
            StrategyKind::LocalOcr => Some(Arc::new(LocalOcrStrategy::new(&config.tesseract_lang))),
            StrategyKind::HostedOcr => Some(Arc::new(HostedOcrStrategy::new(config.hosted.clone()))),
        }
    }

    pub fn strategies(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Each strategy in order with whether it can run here and why.
    pub fn availability(&self) -> Vec<(StrategyKind, bool, String)> {
        self.strategies
            .iter()
            .map(|s| (s.kind(), s.is_available(), s.availability_hint()))
            .collect()
    }

    pub async fn extract(&self, file: &SourceFile) -> Result<Extraction, ExtractionFailure> {
        let mut attempts = Vec::new();
        let mut last_error: Option<String> = None;
        let mut produced_text = false;

        for strategy in &self.strategies {
            let kind = strategy.kind();

            if !strategy.supports(file.file_type) {
                attempts.push(StrategyAttempt {
                    strategy: kind,
                    outcome: AttemptOutcome::Skipped {
                        reason: format!("{} files not supported", file.file_type.as_str()),
                    },
                });
                continue;
            }
            if !strategy.is_available() {
                attempts.push(StrategyAttempt {
                    strategy: kind,
                    outcome: AttemptOutcome::Skipped {
                        reason: strategy.availability_hint(),
                    },
                });
                continue;
            }

            debug!("Trying {} extraction for {}", kind, file.filename);
            match strategy.extract(file).await {
                Ok(output) => {
                    let chars = output.text.trim().chars().count();
                    if chars > self.min_chars {
                        attempts.push(StrategyAttempt {
                            strategy: kind,
                            outcome: AttemptOutcome::Accepted { chars },
                        });
                        info!("Extracted {} chars from {} via {}", chars, file.filename, kind);
                        return Ok(Self::finish(kind, output.text, output.page_count, attempts));
                    }
                    debug!("{} produced only {} chars, falling through", kind, chars);
                    produced_text |= chars > 0;
                    attempts.push(StrategyAttempt {
                        strategy: kind,
                        outcome: AttemptOutcome::InsufficientText { chars },
                    });
                }
                Err(e) => {
                    warn!("{} extraction failed for {}: {}", kind, file.filename, e);
                    attempts.push(StrategyAttempt {
                        strategy: kind,
                        outcome: AttemptOutcome::Failed {
                            error: e.to_string(),
                        },
                    });
                    last_error = Some(e.to_string());
                }
            }
        }

        Err(match last_error {
            Some(err) if !produced_text => ExtractionFailure::exception(&err, attempts),
            _ => ExtractionFailure::no_text(&file.filename, attempts),
        })
    }

    fn finish(
        method: StrategyKind,
        text: String,
        page_count: Option<u32>,
        attempts: Vec<StrategyAttempt>,
    ) -> Extraction {
        let quality = assess_text_quality(&text);
        let confidence = match method {
            StrategyKind::Native => Confidence::High,
            StrategyKind::LocalOcr => Confidence::Medium,
            StrategyKind::HostedOcr => quality.confidence.max(Confidence::Medium),
        };

        Extraction {
            char_count: quality.char_count,
            word_count: quality.word_count,
            text,
            method,
            confidence,
            page_count,
            quality,
            attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::strategy::{StrategyError, StrategyOutput};
    use crate::extraction::upload::FileType;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behaviour {
        Text(&'static str),
        Error,
        Unavailable,
    }

    struct MockStrategy {
        kind: StrategyKind,
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    impl MockStrategy {
        fn new(kind: StrategyKind, behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                kind,
                behaviour,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ExtractionStrategy for MockStrategy {
        fn kind(&self) -> StrategyKind {
            self.kind
        }

        fn supports(&self, _file_type: FileType) -> bool {
            true
        }

        fn is_available(&self) -> bool {
            !matches!(self.behaviour, Behaviour::Unavailable)
        }

        async fn extract(&self, _file: &SourceFile) -> Result<StrategyOutput, StrategyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Text(text) => Ok(StrategyOutput {
                    text: text.to_string(),
                    page_count: Some(1),
                }),
                Behaviour::Error => Err(StrategyError::Failed("boom".to_string())),
                Behaviour::Unavailable => unreachable!(),
            }
        }
    }

    const LONG: &str = "This Electrical Installation Condition Report confirms the installation is satisfactory.";

    fn pdf() -> SourceFile {
        SourceFile::from_upload("EICR_Flat3.pdf", b"%PDF-1.7\n".to_vec(), 1024).unwrap()
    }

    fn chain(strategies: &[&Arc<MockStrategy>]) -> ExtractionChain {
        ExtractionChain::with_strategies(
            strategies
                .iter()
                .map(|s| Arc::clone(*s) as Arc<dyn ExtractionStrategy>)
                .collect(),
            50,
        )
    }

    #[tokio::test]
    async fn test_native_success_skips_later_strategies() {
        let native = MockStrategy::new(StrategyKind::Native, Behaviour::Text(LONG));
        let local = MockStrategy::new(StrategyKind::LocalOcr, Behaviour::Text(LONG));
        let hosted = MockStrategy::new(StrategyKind::HostedOcr, Behaviour::Text(LONG));

        let result = chain(&[&native, &local, &hosted]).extract(&pdf()).await.unwrap();

        assert_eq!(result.method, StrategyKind::Native);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(native.calls(), 1);
        assert_eq!(local.calls(), 0);
        assert_eq!(hosted.calls(), 0);
    }

    #[tokio::test]
    async fn test_threshold_is_strictly_greater_than_min() {
        let exactly_fifty: &'static str = Box::leak("a".repeat(50).into_boxed_str());
        let fifty_one: &'static str = Box::leak("b".repeat(51).into_boxed_str());
        let native = MockStrategy::new(StrategyKind::Native, Behaviour::Text(exactly_fifty));
        let hosted = MockStrategy::new(StrategyKind::HostedOcr, Behaviour::Text(fifty_one));

        let result = chain(&[&native, &hosted]).extract(&pdf()).await.unwrap();
        assert_eq!(result.method, StrategyKind::HostedOcr);
        assert_eq!(hosted.calls(), 1);
        assert!(matches!(
            result.attempts[0].outcome,
            AttemptOutcome::InsufficientText { chars: 50 }
        ));
    }

    #[tokio::test]
    async fn test_falls_through_errors_to_next_strategy() {
        let native = MockStrategy::new(StrategyKind::Native, Behaviour::Error);
        let local = MockStrategy::new(StrategyKind::LocalOcr, Behaviour::Text(LONG));

        let result = chain(&[&native, &local]).extract(&pdf()).await.unwrap();
        assert_eq!(result.method, StrategyKind::LocalOcr);
        assert_eq!(result.confidence, Confidence::Medium);
        assert_eq!(result.attempts.len(), 2);
    }

    #[tokio::test]
    async fn test_short_text_everywhere_is_no_text() {
        let native = MockStrategy::new(StrategyKind::Native, Behaviour::Text("Page 1"));
        let local = MockStrategy::new(StrategyKind::LocalOcr, Behaviour::Error);
        let hosted = MockStrategy::new(StrategyKind::HostedOcr, Behaviour::Text(""));

        let err = chain(&[&native, &local, &hosted]).extract(&pdf()).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::NoText);
        assert!(!err.message.is_empty());
        assert!(err.suggestions[0].contains("scanned"));
        assert_eq!(err.attempts.len(), 3);
    }

    #[tokio::test]
    async fn test_all_errors_is_exception() {
        let native = MockStrategy::new(StrategyKind::Native, Behaviour::Error);
        let local = MockStrategy::new(StrategyKind::LocalOcr, Behaviour::Error);
        let hosted = MockStrategy::new(StrategyKind::HostedOcr, Behaviour::Unavailable);

        let err = chain(&[&native, &local, &hosted]).extract(&pdf()).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::Exception);
        assert!(err.message.contains("boom"));
        assert_eq!(hosted.calls(), 0);
        assert!(matches!(err.attempts[2].outcome, AttemptOutcome::Skipped { .. }));
    }

    #[test]
    fn test_unknown_strategy_names_are_ignored() {
        let config = ExtractionConfig {
            strategies: vec!["native".to_string(), "carrier-pigeon".to_string()],
            ..Default::default()
        };
        let chain = ExtractionChain::from_config(&config);
        assert_eq!(chain.strategies(), vec![StrategyKind::Native]);
    }

    #[test]
    fn test_validation_failure_carries_suggestions() {
        let failure: ExtractionFailure = ValidationError::Empty.into();
        assert_eq!(failure.kind, FailureKind::Validation);
        assert!(!failure.suggestions.is_empty());
    }
}
