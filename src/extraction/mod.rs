//! Document text extraction.
//!
//! Uploads are validated, then passed through an ordered list of
//! strategies (native parse, local OCR, hosted OCR) until one yields
//! enough text.

mod chain;
pub mod config;
mod hosted;
mod local_ocr;
mod native;
mod quality;
mod strategy;
pub mod tools;
mod upload;

pub use chain::{
    AttemptOutcome, Extraction, ExtractionChain, ExtractionFailure, FailureKind, StrategyAttempt,
};
pub use config::{ExtractionConfig, HostedOcrConfig};
pub use hosted::HostedOcrStrategy;
pub use local_ocr::LocalOcrStrategy;
pub use native::NativeStrategy;
pub use quality::{assess_text_quality, QualityReport};
pub use strategy::{ExtractionStrategy, StrategyError, StrategyKind, StrategyOutput};
pub use upload::{FileType, SourceFile, ValidationError, DEFAULT_MAX_UPLOAD_BYTES, SUPPORTED_EXTENSIONS};
