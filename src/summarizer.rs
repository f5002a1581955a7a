//! Compliance summaries from extracted document text.
//!
//! The model is called once per document. Any failure (transport, API,
//! unparseable output) yields a fallback summary built from keyword and
//! regex matches instead of an error.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::llm::{truncate_content, LlmError, TextGenerator, COMPLIANCE_SUMMARY_PROMPT};
use crate::models::{
    parse_date_lenient, Confidence, InspectionDetails, InspectionOutcome, StructuredSummary,
};

pub const FALLBACK_SUMMARY_TEXT: &str =
    "Unable to analyze document automatically. Please review manually.";

/// Keyword groups checked in order; the first hit names the document type.
const DOCUMENT_TYPE_KEYWORDS: &[(&str, &[&str])] = &[
    ("EICR", &["eicr", "electrical installation condition"]),
    ("Fire Risk Assessment", &["fire risk assessment", "fra"]),
    ("Gas Safety Certificate", &["gas safety", "cp12", "landlord gas"]),
    ("Asbestos Survey", &["asbestos"]),
    ("Water Hygiene Assessment", &["legionella", "water hygiene"]),
    ("Fire Alarm Service Report", &["fire alarm"]),
    ("Emergency Lighting Test", &["emergency lighting"]),
    ("Fire Door Inspection", &["fire door"]),
    ("Lift LOLER", &["loler", "lift thorough examination", "lift inspection"]),
];

static INSPECTION_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:date of inspection|inspection date|inspected on|date of survey|assessment date)\s*[:\-]?\s*(\d{4}-\d{2}-\d{2}|\d{1,2}[/.\-]\d{1,2}[/.\-]\d{4}|\d{1,2}\s+[A-Za-z]+\s+\d{4})",
    )
    .expect("valid inspection date regex")
});

static CERTIFICATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:certificate|report|cert\.?)\s*(?:no\.?|number|ref(?:erence)?)\s*[:#]?\s*([A-Z0-9][A-Z0-9/\-]{2,})")
        .expect("valid certificate regex")
});

pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
    prompt: String,
    max_content_chars: usize,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn TextGenerator>, max_content_chars: usize) -> Self {
        Self {
            generator,
            prompt: COMPLIANCE_SUMMARY_PROMPT.to_string(),
            max_content_chars,
        }
    }

    pub fn with_prompt(mut self, prompt: &str) -> Self {
        self.prompt = prompt.to_string();
        self
    }

    /// Summarize extracted text, falling back to a partial summary on failure.
    pub async fn summarize(&self, text: &str, filename: &str) -> StructuredSummary {
        match self.try_summarize(text, filename).await {
            Ok(summary) => {
                info!(
                    "Summarized {} as {} ({} findings)",
                    filename,
                    summary.document_type.as_deref().unwrap_or("unknown type"),
                    summary.key_findings.len()
                );
                summary
            }
            Err(e) => {
                warn!("Summarization failed for {}: {}", filename, e);
                fallback_summary(filename, text)
            }
        }
    }

    async fn try_summarize(&self, text: &str, filename: &str) -> Result<StructuredSummary, LlmError> {
        let content = truncate_content(text, self.max_content_chars);
        let prompt = self
            .prompt
            .replace("{filename}", filename)
            .replace("{content}", content);

        debug!(
            "Requesting summary of {} from {}",
            filename,
            self.generator.model_name()
        );
        let response = self.generator.generate(&prompt).await?;
        if response.trim().is_empty() {
            return Err(LlmError::Parse("Empty response".to_string()));
        }

        let mut summary = parse_response(&response);
        summary.confidence = summary_confidence(&summary);
        Ok(summary)
    }
}

/// Interpret a model response as a summary.
///
/// Code fences are removed and the outermost `{...}` is parsed as JSON.
/// Anything that is not JSON becomes a free-text summary.
pub fn parse_response(response: &str) -> StructuredSummary {
    let cleaned = strip_code_fences(response);

    let json = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if end > start => {
            serde_json::from_str::<Value>(&cleaned[start..=end]).ok()
        }
        _ => None,
    };

    match json {
        Some(value) => StructuredSummary::from_model_output(&value),
        None => StructuredSummary::from_text(cleaned),
    }
}

fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

fn summary_confidence(summary: &StructuredSummary) -> Confidence {
    if summary.fallback {
        return Confidence::Low;
    }
    if summary.document_type.is_none() && summary.compliance_status.is_none() {
        return Confidence::Low;
    }
    match summary.outcome() {
        InspectionOutcome::Satisfactory => Confidence::High,
        _ => Confidence::Medium,
    }
}

/// Partial summary from locally derived fields.
pub fn fallback_summary(filename: &str, text: &str) -> StructuredSummary {
    let inspection_details = InspectionDetails {
        inspection_date: INSPECTION_DATE_RE
            .captures(text)
            .and_then(|c| parse_date_lenient(&c[1])),
        certificate_number: CERTIFICATE_RE.captures(text).map(|c| c[1].to_string()),
        ..Default::default()
    };

    StructuredSummary {
        document_type: Some(detect_document_type(filename, text).to_string()),
        summary: Some(FALLBACK_SUMMARY_TEXT.to_string()),
        inspection_details: (inspection_details != InspectionDetails::default())
            .then_some(inspection_details),
        confidence: Confidence::Low,
        fallback: true,
        ..Default::default()
    }
}

/// Guess the document type from the filename, then the opening text.
pub fn detect_document_type(filename: &str, text: &str) -> &'static str {
    let name = filename.to_lowercase().replace(['_', '-', '.'], " ");
    let head = truncate_content(text, 2000).to_lowercase();

    for haystack in [&name, &head] {
        let words: Vec<&str> = haystack.split_whitespace().collect();
        for (doc_type, keywords) in DOCUMENT_TYPE_KEYWORDS {
            let hit = keywords.iter().any(|k| {
                if k.contains(' ') {
                    haystack.contains(k)
                } else {
                    words.iter().any(|w| w.trim_matches(|c: char| !c.is_alphanumeric()) == *k)
                }
            });
            if hit {
                return doc_type;
            }
        }
    }
    "Other"
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct CannedGenerator(Result<&'static str, ()>);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            self.0
                .map(str::to_string)
                .map_err(|_| LlmError::Connection("refused".to_string()))
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    #[test]
    fn test_parse_fenced_json() {
        let summary = parse_response(
            "```json\n{\"document_type\": \"EICR\", \"compliance_status\": \"satisfactory\"}\n```",
        );
        assert_eq!(summary.document_type.as_deref(), Some("EICR"));
        assert_eq!(summary.outcome(), InspectionOutcome::Satisfactory);
    }

    #[test]
    fn test_parse_json_with_preamble() {
        let summary = parse_response(
            "Here is the analysis:\n{\"document_type\": \"Fire Risk Assessment\"}\nThanks.",
        );
        assert_eq!(summary.document_type.as_deref(), Some("Fire Risk Assessment"));
    }

    #[test]
    fn test_parse_plain_text() {
        let summary = parse_response("The report looks fine overall.");
        assert!(summary.document_type.is_none());
        assert_eq!(summary.summary.as_deref(), Some("The report looks fine overall."));
        assert_eq!(summary.confidence, Confidence::Low);
    }

    #[test]
    fn test_detect_document_type() {
        assert_eq!(detect_document_type("EICR_Flat3.pdf", ""), "EICR");
        assert_eq!(detect_document_type("scan.pdf", "LANDLORD GAS SAFETY RECORD (CP12)"), "Gas Safety Certificate");
        assert_eq!(detect_document_type("FRA-2024.pdf", ""), "Fire Risk Assessment");
        assert_eq!(detect_document_type("frame.pdf", "nothing relevant"), "Other");
    }

    #[test]
    fn test_fallback_summary_extracts_fields() {
        let summary = fallback_summary(
            "report.pdf",
            "Electrical Installation Condition Report\nDate of inspection: 14/02/2024\nCertificate No: EC-88121",
        );
        assert!(summary.fallback);
        assert_eq!(summary.summary.as_deref(), Some(FALLBACK_SUMMARY_TEXT));
        assert_eq!(summary.document_type.as_deref(), Some("EICR"));
        assert_eq!(summary.inspection_date(), NaiveDate::from_ymd_opt(2024, 2, 14));
        assert_eq!(summary.certificate_number(), Some("EC-88121"));
        assert_eq!(summary.confidence, Confidence::Low);
    }

    #[tokio::test]
    async fn test_summarize_sets_confidence() {
        let summarizer = Summarizer::new(
            Arc::new(CannedGenerator(Ok(
                r#"{"document_type": "EICR", "compliance_status": "Satisfactory"}"#,
            ))),
            4000,
        );
        let summary = summarizer.summarize("text", "EICR_Flat3.pdf").await;
        assert!(!summary.fallback);
        assert_eq!(summary.confidence, Confidence::High);
    }

    #[tokio::test]
    async fn test_summarize_falls_back_on_error() {
        let summarizer = Summarizer::new(Arc::new(CannedGenerator(Err(()))), 4000);
        let summary = summarizer.summarize("Gas safety record", "cp12.pdf").await;
        assert!(summary.fallback);
        assert_eq!(summary.document_type.as_deref(), Some("Gas Safety Certificate"));
    }
}
