//! Heuristic quality scoring for extracted text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::models::Confidence;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{3,}\b").expect("valid word regex"));

/// Repeated-character run length treated as an OCR artefact.
const REPEAT_RUN: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub score: u8,
    pub confidence: Confidence,
    pub char_count: usize,
    pub word_count: usize,
    pub warnings: Vec<String>,
}

/// Score text from 0 to 100 by looking for common OCR artefacts.
pub fn assess_text_quality(text: &str) -> QualityReport {
    let char_count = text.chars().count();
    let word_count = text.split_whitespace().count();
    let mut score: i32 = 100;
    let mut warnings = Vec::new();

    if char_count < 50 {
        score -= 30;
        warnings.push("Very little text".to_string());
    }

    let letters = text.chars().filter(|c| !c.is_whitespace()).count();
    if word_count == 0 || (letters as f64 / word_count as f64) < 3.0 {
        score -= 20;
        warnings.push("Short average word length".to_string());
    }

    let symbols = text
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace() && !".,!?;:-()\"'/&%£".contains(*c))
        .count();
    if char_count > 0 && symbols * 10 > char_count {
        score -= 15;
        warnings.push("High proportion of stray symbols".to_string());
    }

    if has_repeated_run(text, REPEAT_RUN) {
        score -= 25;
        warnings.push("Repeated characters".to_string());
    }

    if !WORD_RE.is_match(text) {
        score -= 40;
        warnings.push("No recognisable words".to_string());
    }

    let score = score.clamp(0, 100) as u8;
    QualityReport {
        score,
        confidence: Confidence::from_score(u32::from(score)),
        char_count,
        word_count,
        warnings,
    }
}

/// Whether any non-whitespace character repeats `run` or more times in a row.
fn has_repeated_run(text: &str, run: usize) -> bool {
    let mut prev = None;
    let mut count = 0;
    for c in text.chars() {
        if c.is_whitespace() {
            prev = None;
            count = 0;
            continue;
        }
        if Some(c) == prev {
            count += 1;
            if count >= run {
                return true;
            }
        } else {
            prev = Some(c);
            count = 1;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_scores_high() {
        let report = assess_text_quality(
            "Electrical Installation Condition Report for Ashwood House. \
             The installation was found to be satisfactory at the time of inspection.",
        );
        assert_eq!(report.score, 100);
        assert_eq!(report.confidence, Confidence::High);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_ocr_noise_scores_low() {
        let report = assess_text_quality("|| ~~ ## @@@@@@ ^^ }{");
        assert!(report.score < 50);
        assert_eq!(report.confidence, Confidence::Low);
        assert!(report.warnings.iter().any(|w| w.contains("Repeated")));
    }

    #[test]
    fn test_layout_whitespace_is_not_a_repeat() {
        assert!(!has_repeated_run("Name:          value", 5));
        assert!(has_repeated_run("Total ......... 12", 5));
    }
}
