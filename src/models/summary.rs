//! Structured summaries produced by document analysis.
//!
//! Every field is optional: a missing field means "unknown" and is never an
//! error. Raw model output is normalised exactly once, in
//! [`StructuredSummary::from_model_output`]; everything downstream reads the
//! typed fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::confidence::Confidence;
use super::finding::KeyFindings;

/// Version written into every stored summary.
pub const SUMMARY_SCHEMA_VERSION: u32 = 2;

/// Outcome of an inspection as stated by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectionOutcome {
    Satisfactory,
    Unsatisfactory,
    Unknown,
}

impl InspectionOutcome {
    /// Interpret a free-text compliance status.
    ///
    /// Only whole known statuses count; qualified ones such as "partially
    /// compliant" are `Unknown`.
    pub fn from_status(status: &str) -> Self {
        let normalised = status
            .trim()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase()
            .replace(|c: char| c == '-' || c == '_', " ");
        let words: Vec<&str> = normalised.split_whitespace().collect();

        match words.as_slice() {
            ["unsatisfactory"]
            | ["non", "compliant"]
            | ["noncompliant"]
            | ["not", "compliant"]
            | ["not", "satisfactory"]
            | ["fail"]
            | ["failed"] => Self::Unsatisfactory,
            ["satisfactory"] | ["compliant"] | ["pass"] | ["passed"] => Self::Satisfactory,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InspectionDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspection_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_inspection_due: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector_company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulation_reference: Option<String>,
}

/// Result of analysing one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub key_findings: KeyFindings,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspection_details: Option<InspectionDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_assessment: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_details: Option<PropertyDetails>,
    #[serde(default)]
    pub confidence: Confidence,
    /// Set when the language model was unavailable and the summary was
    /// assembled from locally derived fields.
    #[serde(default)]
    pub fallback: bool,
}

fn default_schema_version() -> u32 {
    SUMMARY_SCHEMA_VERSION
}

impl Default for StructuredSummary {
    fn default() -> Self {
        Self {
            schema_version: SUMMARY_SCHEMA_VERSION,
            document_type: None,
            compliance_status: None,
            summary: None,
            key_findings: KeyFindings::default(),
            recommendations: Vec::new(),
            inspection_details: None,
            risk_assessment: None,
            property_details: None,
            confidence: Confidence::Medium,
            fallback: false,
        }
    }
}

impl StructuredSummary {
    /// Build a summary from an arbitrary JSON value returned by a model.
    ///
    /// Unknown keys are dropped, wrongly-typed values are treated as absent.
    pub fn from_model_output(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return match value.as_str() {
                Some(text) => Self::from_text(text),
                None => Self::default(),
            };
        };

        let text = |v: Option<&Value>| {
            v.and_then(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        // Some responses put the dates at the top level instead of under
        // inspection_details.
        let details_obj = obj.get("inspection_details").and_then(|v| v.as_object());
        let detail = |key: &str| {
            text(details_obj.and_then(|d| d.get(key))).or_else(|| text(obj.get(key)))
        };

        let inspection_details = InspectionDetails {
            inspection_date: detail("inspection_date").and_then(|s| parse_date_lenient(&s)),
            next_inspection_due: detail("next_inspection_due")
                .or_else(|| detail("next_due_date"))
                .and_then(|s| parse_date_lenient(&s)),
            inspector_name: detail("inspector_name").or_else(|| detail("inspector")),
            inspector_company: detail("inspector_company").or_else(|| detail("contractor")),
            certificate_number: detail("certificate_number"),
        };

        let property_obj = obj.get("property_details").and_then(|v| v.as_object());
        let property_details = PropertyDetails {
            building_name: text(property_obj.and_then(|p| p.get("building_name"))),
            address: text(property_obj.and_then(|p| p.get("address"))),
        };

        let recommendations = obj
            .get("recommendations")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(parse_recommendation).collect())
            .unwrap_or_default();

        Self {
            schema_version: SUMMARY_SCHEMA_VERSION,
            document_type: text(obj.get("document_type")).or_else(|| text(obj.get("classification"))),
            compliance_status: text(obj.get("compliance_status"))
                .or_else(|| text(obj.get("overall_condition"))),
            summary: text(obj.get("summary")),
            key_findings: KeyFindings::from_raw(obj.get("key_findings")),
            recommendations,
            inspection_details: (inspection_details != InspectionDetails::default())
                .then_some(inspection_details),
            risk_assessment: obj.get("risk_assessment").filter(|v| !v.is_null()).cloned(),
            property_details: (property_details != PropertyDetails::default())
                .then_some(property_details),
            confidence: Confidence::Medium,
            fallback: false,
        }
    }

    /// A summary holding only free text.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        Self {
            summary: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            confidence: Confidence::Low,
            ..Self::default()
        }
    }

    /// Parse a stored summary column.
    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn outcome(&self) -> InspectionOutcome {
        self.compliance_status
            .as_deref()
            .map(InspectionOutcome::from_status)
            .unwrap_or(InspectionOutcome::Unknown)
    }

    pub fn inspection_date(&self) -> Option<NaiveDate> {
        self.inspection_details.as_ref().and_then(|d| d.inspection_date)
    }

    pub fn next_inspection_due(&self) -> Option<NaiveDate> {
        self.inspection_details.as_ref().and_then(|d| d.next_inspection_due)
    }

    pub fn certificate_number(&self) -> Option<&str> {
        self.inspection_details
            .as_ref()
            .and_then(|d| d.certificate_number.as_deref())
    }

    pub fn contractor(&self) -> Option<&str> {
        self.inspection_details
            .as_ref()
            .and_then(|d| d.inspector_company.as_deref().or(d.inspector_name.as_deref()))
    }
}

fn parse_recommendation(value: &Value) -> Option<Recommendation> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(Recommendation {
            action: s.trim().to_string(),
            reason: None,
            timeframe: None,
            regulation_reference: None,
        }),
        Value::Object(obj) => {
            let text = |key: &str| {
                obj.get(key)
                    .and_then(|v| v.as_str())
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            };
            Some(Recommendation {
                action: text("action").or_else(|| text("recommendation"))?,
                reason: text("reason"),
                timeframe: text("timeframe"),
                regulation_reference: text("regulation_reference"),
            })
        }
        _ => None,
    }
}

/// Parse the date formats seen in UK inspection reports.
pub fn parse_date_lenient(s: &str) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d %B %Y", "%d %b %Y", "%B %d, %Y",
    ];

    let s = s.trim();
    // Accept full timestamps by looking at the date part only.
    let s = s.split('T').next().unwrap_or(s);
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_from_status() {
        assert_eq!(
            InspectionOutcome::from_status("Satisfactory"),
            InspectionOutcome::Satisfactory
        );
        assert_eq!(
            InspectionOutcome::from_status("UNSATISFACTORY"),
            InspectionOutcome::Unsatisfactory
        );
        assert_eq!(
            InspectionOutcome::from_status("non-compliant"),
            InspectionOutcome::Unsatisfactory
        );
        assert_eq!(
            InspectionOutcome::from_status("requires review"),
            InspectionOutcome::Unknown
        );
    }

    #[test]
    fn test_negated_and_qualified_statuses() {
        for status in ["Not satisfactory", "Not compliant", "NON_COMPLIANT", "Failed."] {
            assert_eq!(
                InspectionOutcome::from_status(status),
                InspectionOutcome::Unsatisfactory,
                "{}",
                status
            );
        }
        for status in ["Partially compliant", "satisfactory with observations", "requires_action", ""] {
            assert_eq!(
                InspectionOutcome::from_status(status),
                InspectionOutcome::Unknown,
                "{}",
                status
            );
        }
        assert_eq!(
            InspectionOutcome::from_status("  Compliant. "),
            InspectionOutcome::Satisfactory
        );
    }

    #[test]
    fn test_from_model_output() {
        let raw = json!({
            "document_type": "EICR",
            "compliance_status": "satisfactory",
            "summary": "Periodic inspection of landlord supply.",
            "key_findings": [{"classification": "C3", "observation": "Label missing"}],
            "recommendations": ["Replace labels", {"action": "Retest in 5 years", "timeframe": "5 years"}],
            "inspection_details": {
                "inspection_date": "12/03/2024",
                "next_inspection_due": "2029-03-12",
                "certificate_number": "EICR-0042"
            },
            "unexpected": 7
        });

        let summary = StructuredSummary::from_model_output(&raw);
        assert_eq!(summary.document_type.as_deref(), Some("EICR"));
        assert_eq!(summary.outcome(), InspectionOutcome::Satisfactory);
        assert_eq!(summary.key_findings.len(), 1);
        assert_eq!(summary.recommendations.len(), 2);
        assert_eq!(summary.recommendations[1].timeframe.as_deref(), Some("5 years"));
        assert_eq!(
            summary.inspection_date(),
            NaiveDate::from_ymd_opt(2024, 3, 12)
        );
        assert_eq!(
            summary.next_inspection_due(),
            NaiveDate::from_ymd_opt(2029, 3, 12)
        );
        assert_eq!(summary.certificate_number(), Some("EICR-0042"));
        assert!(summary.property_details.is_none());
    }

    #[test]
    fn test_absent_fields_are_unknown() {
        let summary = StructuredSummary::from_model_output(&json!({}));
        assert!(summary.document_type.is_none());
        assert!(summary.inspection_details.is_none());
        assert!(summary.key_findings.is_empty());
        assert_eq!(summary.outcome(), InspectionOutcome::Unknown);

        let wrong_types = json!({"document_type": 12, "key_findings": "none"});
        let summary = StructuredSummary::from_model_output(&wrong_types);
        assert!(summary.document_type.is_none());
        assert!(summary.key_findings.is_empty());
    }

    #[test]
    fn test_stored_summary_roundtrip_keeps_version() {
        let summary = StructuredSummary::from_model_output(&json!({"document_type": "EICR"}));
        let stored = summary.to_json();
        assert!(stored.contains("\"schema_version\":2"));
        assert_eq!(StructuredSummary::from_json(&stored), Some(summary));
    }

    #[test]
    fn test_parse_date_lenient() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 7);
        assert_eq!(parse_date_lenient("2025-01-07"), expected);
        assert_eq!(parse_date_lenient("07/01/2025"), expected);
        assert_eq!(parse_date_lenient("7 January 2025"), expected);
        assert_eq!(parse_date_lenient("2025-01-07T10:00:00Z"), expected);
        assert_eq!(parse_date_lenient("soon"), None);
    }
}
