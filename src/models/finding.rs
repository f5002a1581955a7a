//! Findings reported by inspection documents.
//!
//! Electrical reports grade observations with the C1/C2/C3/FI codes, most
//! other assessments use HIGH/MEDIUM/LOW. Both vocabularies share one enum.

use serde::{Deserialize, Serialize};

/// Severity classification attached to a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Danger present, immediate action required.
    C1,
    /// Potentially dangerous, urgent remedial action required.
    C2,
    /// Improvement recommended.
    C3,
    /// Further investigation required.
    FI,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "LOW")]
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::C1 => "C1",
            Self::C2 => "C2",
            Self::C3 => "C3",
            Self::FI => "FI",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }

    /// Parse a classification label leniently ("c2", "High", " FI ").
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "C1" => Some(Self::C1),
            "C2" => Some(Self::C2),
            "C3" => Some(Self::C3),
            "FI" => Some(Self::FI),
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }

    /// Urgent findings raise an alert when a summary is committed.
    pub fn is_urgent(&self) -> bool {
        matches!(self, Self::C1 | Self::C2 | Self::High)
    }

    /// Alert type and priority recorded for an urgent finding.
    pub fn alert_kind(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::C1 => Some(("immediate_danger", "immediate")),
            Self::C2 | Self::High => Some(("potentially_dangerous", "urgent")),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// `None` when the model used a label outside the known vocabulary.
    #[serde(default)]
    pub classification: Option<Severity>,
    #[serde(default)]
    pub observation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_required: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl Finding {
    pub fn is_urgent(&self) -> bool {
        self.classification.is_some_and(|c| c.is_urgent())
    }

    /// Build a finding from a loosely-shaped JSON object.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |key: &str| {
            obj.get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let observation = text("observation")
            .or_else(|| text("description"))
            .or_else(|| text("finding"))
            .unwrap_or_default();

        Some(Self {
            classification: text("classification")
                .or_else(|| text("severity"))
                .or_else(|| text("code"))
                .and_then(|c| Severity::from_str(&c)),
            observation,
            location: text("location"),
            action_required: text("action_required"),
            priority: text("priority"),
        })
    }
}

/// Key findings, tagged with the format they were recorded in.
///
/// Older analyses stored bare strings; newer ones store structured
/// findings. The tag travels with the stored JSON so readers never need to
/// inspect element shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "items", rename_all = "snake_case")]
pub enum KeyFindings {
    Legacy(Vec<String>),
    Structured(Vec<Finding>),
}

impl Default for KeyFindings {
    fn default() -> Self {
        Self::Structured(Vec::new())
    }
}

impl KeyFindings {
    /// Normalise a raw `key_findings` array from model output.
    ///
    /// An array made only of strings is legacy; anything containing an
    /// object is structured, with stray strings promoted to unclassified
    /// findings.
    pub fn from_raw(value: Option<&serde_json::Value>) -> Self {
        let Some(items) = value.and_then(|v| v.as_array()) else {
            return Self::default();
        };

        if !items.is_empty() && items.iter().all(|v| v.is_string()) {
            return Self::Legacy(
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            );
        }

        Self::Structured(
            items
                .iter()
                .filter_map(|v| match v {
                    serde_json::Value::String(s) => Some(Finding {
                        classification: None,
                        observation: s.trim().to_string(),
                        location: None,
                        action_required: None,
                        priority: None,
                    }),
                    other => Finding::from_value(other),
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Legacy(items) => items.len(),
            Self::Structured(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Structured findings with an urgent classification. Legacy findings
    /// carry no classification and are never urgent.
    pub fn urgent(&self) -> Vec<&Finding> {
        match self {
            Self::Legacy(_) => Vec::new(),
            Self::Structured(items) => items.iter().filter(|f| f.is_urgent()).collect(),
        }
    }

    /// One display line per finding.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Legacy(items) => items.clone(),
            Self::Structured(items) => items
                .iter()
                .map(|f| match f.classification {
                    Some(c) => format!("{}: {}", c, f.observation),
                    None => f.observation.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_severity_parsing() {
        assert_eq!(Severity::from_str("c2"), Some(Severity::C2));
        assert_eq!(Severity::from_str(" High "), Some(Severity::High));
        assert_eq!(Severity::from_str("FI"), Some(Severity::FI));
        assert_eq!(Severity::from_str("severe"), None);
    }

    #[test]
    fn test_urgency() {
        assert!(Severity::C1.is_urgent());
        assert!(Severity::C2.is_urgent());
        assert!(Severity::High.is_urgent());
        assert!(!Severity::C3.is_urgent());
        assert!(!Severity::FI.is_urgent());
        assert!(!Severity::Medium.is_urgent());
    }

    #[test]
    fn test_legacy_findings_are_tagged() {
        let raw = json!(["No earthing to bathroom", "Consumer unit labelled"]);
        let findings = KeyFindings::from_raw(Some(&raw));
        assert!(matches!(findings, KeyFindings::Legacy(ref v) if v.len() == 2));
        assert!(findings.urgent().is_empty());

        let stored = serde_json::to_value(&findings).unwrap();
        assert_eq!(stored["format"], "legacy");
    }

    #[test]
    fn test_structured_findings() {
        let raw = json!([
            {"classification": "C1", "observation": "Exposed live conductors", "location": "Riser"},
            {"classification": "C3", "observation": "No RCD on lighting circuit"},
            "Loose socket faceplate"
        ]);
        let findings = KeyFindings::from_raw(Some(&raw));
        assert_eq!(findings.len(), 3);

        let urgent = findings.urgent();
        assert_eq!(urgent.len(), 1);
        assert_eq!(urgent[0].observation, "Exposed live conductors");
        assert_eq!(urgent[0].location.as_deref(), Some("Riser"));

        let stored = serde_json::to_value(&findings).unwrap();
        assert_eq!(stored["format"], "structured");
        let back: KeyFindings = serde_json::from_value(stored).unwrap();
        assert_eq!(back, findings);
    }

    #[test]
    fn test_missing_findings_are_empty() {
        assert!(KeyFindings::from_raw(None).is_empty());
        assert!(KeyFindings::from_raw(Some(&json!("not a list"))).is_empty());
    }
}
