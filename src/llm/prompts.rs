//! Prompt templates.

/// Compliance document analysis prompt. Uses `{filename}` and `{content}`.
pub const COMPLIANCE_SUMMARY_PROMPT: &str = r#"You are a compliance analyst for UK leasehold block management. Analyse the building compliance document below and write in British English.

Document filename: {filename}

Document content:
{content}

Respond with ONLY a JSON object of this shape, no commentary and no markdown:
{
  "document_type": "EICR | Fire Risk Assessment | Gas Safety Certificate | Asbestos Survey | Water Hygiene Assessment | Fire Alarm Service Report | Emergency Lighting Test | Fire Door Inspection | Lift LOLER | Other",
  "compliance_status": "satisfactory | unsatisfactory | requires_action | unknown",
  "summary": "two or three sentences describing the document and its outcome",
  "key_findings": [
    {
      "classification": "C1 | C2 | C3 | FI | HIGH | MEDIUM | LOW",
      "observation": "what was found",
      "location": "where it was found",
      "action_required": "what must be done",
      "priority": "immediate | urgent | routine"
    }
  ],
  "recommendations": [
    {
      "action": "recommended action",
      "reason": "why",
      "timeframe": "when",
      "regulation_reference": "relevant regulation, if any"
    }
  ],
  "inspection_details": {
    "inspection_date": "YYYY-MM-DD",
    "next_inspection_due": "YYYY-MM-DD",
    "inspector_name": "name",
    "inspector_company": "company",
    "certificate_number": "reference"
  },
  "risk_assessment": {
    "overall_risk": "low | medium | high",
    "notes": "short justification"
  },
  "property_details": {
    "building_name": "name of the building",
    "address": "full address"
  }
}

Use C1 for danger present, C2 for potentially dangerous, C3 for improvement recommended and FI for further investigation. Use null for anything the document does not state. Never invent dates."#;
