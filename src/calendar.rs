//! Renewal reminders in an external calendar.
//!
//! Reminders go to an HTTP endpoint that accepts a JSON event and answers
//! with the created event id. The endpoint is optional; without it every
//! reminder request fails with [`CalendarError::NotConfigured`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{Building, InspectionDetails};

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("No calendar endpoint configured")]
    NotConfigured,

    #[error("Calendar request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Calendar API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Calendar response had no event id")]
    MissingEventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Event creation endpoint; reminders are skipped when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Bearer token for the endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default = "default_reminder_days")]
    pub reminder_days_before: u32,
    /// Local hour the renewal event starts
    #[serde(default = "default_event_hour")]
    pub event_hour: u32,
    #[serde(default = "default_event_duration")]
    pub event_duration_hours: u32,
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

fn default_reminder_days() -> u32 {
    30
}

fn default_event_hour() -> u32 {
    16
}

fn default_event_duration() -> u32 {
    2
}

fn default_time_zone() -> String {
    "Europe/London".to_string()
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_token: None,
            reminder_days_before: default_reminder_days(),
            event_hour: default_event_hour(),
            event_duration_hours: default_event_duration(),
            time_zone: default_time_zone(),
        }
    }
}

impl CalendarConfig {
    /// Apply `CALENDAR_ENDPOINT` and `CALENDAR_TOKEN`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("CALENDAR_ENDPOINT") {
            self.endpoint = Some(val);
        }
        if let Ok(val) = std::env::var("CALENDAR_TOKEN") {
            self.api_token = Some(val);
        }
        self
    }
}

/// Event payload sent to the calendar endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRequest {
    pub subject: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub time_zone: String,
    pub description: String,
    pub reminder_minutes: u32,
    pub is_all_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ReminderRequest {
    /// Renewal reminder for a compliance asset falling due on `due`.
    pub fn renewal(
        document_type: &str,
        building: &Building,
        due: NaiveDate,
        details: Option<&InspectionDetails>,
        urgent_findings: usize,
        config: &CalendarConfig,
    ) -> Self {
        let start_time = NaiveTime::from_hms_opt(config.event_hour.min(23), 0, 0)
            .unwrap_or(NaiveTime::MIN);
        let start = due.and_time(start_time);
        let end = start + chrono::Duration::hours(i64::from(config.event_duration_hours));

        let last_inspection = details
            .and_then(|d| d.inspection_date)
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let inspector = details
            .and_then(|d| d.inspector_name.as_deref())
            .unwrap_or("Unknown");
        let certificate = details
            .and_then(|d| d.certificate_number.as_deref())
            .unwrap_or("N/A");

        let mut description = format!(
            "{doc} inspection is due for {name}.\n\n\
             Property: {name}\n\
             Address: {address}\n\
             Document Type: {doc}\n\
             Last Inspection: {last}\n\
             Inspector: {inspector}\n\
             Certificate: {certificate}",
            doc = document_type,
            name = building.name,
            address = building.address.as_deref().unwrap_or("Unknown"),
            last = last_inspection,
            inspector = inspector,
            certificate = certificate,
        );
        if urgent_findings > 0 {
            description.push_str(&format!(
                "\n\n{} urgent finding(s) from the last inspection require attention.",
                urgent_findings
            ));
        }

        Self {
            subject: format!("{} Renewal – {}", document_type, building.name),
            start,
            end,
            time_zone: config.time_zone.clone(),
            description,
            reminder_minutes: config.reminder_days_before * 24 * 60,
            is_all_day: false,
            location: building.address.clone(),
        }
    }
}

/// Creates calendar events and returns their ids.
#[async_trait]
pub trait CalendarClient: Send + Sync {
    async fn create_reminder(&self, request: &ReminderRequest) -> Result<String, CalendarError>;
}

/// Client for a JSON event-creation endpoint.
pub struct HttpCalendarClient {
    endpoint: String,
    api_token: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedEvent {
    event_id: Option<String>,
    id: Option<String>,
}

impl HttpCalendarClient {
    pub fn new(endpoint: &str, api_token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            endpoint: endpoint.to_string(),
            api_token,
            client,
        }
    }
}

#[async_trait]
impl CalendarClient for HttpCalendarClient {
    async fn create_reminder(&self, request: &ReminderRequest) -> Result<String, CalendarError> {
        debug!("Creating calendar event '{}'", request.subject);
        let mut req = self.client.post(&self.endpoint).json(request);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(CalendarError::Api { status, body });
        }

        let created: CreatedEvent = resp.json().await?;
        created
            .event_id
            .or(created.id)
            .ok_or(CalendarError::MissingEventId)
    }
}

/// Stand-in used when no endpoint is configured.
pub struct NoCalendar;

#[async_trait]
impl CalendarClient for NoCalendar {
    async fn create_reminder(&self, _request: &ReminderRequest) -> Result<String, CalendarError> {
        Err(CalendarError::NotConfigured)
    }
}

/// Build the calendar client for a configuration.
pub fn calendar_from_config(config: &CalendarConfig) -> Arc<dyn CalendarClient> {
    match &config.endpoint {
        Some(endpoint) => Arc::new(HttpCalendarClient::new(endpoint, config.api_token.clone())),
        None => Arc::new(NoCalendar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renewal_request() {
        let building = Building::new("Ashwood House", Some("1 Ashwood Road, London".to_string()), false);
        let due = NaiveDate::from_ymd_opt(2029, 3, 12).unwrap();
        let request = ReminderRequest::renewal("EICR", &building, due, None, 0, &CalendarConfig::default());

        assert_eq!(request.subject, "EICR Renewal – Ashwood House");
        assert_eq!(request.start.to_string(), "2029-03-12 16:00:00");
        assert_eq!(request.end.to_string(), "2029-03-12 18:00:00");
        assert_eq!(request.reminder_minutes, 43_200);
        assert_eq!(request.location.as_deref(), Some("1 Ashwood Road, London"));
        assert!(request.description.contains("Certificate: N/A"));
        assert!(!request.description.contains("urgent"));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["reminderMinutes"], 43_200);
        assert_eq!(json["isAllDay"], false);
    }

    #[test]
    fn test_urgent_findings_are_mentioned() {
        let building = Building::new("Birch Court", None, true);
        let due = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let request = ReminderRequest::renewal("Fire Risk Assessment", &building, due, None, 2, &CalendarConfig::default());
        assert!(request.description.contains("2 urgent finding(s)"));
        assert!(request.location.is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_calendar_fails() {
        let client = calendar_from_config(&CalendarConfig::default());
        let building = Building::new("Ashwood House", None, false);
        let due = NaiveDate::from_ymd_opt(2029, 3, 12).unwrap();
        let request = ReminderRequest::renewal("EICR", &building, due, None, 0, &CalendarConfig::default());
        assert!(matches!(
            client.create_reminder(&request).await,
            Err(CalendarError::NotConfigured)
        ));
    }
}
