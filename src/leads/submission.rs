//! Public lead form.

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use super::models::{Lead, NewLead};
use crate::api::LeadStore;
use crate::core::{Error, RefreshSignal, Result, ValidationError};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Wall-clock layouts accepted for the preferred appointment time.
const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Raw field values as typed by the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub notes: String,
    /// Local date-time, e.g. `2024-06-01T10:00`. Empty when not requested.
    pub requested_start: String,
    /// Appointment length in minutes. Empty lets the store pick its default.
    pub duration_minutes: String,
}

impl LeadForm {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check required fields and build the request body, reading
    /// `requested_start` as wall-clock time in `tz`.
    pub fn validate<Tz: TimeZone>(&self, tz: &Tz) -> Result<NewLead, ValidationError> {
        // Blank checks ignore surrounding whitespace, the values are sent as
        // entered
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail(email.to_string()));
        }

        let duration = self.duration_minutes.trim();
        let requested_duration_minutes = if duration.is_empty() {
            None
        } else {
            match duration.parse::<u32>() {
                Ok(minutes) if minutes > 0 => Some(minutes),
                _ => return Err(ValidationError::InvalidDuration(duration.to_string())),
            }
        };

        Ok(NewLead {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: Some(self.phone.clone()),
            notes: Some(self.notes.clone()),
            requested_start: parse_requested_start(&self.requested_start, tz)?,
            requested_duration_minutes,
        })
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Convert the preferred time to an absolute instant.
///
/// Input that already carries an offset (RFC 3339) is kept as the same
/// instant. Bare wall-clock input is read in `tz`; when the wall-clock time
/// is ambiguous the earlier instant wins.
pub fn parse_requested_start<Tz: TimeZone>(
    input: &str,
    tz: &Tz,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }

    LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|local| Some(local.with_timezone(&Utc)))
        .ok_or_else(|| ValidationError::InvalidRequestedStart(input.to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Sending,
    Sent,
    Error,
    Invalid(ValidationError),
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Idle => write!(f, ""),
            SubmissionStatus::Sending => write!(f, "sending"),
            SubmissionStatus::Sent => write!(f, "sent"),
            SubmissionStatus::Error => write!(f, "error"),
            SubmissionStatus::Invalid(e) => write!(f, "{}", e),
        }
    }
}

/// The form plus its submit behaviour. Each successful submit raises the
/// shared refresh signal once.
pub struct LeadSubmission {
    store: Arc<dyn LeadStore>,
    refresh: RefreshSignal,
    pub form: LeadForm,
    status: SubmissionStatus,
}

impl LeadSubmission {
    pub fn new(store: Arc<dyn LeadStore>, refresh: RefreshSignal) -> Self {
        Self {
            store,
            refresh,
            form: LeadForm::default(),
            status: SubmissionStatus::Idle,
        }
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    /// Submit reading the preferred time in the machine's local zone.
    pub async fn submit(&mut self) -> Result<Lead> {
        self.submit_in(&Local).await
    }

    pub async fn submit_in<Tz: TimeZone>(&mut self, tz: &Tz) -> Result<Lead> {
        let new_lead = match self.form.validate(tz) {
            Ok(lead) => lead,
            Err(e) => {
                tracing::debug!("Lead rejected locally: {}", e);
                self.status = SubmissionStatus::Invalid(e.clone());
                return Err(Error::Validation(e));
            }
        };
        self.send(new_lead).await
    }

    async fn send(&mut self, new_lead: NewLead) -> Result<Lead> {
        self.status = SubmissionStatus::Sending;

        match self.store.create_lead(&new_lead).await {
            Ok(lead) => {
                tracing::info!(id = lead.id, "Lead submitted");
                self.status = SubmissionStatus::Sent;
                self.form = LeadForm::default();
                self.refresh.notify();
                Ok(lead)
            }
            Err(e) => {
                // Keep the form so the visitor can retry
                tracing::error!("Failed to submit lead: {}", e);
                self.status = SubmissionStatus::Error;
                Err(e)
            }
        }
    }
}
