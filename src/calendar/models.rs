use serde::{Deserialize, Serialize};

/// Event ids come back as integers from the store but the display layer
/// wants strings, so accept either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Int(i64),
    Str(String),
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventId::Int(id) => write!(f, "{}", id),
            EventId::Str(id) => write!(f, "{}", id),
        }
    }
}

/// Event record as listed by `GET /events/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: EventId,
    pub title: String,
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub client_id: Option<i64>,
    #[serde(default)]
    pub all_day: Option<bool>,
}

/// Normalized event handed to the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: String,
    pub end: Option<String>,
    pub all_day: bool,
}

impl From<RawEvent> for CalendarEvent {
    fn from(raw: RawEvent) -> Self {
        Self {
            id: raw.id.to_string(),
            title: raw.title,
            start: raw.start,
            end: raw.end,
            all_day: raw.all_day.unwrap_or(false),
        }
    }
}
