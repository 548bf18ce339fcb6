//! Plain-text views for the terminal.

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::calendar::{AccessMode, CalendarEvent};
use crate::core::LoadStatus;
use crate::leads::Lead;

pub fn roster(leads: &[Lead], status: &LoadStatus) -> String {
    roster_in(leads, status, &Local)
}

pub fn roster_in<Tz: TimeZone>(leads: &[Lead], status: &LoadStatus, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if *status == LoadStatus::Loading {
        return "Loading clients...".to_string();
    }

    let mut out = vec![format!("# All Leads from Landing Page ({})", leads.len())];
    if leads.is_empty() {
        out.push(
            "No leads yet. Leads submitted from the landing page will appear here.".to_string(),
        );
    }

    for lead in leads {
        let mut lines = vec![
            format!("## {}  ({})", lead.name, created_at(&lead.created_at, tz)),
            format!("Email: mailto:{}", lead.email),
        ];
        if let Some(phone) = lead.phone.as_deref().filter(|p| !p.is_empty()) {
            lines.push(format!("Phone: tel:{}", phone));
        }
        if let Some(notes) = lead.notes.as_deref().filter(|n| !n.is_empty()) {
            lines.push(format!("Notes: {}", notes));
        }
        out.push(lines.join("\n"));
    }

    if status.is_failed() {
        out.push("(leads could not be loaded)".to_string());
    }

    out.join("\n\n")
}

pub fn calendar(events: &[CalendarEvent], mode: AccessMode, status: &LoadStatus) -> String {
    let mut out = vec![format!("# Calendar ({}, {} events)", mode, events.len())];

    if events.is_empty() {
        out.push("No events in this window.".to_string());
    }
    for event in events {
        let end = event.end.as_deref().unwrap_or("-");
        let all_day = if event.all_day { " (all day)" } else { "" };
        out.push(format!(
            "## {}{}\nStart: {}\nEnd: {}",
            event.title, all_day, event.start, end
        ));
    }

    if status.is_failed() {
        out.push("(events could not be loaded)".to_string());
    }

    out.join("\n\n")
}

/// Roster followed by the private calendar.
pub fn dashboard(
    leads: &[Lead],
    lead_status: &LoadStatus,
    events: &[CalendarEvent],
    event_status: &LoadStatus,
) -> String {
    format!(
        "{}\n\n{}",
        roster(leads, lead_status),
        calendar(events, AccessMode::Private, event_status)
    )
}

/// `created_at` in the viewer's zone.
pub fn created_at<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string()
}
