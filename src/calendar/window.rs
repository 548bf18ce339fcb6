//! The sliding three month window the calendar fetches.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, TimeZone, Utc};

/// Half-open range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CalendarWindow {
    /// From the first day of the month before `reference` up to (excluding)
    /// the first day of the month two after it. Month boundaries are taken
    /// in the reference's own time zone.
    pub fn around<Tz: TimeZone>(reference: &DateTime<Tz>) -> Self {
        let tz = reference.timezone();
        let local = reference.naive_local();
        let month0 = local.year() * 12 + local.month0() as i32;

        Self {
            start: first_of_month(&tz, month0 - 1),
            end: first_of_month(&tz, month0 + 2),
        }
    }

    pub fn start_param(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn end_param(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Query string pairs for `GET /events/`.
    pub fn query(&self) -> [(&'static str, String); 2] {
        [("start", self.start_param()), ("end", self.end_param())]
    }
}

/// Midnight on the first of the month `months` counted from year 0.
fn first_of_month<Tz: TimeZone>(tz: &Tz, months: i32) -> DateTime<Utc> {
    let year = months.div_euclid(12);
    let month = months.rem_euclid(12) as u32 + 1;
    let midnight = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default();

    // Zones that skip midnight on a DST change fall back to reading the
    // wall clock as UTC.
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}
