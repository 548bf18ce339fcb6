use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};

use super::AccessMode;
use super::models::CalendarEvent;
use super::window::CalendarWindow;
use crate::api::EventStore;
use crate::core::{Error, Latest, LoadOutcome, LoadStatus};

/// Events in the three month window around a reference time.
///
/// Public and private projections run the same window math and mapping;
/// only the access mode passed to the store differs.
#[derive(Clone)]
pub struct CalendarProjection {
    store: Arc<dyn EventStore>,
    mode: AccessMode,
    events: Latest<CalendarEvent>,
}

impl CalendarProjection {
    pub fn new(store: Arc<dyn EventStore>, mode: AccessMode) -> Self {
        Self {
            store,
            mode,
            events: Latest::new(),
        }
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Load the window around now, in the machine's local zone.
    pub async fn reload(&self) -> LoadOutcome {
        self.load_window(Local::now()).await
    }

    pub async fn load_window<Tz: TimeZone>(&self, reference: DateTime<Tz>) -> LoadOutcome {
        let window = CalendarWindow::around(&reference);
        let store = Arc::clone(&self.store);
        let mode = self.mode;

        self.events
            .load("events", async move {
                let raw = store.list_events(&window, mode).await?;
                Ok::<Vec<CalendarEvent>, Error>(raw.into_iter().map(CalendarEvent::from).collect())
            })
            .await
    }

    pub fn events(&self) -> Vec<CalendarEvent> {
        self.events.items()
    }

    pub fn status(&self) -> LoadStatus {
        self.events.status()
    }
}
