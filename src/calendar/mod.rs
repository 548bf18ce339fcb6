mod models;
pub mod projection;
pub mod window;

pub use models::{CalendarEvent, EventId, RawEvent};
pub use projection::CalendarProjection;
pub use window::CalendarWindow;

/// Who a calendar fetch is made as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Anonymous. The backend may reduce events to busy/free.
    Public,
    /// As the logged in freelancer, bearer credential attached.
    Private,
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessMode::Public => write!(f, "public"),
            AccessMode::Private => write!(f, "private"),
        }
    }
}
