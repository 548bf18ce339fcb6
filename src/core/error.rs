//! Error taxonomy shared by every component.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fallback shown when a login fails without a server-provided reason.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name is required")]
    MissingName,
    #[error("email is required")]
    MissingEmail,
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("'{0}' is not a valid date/time")]
    InvalidRequestedStart(String),
    #[error("'{0}' is not a valid duration in minutes")]
    InvalidDuration(String),
    #[error("username and password are required")]
    MissingCredentials,
}

#[derive(Debug, Error)]
pub enum Error {
    /// Rejected locally, nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Backend unreachable, connection reset, undecodable body.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend refused the bearer credential on an authenticated call.
    #[error("credential rejected by the server")]
    Unauthorized,

    /// Login failed. Holds the message meant for the user.
    #[error("{0}")]
    Authentication(String),

    #[error("not logged in")]
    NotAuthenticated,

    #[error("cannot go from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized)
    }
}
