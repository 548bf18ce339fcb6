//! Backend contract.
//!
//! The lead store, event store and token issuer are ports so the
//! components can be driven by anything that speaks the same contract.
//! `ApiClient` is the HTTP implementation.

mod client;
pub mod public;

pub use client::ApiClient;

use async_trait::async_trait;

use crate::calendar::{AccessMode, CalendarWindow, RawEvent};
use crate::core::Result;
use crate::leads::{Lead, NewLead};

#[async_trait]
pub trait LeadStore: Send + Sync {
    /// `POST /clients/`
    async fn create_lead(&self, lead: &NewLead) -> Result<Lead>;
    /// `GET /clients/`, bearer required
    async fn list_leads(&self) -> Result<Vec<Lead>>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// `GET /events/?start=..&end=..`
    async fn list_events(&self, window: &CalendarWindow, mode: AccessMode)
    -> Result<Vec<RawEvent>>;
}

#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// `POST /token`. Failures come back as `Error::Authentication` with a
    /// message fit for the user.
    async fn issue_token(&self, username: &str, password: &str) -> Result<String>;
}
