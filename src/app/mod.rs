//! Top-level composition.
//!
//! `App` owns the session, the view router and every component, and wires
//! the refresh signal from the lead form to the listings. Listings reload
//! when their view is entered and whenever the signal fires.

pub mod router;

use std::sync::{Arc, RwLock};

use tokio::task::JoinHandle;

use crate::api::{ApiClient, EventStore, LeadStore, TokenIssuer};
use crate::auth::{Session, login_with_password};
use crate::calendar::{AccessMode, CalendarProjection};
use crate::core::{
    AppConfig, Error, FileStore, LoadStatus, RefreshSignal, Result, SharedStore,
};
use crate::leads::{Lead, LeadForm, LeadRoster, LeadSubmission, SubmissionStatus};
pub use router::{View, ViewEvent, ViewRouter};

pub const SESSION_EXPIRED_NOTICE: &str = "Session expired, please log in again.";

/// Everything the background refresh needs, cheap to clone.
#[derive(Clone)]
struct Views {
    session: Session,
    router: Arc<RwLock<ViewRouter>>,
    notice: Arc<RwLock<Option<String>>>,
    roster: LeadRoster,
    public_calendar: CalendarProjection,
    private_calendar: CalendarProjection,
}

impl Views {
    fn current(&self) -> View {
        self.router.read().unwrap_or_else(|e| e.into_inner()).current()
    }

    fn apply(&self, event: ViewEvent) -> Result<View> {
        self.router
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .apply(event)
    }

    fn set_notice(&self, notice: Option<&str>) {
        *self.notice.write().unwrap_or_else(|e| e.into_inner()) = notice.map(str::to_string);
    }

    /// (Re)load whatever the current view shows.
    async fn refresh(&self) {
        match self.current() {
            View::Public => {
                self.public_calendar.reload().await;
            }
            View::Authenticated => {
                tokio::join!(self.roster.load(), self.private_calendar.reload());
                self.expire_if_rejected().await;
            }
            View::Loading | View::Login => {}
        }
    }

    /// A rejected credential means the token is stale: drop it and fall
    /// back to the public view.
    async fn expire_if_rejected(&self) {
        let rejected = self.roster.status() == LoadStatus::Unauthorized
            || self.private_calendar.status() == LoadStatus::Unauthorized;
        if !rejected || self.current() != View::Authenticated {
            return;
        }

        tracing::warn!("Stored credential was rejected, logging out");
        if let Err(e) = self.session.logout() {
            tracing::error!("Failed to clear persisted token: {}", e);
        }
        if self.apply(ViewEvent::Logout).is_ok() {
            self.set_notice(Some(SESSION_EXPIRED_NOTICE));
            self.public_calendar.reload().await;
        }
    }
}

pub struct App {
    views: Views,
    issuer: Arc<dyn TokenIssuer>,
    refresh: RefreshSignal,
    submission: LeadSubmission,
    login_error: Option<String>,
    listener: Option<JoinHandle<()>>,
}

impl App {
    /// Wire the app against the HTTP backend, persisting the token on disk.
    pub fn from_config(config: &AppConfig) -> Self {
        let storage: SharedStore = Arc::new(FileStore::new(config.storage_file()));
        let session = Session::new(storage);
        let api = Arc::new(ApiClient::new(&config.api_base_url, session.clone()));
        Self::new(session, api)
    }

    pub fn new<B>(session: Session, backend: Arc<B>) -> Self
    where
        B: LeadStore + EventStore + TokenIssuer + 'static,
    {
        let leads: Arc<dyn LeadStore> = backend.clone();
        let events: Arc<dyn EventStore> = backend.clone();
        let issuer: Arc<dyn TokenIssuer> = backend;
        let refresh = RefreshSignal::new();

        Self {
            views: Views {
                session,
                router: Arc::new(RwLock::new(ViewRouter::new())),
                notice: Arc::new(RwLock::new(None)),
                roster: LeadRoster::new(Arc::clone(&leads)),
                public_calendar: CalendarProjection::new(Arc::clone(&events), AccessMode::Public),
                private_calendar: CalendarProjection::new(events, AccessMode::Private),
            },
            issuer,
            submission: LeadSubmission::new(leads, refresh.clone()),
            refresh,
            login_error: None,
            listener: None,
        }
    }

    /// Restore the session, pick the first view, load it and start
    /// listening for refresh signals. Calling it again does nothing.
    pub async fn start(&mut self) -> Result<View> {
        let Some(authenticated) = self.views.session.restore() else {
            return Ok(self.view());
        };
        let view = self.views.apply(ViewEvent::Ready { authenticated })?;
        self.views.refresh().await;
        self.listener = Some(self.spawn_refresh_listener());

        Ok(view)
    }

    /// Every signal starts its own fetch without waiting for or cancelling
    /// the previous one; the listings keep only the newest result.
    fn spawn_refresh_listener(&self) -> JoinHandle<()> {
        let mut rx = self.refresh.subscribe();
        let views = self.views.clone();

        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let views = views.clone();
                tokio::spawn(async move { views.refresh().await });
            }
        })
    }

    pub fn view(&self) -> View {
        self.views.current()
    }

    pub fn session(&self) -> &Session {
        &self.views.session
    }

    pub fn refresh_signal(&self) -> &RefreshSignal {
        &self.refresh
    }

    /// One-off message for the user, e.g. after a stale session was dropped.
    pub fn take_notice(&self) -> Option<String> {
        self.views
            .notice
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }

    pub fn login_error(&self) -> Option<&str> {
        self.login_error.as_deref()
    }

    pub fn roster(&self) -> &LeadRoster {
        &self.views.roster
    }

    /// The calendar the current view shows.
    pub fn calendar(&self) -> &CalendarProjection {
        match self.view() {
            View::Authenticated => &self.views.private_calendar,
            _ => &self.views.public_calendar,
        }
    }

    pub fn form(&self) -> &LeadForm {
        &self.submission.form
    }

    pub fn form_mut(&mut self) -> &mut LeadForm {
        &mut self.submission.form
    }

    pub fn submission_status(&self) -> &SubmissionStatus {
        self.submission.status()
    }

    /// Re-fetch the current view's listings.
    pub async fn refresh(&self) {
        self.views.refresh().await;
    }

    /// Submit the lead form. Only the public view has one.
    pub async fn submit_lead(&mut self) -> Result<Lead> {
        self.require(View::Public, "submit")?;
        self.submission.submit().await
    }

    /// "I am the freelancer"
    pub fn request_login(&mut self) -> Result<View> {
        self.login_error = None;
        self.views.apply(ViewEvent::RequestLogin)
    }

    pub async fn back(&mut self) -> Result<View> {
        let view = self.views.apply(ViewEvent::Back)?;
        self.views.refresh().await;
        Ok(view)
    }

    /// Authenticate from the login view. On failure the view stays on login
    /// and the message is kept in `login_error`.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<View> {
        self.require(View::Login, "login")?;
        self.login_error = None;

        if let Err(e) =
            login_with_password(self.issuer.as_ref(), &self.views.session, username, password)
                .await
        {
            self.login_error = Some(e.to_string());
            return Err(e);
        }

        let view = self.views.apply(ViewEvent::LoginSucceeded)?;
        self.views.refresh().await;
        Ok(view)
    }

    pub async fn logout(&mut self) -> Result<View> {
        self.require(View::Authenticated, "logout")?;
        // The session drops its token even if storage fails, so the view
        // follows it before the error is reported
        let cleared = self.views.session.logout();
        let view = self.views.apply(ViewEvent::Logout)?;
        self.views.refresh().await;
        cleared?;
        Ok(view)
    }

    fn require(&self, view: View, action: &str) -> Result<()> {
        let current = self.view();
        if current != view {
            return Err(Error::InvalidTransition {
                from: current.to_string(),
                event: action.to_string(),
            });
        }
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}
