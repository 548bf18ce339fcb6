use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};

use super::public::{ErrorDetail, TokenResponse};
use super::{EventStore, LeadStore, TokenIssuer};
use crate::auth::Session;
use crate::calendar::{AccessMode, CalendarWindow, RawEvent};
use crate::core::error::LOGIN_FAILED_MESSAGE;
use crate::core::{Error, Result};
use crate::leads::{Lead, NewLead};

/// HTTP client for the lead/event backend.
///
/// Reads the bearer credential from the injected `Session` on every call, so
/// logging in or out is picked up without rebuilding the client. No
/// timeouts are configured beyond reqwest's defaults.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach the credential if there is one.
    fn with_optional_auth(&self, req: RequestBuilder) -> (RequestBuilder, bool) {
        match self.session.bearer() {
            Some(bearer) => (req.header(reqwest::header::AUTHORIZATION, bearer), true),
            None => (req, false),
        }
    }

    /// Attach the credential or refuse to send.
    fn with_required_auth(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        let bearer = self.session.bearer().ok_or(Error::NotAuthenticated)?;
        Ok(req.header(reqwest::header::AUTHORIZATION, bearer))
    }
}

/// Turn non-2xx responses into errors. A 401/403 only counts as a rejected
/// credential when one was actually sent.
async fn check(resp: Response, authenticated: bool) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if authenticated && matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(Error::Unauthorized);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl LeadStore for ApiClient {
    async fn create_lead(&self, lead: &NewLead) -> Result<Lead> {
        let req = self.http.post(self.url("/clients/")).json(lead);
        let (req, authenticated) = self.with_optional_auth(req);
        let resp = check(req.send().await?, authenticated).await?;
        Ok(resp.json().await?)
    }

    async fn list_leads(&self) -> Result<Vec<Lead>> {
        let req = self.with_required_auth(self.http.get(self.url("/clients/")))?;
        let resp = check(req.send().await?, true).await?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl EventStore for ApiClient {
    async fn list_events(
        &self,
        window: &CalendarWindow,
        mode: AccessMode,
    ) -> Result<Vec<RawEvent>> {
        let req = self.http.get(self.url("/events/")).query(&window.query());
        let (req, authenticated) = match mode {
            AccessMode::Public => (req, false),
            AccessMode::Private => (self.with_required_auth(req)?, true),
        };
        let resp = check(req.send().await?, authenticated).await?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl TokenIssuer for ApiClient {
    async fn issue_token(&self, username: &str, password: &str) -> Result<String> {
        let resp = self
            .http
            .post(self.url("/token"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Login request failed: {}", e);
                Error::Authentication(LOGIN_FAILED_MESSAGE.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.json::<ErrorDetail>().await.ok();
            let message = detail
                .as_ref()
                .and_then(|d| d.message())
                .unwrap_or(LOGIN_FAILED_MESSAGE);
            tracing::warn!(status = status.as_u16(), "Login rejected: {}", message);
            return Err(Error::Authentication(message.to_string()));
        }

        let token: TokenResponse = resp.json().await.map_err(|e| {
            tracing::error!("Unexpected token response: {}", e);
            Error::Authentication(LOGIN_FAILED_MESSAGE.to_string())
        })?;

        Ok(token.access_token)
    }
}
