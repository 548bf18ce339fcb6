//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::sync::Notify;

use leadbook::api::{ApiClient, EventStore, LeadStore, TokenIssuer};
use leadbook::app::App;
use leadbook::auth::Session;
use leadbook::calendar::{AccessMode, CalendarWindow, EventId, RawEvent};
use leadbook::core::{
    Error, FileStore, KeyValueStore, MemoryStore, Result, SharedStore, TOKEN_STORAGE_KEY,
};
use leadbook::leads::{Lead, NewLead};

/// Token storage backed by a file in a fresh temporary directory. Keep the
/// `TempDir` alive for as long as the store is used.
pub fn test_storage() -> (TempDir, SharedStore) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store: SharedStore = Arc::new(FileStore::new(dir.path().join("storage.json")));
    (dir, store)
}

/// Same as `test_storage` with a token already persisted.
pub fn test_storage_with_token(token: &str) -> (TempDir, SharedStore) {
    let (dir, store) = test_storage();
    store
        .set(TOKEN_STORAGE_KEY, token)
        .expect("Failed to seed token");
    (dir, store)
}

/// An app talking HTTP to `base_url`.
pub fn test_app(base_url: &str, storage: SharedStore) -> App {
    let session = Session::new(storage);
    let api = Arc::new(ApiClient::new(base_url, session.clone()));
    App::new(session, api)
}

pub fn lead_json(id: i64, name: &str, email: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": email,
        "phone": "",
        "notes": "",
        "created_at": "2024-05-20T08:15:00"
    })
}

pub fn event_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "start": "2024-06-03T09:00:00",
        "end": "2024-06-03T10:00:00"
    })
}

/// Poll `check` until it holds, panicking after a few seconds.
pub async fn wait_until(mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "Timed out waiting for condition"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// In-memory storage whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    pub failing: AtomicBool,
}

impl FlakyStore {
    pub fn with_token(token: &str) -> Self {
        let store = Self::default();
        store
            .inner
            .set(TOKEN_STORAGE_KEY, token)
            .expect("Failed to seed token");
        store
    }

    pub fn fail_writes(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Storage(std::io::Error::other("disk full")));
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check()?;
        self.inner.remove(key)
    }
}

/// In-process backend that counts event fetches. The fetch numbered
/// `gated_call` (if any) blocks until `release` is called and then answers
/// with a "stale" event.
#[derive(Default)]
pub struct FakeBackend {
    pub event_calls: AtomicUsize,
    pub finished_event_calls: AtomicUsize,
    pub gated_call: Option<usize>,
    gate: Notify,
}

impl FakeBackend {
    pub fn gated(call: usize) -> Self {
        Self {
            gated_call: Some(call),
            ..Default::default()
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn event_calls(&self) -> usize {
        self.event_calls.load(Ordering::SeqCst)
    }

    pub fn finished_event_calls(&self) -> usize {
        self.finished_event_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LeadStore for FakeBackend {
    async fn create_lead(&self, lead: &NewLead) -> Result<Lead> {
        Ok(Lead {
            id: 1,
            name: lead.name.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            notes: lead.notes.clone(),
            requested_start: lead.requested_start,
            created_at: "2024-05-20T08:15:00Z".parse().expect("valid timestamp"),
        })
    }

    async fn list_leads(&self) -> Result<Vec<Lead>> {
        Ok(vec![])
    }
}

#[async_trait]
impl EventStore for FakeBackend {
    async fn list_events(
        &self,
        _window: &CalendarWindow,
        _mode: AccessMode,
    ) -> Result<Vec<RawEvent>> {
        let call = self.event_calls.fetch_add(1, Ordering::SeqCst);
        let title = if Some(call) == self.gated_call {
            self.gate.notified().await;
            "stale".to_string()
        } else {
            format!("call {}", call)
        };
        self.finished_event_calls.fetch_add(1, Ordering::SeqCst);

        Ok(vec![RawEvent {
            id: EventId::Int(call as i64),
            title,
            start: "2024-06-03T09:00:00".to_string(),
            end: None,
            client_id: None,
            all_day: None,
        }])
    }
}

#[async_trait]
impl TokenIssuer for FakeBackend {
    async fn issue_token(&self, _username: &str, _password: &str) -> Result<String> {
        Ok("fake-token".to_string())
    }
}
