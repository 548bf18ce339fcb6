//! Listing state that only accepts the newest fetch.

use std::future::Future;
use std::sync::{Arc, RwLock};

use super::error::{Error, Result};
use super::signal::Sequencer;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    /// Never loaded
    #[default]
    Idle,
    Loading,
    Ready,
    /// The fetch failed and the listing fell back to empty.
    Failed(String),
    /// Same as `Failed` but the server rejected the credential.
    Unauthorized,
}

impl LoadStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, LoadStatus::Failed(_) | LoadStatus::Unauthorized)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied(LoadStatus),
    /// A newer fetch was dispatched meanwhile, this result was dropped.
    Superseded,
}

#[derive(Debug)]
struct Snapshot<T> {
    items: Vec<T>,
    status: LoadStatus,
}

/// Shared, cloneable holder for a fetched list.
#[derive(Debug)]
pub struct Latest<T> {
    seq: Arc<Sequencer>,
    snapshot: Arc<RwLock<Snapshot<T>>>,
}

impl<T> Clone for Latest<T> {
    fn clone(&self) -> Self {
        Self {
            seq: Arc::clone(&self.seq),
            snapshot: Arc::clone(&self.snapshot),
        }
    }
}

impl<T> Default for Latest<T> {
    fn default() -> Self {
        Self {
            seq: Arc::new(Sequencer::new()),
            snapshot: Arc::new(RwLock::new(Snapshot {
                items: Vec::new(),
                status: LoadStatus::Idle,
            })),
        }
    }
}

impl<T: Clone> Latest<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> Vec<T> {
        self.read().items.clone()
    }

    pub fn len(&self) -> usize {
        self.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().items.is_empty()
    }

    pub fn status(&self) -> LoadStatus {
        self.read().status.clone()
    }

    /// Run `fetch` and store its result unless a later fetch was issued
    /// while it was in flight. Errors are logged and fail open to an empty
    /// list.
    pub async fn load<F>(&self, what: &str, fetch: F) -> LoadOutcome
    where
        F: Future<Output = Result<Vec<T>>>,
    {
        let ticket = self.seq.issue();
        self.write().status = LoadStatus::Loading;

        let result = fetch.await;

        let mut snapshot = self.write();
        if !self.seq.is_latest(ticket) {
            tracing::debug!(ticket = ticket.value(), "Discarding superseded {} result", what);
            return LoadOutcome::Superseded;
        }

        let status = match result {
            Ok(items) => {
                tracing::debug!(count = items.len(), "Loaded {}", what);
                snapshot.items = items;
                LoadStatus::Ready
            }
            Err(Error::Unauthorized) => {
                tracing::error!("Failed to load {}: credential rejected", what);
                snapshot.items.clear();
                LoadStatus::Unauthorized
            }
            Err(e) => {
                tracing::error!("Failed to load {}: {}", what, e);
                snapshot.items.clear();
                LoadStatus::Failed(e.to_string())
            }
        };
        snapshot.status = status.clone();

        LoadOutcome::Applied(status)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Snapshot<T>> {
        self.snapshot.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Snapshot<T>> {
        self.snapshot.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn it_stores_successful_results() {
        let latest = Latest::new();
        let outcome = latest.load("numbers", async { Ok::<_, Error>(vec![1, 2, 3]) }).await;

        assert_eq!(outcome, LoadOutcome::Applied(LoadStatus::Ready));
        assert_eq!(latest.items(), vec![1, 2, 3]);
        assert_eq!(latest.len(), 3);
    }

    #[tokio::test]
    async fn it_fails_open_to_empty() {
        let latest = Latest::new();
        latest.load("numbers", async { Ok::<_, Error>(vec![1]) }).await;

        let outcome = latest
            .load("numbers", async {
                Err::<Vec<i32>, _>(Error::Status {
                    status: 500,
                    body: "boom".into(),
                })
            })
            .await;

        assert!(matches!(outcome, LoadOutcome::Applied(LoadStatus::Failed(_))));
        assert!(latest.is_empty());
        assert!(latest.status().is_failed());
    }

    #[tokio::test]
    async fn it_flags_rejected_credentials() {
        let latest: Latest<i32> = Latest::new();
        let outcome = latest
            .load("numbers", async { Err::<Vec<i32>, _>(Error::Unauthorized) })
            .await;
        assert_eq!(outcome, LoadOutcome::Applied(LoadStatus::Unauthorized));
    }

    #[tokio::test]
    async fn a_slow_earlier_fetch_cannot_overwrite_a_newer_one() {
        let latest = Latest::new();
        let (slow_tx, slow_rx) = oneshot::channel::<Vec<i32>>();

        let first = {
            let latest = latest.clone();
            tokio::spawn(async move {
                latest
                    .load("numbers", async move { Ok::<_, Error>(slow_rx.await.unwrap()) })
                    .await
            })
        };
        // Let the first fetch get its ticket
        tokio::task::yield_now().await;
        while latest.status() != LoadStatus::Loading {
            tokio::task::yield_now().await;
        }

        let second = latest.load("numbers", async { Ok::<_, Error>(vec![2]) }).await;
        assert_eq!(second, LoadOutcome::Applied(LoadStatus::Ready));

        slow_tx.send(vec![1]).unwrap();
        assert_eq!(first.await.unwrap(), LoadOutcome::Superseded);
        assert_eq!(latest.items(), vec![2]);
    }
}
