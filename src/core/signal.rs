//! Cross-component coordination.
//!
//! `RefreshSignal` is the one-way counter lead submission bumps so the
//! listings know to re-fetch. `Sequencer` tags each fetch at dispatch so a
//! slow, superseded response can't overwrite a newer one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

#[derive(Clone, Debug)]
pub struct RefreshSignal {
    tx: Arc<watch::Sender<u64>>,
}

impl Default for RefreshSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Raise the signal. Returns the new counter value.
    pub fn notify(&self) -> u64 {
        let mut value = 0;
        self.tx.send_modify(|count| {
            *count += 1;
            value = *count;
        });
        value
    }

    pub fn count(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Listeners only observe bumps raised after they subscribed.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}

/// Monotonic ticket issued to each fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct Sequencer {
    issued: AtomicU64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True only for the most recently issued ticket.
    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_counts_notifications() {
        let signal = RefreshSignal::new();
        assert_eq!(signal.count(), 0);
        assert_eq!(signal.notify(), 1);
        assert_eq!(signal.notify(), 2);
        assert_eq!(signal.count(), 2);
    }

    #[tokio::test]
    async fn it_wakes_subscribers() {
        let signal = RefreshSignal::new();
        let mut rx = signal.subscribe();

        let clone = signal.clone();
        clone.notify();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
    }

    #[test]
    fn only_the_last_ticket_is_latest() {
        let seq = Sequencer::new();
        let first = seq.issue();
        assert!(seq.is_latest(first));

        let second = seq.issue();
        assert!(second > first);
        assert!(!seq.is_latest(first));
        assert!(seq.is_latest(second));
    }
}
