//! The freelancer's list of submitted leads.

use std::sync::Arc;

use super::models::Lead;
use crate::api::LeadStore;
use crate::core::{Latest, LoadOutcome, LoadStatus};

/// Leads in whatever order the store returns them.
#[derive(Clone)]
pub struct LeadRoster {
    store: Arc<dyn LeadStore>,
    leads: Latest<Lead>,
}

impl LeadRoster {
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        Self {
            store,
            leads: Latest::new(),
        }
    }

    /// Fetch the full list. Failures leave the roster empty.
    pub async fn load(&self) -> LoadOutcome {
        let store = Arc::clone(&self.store);
        self.leads
            .load("leads", async move { store.list_leads().await })
            .await
    }

    pub fn leads(&self) -> Vec<Lead> {
        self.leads.items()
    }

    pub fn count(&self) -> usize {
        self.leads.len()
    }

    pub fn status(&self) -> LoadStatus {
        self.leads.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Error, Result};
    use crate::leads::NewLead;
    use async_trait::async_trait;

    struct FixedStore(Option<Vec<Lead>>);

    #[async_trait]
    impl LeadStore for FixedStore {
        async fn create_lead(&self, _lead: &NewLead) -> Result<Lead> {
            unimplemented!()
        }

        async fn list_leads(&self) -> Result<Vec<Lead>> {
            self.0.clone().ok_or(Error::Status {
                status: 502,
                body: "bad gateway".into(),
            })
        }
    }

    fn lead(id: i64, name: &str) -> Lead {
        Lead {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            notes: None,
            requested_start: None,
            created_at: "2024-05-20T08:15:00Z".parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn it_keeps_store_order() {
        let roster = LeadRoster::new(Arc::new(FixedStore(Some(vec![
            lead(3, "Zed"),
            lead(1, "Amy"),
        ]))));

        assert_eq!(roster.status(), LoadStatus::Idle);
        roster.load().await;

        let ids: Vec<i64> = roster.leads().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(roster.count(), 2);
        assert_eq!(roster.status(), LoadStatus::Ready);
    }

    #[tokio::test]
    async fn it_falls_back_to_empty_on_failure() {
        let roster = LeadRoster::new(Arc::new(FixedStore(None)));
        let outcome = roster.load().await;

        assert!(matches!(outcome, LoadOutcome::Applied(LoadStatus::Failed(_))));
        assert_eq!(roster.count(), 0);
    }
}
