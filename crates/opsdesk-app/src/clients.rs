//! Client roster: CRUD plus the list-view aggregates.

use std::collections::HashMap;
use std::sync::Arc;

use opsdesk_core::{Client, ClientId, ClientPatch, ClientStatus, NewClient, Task};
use time::Date;

use crate::background::{self, WriteFailureHook};
use crate::session::Session;
use crate::store::{ClientStore, StoreError};

/// Open and overdue task tallies for one client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientTaskCounts {
    /// Pending tasks for the client.
    pub open: usize,
    /// Pending tasks already past their due date.
    pub overdue: usize,
}

/// Per-client pending and overdue tallies, keyed by client id.
///
/// Takes the task snapshot as a slice so the caller decides which
/// manager's view feeds the roster.
#[must_use]
pub fn task_counts(tasks: &[Task], today: Date) -> HashMap<ClientId, ClientTaskCounts> {
    let mut counts: HashMap<ClientId, ClientTaskCounts> = HashMap::new();
    for task in tasks.iter().filter(|t| t.is_pending()) {
        let entry = counts.entry(task.client_id).or_default();
        entry.open += 1;
        if task.is_overdue(today) {
            entry.overdue += 1;
        }
    }
    counts
}

/// Owner of the in-memory client snapshot for one session.
pub struct ClientManager<S> {
    store: Arc<S>,
    session: Session,
    clients: Vec<Client>,
    on_write_failure: WriteFailureHook,
}

impl<S: ClientStore + 'static> ClientManager<S> {
    /// Fetch the session's clients and build a manager around them.
    ///
    /// # Errors
    /// Fails when the initial list cannot be fetched.
    pub async fn load(store: Arc<S>, session: Session) -> Result<Self, StoreError> {
        let clients = store.list_clients(session.user).await?;
        Ok(Self {
            store,
            session,
            clients,
            on_write_failure: background::log_failures(),
        })
    }

    /// Replace the default write-failure hook.
    #[must_use]
    pub fn with_write_failure_hook(mut self, hook: WriteFailureHook) -> Self {
        self.on_write_failure = hook;
        self
    }

    /// The current snapshot, in the order received from the store.
    #[must_use]
    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    /// Look up one client by id.
    #[must_use]
    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Discard local state and re-fetch the authoritative snapshot.
    ///
    /// # Errors
    /// Fails when the list cannot be fetched; local state is kept.
    pub async fn reload(&mut self) -> Result<(), StoreError> {
        self.clients = self.store.list_clients(self.session.user).await?;
        Ok(())
    }

    /// Create a client. Waits for the store because the id and creation
    /// timestamp are generated there.
    ///
    /// # Errors
    /// Surfaces insert failures with no local change.
    pub async fn add(&mut self, new: NewClient) -> Result<Client, StoreError> {
        let client = self.store.insert_client(self.session.user, new).await?;
        self.clients.push(client.clone());
        Ok(client)
    }

    /// Apply a patch locally and persist it in the background. Unknown
    /// ids are a silent no-op.
    pub fn update(&mut self, id: ClientId, patch: ClientPatch) {
        let Some(client) = self.clients.iter_mut().find(|c| c.id == id) else {
            return;
        };
        client.apply(&patch);
        let store = Arc::clone(&self.store);
        let user = self.session.user;
        background::spawn_write(&self.on_write_failure, "clients.update", async move {
            store.update_client(user, id, patch).await
        });
    }

    /// Remove a client locally and delete it in the background. The
    /// store cascades to the client's projects and tasks; other
    /// managers pick that up on their next reload.
    pub fn delete(&mut self, id: ClientId) {
        let before = self.clients.len();
        self.clients.retain(|c| c.id != id);
        if self.clients.len() == before {
            return;
        }
        let store = Arc::clone(&self.store);
        let user = self.session.user;
        background::spawn_write(&self.on_write_failure, "clients.delete", async move {
            store.delete_client(user, id).await
        });
    }

    /// How many clients are currently active.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.clients
            .iter()
            .filter(|c| c.status == ClientStatus::Active)
            .count()
    }

    /// Summed monthly revenue across active clients.
    #[must_use]
    pub fn monthly_revenue(&self) -> f64 {
        self.clients
            .iter()
            .filter(|c| c.status == ClientStatus::Active)
            .map(|c| c.monthly_revenue)
            .sum()
    }
}
