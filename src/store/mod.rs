//! Client-side state store
//!
//! Holds the auth session, the selected instance and every collection fetched
//! from the backend. The session and the selected instance are written
//! through to a [`StatePersistence`] backend on every change; collections are
//! kept in memory only.
//!
//! A freshly created store is *not hydrated*: views that depend on the
//! selected instance must wait for [`Store::hydrate`] (see [`crate::guard`]).

mod persistence;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::types::{
    Backup, BackupConfiguration, Collaborator, Domain, HelpTicket, Instance, InstanceStatus,
    ResourceUsage, Subscription, SubscriptionPlan, User,
};
use crate::error::StoreResult;

pub use persistence::{FilePersistence, MemoryPersistence, PersistedState, StatePersistence};

/// Bearer token plus the profile it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Snapshot of the instance the instance-scoped views operate on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedInstance {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub status: InstanceStatus,
    #[serde(default)]
    pub usage: ResourceUsage,
}

impl From<&Instance> for SelectedInstance {
    fn from(instance: &Instance) -> Self {
        Self {
            id: instance.id.clone(),
            name: instance.name.clone(),
            version: instance.version.clone(),
            status: instance.status,
            usage: instance.usage.clone(),
        }
    }
}

/// Application-wide client state
pub struct Store {
    persistence: Arc<dyn StatePersistence>,

    /// Set once persisted state has been read (successfully or not)
    hydrated: bool,

    session: Option<AuthSession>,

    selected_instance: Option<SelectedInstance>,

    pub instances: Vec<Instance>,

    /// Collections below belong to the selected instance
    pub backups: Vec<Backup>,
    pub backup_configuration: Option<BackupConfiguration>,
    pub domains: Vec<Domain>,
    pub collaborators: Vec<Collaborator>,

    /// Account-wide collections
    pub subscriptions: Vec<Subscription>,
    pub plans: Vec<SubscriptionPlan>,
    pub tickets: Vec<HelpTicket>,
}

impl Store {
    pub fn new(persistence: Arc<dyn StatePersistence>) -> Self {
        Self {
            persistence,
            hydrated: false,
            session: None,
            selected_instance: None,
            instances: Vec::new(),
            backups: Vec::new(),
            backup_configuration: None,
            domains: Vec::new(),
            collaborators: Vec::new(),
            subscriptions: Vec::new(),
            plans: Vec::new(),
            tickets: Vec::new(),
        }
    }

    /// Store backed by a JSON file
    pub fn with_file(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Arc::new(FilePersistence::new(path)))
    }

    /// Load persisted state.
    ///
    /// The store counts as hydrated afterwards even when loading fails, so
    /// gated views fall through to their redirect instead of waiting forever.
    pub async fn hydrate(&mut self) -> StoreResult<()> {
        let result = self.persistence.load().await;
        self.hydrated = true;

        match result {
            Ok(Some(state)) => {
                debug!(
                    "hydrated store (session: {}, instance: {:?})",
                    state.session.is_some(),
                    state.selected_instance.as_ref().map(|i| &i.id)
                );
                self.session = state.session;
                self.selected_instance = state.selected_instance;
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => {
                warn!("failed to load persisted state: {err}");
                Err(err)
            }
        }
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn selected_instance(&self) -> Option<&SelectedInstance> {
        self.selected_instance.as_ref()
    }

    /// Store a fresh session
    pub async fn login(&mut self, session: AuthSession) -> StoreResult<()> {
        self.session = Some(session);
        self.persist().await
    }

    /// Drop the session, the selection and every fetched collection
    pub async fn logout(&mut self) -> StoreResult<()> {
        self.session = None;
        self.selected_instance = None;
        self.instances.clear();
        self.subscriptions.clear();
        self.plans.clear();
        self.tickets.clear();
        self.clear_instance_scoped();

        self.persistence.clear().await
    }

    /// Make `instance` the target of instance-scoped views
    pub async fn select_instance(&mut self, instance: &Instance) -> StoreResult<()> {
        let changed = self
            .selected_instance
            .as_ref()
            .is_none_or(|current| current.id != instance.id);

        if changed {
            self.clear_instance_scoped();
        }

        self.selected_instance = Some(SelectedInstance::from(instance));
        self.persist().await
    }

    pub async fn clear_selected_instance(&mut self) -> StoreResult<()> {
        if self.selected_instance.take().is_some() {
            self.clear_instance_scoped();
            self.persist().await?;
        }
        Ok(())
    }

    /// Forget a deleted instance, clearing the selection if it was selected
    pub async fn instance_deleted(&mut self, instance_id: &str) -> StoreResult<()> {
        self.instances.retain(|instance| instance.id != instance_id);

        let was_selected = self
            .selected_instance
            .as_ref()
            .is_some_and(|selected| selected.id == instance_id);

        if was_selected {
            self.clear_selected_instance().await?;
        }

        Ok(())
    }

    /// Replace the instance list, refreshing the selected snapshot from it
    pub async fn set_instances(&mut self, instances: Vec<Instance>) -> StoreResult<()> {
        self.instances = instances;

        let refreshed = self.selected_instance.as_ref().and_then(|selected| {
            self.instances
                .iter()
                .find(|instance| instance.id == selected.id)
                .map(SelectedInstance::from)
        });

        match refreshed {
            Some(snapshot) if Some(&snapshot) != self.selected_instance.as_ref() => {
                self.selected_instance = Some(snapshot);
                self.persist().await
            }
            _ => Ok(()),
        }
    }

    fn clear_instance_scoped(&mut self) {
        self.backups.clear();
        self.backup_configuration = None;
        self.domains.clear();
        self.collaborators.clear();
    }

    async fn persist(&self) -> StoreResult<()> {
        let state = PersistedState {
            session: self.session.clone(),
            selected_instance: self.selected_instance.clone(),
        };
        self.persistence.save(&state).await
    }
}
