use crate::events::{EventBus, PortalEvent, RemovalReason};
use crate::models::{Resource, ResourceDraft, User, actions};
use crate::services::directory::UserDirectory;
use crate::storage::{SharedStore, StoreError, keys, load_collection, save_collection};
use chrono::Utc;
use thiserror::Error;

/// Uploader recorded when nobody is logged in.
pub const UNKNOWN_UPLOADER: &str = "unknown";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Resource {0} not found")]
    NotFound(u64),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Callback run with the full collection after every catalog mutation.
pub type RefreshHook = Box<dyn FnMut(&[Resource]) + Send>;

/// Downloadable resources and their approval / premium gating.
///
/// Uploads start unapproved. Approval is one-way; a resource only leaves the
/// approved state by being rejected or removed, which both delete it.
pub struct ResourceCatalog {
    resources: Vec<Resource>,
    store: SharedStore,
    directory: UserDirectory,
    events: EventBus,
    refresh: Option<RefreshHook>,
}

impl ResourceCatalog {
    pub fn open(
        store: SharedStore,
        directory: UserDirectory,
        events: EventBus,
    ) -> Result<Self, StoreError> {
        let mut resources: Vec<Resource> = load_collection(store.as_ref(), keys::RESOURCES)?;

        if resources.is_empty() {
            resources = default_resources();
            save_collection(store.as_ref(), keys::RESOURCES, &resources)?;
            tracing::info!("Seeded {} default resources", resources.len());
        } else {
            tracing::debug!("Loaded {} resources", resources.len());
        }

        Ok(Self {
            resources,
            store,
            directory,
            events,
            refresh: None,
        })
    }

    /// Register the callback that keeps a displayed resource list current.
    pub fn with_refresh_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&[Resource]) + Send + 'static,
    {
        self.refresh = Some(Box::new(hook));
        self
    }

    /// Add a new, unapproved resource uploaded by the current session user.
    pub fn submit(&mut self, draft: ResourceDraft) -> Result<Resource, CatalogError> {
        if draft.approved {
            tracing::debug!("Ignoring approved flag on upload of {:?}", draft.title);
        }

        let resource = Resource {
            id: self.next_id(),
            title: draft.title,
            description: draft.description,
            kind: draft.kind,
            category: draft.category,
            is_premium: draft.is_premium,
            download_url: draft.download_url,
            uploaded_by: self
                .directory
                .current_actor()
                .unwrap_or_else(|| UNKNOWN_UPLOADER.to_string()),
            upload_date: Utc::now(),
            approved: false,
        };

        self.resources.push(resource.clone());
        self.persist()?;
        self.directory.log_action(
            actions::RESOURCE_UPLOAD,
            &format!("Resource \"{}\" uploaded", resource.title),
        )?;

        tracing::info!(
            "Resource {} ({}) submitted by {}",
            resource.id,
            resource.title,
            resource.uploaded_by
        );
        self.events.emit(PortalEvent::ResourceSubmitted {
            resource_id: resource.id,
        });
        self.refresh();

        Ok(resource)
    }

    pub fn approve(&mut self, resource_id: u64) -> Result<(), CatalogError> {
        let index = self.index_of(resource_id)?;

        self.resources[index].approved = true;
        self.persist()?;
        self.directory.log_action(
            actions::RESOURCE_APPROVAL,
            &format!("Resource \"{}\" approved", self.resources[index].title),
        )?;

        tracing::info!("Resource {} approved", resource_id);
        self.events
            .emit(PortalEvent::ResourceApproved { resource_id });
        self.refresh();

        Ok(())
    }

    /// Turn down a submission. The resource is deleted outright.
    pub fn reject(&mut self, resource_id: u64) -> Result<Resource, CatalogError> {
        self.delete(resource_id, RemovalReason::Rejected)
    }

    pub fn remove(&mut self, resource_id: u64) -> Result<Resource, CatalogError> {
        self.delete(resource_id, RemovalReason::Deleted)
    }

    pub fn list_approved(&self) -> Vec<&Resource> {
        self.resources.iter().filter(|r| r.approved).collect()
    }

    pub fn list_all(&self) -> &[Resource] {
        &self.resources
    }

    pub fn get_by_id(&self, resource_id: u64) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == resource_id)
    }

    /// Approved free resources are open to everyone; approved premium ones need
    /// an admin or a user holding the premium entitlement.
    pub fn can_download(&self, resource_id: u64, user: Option<&User>) -> bool {
        match self.get_by_id(resource_id) {
            Some(resource) if resource.approved => {
                !resource.is_premium || user.is_some_and(|u| u.is_admin() || u.has_premium)
            }
            _ => false,
        }
    }

    fn delete(
        &mut self,
        resource_id: u64,
        reason: RemovalReason,
    ) -> Result<Resource, CatalogError> {
        let index = self.index_of(resource_id)?;

        let removed = self.resources.remove(index);
        self.persist()?;

        let (action, description) = match reason {
            RemovalReason::Rejected => (
                actions::RESOURCE_REJECTION,
                format!("Resource \"{}\" rejected and removed", removed.title),
            ),
            RemovalReason::Deleted => (
                actions::RESOURCE_DELETION,
                format!("Resource \"{}\" deleted", removed.title),
            ),
        };
        self.directory.log_action(action, &description)?;

        tracing::info!("Resource {} removed ({:?})", resource_id, reason);
        self.events
            .emit(PortalEvent::ResourceRemoved { resource_id, reason });
        self.refresh();

        Ok(removed)
    }

    /// Millisecond timestamp, bumped past the largest existing id when needed.
    fn next_id(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let floor = self
            .resources
            .iter()
            .map(|r| r.id.saturating_add(1))
            .max()
            .unwrap_or(1);
        now.max(floor)
    }

    fn index_of(&self, resource_id: u64) -> Result<usize, CatalogError> {
        self.resources
            .iter()
            .position(|r| r.id == resource_id)
            .ok_or_else(|| {
                tracing::warn!("Resource {} not found", resource_id);
                CatalogError::NotFound(resource_id)
            })
    }

    fn persist(&self) -> Result<(), StoreError> {
        save_collection(self.store.as_ref(), keys::RESOURCES, &self.resources)
    }

    fn refresh(&mut self) {
        if let Some(hook) = self.refresh.as_mut() {
            hook(&self.resources);
        }
    }
}

fn default_resources() -> Vec<Resource> {
    let seeded = [
        (
            1,
            "Introduction to Mental Health",
            "Basic guide to understanding mental health concepts",
            "PDF",
            "Education",
            false,
        ),
        (
            2,
            "Advanced Therapy Techniques",
            "Professional techniques for therapy sessions",
            "Video",
            "Professional",
            true,
        ),
        (
            3,
            "Crisis Intervention Handbook",
            "Emergency response protocols and procedures",
            "PDF",
            "Emergency",
            true,
        ),
    ];

    seeded
        .into_iter()
        .map(|(id, title, description, kind, category, is_premium)| Resource {
            id,
            title: title.to_string(),
            description: description.to_string(),
            kind: kind.to_string(),
            category: category.to_string(),
            is_premium,
            download_url: "#".to_string(),
            uploaded_by: "admin".to_string(),
            upload_date: Utc::now(),
            approved: true,
        })
        .collect()
}
