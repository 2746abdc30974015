//! Composition root wiring the managers together.
//!
//! The directory is opened first; the registry and catalog receive a clone of it,
//! so the dependency only runs one way. All managers share one store and one
//! event bus.

use crate::events::EventBus;
use crate::models::PortalConfig;
use crate::services::{ApplicationRegistry, ResourceCatalog, ThemePreference, UserDirectory};
use crate::storage::SharedStore;
use anyhow::{Context, Result};

pub struct Portal {
    pub directory: UserDirectory,
    pub applications: ApplicationRegistry,
    pub resources: ResourceCatalog,
    pub theme: ThemePreference,
    events: EventBus,
}

impl Portal {
    /// Load every manager from `store`, seeding defaults where collections are empty.
    pub fn open(store: SharedStore, config: &PortalConfig) -> Result<Self> {
        let events = EventBus::new(config.events.capacity);

        let directory = UserDirectory::open(store.clone(), events.clone(), &config.security)
            .context("Failed to load user directory")?;
        let applications =
            ApplicationRegistry::open(store.clone(), directory.clone(), events.clone())
                .context("Failed to load applications")?;
        let resources = ResourceCatalog::open(store.clone(), directory.clone(), events.clone())
            .context("Failed to load resources")?;
        let theme = ThemePreference::new(store, events.clone(), config.theme.prefers_dark);

        tracing::info!(
            "Portal ready: {} users, {} applications, {} resources, theme={}",
            directory.users().len(),
            applications.list().len(),
            resources.list_all().len(),
            theme.current()
        );

        Ok(Self {
            directory,
            applications,
            resources,
            theme,
            events,
        })
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }
}
