// Admin Portal - local administration of applications, users and resources
//
// This is the library crate containing the managers, models and persistence.
// The binary crate (main.rs) bootstraps configuration, logging and storage.

pub mod config;
pub mod events;
pub mod logging;
pub mod models;
pub mod portal;
pub mod services;
pub mod storage;

// Re-export commonly used types for convenience
pub use self::config::ConfigManager;
pub use events::{EventBus, PortalEvent, RemovalReason};
pub use models::{
    Application, ApplicationStatus, AuditEntry, PortalConfig, Resource, ResourceDraft, Role,
    Session, Theme, User,
};
pub use portal::Portal;
pub use services::{
    ApplicationRegistry, CatalogError, DirectoryError, RegistryError, ResourceCatalog,
    ThemePreference, UserDirectory,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SharedStore, StoreError};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
