//! Services module - the portal's managers.
//!
//! Each manager owns one collection, loads it from the [`KeyValueStore`] at startup,
//! seeds defaults when it is empty, and after every successful mutation:
//! 1. rewrites the whole collection in the store
//! 2. appends an audit entry through the [`UserDirectory`]
//! 3. emits a [`PortalEvent`] on the shared [`EventBus`]
//!
//! # Components
//!
//! - [`UserDirectory`]: accounts, roles, the admin secret, the session and the action log.
//!   It is a shared handle; the other managers receive a clone at construction.
//! - [`ApplicationRegistry`]: applicant records and their review status.
//! - [`ResourceCatalog`]: uploads, approval and premium download gating.
//! - [`ThemePreference`]: the light/dark display preference. It does not audit and
//!   swallows storage failures.
//!
//! Not-found, unauthorized and protected-account failures leave every collection,
//! the store and the action log untouched. Storage failures propagate as
//! [`StoreError`] wrapped in each manager's error type.
//!
//! [`KeyValueStore`]: crate::storage::KeyValueStore
//! [`StoreError`]: crate::storage::StoreError
//! [`PortalEvent`]: crate::events::PortalEvent
//! [`EventBus`]: crate::events::EventBus

pub mod applications;
pub mod directory;
pub mod resources;
pub mod theme;

pub use applications::{ApplicationRegistry, RegistryError};
pub use directory::{DirectoryError, UserDirectory};
pub use resources::{CatalogError, RefreshHook, ResourceCatalog, UNKNOWN_UPLOADER};
pub use theme::ThemePreference;
