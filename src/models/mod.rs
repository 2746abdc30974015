//! Data models for the admin portal.
//!
//! - [`User`], [`Role`] and [`Session`]: accounts and the authenticated context
//! - [`Application`]: applicant records and their review status
//! - [`Resource`] and [`ResourceDraft`]: downloadable material and upload input
//! - [`AuditEntry`]: one line of the append-only action log
//! - [`Theme`]: the persisted display preference
//! - [`PortalConfig`]: settings loaded by [`ConfigManager`](crate::config::ConfigManager)
//!
//! Every persisted struct derives `Serialize`/`Deserialize` with camelCase field
//! names so the stored JSON matches the layout the portal has always used.

pub mod application;
pub mod audit;
pub mod config;
pub mod resource;
pub mod theme;
pub mod user;

pub use application::{Application, ApplicationStatus, Priority};
pub use audit::{AuditEntry, SYSTEM_ACTOR, actions};
pub use self::config::{
    EventSettings, LoggingSettings, PortalConfig, SecuritySettings, StorageSettings,
    ThemeSettings,
};
pub use resource::{Resource, ResourceDraft};
pub use theme::{Theme, UnknownTheme};
pub use user::{Role, Session, User};
