use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Actor recorded when no session is active.
pub const SYSTEM_ACTOR: &str = "system";

/// Action tags written by the portal managers.
pub mod actions {
    pub const LOGIN: &str = "login";
    pub const LOGOUT: &str = "logout";
    pub const ADMIN_ACCESS: &str = "admin_access";
    pub const PASSWORD_CHANGE: &str = "password_change";
    pub const ADMIN_APPOINTMENT: &str = "admin_appointment";
    pub const ADMIN_REMOVAL: &str = "admin_removal";
    pub const USER_DELETION: &str = "user_deletion";
    pub const APPLICATION_UPDATE: &str = "application_update";
    pub const APPLICATION_DELETION: &str = "application_deletion";
    pub const RESOURCE_UPLOAD: &str = "resource_upload";
    pub const RESOURCE_APPROVAL: &str = "resource_approval";
    pub const RESOURCE_REJECTION: &str = "resource_rejection";
    pub const RESOURCE_DELETION: &str = "resource_deletion";
}

/// One immutable line of the `actionLog`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub description: String,
    pub user: String,
}

impl AuditEntry {
    pub fn new(action: &str, description: impl Into<String>, actor: Option<&str>) -> Self {
        Self {
            timestamp: Utc::now(),
            action: action.to_string(),
            description: description.into(),
            user: actor.unwrap_or(SYSTEM_ACTOR).to_string(),
        }
    }
}
