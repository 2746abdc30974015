use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Access level of a portal account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A portal account as persisted under the `users` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created: DateTime<Utc>,

    /// Grants access to premium resources without the admin role.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_premium: bool,
}

impl User {
    pub fn new(id: u64, username: &str, email: &str, role: Role) -> Self {
        Self {
            id,
            username: username.to_string(),
            email: email.to_string(),
            role,
            created: Utc::now(),
            has_premium: false,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// The authenticated user context held by the directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub is_admin: bool,
}

impl Session {
    pub fn for_user(user: User) -> Self {
        let is_admin = user.is_admin();
        Self { user, is_admin }
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }
}
