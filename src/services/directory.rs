//! User directory: accounts, roles, the admin secret, the session and the action log.
//!
//! [`UserDirectory`] is a cheap-to-clone handle. The application registry and the
//! resource catalog each hold a clone so they can resolve the acting user and append
//! to the shared audit trail.
//!
//! # Examples
//!
//! ```ignore
//! let store: SharedStore = Arc::new(MemoryStore::new());
//! let directory = UserDirectory::open(store, EventBus::default(), &SecuritySettings::default())?;
//!
//! directory.authenticate("admin", "")?;
//! directory.promote(3)?;
//! assert_eq!(directory.action_log().len(), 2);
//! ```

use crate::events::{EventBus, PortalEvent};
use crate::models::{AuditEntry, Role, SecuritySettings, Session, User, actions};
use crate::storage::{
    SharedStore, StoreError, keys, load_collection, load_value, save_collection, save_value,
};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("No user named {0}")]
    UnknownUser(String),

    #[error("Admin secret does not match")]
    InvalidSecret,

    #[error("Operation requires an admin session")]
    NotAuthorized,

    #[error("User {0} not found")]
    UserNotFound(u64),

    #[error("Account {0} is protected")]
    ProtectedAccount(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

#[derive(Debug)]
struct DirectoryState {
    users: Vec<User>,
    admins: Vec<String>,
    action_log: Vec<AuditEntry>,
    admin_secret: String,
    session: Option<Session>,
}

impl DirectoryState {
    fn actor(&self) -> Option<&str> {
        self.session.as_ref().map(Session::username)
    }

    fn is_admin(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_admin)
    }
}

/// Shared handle to the user directory.
#[derive(Clone)]
pub struct UserDirectory {
    state: Arc<RwLock<DirectoryState>>,
    store: SharedStore,
    events: EventBus,
    bootstrap_admin: Arc<str>,
}

impl UserDirectory {
    /// Load the directory from `store`, seeding the default accounts when no users exist.
    pub fn open(
        store: SharedStore,
        events: EventBus,
        security: &SecuritySettings,
    ) -> Result<Self, StoreError> {
        let admin_secret = store
            .get(keys::ADMIN_PASSWORD)?
            .unwrap_or_else(|| security.default_admin_secret.clone());
        let mut users: Vec<User> = load_collection(store.as_ref(), keys::USERS)?;
        let admins: Vec<String> = load_value(store.as_ref(), keys::ADMINS)?
            .unwrap_or_else(|| vec![security.bootstrap_admin.clone()]);
        let action_log: Vec<AuditEntry> = load_collection(store.as_ref(), keys::ACTION_LOG)?;

        if users.is_empty() {
            users = default_users(&security.bootstrap_admin);
            save_collection(store.as_ref(), keys::USERS, &users)?;
            tracing::info!("Seeded {} default users", users.len());
        } else {
            tracing::debug!(
                "Loaded {} users and {} audit entries",
                users.len(),
                action_log.len()
            );
        }

        Ok(Self {
            state: Arc::new(RwLock::new(DirectoryState {
                users,
                admins,
                action_log,
                admin_secret,
                session: None,
            })),
            store,
            events,
            bootstrap_admin: Arc::from(security.bootstrap_admin.as_str()),
        })
    }

    /// Start a session for `username`.
    ///
    /// The password is accepted but not checked: any known username logs in.
    pub fn authenticate(&self, username: &str, _password: &str) -> Result<Session, DirectoryError> {
        let mut state = self.write();

        let Some(user) = state.users.iter().find(|u| u.username == username).cloned() else {
            tracing::warn!("Login rejected for unknown user {}", username);
            return Err(DirectoryError::UnknownUser(username.to_string()));
        };

        let session = Session::for_user(user);
        state.session = Some(session.clone());
        save_value(self.store.as_ref(), keys::CURRENT_USER, &session.user)?;
        self.append(
            &mut state,
            actions::LOGIN,
            format!("User {} logged in", username),
        )?;

        tracing::info!("User {} logged in (admin={})", username, session.is_admin);
        self.events.emit(PortalEvent::SessionStarted {
            username: username.to_string(),
            is_admin: session.is_admin,
        });

        Ok(session)
    }

    /// Check `candidate` against the stored admin secret.
    pub fn verify_admin_secret(&self, candidate: &str) -> Result<(), DirectoryError> {
        let mut state = self.write();

        if candidate != state.admin_secret {
            tracing::warn!("Admin secret check failed");
            return Err(DirectoryError::InvalidSecret);
        }

        let description = format!("Admin panel accessed by {}", actor_name(&state));
        self.append(&mut state, actions::ADMIN_ACCESS, description)?;
        Ok(())
    }

    pub fn change_admin_secret(&self, new_secret: &str) -> Result<(), DirectoryError> {
        let mut state = self.write();
        self.require_admin(&state, "change the admin secret")?;

        state.admin_secret = new_secret.to_string();
        self.store.set(keys::ADMIN_PASSWORD, new_secret)?;

        let description = format!("Admin password changed by {}", actor_name(&state));
        self.append(&mut state, actions::PASSWORD_CHANGE, description)?;

        tracing::info!("Admin secret changed");
        self.events.emit(PortalEvent::AdminSecretChanged);
        Ok(())
    }

    /// Grant the admin role to a user.
    pub fn promote(&self, user_id: u64) -> Result<(), DirectoryError> {
        let mut state = self.write();
        self.require_admin(&state, "promote users")?;

        let index = Self::index_of(&state, user_id)?;
        state.users[index].role = Role::Admin;
        save_collection(self.store.as_ref(), keys::USERS, &state.users)?;

        let description = format!(
            "User {} appointed as admin by {}",
            state.users[index].username,
            actor_name(&state)
        );
        self.append(&mut state, actions::ADMIN_APPOINTMENT, description)?;

        tracing::info!("User {} promoted to admin", user_id);
        self.events.emit(PortalEvent::UserRoleChanged {
            user_id,
            role: Role::Admin,
        });
        Ok(())
    }

    /// Revoke the admin role. The bootstrap admin keeps it.
    pub fn demote(&self, user_id: u64) -> Result<(), DirectoryError> {
        let mut state = self.write();
        self.require_admin(&state, "demote users")?;

        let index = Self::index_of(&state, user_id)?;
        self.reject_protected(&state.users[index])?;

        state.users[index].role = Role::User;
        save_collection(self.store.as_ref(), keys::USERS, &state.users)?;

        let description = format!(
            "User {} removed from admin by {}",
            state.users[index].username,
            actor_name(&state)
        );
        self.append(&mut state, actions::ADMIN_REMOVAL, description)?;

        tracing::info!("User {} demoted", user_id);
        self.events.emit(PortalEvent::UserRoleChanged {
            user_id,
            role: Role::User,
        });
        Ok(())
    }

    /// Remove a user. The bootstrap admin cannot be deleted.
    pub fn delete_user(&self, user_id: u64) -> Result<User, DirectoryError> {
        let mut state = self.write();
        self.require_admin(&state, "delete users")?;

        let index = Self::index_of(&state, user_id)?;
        self.reject_protected(&state.users[index])?;

        let removed = state.users.remove(index);
        save_collection(self.store.as_ref(), keys::USERS, &state.users)?;

        let description = format!("User {} deleted by {}", removed.username, actor_name(&state));
        self.append(&mut state, actions::USER_DELETION, description)?;

        tracing::info!("User {} ({}) deleted", user_id, removed.username);
        self.events.emit(PortalEvent::UserDeleted { user_id });
        Ok(removed)
    }

    /// Append an entry to the action log, stamped with the session user or `system`.
    ///
    /// Only a storage failure can make this return an error.
    pub fn log_action(&self, action: &str, description: &str) -> Result<AuditEntry, StoreError> {
        let mut state = self.write();
        self.append(&mut state, action, description.to_string())
    }

    /// Log the logout and clear the session, including its persisted copy.
    pub fn end_session(&self) -> Result<(), StoreError> {
        let mut state = self.write();

        let username = state.actor().map(str::to_string);
        let description = format!("User {} logged out", actor_name(&state));
        self.append(&mut state, actions::LOGOUT, description)?;

        state.session = None;
        self.store.remove(keys::CURRENT_USER)?;

        tracing::info!("Session ended");
        self.events.emit(PortalEvent::SessionEnded { username });
        Ok(())
    }

    /// The active session, restored from storage on first access if needed.
    pub fn current_session(&self) -> Result<Option<Session>, StoreError> {
        let mut state = self.write();

        if state.session.is_none() {
            if let Some(user) = load_value::<User>(self.store.as_ref(), keys::CURRENT_USER)? {
                tracing::debug!("Restored session for {}", user.username);
                state.session = Some(Session::for_user(user));
            }
        }

        Ok(state.session.clone())
    }

    /// The in-memory session, without consulting storage.
    pub fn session(&self) -> Option<Session> {
        self.read().session.clone()
    }

    pub fn is_admin(&self) -> bool {
        self.read().is_admin()
    }

    /// Username to stamp on records created by the current session.
    pub fn current_actor(&self) -> Option<String> {
        self.read().actor().map(str::to_string)
    }

    pub fn users(&self) -> Vec<User> {
        self.read().users.clone()
    }

    pub fn user_by_id(&self, user_id: u64) -> Option<User> {
        self.read().users.iter().find(|u| u.id == user_id).cloned()
    }

    pub fn user_by_name(&self, username: &str) -> Option<User> {
        self.read()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    pub fn action_log(&self) -> Vec<AuditEntry> {
        self.read().action_log.clone()
    }

    /// Contents of the legacy `admins` key. Role checks use [`User::role`] instead.
    pub fn admin_usernames(&self) -> Vec<String> {
        self.read().admins.clone()
    }

    pub fn bootstrap_admin(&self) -> &str {
        &self.bootstrap_admin
    }

    fn append(
        &self,
        state: &mut DirectoryState,
        action: &str,
        description: String,
    ) -> Result<AuditEntry, StoreError> {
        let entry = AuditEntry::new(action, description, state.actor());
        state.action_log.push(entry.clone());
        save_collection(self.store.as_ref(), keys::ACTION_LOG, &state.action_log)?;

        tracing::debug!("Audit [{}] {} ({})", entry.action, entry.description, entry.user);
        self.events.emit(PortalEvent::AuditAppended {
            action: entry.action.clone(),
        });
        Ok(entry)
    }

    fn require_admin(&self, state: &DirectoryState, what: &str) -> Result<(), DirectoryError> {
        if state.is_admin() {
            Ok(())
        } else {
            tracing::warn!("Refused: non-admin session tried to {}", what);
            Err(DirectoryError::NotAuthorized)
        }
    }

    fn reject_protected(&self, user: &User) -> Result<(), DirectoryError> {
        if user.username == *self.bootstrap_admin {
            tracing::warn!("Refused: {} is the protected bootstrap admin", user.username);
            return Err(DirectoryError::ProtectedAccount(user.username.clone()));
        }
        Ok(())
    }

    fn index_of(state: &DirectoryState, user_id: u64) -> Result<usize, DirectoryError> {
        state
            .users
            .iter()
            .position(|u| u.id == user_id)
            .ok_or(DirectoryError::UserNotFound(user_id))
    }

    fn read(&self) -> RwLockReadGuard<'_, DirectoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DirectoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn actor_name(state: &DirectoryState) -> &str {
    state.actor().unwrap_or(crate::models::SYSTEM_ACTOR)
}

fn default_users(bootstrap_admin: &str) -> Vec<User> {
    vec![
        User::new(1, bootstrap_admin, "admin@ihtsip.com", Role::Admin),
        User::new(2, "sarah_johnson", "sarah@example.com", Role::User),
        User::new(3, "michael_chen", "michael@example.com", Role::User),
        User::new(4, "anna_thompson", "anna@example.com", Role::User),
        User::new(5, "james_wilson", "james@example.com", Role::User),
        User::new(6, "patricia_lee", "patricia@example.com", Role::User),
    ]
}
