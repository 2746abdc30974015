// Change notification for the portal managers
//
// Each manager holds a clone of the EventBus and emits a PortalEvent after every
// successful mutation. Interested parties (a UI layer, tests) subscribe through
// tokio broadcast channels.

use crate::models::{ApplicationStatus, Role, Theme};
use tokio::sync::broadcast;

/// Why a resource left the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalReason {
    Rejected,
    Deleted,
}

/// Events emitted after a manager has mutated and persisted its state.
#[derive(Clone, Debug, PartialEq)]
pub enum PortalEvent {
    SessionStarted {
        username: String,
        is_admin: bool,
    },

    SessionEnded {
        username: Option<String>,
    },

    UserRoleChanged {
        user_id: u64,
        role: Role,
    },

    UserDeleted {
        user_id: u64,
    },

    AdminSecretChanged,

    /// A line was appended to the action log
    AuditAppended {
        action: String,
    },

    ApplicationUpdated {
        application_id: u64,
        status: ApplicationStatus,
    },

    ApplicationRemoved {
        application_id: u64,
    },

    ResourceSubmitted {
        resource_id: u64,
    },

    ResourceApproved {
        resource_id: u64,
    },

    ResourceRemoved {
        resource_id: u64,
        reason: RemovalReason,
    },

    ThemeChanged {
        theme: Theme,
    },
}

/// Broadcast hub shared by all managers.
///
/// Cloning the bus shares the underlying channel. Sending never fails from the
/// emitter's point of view: with no subscribers the event is simply dropped.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<PortalEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per lagging subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PortalEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: PortalEvent) {
        // Ignore send errors - it's OK if no one is listening
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
