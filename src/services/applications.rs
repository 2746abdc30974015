use crate::events::{EventBus, PortalEvent};
use crate::models::{Application, ApplicationStatus, Priority, actions};
use crate::services::directory::UserDirectory;
use crate::storage::{SharedStore, StoreError, keys, load_collection, save_collection};
use chrono::{NaiveDate, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Application {0} not found")]
    NotFound(u64),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Applicant records and their review status.
///
/// Owns the `applications` collection; every mutation rewrites it in full and
/// appends an audit entry through the shared [`UserDirectory`].
pub struct ApplicationRegistry {
    applications: Vec<Application>,
    store: SharedStore,
    directory: UserDirectory,
    events: EventBus,
}

impl ApplicationRegistry {
    pub fn open(
        store: SharedStore,
        directory: UserDirectory,
        events: EventBus,
    ) -> Result<Self, StoreError> {
        let mut applications: Vec<Application> =
            load_collection(store.as_ref(), keys::APPLICATIONS)?;

        if applications.is_empty() {
            applications = default_applications();
            save_collection(store.as_ref(), keys::APPLICATIONS, &applications)?;
            tracing::info!("Seeded {} default applications", applications.len());
        } else {
            tracing::debug!("Loaded {} applications", applications.len());
        }

        Ok(Self {
            applications,
            store,
            directory,
            events,
        })
    }

    /// Move an application to `status`. Any transition is allowed.
    ///
    /// Non-empty `notes` replace the existing notes.
    pub fn set_status(
        &mut self,
        application_id: u64,
        status: ApplicationStatus,
        notes: Option<&str>,
    ) -> Result<&Application, RegistryError> {
        let index = self.index_of(application_id)?;

        let application = &mut self.applications[index];
        let old_status = std::mem::replace(&mut application.status, status.clone());
        if let Some(notes) = notes.filter(|n| !n.is_empty()) {
            application.notes = notes.to_string();
        }
        application.last_updated = Some(Utc::now());
        let description = format!(
            "Application {} ({}) status changed from {} to {}",
            application_id, application.applicant_name, old_status, status
        );

        save_collection(self.store.as_ref(), keys::APPLICATIONS, &self.applications)?;
        self.directory
            .log_action(actions::APPLICATION_UPDATE, &description)?;

        tracing::info!(
            "Application {}: {} -> {}",
            application_id,
            old_status,
            status
        );
        self.events.emit(PortalEvent::ApplicationUpdated {
            application_id,
            status,
        });

        Ok(&self.applications[index])
    }

    pub fn remove(&mut self, application_id: u64) -> Result<Application, RegistryError> {
        let index = self.index_of(application_id)?;

        let removed = self.applications.remove(index);
        save_collection(self.store.as_ref(), keys::APPLICATIONS, &self.applications)?;
        self.directory.log_action(
            actions::APPLICATION_DELETION,
            &format!(
                "Application {} ({}) deleted",
                application_id, removed.applicant_name
            ),
        )?;

        tracing::info!("Application {} removed", application_id);
        self.events
            .emit(PortalEvent::ApplicationRemoved { application_id });

        Ok(removed)
    }

    pub fn list(&self) -> &[Application] {
        &self.applications
    }

    pub fn get_by_id(&self, application_id: u64) -> Option<&Application> {
        self.applications.iter().find(|a| a.id == application_id)
    }

    fn index_of(&self, application_id: u64) -> Result<usize, RegistryError> {
        self.applications
            .iter()
            .position(|a| a.id == application_id)
            .ok_or_else(|| {
                tracing::warn!("Application {} not found", application_id);
                RegistryError::NotFound(application_id)
            })
    }
}

#[allow(clippy::too_many_arguments)]
fn seed(
    id: u64,
    applicant_name: &str,
    program: &str,
    submitted: (i32, u32, u32),
    status: ApplicationStatus,
    priority: Priority,
    contact: (&str, &str),
    documents: &[&str],
    notes: &str,
) -> Application {
    let (year, month, day) = submitted;
    Application {
        id,
        applicant_name: applicant_name.to_string(),
        program: program.to_string(),
        submission_date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN),
        status,
        priority,
        email: contact.0.to_string(),
        phone: contact.1.to_string(),
        documents: documents.iter().map(|d| d.to_string()).collect(),
        notes: notes.to_string(),
        last_updated: None,
    }
}

fn default_applications() -> Vec<Application> {
    use ApplicationStatus::*;

    vec![
        seed(
            1,
            "Sarah Johnson",
            "CGHS Program",
            (2023, 3, 18),
            UnderReview,
            Priority::High,
            ("sarah@example.com", "+1-555-0123"),
            &["resume.pdf", "cover_letter.pdf"],
            "Strong candidate with relevant experience",
        ),
        seed(
            2,
            "Michael Chen",
            "Mental Health Certification",
            (2023, 3, 15),
            Approved,
            Priority::Medium,
            ("michael@example.com", "+1-555-0124"),
            &["application.pdf", "transcript.pdf"],
            "Application approved, awaiting payment",
        ),
        seed(
            3,
            "Anna Thompson",
            "Crisis Intervention Training",
            (2023, 3, 12),
            Pending,
            Priority::Low,
            ("anna@example.com", "+1-555-0125"),
            &["application.pdf"],
            "Waiting for additional documentation",
        ),
        seed(
            4,
            "James Wilson",
            "Advanced Therapy Techniques",
            (2023, 3, 10),
            UnderReview,
            Priority::High,
            ("james@example.com", "+1-555-0126"),
            &["resume.pdf", "portfolio.pdf", "references.pdf"],
            "Experienced professional seeking advanced certification",
        ),
        seed(
            5,
            "Patricia Lee",
            "Basic Counseling Skills",
            (2023, 3, 8),
            Rejected,
            Priority::Low,
            ("patricia@example.com", "+1-555-0127"),
            &["application.pdf"],
            "Did not meet minimum requirements",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SecuritySettings;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn open_registry() -> (ApplicationRegistry, UserDirectory) {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let events = EventBus::default();
        let directory =
            UserDirectory::open(store.clone(), events.clone(), &SecuritySettings::default())
                .unwrap();
        let registry = ApplicationRegistry::open(store, directory.clone(), events).unwrap();
        (registry, directory)
    }

    #[test]
    fn test_seed_data() {
        let (registry, _directory) = open_registry();
        let apps = registry.list();

        assert_eq!(apps.len(), 5);
        assert_eq!(apps.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert_eq!(apps[0].applicant_name, "Sarah Johnson");
        assert_eq!(apps[0].status, ApplicationStatus::UnderReview);
        assert_eq!(apps[3].documents.len(), 3);
    }

    #[test]
    fn test_empty_notes_keep_existing_notes() {
        let (mut registry, _directory) = open_registry();

        let updated = registry
            .set_status(3, ApplicationStatus::Approved, Some(""))
            .unwrap();
        assert_eq!(updated.notes, "Waiting for additional documentation");
        assert!(updated.last_updated.is_some());

        let updated = registry
            .set_status(3, ApplicationStatus::Pending, Some("Documents received"))
            .unwrap();
        assert_eq!(updated.notes, "Documents received");
    }

    #[test]
    fn test_status_change_description() {
        let (mut registry, directory) = open_registry();
        registry
            .set_status(5, ApplicationStatus::UnderReview, None)
            .unwrap();

        let log = directory.action_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, actions::APPLICATION_UPDATE);
        assert_eq!(
            log[0].description,
            "Application 5 (Patricia Lee) status changed from Rejected to Under Review"
        );
    }

    #[test]
    fn test_remove_unknown_application() {
        let (mut registry, directory) = open_registry();

        assert!(matches!(registry.remove(99), Err(RegistryError::NotFound(99))));
        assert_eq!(registry.list().len(), 5);
        assert!(directory.action_log().is_empty());
    }
}
