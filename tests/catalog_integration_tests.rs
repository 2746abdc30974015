//! Integration tests for ResourceCatalog
//!
//! These tests verify:
//! - Uploads are always unapproved and stamped with the uploader
//! - Approval, rejection and deletion with their audit entries
//! - Download gating for free and premium resources
//! - Read-after-write consistency of the `resources` key

use admin_portal::models::{SecuritySettings, actions};
use admin_portal::storage::{keys, save_collection};
use admin_portal::{
    CatalogError, EventBus, KeyValueStore, MemoryStore, PortalEvent, RemovalReason, Resource,
    ResourceCatalog, ResourceDraft, Role, SharedStore, User, UserDirectory,
};
use chrono::Utc;
use proptest::prelude::*;
use std::sync::Arc;

fn open_with(store: Arc<MemoryStore>) -> (ResourceCatalog, UserDirectory) {
    open_with_events(store, EventBus::default())
}

fn open_with_events(store: Arc<MemoryStore>, events: EventBus) -> (ResourceCatalog, UserDirectory) {
    let directory = UserDirectory::open(
        store.clone() as SharedStore,
        events.clone(),
        &SecuritySettings::default(),
    )
    .unwrap();
    let catalog = ResourceCatalog::open(store as SharedStore, directory.clone(), events).unwrap();
    (catalog, directory)
}

fn resource(id: u64, is_premium: bool, approved: bool) -> Resource {
    Resource {
        id,
        title: format!("Resource {}", id),
        description: String::new(),
        kind: "PDF".to_string(),
        category: "Education".to_string(),
        is_premium,
        download_url: "#".to_string(),
        uploaded_by: "admin".to_string(),
        upload_date: Utc::now(),
        approved,
    }
}

fn assert_persisted(catalog: &ResourceCatalog, store: &MemoryStore) {
    assert_eq!(
        store.get(keys::RESOURCES).unwrap().unwrap(),
        serde_json::to_string(catalog.list_all()).unwrap()
    );
}

#[test]
fn test_submitted_resource_is_never_preapproved() {
    let store = Arc::new(MemoryStore::new());
    let (mut catalog, directory) = open_with(store.clone());
    directory.authenticate("sarah_johnson", "").unwrap();

    let draft: ResourceDraft = serde_json::from_str(
        r#"{"title":"Self-care Plan","type":"PDF","category":"Wellbeing","isPremium":false,"approved":true}"#,
    )
    .unwrap();
    assert!(draft.approved);

    let submitted = catalog.submit(draft).unwrap();
    assert!(!submitted.approved);
    assert_eq!(submitted.uploaded_by, "sarah_johnson");
    assert!(!catalog.get_by_id(submitted.id).unwrap().approved);
    assert!(catalog.list_approved().iter().all(|r| r.id != submitted.id));
    assert!(!catalog.can_download(submitted.id, directory.session().map(|s| s.user).as_ref()));
    assert_persisted(&catalog, &store);

    let last = directory.action_log().pop().unwrap();
    assert_eq!(last.action, actions::RESOURCE_UPLOAD);
    assert_eq!(last.description, "Resource \"Self-care Plan\" uploaded");
}

#[test]
fn test_approve_existing_unapproved_resource() {
    let store = Arc::new(MemoryStore::new());
    let existing = vec![
        resource(1, false, true),
        resource(2, true, true),
        Resource {
            title: "Crisis Intervention Handbook".to_string(),
            ..resource(3, true, false)
        },
    ];
    save_collection(store.as_ref(), keys::RESOURCES, &existing).unwrap();

    let (mut catalog, directory) = open_with(store.clone());
    assert!(catalog.list_approved().iter().all(|r| r.id != 3));

    catalog.approve(3).unwrap();

    assert!(catalog.list_approved().iter().any(|r| r.id == 3));
    assert_persisted(&catalog, &store);

    let log = directory.action_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, actions::RESOURCE_APPROVAL);
    assert_eq!(
        log[0].description,
        "Resource \"Crisis Intervention Handbook\" approved"
    );
}

#[test]
fn test_download_gating_examples() {
    let store = Arc::new(MemoryStore::new());
    let existing = vec![
        resource(1, false, true),
        resource(2, true, true),
        resource(3, false, false),
    ];
    save_collection(store.as_ref(), keys::RESOURCES, &existing).unwrap();
    let (catalog, _directory) = open_with(store);

    let member = User::new(20, "member", "member@example.com", Role::User);
    let admin = User::new(21, "boss", "boss@example.com", Role::Admin);

    assert!(catalog.can_download(1, None));
    assert!(!catalog.can_download(2, None));
    assert!(!catalog.can_download(2, Some(&member)));
    assert!(catalog.can_download(2, Some(&admin)));
    assert!(!catalog.can_download(3, Some(&admin)));
}

#[test]
fn test_reject_removes_and_notifies() {
    let store = Arc::new(MemoryStore::new());
    let events = EventBus::new(8);
    let mut rx = events.subscribe();
    let (mut catalog, _directory) = open_with_events(store.clone(), events);

    let removed = catalog.reject(2).unwrap();
    assert_eq!(removed.title, "Advanced Therapy Techniques");
    assert!(catalog.get_by_id(2).is_none());
    assert_persisted(&catalog, &store);

    let events: Vec<PortalEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    assert_eq!(
        events,
        vec![
            PortalEvent::AuditAppended {
                action: actions::RESOURCE_REJECTION.to_string()
            },
            PortalEvent::ResourceRemoved {
                resource_id: 2,
                reason: RemovalReason::Rejected
            },
        ]
    );
    assert!(matches!(catalog.approve(2), Err(CatalogError::NotFound(2))));
}

#[test]
fn test_uploads_survive_reopen() {
    let store = Arc::new(MemoryStore::new());
    let (mut catalog, _directory) = open_with(store.clone());
    let submitted = catalog
        .submit(ResourceDraft {
            title: "Breathing Exercises".to_string(),
            ..Default::default()
        })
        .unwrap();

    let (reopened, _directory) = open_with(store);
    assert_eq!(reopened.list_all().len(), 4);
    assert_eq!(
        reopened.get_by_id(submitted.id).unwrap().title,
        "Breathing Exercises"
    );
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Admin)]
}

proptest! {
    #[test]
    fn prop_can_download_follows_gating_rules(
        is_premium in any::<bool>(),
        approved in any::<bool>(),
        anonymous in any::<bool>(),
        role in role_strategy(),
        has_premium in any::<bool>(),
    ) {
        let store = Arc::new(MemoryStore::new());
        save_collection(store.as_ref(), keys::RESOURCES, &[resource(9, is_premium, approved)]).unwrap();
        let (catalog, _directory) = open_with(store);

        let mut user = User::new(30, "tester", "tester@example.com", role);
        user.has_premium = has_premium;
        let caller = if anonymous { None } else { Some(&user) };

        let expected = approved
            && (!is_premium || (!anonymous && (role == Role::Admin || has_premium)));
        prop_assert_eq!(catalog.can_download(9, caller), expected);

        if !approved {
            prop_assert!(!catalog.can_download(9, caller));
        }
    }
}

#[test]
fn test_storage_failure_surfaces_to_caller() {
    let store = Arc::new(MemoryStore::new());
    let (mut catalog, _directory) = open_with(store.clone());
    store.set_available(false);

    let submitted = catalog.submit(ResourceDraft {
        title: "Offline upload".to_string(),
        ..Default::default()
    });
    assert!(matches!(submitted, Err(CatalogError::Storage(_))));
    assert!(matches!(catalog.approve(1), Err(CatalogError::Storage(_))));
    assert!(matches!(catalog.remove(2), Err(CatalogError::Storage(_))));
}
