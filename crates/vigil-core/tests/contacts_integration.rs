//! Integration tests for relationship management and the watchlist view.

use chrono::{DateTime, Duration, TimeZone, Utc};
use vigil_core::checkin::{CheckInInterval, CheckInProfile};
use vigil_core::contacts::ContactService;
use vigil_core::store::{
    ContactRecord, DocumentStore, InviteDetails, MemoryDirectory, MemoryStore, UserRecord,
};
use vigil_core::ManualAlertState;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 2, 18, 0, 0).unwrap()
}

fn user_checked_in_at(id: &str, last_checked_in: DateTime<Utc>) -> UserRecord {
    UserRecord {
        user_id: id.to_string(),
        name: id.to_uppercase(),
        phone: String::new(),
        check_in: CheckInProfile::new(last_checked_in, CheckInInterval::from_hours(24).unwrap()),
        alert: ManualAlertState::default(),
    }
}

fn bea_invite() -> InviteDetails {
    InviteDetails {
        user_id: "bea".to_string(),
        name: "Bea".to_string(),
        phone: "+15550002".to_string(),
        note: "sister".to_string(),
    }
}

#[test]
fn test_accept_invite_creates_relationship_with_chosen_roles() {
    let store = MemoryStore::new();
    let directory = MemoryDirectory::new();
    directory.register("qr-bea-1", bea_invite());

    let service = ContactService::new(&store);
    service
        .accept_invite(&directory, "ann", "qr-bea-1", true, false, t0())
        .unwrap();

    let record = store.get_contact("ann", "bea").unwrap();
    assert_eq!(record.name, "Bea");
    assert_eq!(record.note, "sister");
    assert!(record.is_responder);
    assert!(!record.is_dependent);
}

#[test]
fn test_unknown_invite_code_is_an_error() {
    let store = MemoryStore::new();
    let directory = MemoryDirectory::new();
    let service = ContactService::new(&store);

    assert!(service
        .accept_invite(&directory, "ann", "qr-unknown", true, false, t0())
        .is_err());
}

#[test]
fn test_add_contact_is_an_idempotent_upsert() {
    let store = MemoryStore::new();
    let service = ContactService::new(&store);

    service
        .add_contact("ann", &bea_invite(), true, false, t0())
        .unwrap();

    // Live ping state arrives while the invitation is re-accepted.
    let mut record = store.get_contact("ann", "bea").unwrap();
    record.set_incoming_ping(t0());
    store.put_contact("ann", &record).unwrap();

    service
        .add_contact("ann", &bea_invite(), false, true, t0())
        .unwrap();

    let record = store.get_contact("ann", "bea").unwrap();
    assert!(!record.is_responder);
    assert!(record.is_dependent);
    // Mirror state survives the upsert.
    assert!(record.has_incoming_ping);
    assert_eq!(record.incoming_ping_at, Some(t0()));
}

#[test]
fn test_roles_are_independently_toggleable() {
    let store = MemoryStore::new();
    let service = ContactService::new(&store);
    service
        .add_contact("ann", &bea_invite(), true, true, t0())
        .unwrap();

    // Both roles off is legal; the relationship is simply inert.
    service.toggle_roles("ann", "bea", false, false, t0()).unwrap();
    let record = store.get_contact("ann", "bea").unwrap();
    assert!(!record.is_responder);
    assert!(!record.is_dependent);
}

#[test]
fn test_remove_contact_leaves_inverse_record() {
    let store = MemoryStore::new();
    let service = ContactService::new(&store);

    service
        .add_contact("ann", &bea_invite(), true, false, t0())
        .unwrap();
    store
        .put_contact("bea", &ContactRecord::new("ann", "Ann", "+15550001", ""))
        .unwrap();

    service.remove_contact("ann", "bea", t0()).unwrap();

    assert!(store.get_contact("ann", "bea").is_err());
    // Bea's own record about Ann is hers to remove.
    assert!(store.get_contact("bea", "ann").is_ok());
}

#[test]
fn test_watchlist_counts_overdue_dependent() {
    let store = MemoryStore::new();
    let service = ContactService::new(&store);

    // Dependent last checked in 30 hours ago on a 24-hour interval.
    store.seed_user(user_checked_in_at("bea", t0() - Duration::hours(30)));
    let mut record = ContactRecord::new("bea", "Bea", "+15550002", "");
    record.is_dependent = true;
    store.put_contact("ann", &record).unwrap();

    let watchlist = service.watchlist("ann", t0()).unwrap();
    assert_eq!(watchlist.non_responsive_count(), 1);
    assert!(watchlist.entries[0].overdue);

    // Dropping the dependent role removes it from the count even though
    // the contact is still overdue.
    service.toggle_roles("ann", "bea", false, false, t0()).unwrap();
    let watchlist = service.watchlist("ann", t0()).unwrap();
    assert_eq!(watchlist.non_responsive_count(), 0);
    assert!(watchlist.entries.is_empty());
}

#[test]
fn test_watchlist_counts_alerting_dependent() {
    let store = MemoryStore::new();
    let service = ContactService::new(&store);

    // Fresh check-in, but the alert mirror is active.
    store.seed_user(user_checked_in_at("bea", t0()));
    let mut record = ContactRecord::new("bea", "Bea", "+15550002", "");
    record.is_dependent = true;
    record.set_alert_mirror(true, Some(t0()));
    store.put_contact("ann", &record).unwrap();

    let watchlist = service.watchlist("ann", t0()).unwrap();
    assert_eq!(watchlist.non_responsive_count(), 1);
    assert!(!watchlist.entries[0].overdue);
    assert!(watchlist.entries[0].alert_active);
}

#[test]
fn test_watchlist_ignores_non_dependents_and_fresh_dependents() {
    let store = MemoryStore::new();
    let service = ContactService::new(&store);

    // Overdue, but not a dependent.
    store.seed_user(user_checked_in_at("cal", t0() - Duration::hours(48)));
    store
        .put_contact("ann", &ContactRecord::new("cal", "Cal", "", ""))
        .unwrap();

    // Dependent, checked in recently.
    store.seed_user(user_checked_in_at("bea", t0() - Duration::hours(1)));
    let mut bea = ContactRecord::new("bea", "Bea", "", "");
    bea.is_dependent = true;
    store.put_contact("ann", &bea).unwrap();

    let watchlist = service.watchlist("ann", t0()).unwrap();
    assert_eq!(watchlist.entries.len(), 1);
    assert_eq!(watchlist.non_responsive_count(), 0);
}

#[test]
fn test_watchlist_dependent_with_unreadable_record_uses_alert_mirror() {
    let store = MemoryStore::new();
    let service = ContactService::new(&store);

    // No user record seeded for "ghost": overdue cannot be computed.
    let mut ghost = ContactRecord::new("ghost", "Ghost", "", "");
    ghost.is_dependent = true;
    ghost.set_alert_mirror(true, Some(t0()));
    store.put_contact("ann", &ghost).unwrap();

    let watchlist = service.watchlist("ann", t0()).unwrap();
    assert_eq!(watchlist.non_responsive_count(), 1);
    assert!(!watchlist.entries[0].overdue);
    assert!(watchlist.entries[0].alert_active);
}
