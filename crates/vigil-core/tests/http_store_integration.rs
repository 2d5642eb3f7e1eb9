//! Wire-level tests for the HTTP platform client, against a mock server.

use mockito::Matcher;
use serde_json::json;
use vigil_core::store::{Directory, DocumentStore, HttpStore};
use vigil_core::StoreError;

fn alice_body() -> String {
    json!({
        "userId": "alice",
        "name": "Alice",
        "phone": "+15550001",
        "lastCheckedIn": "2025-03-01T12:00:00Z",
        "checkInInterval": 86400,
        "notify30MinBefore": true,
        "notify2HoursBefore": false,
        "manualAlertActive": false,
        "manualAlertTimestamp": null
    })
    .to_string()
}

#[test]
fn test_get_user_record_parses_wire_fields() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/users/alice")
        .match_header("authorization", "Bearer tok-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(alice_body())
        .create();

    let store = HttpStore::new(&server.url(), "tok-1").unwrap();
    let record = store.get_user_record("alice").unwrap();

    mock.assert();
    assert_eq!(record.user_id, "alice");
    assert_eq!(record.check_in.interval.as_secs(), 86_400);
    assert!(record.check_in.reminders.notify_30_min_before);
    assert!(!record.alert.is_active());
}

#[test]
fn test_missing_document_maps_to_not_found() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/users/nobody")
        .with_status(404)
        .create();

    let store = HttpStore::new(&server.url(), "tok-1").unwrap();
    let err = store.get_user_record("nobody").unwrap_err();
    assert!(matches!(err, StoreError::NotFound { ref path } if path == "users/nobody"));
}

#[test]
fn test_forbidden_maps_to_permission_denied() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/users/alice/contacts/bob")
        .with_status(403)
        .create();

    let store = HttpStore::new(&server.url(), "tok-1").unwrap();
    let err = store.get_contact("alice", "bob").unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied { .. }));
}

#[test]
fn test_unauthorized_maps_to_session_invalidated() {
    let mut server = mockito::Server::new();
    server.mock("GET", "/users/alice").with_status(401).create();

    let store = HttpStore::new(&server.url(), "tok-expired").unwrap();
    let err = store.get_user_record("alice").unwrap_err();
    assert!(matches!(err, StoreError::SessionInvalidated));
}

#[test]
fn test_empty_token_fails_before_any_request() {
    let mut server = mockito::Server::new();
    let mock = server.mock("GET", "/users/alice").expect(0).create();

    let store = HttpStore::new(&server.url(), "").unwrap();
    let err = store.get_user_record("alice").unwrap_err();
    assert!(matches!(err, StoreError::NotAuthenticated));
    mock.assert();
}

#[test]
fn test_malformed_body_is_reported() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/users/alice")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{\"userId\": 42}")
        .create();

    let store = HttpStore::new(&server.url(), "tok-1").unwrap();
    let err = store.get_user_record("alice").unwrap_err();
    assert!(matches!(err, StoreError::MalformedResponse { .. }));
}

#[test]
fn test_put_contact_sends_wire_shape() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("PUT", "/users/alice/contacts/bob")
        .match_header("authorization", "Bearer tok-1")
        .match_body(Matcher::PartialJson(json!({
            "contactId": "bob",
            "isResponder": true,
            "hasOutgoingPing": false,
        })))
        .with_status(200)
        .create();

    let store = HttpStore::new(&server.url(), "tok-1").unwrap();
    let mut record = vigil_core::store::ContactRecord::new("bob", "Bob", "+15550002", "");
    record.is_responder = true;
    store.put_contact("alice", &record).unwrap();
    mock.assert();
}

#[test]
fn test_delete_contact_hits_document_path() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("DELETE", "/users/alice/contacts/bob")
        .with_status(200)
        .create();

    let store = HttpStore::new(&server.url(), "tok-1").unwrap();
    store.delete_contact("alice", "bob").unwrap();
    mock.assert();
}

#[test]
fn test_lookup_invite_posts_opaque_code() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/functions/lookupInvite")
        .match_body(Matcher::Json(json!({ "code": "qr:opaque/token==" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "userId": "bea",
                "name": "Bea",
                "phone": "+15550002",
                "note": "sister"
            })
            .to_string(),
        )
        .create();

    let store = HttpStore::new(&server.url(), "tok-1").unwrap();
    let details = store.lookup_invite("qr:opaque/token==").unwrap();
    mock.assert();
    assert_eq!(details.user_id, "bea");
    assert_eq!(details.note, "sister");
}

#[test]
fn test_user_ids_are_path_encoded() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/users/user%20one")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(alice_body())
        .create();

    let store = HttpStore::new(&server.url(), "tok-1").unwrap();
    store.get_user_record("user one").unwrap();
    mock.assert();
}
