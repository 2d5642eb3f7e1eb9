//! Document-store boundary for the hosted platform.
//!
//! Everything remote goes through two small traits: [`DocumentStore`] for
//! CRUD on user records and per-owner contact subcollections, and
//! [`Directory`] for the server-side functions that are not plain CRUD
//! (QR invite lookup). The state machines only ever see these traits, so
//! they test against [`MemoryStore`] and ship against [`HttpStore`].
//!
//! Updates are whole-record overwrites. The platform is last-write-wins;
//! there is no conflict resolution on this side of the wire.

pub mod http;
pub mod memory;
pub mod session;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alert::ManualAlertState;
use crate::checkin::CheckInProfile;
use crate::error::StoreError;

pub use http::HttpStore;
pub use memory::{MemoryDirectory, MemoryStore};

/// One user's primary record. Field names follow the hosted document
/// schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(flatten)]
    pub check_in: CheckInProfile,
    #[serde(flatten)]
    pub alert: ManualAlertState,
}

/// One directed relationship record: the owner's view of a contact.
///
/// Each side of a relationship holds its own copy; nothing here is derived
/// from the inverse record. The ping and alert fields are mirrors written
/// by the other party's operations and may lag behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    #[serde(rename = "contactId")]
    pub contact_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub note: String,

    /// This contact should be notified of the owner's overdue/alert state.
    #[serde(rename = "isResponder", default)]
    pub is_responder: bool,
    /// The owner is responsible for monitoring this contact.
    #[serde(rename = "isDependent", default)]
    pub is_dependent: bool,

    #[serde(rename = "hasOutgoingPing", default)]
    pub has_outgoing_ping: bool,
    #[serde(rename = "outgoingPingTimestamp", default)]
    pub outgoing_ping_at: Option<DateTime<Utc>>,

    #[serde(rename = "hasIncomingPing", default)]
    pub has_incoming_ping: bool,
    #[serde(rename = "incomingPingTimestamp", default)]
    pub incoming_ping_at: Option<DateTime<Utc>>,

    /// Mirror of the contact's manual alert state, maintained by the
    /// contact's trigger/clear fan-out.
    #[serde(rename = "manualAlertActive", default)]
    pub manual_alert_active: bool,
    #[serde(rename = "manualAlertTimestamp", default)]
    pub manual_alert_at: Option<DateTime<Utc>>,
}

impl ContactRecord {
    pub fn new(contact_id: &str, name: &str, phone: &str, note: &str) -> Self {
        Self {
            contact_id: contact_id.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            note: note.to_string(),
            is_responder: false,
            is_dependent: false,
            has_outgoing_ping: false,
            outgoing_ping_at: None,
            has_incoming_ping: false,
            incoming_ping_at: None,
            manual_alert_active: false,
            manual_alert_at: None,
        }
    }

    // Flag/timestamp pairs are only ever touched together; the timestamp
    // is present iff the flag is set.

    pub fn set_outgoing_ping(&mut self, at: DateTime<Utc>) {
        self.has_outgoing_ping = true;
        self.outgoing_ping_at = Some(at);
    }

    pub fn clear_outgoing_ping(&mut self) {
        self.has_outgoing_ping = false;
        self.outgoing_ping_at = None;
    }

    pub fn set_incoming_ping(&mut self, at: DateTime<Utc>) {
        self.has_incoming_ping = true;
        self.incoming_ping_at = Some(at);
    }

    pub fn clear_incoming_ping(&mut self) {
        self.has_incoming_ping = false;
        self.incoming_ping_at = None;
    }

    pub fn set_alert_mirror(&mut self, active: bool, at: Option<DateTime<Utc>>) {
        self.manual_alert_active = active;
        self.manual_alert_at = if active { at } else { None };
    }
}

/// Resolution of an opaque scanned QR invite code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteDetails {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub note: String,
}

/// CRUD interface to the hosted document store.
///
/// Implementations do not retry; errors surface to the caller as-is.
pub trait DocumentStore: Send + Sync {
    fn get_user_record(&self, user_id: &str) -> Result<UserRecord, StoreError>;

    fn create_user_record(&self, record: &UserRecord) -> Result<(), StoreError>;

    /// Whole-record overwrite of an existing user record.
    fn update_user_record(&self, record: &UserRecord) -> Result<(), StoreError>;

    fn list_contacts(&self, owner_id: &str) -> Result<Vec<ContactRecord>, StoreError>;

    fn get_contact(&self, owner_id: &str, contact_id: &str) -> Result<ContactRecord, StoreError>;

    /// Upsert of a contact record in the owner's subcollection.
    fn put_contact(&self, owner_id: &str, record: &ContactRecord) -> Result<(), StoreError>;

    fn delete_contact(&self, owner_id: &str, contact_id: &str) -> Result<(), StoreError>;
}

/// Server-side directory functions.
pub trait Directory: Send + Sync {
    /// Resolve an opaque scanned QR code. The code is passed through
    /// unvalidated; only the directory knows its structure.
    fn lookup_invite(&self, code: &str) -> Result<InviteDetails, StoreError>;
}

/// Document path of a user record, for error reporting.
pub(crate) fn user_path(user_id: &str) -> String {
    format!("users/{user_id}")
}

/// Document path of a contact record, for error reporting.
pub(crate) fn contact_path(owner_id: &str, contact_id: &str) -> String {
    format!("users/{owner_id}/contacts/{contact_id}")
}
