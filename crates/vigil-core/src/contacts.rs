//! Contact relationship management.
//!
//! Relationships are directed: each party holds its own record about the
//! other, created when a QR invite is accepted and maintained
//! independently thereafter. Roles are two independent booleans; a record
//! with neither role is legal and simply inert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, StoreError};
use crate::events::Event;
use crate::store::{ContactRecord, Directory, DocumentStore, InviteDetails};

/// One dependent's row in the monitoring view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub contact_id: String,
    pub name: String,
    pub overdue: bool,
    pub alert_active: bool,
}

impl WatchlistEntry {
    pub fn is_non_responsive(&self) -> bool {
        self.overdue || self.alert_active
    }
}

/// The owner's view of every contact with the dependent role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Watchlist {
    pub entries: Vec<WatchlistEntry>,
}

impl Watchlist {
    /// Badge count: dependents that are overdue or have an active alert.
    pub fn non_responsive_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_non_responsive()).count()
    }
}

/// Contact operations against the document store.
pub struct ContactService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ContactService<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Resolve a scanned QR invite code and add the resulting contact with
    /// the role combination chosen at invite time.
    pub fn accept_invite(
        &self,
        directory: &dyn Directory,
        owner_id: &str,
        code: &str,
        is_responder: bool,
        is_dependent: bool,
        now: DateTime<Utc>,
    ) -> Result<Event, CoreError> {
        let details = directory.lookup_invite(code)?;
        self.add_contact(owner_id, &details, is_responder, is_dependent, now)
    }

    /// Upsert a contact relationship.
    ///
    /// Accepting the same invitation twice overwrites the role and identity
    /// fields but preserves any live ping/alert mirror state, so the
    /// operation is idempotent rather than failing on duplicates.
    pub fn add_contact(
        &self,
        owner_id: &str,
        details: &InviteDetails,
        is_responder: bool,
        is_dependent: bool,
        now: DateTime<Utc>,
    ) -> Result<Event, CoreError> {
        let mut record = match self.store.get_contact(owner_id, &details.user_id) {
            Ok(existing) => existing,
            Err(StoreError::NotFound { .. }) => {
                ContactRecord::new(&details.user_id, &details.name, &details.phone, &details.note)
            }
            Err(e) => return Err(e.into()),
        };
        record.name = details.name.clone();
        record.phone = details.phone.clone();
        record.note = details.note.clone();
        record.is_responder = is_responder;
        record.is_dependent = is_dependent;
        self.store.put_contact(owner_id, &record)?;

        Ok(Event::ContactAdded {
            owner_id: owner_id.to_string(),
            contact_id: details.user_id.clone(),
            is_responder,
            is_dependent,
            at: now,
        })
    }

    /// Unconditional overwrite of both role flags. No validation that at
    /// least one role remains set.
    pub fn toggle_roles(
        &self,
        owner_id: &str,
        contact_id: &str,
        is_responder: bool,
        is_dependent: bool,
        now: DateTime<Utc>,
    ) -> Result<Event, CoreError> {
        let mut record = self.store.get_contact(owner_id, contact_id)?;
        record.is_responder = is_responder;
        record.is_dependent = is_dependent;
        self.store.put_contact(owner_id, &record)?;

        Ok(Event::RolesChanged {
            owner_id: owner_id.to_string(),
            contact_id: contact_id.to_string(),
            is_responder,
            is_dependent,
            at: now,
        })
    }

    /// Delete only the owner's record. The contact's own inverse record,
    /// if any, must be removed by that party.
    pub fn remove_contact(
        &self,
        owner_id: &str,
        contact_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Event, CoreError> {
        self.store.delete_contact(owner_id, contact_id)?;
        Ok(Event::ContactRemoved {
            owner_id: owner_id.to_string(),
            contact_id: contact_id.to_string(),
            at: now,
        })
    }

    pub fn list(&self, owner_id: &str) -> Result<Vec<ContactRecord>, CoreError> {
        Ok(self.store.list_contacts(owner_id)?)
    }

    /// Build the monitoring view over every dependent contact.
    ///
    /// Overdue-ness comes from the dependent's fetched user record; the
    /// alert column uses the relationship's mirrored fields, which is what
    /// the fan-out maintains. A dependent whose record cannot be fetched
    /// contributes through its alert mirror only.
    pub fn watchlist(&self, owner_id: &str, now: DateTime<Utc>) -> Result<Watchlist, CoreError> {
        let contacts = self.store.list_contacts(owner_id)?;
        let mut entries = Vec::new();

        for contact in contacts.into_iter().filter(|c| c.is_dependent) {
            let overdue = self
                .store
                .get_user_record(&contact.contact_id)
                .map(|user| user.check_in.is_overdue(now))
                .unwrap_or(false);
            entries.push(WatchlistEntry {
                contact_id: contact.contact_id,
                name: contact.name,
                overdue,
                alert_active: contact.manual_alert_active,
            });
        }
        Ok(Watchlist { entries })
    }
}
