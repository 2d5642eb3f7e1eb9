//! In-memory store, used by tests and by callers embedding the core
//! without a platform connection.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use crate::error::StoreError;

use super::{contact_path, user_path, ContactRecord, Directory, DocumentStore, InviteDetails, UserRecord};

/// HashMap-backed [`DocumentStore`].
///
/// Contact records are keyed `(owner_id, contact_id)`. Individual contact
/// writes can be made to fail with `PermissionDenied`, which is how the
/// fan-out tests exercise partial failure.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, UserRecord>>,
    contacts: Mutex<BTreeMap<(String, String), ContactRecord>>,
    denied_contact_writes: Mutex<HashSet<(String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user record directly, bypassing create semantics.
    pub fn seed_user(&self, record: UserRecord) {
        self.users
            .lock()
            .unwrap()
            .insert(record.user_id.clone(), record);
    }

    /// Make every future write of `(owner_id, contact_id)` fail with
    /// `PermissionDenied`.
    pub fn deny_contact_write(&self, owner_id: &str, contact_id: &str) {
        self.denied_contact_writes
            .lock()
            .unwrap()
            .insert((owner_id.to_string(), contact_id.to_string()));
    }
}

impl DocumentStore for MemoryStore {
    fn get_user_record(&self, user_id: &str) -> Result<UserRecord, StoreError> {
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                path: user_path(user_id),
            })
    }

    fn create_user_record(&self, record: &UserRecord) -> Result<(), StoreError> {
        self.users
            .lock()
            .unwrap()
            .insert(record.user_id.clone(), record.clone());
        Ok(())
    }

    fn update_user_record(&self, record: &UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if !users.contains_key(&record.user_id) {
            return Err(StoreError::NotFound {
                path: user_path(&record.user_id),
            });
        }
        users.insert(record.user_id.clone(), record.clone());
        Ok(())
    }

    fn list_contacts(&self, owner_id: &str) -> Result<Vec<ContactRecord>, StoreError> {
        Ok(self
            .contacts
            .lock()
            .unwrap()
            .range((owner_id.to_string(), String::new())..)
            .take_while(|((owner, _), _)| owner == owner_id)
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn get_contact(&self, owner_id: &str, contact_id: &str) -> Result<ContactRecord, StoreError> {
        self.contacts
            .lock()
            .unwrap()
            .get(&(owner_id.to_string(), contact_id.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                path: contact_path(owner_id, contact_id),
            })
    }

    fn put_contact(&self, owner_id: &str, record: &ContactRecord) -> Result<(), StoreError> {
        let key = (owner_id.to_string(), record.contact_id.clone());
        if self.denied_contact_writes.lock().unwrap().contains(&key) {
            return Err(StoreError::PermissionDenied {
                path: contact_path(owner_id, &record.contact_id),
            });
        }
        self.contacts.lock().unwrap().insert(key, record.clone());
        Ok(())
    }

    fn delete_contact(&self, owner_id: &str, contact_id: &str) -> Result<(), StoreError> {
        let key = (owner_id.to_string(), contact_id.to_string());
        self.contacts
            .lock()
            .unwrap()
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                path: contact_path(owner_id, contact_id),
            })
    }
}

/// HashMap-backed [`Directory`] of invite codes.
#[derive(Default)]
pub struct MemoryDirectory {
    invites: Mutex<HashMap<String, InviteDetails>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, code: &str, details: InviteDetails) {
        self.invites
            .lock()
            .unwrap()
            .insert(code.to_string(), details);
    }
}

impl Directory for MemoryDirectory {
    fn lookup_invite(&self, code: &str) -> Result<InviteDetails, StoreError> {
        self.invites
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                path: format!("invites/{code}"),
            })
    }
}
