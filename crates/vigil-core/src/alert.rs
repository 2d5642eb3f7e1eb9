//! Manual alert state machine and responder fan-out.
//!
//! A manual alert is a user-triggered emergency signal, distinct from
//! passive overdue detection. The state machine is two states, Idle and
//! Active, with the timestamp present iff active. Triggering while already
//! active refreshes the timestamp: it records the most recent trigger.
//!
//! Trigger and clear write the user's primary record first, then mirror
//! the state into the record each responder holds about this user, one
//! write at a time. Mirror failures are collected in a [`FanOutReport`]
//! and never roll anything back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::events::Event;
use crate::fanout::FanOutReport;
use crate::store::DocumentStore;

/// Per-user manual alert state: Idle or Active.
///
/// The timestamp is present iff the alert is active; the mutators keep the
/// pair consistent, so the fields stay private.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualAlertState {
    #[serde(rename = "manualAlertActive", default)]
    active: bool,
    #[serde(rename = "manualAlertTimestamp", default)]
    triggered_at: Option<DateTime<Utc>>,
}

impl ManualAlertState {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn triggered_at(&self) -> Option<DateTime<Utc>> {
        self.triggered_at
    }

    /// Activate, stamping `now`. Re-triggering while active refreshes the
    /// timestamp.
    pub fn trigger(&mut self, now: DateTime<Utc>) {
        self.active = true;
        self.triggered_at = Some(now);
    }

    /// Return to idle. Clearing an idle alert is a no-op.
    pub fn clear(&mut self) {
        self.active = false;
        self.triggered_at = None;
    }
}

/// Result of a trigger or clear: the event plus the per-responder mirror
/// outcome.
#[derive(Debug)]
pub struct AlertUpdate {
    pub event: Event,
    pub fan_out: FanOutReport,
}

/// Alert operations against the document store.
pub struct AlertService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> AlertService<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Trigger the user's manual alert and mirror it to every responder.
    ///
    /// The primary write must succeed or the whole operation fails; mirror
    /// writes are best-effort per responder.
    pub fn trigger(&self, user_id: &str, now: DateTime<Utc>) -> Result<AlertUpdate, CoreError> {
        let mut user = self.store.get_user_record(user_id)?;
        user.alert.trigger(now);
        self.store.update_user_record(&user)?;

        let fan_out = self.mirror_to_responders(user_id, true, Some(now))?;
        Ok(AlertUpdate {
            event: Event::AlertTriggered {
                user_id: user_id.to_string(),
                at: now,
            },
            fan_out,
        })
    }

    /// Clear the user's manual alert and mirror the idle state to every
    /// responder. Idempotent: clearing an idle alert writes the same idle
    /// state again.
    pub fn clear(&self, user_id: &str, now: DateTime<Utc>) -> Result<AlertUpdate, CoreError> {
        let mut user = self.store.get_user_record(user_id)?;
        user.alert.clear();
        self.store.update_user_record(&user)?;

        let fan_out = self.mirror_to_responders(user_id, false, None)?;
        Ok(AlertUpdate {
            event: Event::AlertCleared {
                user_id: user_id.to_string(),
                at: now,
            },
            fan_out,
        })
    }

    /// Write the alert mirror into the record each responder holds about
    /// `user_id`, sequentially. A responder that never added the user back
    /// shows up as a failed mirror (its record is missing).
    fn mirror_to_responders(
        &self,
        user_id: &str,
        active: bool,
        at: Option<DateTime<Utc>>,
    ) -> Result<FanOutReport, CoreError> {
        let contacts = self.store.list_contacts(user_id)?;
        let mut report = FanOutReport::new();

        for contact in contacts.iter().filter(|c| c.is_responder) {
            let result = self
                .store
                .get_contact(&contact.contact_id, user_id)
                .and_then(|mut mirror| {
                    mirror.set_alert_mirror(active, at);
                    self.store.put_contact(&contact.contact_id, &mirror)
                });
            report.record(&contact.contact_id, result);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn trigger_sets_state_and_timestamp() {
        let mut state = ManualAlertState::default();
        assert!(!state.is_active());
        assert_eq!(state.triggered_at(), None);

        state.trigger(at(9));
        assert!(state.is_active());
        assert_eq!(state.triggered_at(), Some(at(9)));
    }

    #[test]
    fn retrigger_refreshes_timestamp() {
        let mut state = ManualAlertState::default();
        state.trigger(at(9));
        state.trigger(at(11));
        assert!(state.is_active());
        assert_eq!(state.triggered_at(), Some(at(11)));
    }

    #[test]
    fn trigger_then_clear_restores_idle() {
        let mut state = ManualAlertState::default();
        let before = state.clone();
        state.trigger(at(9));
        state.clear();
        assert_eq!(state, before);
    }

    #[test]
    fn clear_on_idle_is_noop() {
        let mut state = ManualAlertState::default();
        state.clear();
        assert!(!state.is_active());
        assert_eq!(state.triggered_at(), None);
    }

    #[test]
    fn wire_names() {
        let mut state = ManualAlertState::default();
        state.trigger(at(9));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["manualAlertActive"], true);
        assert!(json["manualAlertTimestamp"].is_string());
    }
}
