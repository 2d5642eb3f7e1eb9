//! Directed ping protocol.
//!
//! A ping is a lightweight "please check in or respond" request between
//! contacts. Per ordered pair there are two one-bit signals: the sender's
//! outgoing flag and the mirrored incoming flag on the recipient's record,
//! each with a timestamp present iff the flag is set. A ping persists
//! until the sender retracts it or the recipient responds; there is no
//! rate limiting, dedup window, or expiry.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, StoreError};
use crate::events::Event;
use crate::fanout::FanOutReport;
use crate::store::DocumentStore;

/// Ping operations against the document store.
pub struct PingService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> PingService<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Send a ping from `from` to `to`: set the sender's outgoing pair and
    /// mirror the incoming pair onto the recipient's record.
    pub fn ping(&self, from: &str, to: &str, now: DateTime<Utc>) -> Result<Event, CoreError> {
        let mut outgoing = self.store.get_contact(from, to)?;
        outgoing.set_outgoing_ping(now);
        self.store.put_contact(from, &outgoing)?;

        let mut incoming = self.store.get_contact(to, from)?;
        incoming.set_incoming_ping(now);
        self.store.put_contact(to, &incoming)?;

        Ok(Event::PingSent {
            from: from.to_string(),
            to: to.to_string(),
            at: now,
        })
    }

    /// Sender voluntarily retracts a ping: clears the outgoing pair on the
    /// sender's side only. The recipient's incoming mirror is left as-is
    /// and clears when they respond.
    pub fn retract(&self, from: &str, to: &str, now: DateTime<Utc>) -> Result<Event, CoreError> {
        let mut outgoing = self.store.get_contact(from, to)?;
        outgoing.clear_outgoing_ping();
        self.store.put_contact(from, &outgoing)?;

        Ok(Event::PingRetracted {
            from: from.to_string(),
            to: to.to_string(),
            at: now,
        })
    }

    /// Respond to a ping from `pinger`: clears the responder's incoming
    /// pair and the pinger's mirrored outgoing pair.
    pub fn respond(
        &self,
        responder: &str,
        pinger: &str,
        now: DateTime<Utc>,
    ) -> Result<Event, CoreError> {
        self.respond_one(responder, pinger)?;
        Ok(Event::PingResponded {
            responder: responder.to_string(),
            pinger: pinger.to_string(),
            at: now,
        })
    }

    /// Respond to every incoming ping, one relationship at a time, in no
    /// particular order. There is no batch atomicity: each item succeeds or
    /// fails on its own and the report carries the split.
    pub fn respond_to_all(
        &self,
        responder: &str,
        now: DateTime<Utc>,
    ) -> Result<(Vec<Event>, FanOutReport), CoreError> {
        let contacts = self.store.list_contacts(responder)?;
        let mut report = FanOutReport::new();
        let mut events = Vec::new();

        for contact in contacts.iter().filter(|c| c.has_incoming_ping) {
            let result = self.respond_one(responder, &contact.contact_id);
            if result.is_ok() {
                events.push(Event::PingResponded {
                    responder: responder.to_string(),
                    pinger: contact.contact_id.clone(),
                    at: now,
                });
            }
            report.record(&contact.contact_id, result);
        }
        Ok((events, report))
    }

    /// Clear both sides of one ping: the responder's incoming pair and the
    /// pinger's outgoing pair.
    fn respond_one(&self, responder: &str, pinger: &str) -> Result<(), StoreError> {
        let mut incoming = self.store.get_contact(responder, pinger)?;
        incoming.clear_incoming_ping();
        self.store.put_contact(responder, &incoming)?;

        let mut outgoing = self.store.get_contact(pinger, responder)?;
        outgoing.clear_outgoing_ping();
        self.store.put_contact(pinger, &outgoing)?;
        Ok(())
    }
}
