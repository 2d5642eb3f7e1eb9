use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in the system produces an Event.
/// The CLI prints them; callers embedding the core subscribe to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CheckedIn {
        user_id: String,
        expiration: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    IntervalChanged {
        user_id: String,
        interval_secs: i64,
        expiration: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    AlertTriggered {
        user_id: String,
        at: DateTime<Utc>,
    },
    AlertCleared {
        user_id: String,
        at: DateTime<Utc>,
    },
    PingSent {
        from: String,
        to: String,
        at: DateTime<Utc>,
    },
    /// Sender retracted a ping without waiting for a response.
    PingRetracted {
        from: String,
        to: String,
        at: DateTime<Utc>,
    },
    PingResponded {
        responder: String,
        pinger: String,
        at: DateTime<Utc>,
    },
    ContactAdded {
        owner_id: String,
        contact_id: String,
        is_responder: bool,
        is_dependent: bool,
        at: DateTime<Utc>,
    },
    RolesChanged {
        owner_id: String,
        contact_id: String,
        is_responder: bool,
        is_dependent: bool,
        at: DateTime<Utc>,
    },
    ContactRemoved {
        owner_id: String,
        contact_id: String,
        at: DateTime<Utc>,
    },
}
