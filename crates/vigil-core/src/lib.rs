//! # Vigil Core Library
//!
//! This library provides the core logic for Vigil, a safety check-in
//! application: users check in on a configurable interval, designated
//! responder contacts see their overdue/alert state, and contacts
//! exchange lightweight pings. It implements a CLI-first philosophy where
//! all operations are available via a standalone CLI binary; any GUI is a
//! thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Check-in clock**: pure wall-clock arithmetic over the last
//!   check-in timestamp and the configured interval
//! - **Alert / ping state**: small explicit state machines, mirrored to
//!   contacts through sequential per-record writes with structured
//!   partial-failure reporting
//! - **Store**: CRUD trait over the hosted document platform, with an
//!   in-memory implementation for tests and a reqwest-backed one for real
//!   use
//! - **Storage**: TOML configuration and SQLite-persisted reminders
//!
//! ## Key Components
//!
//! - [`CheckInProfile`]: the clock's stored fields and derived values
//! - [`AlertService`] / [`PingService`] / [`ContactService`]: operations
//!   against a [`DocumentStore`]
//! - [`FanOutReport`]: per-contact outcome of a mirror fan-out
//! - [`Config`] / [`Database`]: local configuration and state

pub mod alert;
pub mod checkin;
pub mod contacts;
pub mod error;
pub mod events;
pub mod fanout;
pub mod ping;
pub mod reminders;
pub mod storage;
pub mod store;

pub use alert::{AlertService, AlertUpdate, ManualAlertState};
pub use checkin::{CheckInInterval, CheckInProfile, CheckInService, CheckInStatus, ReminderPrefs};
pub use contacts::{ContactService, Watchlist, WatchlistEntry};
pub use error::{ConfigError, CoreError, DatabaseError, SessionError, StoreError, ValidationError};
pub use events::Event;
pub use fanout::{FanOutFailure, FanOutReport};
pub use ping::PingService;
pub use reminders::{LocalReminderScheduler, Notification, Reminder, ReminderScheduler};
pub use storage::{Config, Database};
pub use store::{
    ContactRecord, Directory, DocumentStore, HttpStore, InviteDetails, MemoryDirectory,
    MemoryStore, UserRecord,
};
