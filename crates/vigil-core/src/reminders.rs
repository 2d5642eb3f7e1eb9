//! Advisory check-in reminders.
//!
//! Reminders are local and advisory only: they never affect overdue
//! determination. Each enabled lead time maps to one scheduled reminder at
//! `expiration - lead`. A check-in or interval change cancels everything
//! scheduled against the old expiration and schedules fresh reminders
//! against the new one.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::CoreError;
use crate::storage::Database;

pub type ReminderId = String;

/// One scheduled advisory reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub fire_at: DateTime<Utc>,
    pub lead_minutes: i64,
    /// Expiration the reminder was computed against.
    pub expiration: DateTime<Utc>,
}

/// A user-facing notification, ready for whatever surface displays it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub metadata: serde_json::Value,
}

/// Scheduling surface for advisory reminders.
pub trait ReminderScheduler {
    fn schedule(
        &mut self,
        expiration: DateTime<Utc>,
        lead_minutes: i64,
    ) -> Result<ReminderId, CoreError>;

    fn cancel(&mut self, ids: &[ReminderId]) -> Result<(), CoreError>;

    fn pending(&self) -> Result<Vec<Reminder>, CoreError>;
}

/// SQLite-persisted scheduler, so reminders survive process restarts.
pub struct LocalReminderScheduler<'a> {
    db: &'a Database,
}

impl<'a> LocalReminderScheduler<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Remove every reminder whose fire time has passed and return the
    /// notifications to display for them.
    pub fn drain_due(&mut self, now: DateTime<Utc>) -> Result<Vec<Notification>, CoreError> {
        let due = self.db.due_reminders(now)?;
        let mut notifications = Vec::with_capacity(due.len());
        for reminder in due {
            self.db.delete_reminders(&[reminder.id.clone()])?;
            notifications.push(notification_for(&reminder));
        }
        Ok(notifications)
    }
}

impl ReminderScheduler for LocalReminderScheduler<'_> {
    fn schedule(
        &mut self,
        expiration: DateTime<Utc>,
        lead_minutes: i64,
    ) -> Result<ReminderId, CoreError> {
        let reminder = Reminder {
            id: uuid::Uuid::new_v4().to_string(),
            fire_at: expiration - Duration::minutes(lead_minutes),
            lead_minutes,
            expiration,
        };
        self.db.insert_reminder(&reminder)?;
        Ok(reminder.id)
    }

    fn cancel(&mut self, ids: &[ReminderId]) -> Result<(), CoreError> {
        self.db.delete_reminders(ids)?;
        Ok(())
    }

    fn pending(&self) -> Result<Vec<Reminder>, CoreError> {
        Ok(self.db.list_reminders()?)
    }
}

fn format_lead(lead_minutes: i64) -> String {
    if lead_minutes % 60 == 0 {
        let hours = lead_minutes / 60;
        if hours == 1 {
            "1 hour".to_string()
        } else {
            format!("{hours} hours")
        }
    } else {
        format!("{lead_minutes} minutes")
    }
}

fn notification_for(reminder: &Reminder) -> Notification {
    Notification {
        title: "Check-in reminder".to_string(),
        body: format!(
            "Your check-in window ends in {}",
            format_lead(reminder.lead_minutes)
        ),
        metadata: json!({
            "expiration": reminder.expiration.to_rfc3339(),
            "leadMinutes": reminder.lead_minutes,
        }),
    }
}
