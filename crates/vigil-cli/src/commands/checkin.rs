use chrono::Utc;
use clap::Subcommand;
use vigil_core::{
    CheckInInterval, CheckInService, Config, Database, LocalReminderScheduler, ReminderScheduler,
};

use super::common;

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Check in now, resetting the window
    Now,
    /// Print the current check-in status as JSON
    Status,
    /// Change the check-in interval (expiration shifts, the window does
    /// not reset)
    SetInterval {
        /// Interval in hours (8-60 in 8-hour steps on the mobile picker)
        #[arg(long, conflicts_with = "days")]
        hours: Option<i64>,
        /// Interval in days (1-7 on the mobile picker)
        #[arg(long)]
        days: Option<i64>,
    },
    /// List pending reminders and print any that are due
    Reminders,
}

pub fn run(action: CheckinAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let user_id = common::require_user_id(&config)?;
    let db = Database::open()?;
    let mut scheduler = LocalReminderScheduler::new(&db);
    let now = Utc::now();

    match action {
        CheckinAction::Now => {
            let store = common::open_store(&config)?;
            let service = CheckInService::new(&store);
            let event = service.check_in(&user_id, &mut scheduler, now)?;
            common::print_json(&event)?;
        }
        CheckinAction::Status => {
            let store = common::open_store(&config)?;
            let service = CheckInService::new(&store);
            let status = service.status(&user_id, now)?;
            common::print_json(&status)?;
        }
        CheckinAction::SetInterval { hours, days } => {
            let interval = match (hours, days) {
                (Some(h), None) => CheckInInterval::from_hours(h)?,
                (None, Some(d)) => CheckInInterval::from_days(d)?,
                _ => return Err("pass exactly one of --hours or --days".into()),
            };
            let store = common::open_store(&config)?;
            let service = CheckInService::new(&store);
            let event = service.set_interval(&user_id, &mut scheduler, interval, now)?;
            common::print_json(&event)?;
        }
        CheckinAction::Reminders => {
            if config.notifications.enabled {
                let due = scheduler.drain_due(now)?;
                for notification in &due {
                    println!("{}: {}", notification.title, notification.body);
                }
            }
            common::print_json(&scheduler.pending()?)?;
        }
    }
    Ok(())
}
