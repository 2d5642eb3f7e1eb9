//! Check-in clock.
//!
//! Pure wall-clock arithmetic over two stored fields: the last check-in
//! timestamp and the configured interval. Expiration, overdue-ness and the
//! progress ratio are derived, never stored.
//!
//! ## Rules
//!
//! - `expiration = last_checked_in + interval`
//! - overdue strictly AFTER expiration (at the exact instant, not yet)
//! - `time_remaining` floors at zero, `progress` clamps to `[0, 1]`
//! - `last_checked_in` only moves forward

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::reminders::{ReminderId, ReminderScheduler};
use crate::store::DocumentStore;

/// User-configurable check-in interval, always a positive whole-second
/// duration.
///
/// The preset constructors cover the ranges the mobile picker offers:
/// whole days up to a week, or 8-60 hours in 8-hour steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct CheckInInterval {
    secs: i64,
}

impl CheckInInterval {
    /// Construct from whole seconds. Rejects non-positive durations.
    pub fn from_secs(secs: i64) -> Result<Self, ValidationError> {
        if secs <= 0 {
            return Err(ValidationError::NonPositiveInterval { seconds: secs });
        }
        Ok(Self { secs })
    }

    pub fn from_hours(hours: i64) -> Result<Self, ValidationError> {
        Self::from_secs(hours * 3600)
    }

    pub fn from_days(days: i64) -> Result<Self, ValidationError> {
        Self::from_secs(days * 86_400)
    }

    pub fn as_secs(&self) -> i64 {
        self.secs
    }

    pub fn as_duration(&self) -> Duration {
        Duration::seconds(self.secs)
    }

    /// Day presets offered by the picker: 1 through 7 days.
    pub fn day_presets() -> Vec<Self> {
        (1..=7).map(|d| Self { secs: d * 86_400 }).collect()
    }

    /// Hour presets offered by the picker: 8 to 56 hours in 8-hour steps.
    pub fn hour_presets() -> Vec<Self> {
        (1..=7).map(|n| Self { secs: n * 8 * 3600 }).collect()
    }
}

impl Default for CheckInInterval {
    /// One day.
    fn default() -> Self {
        Self { secs: 86_400 }
    }
}

impl TryFrom<i64> for CheckInInterval {
    type Error = ValidationError;

    fn try_from(secs: i64) -> Result<Self, Self::Error> {
        Self::from_secs(secs)
    }
}

impl From<CheckInInterval> for i64 {
    fn from(interval: CheckInInterval) -> i64 {
        interval.secs
    }
}

/// Advisory reminder lead times. Never consulted by overdue logic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPrefs {
    #[serde(rename = "notify30MinBefore", default)]
    pub notify_30_min_before: bool,
    #[serde(rename = "notify2HoursBefore", default)]
    pub notify_2_hours_before: bool,
}

impl ReminderPrefs {
    /// Enabled lead times in minutes, longest lead first.
    pub fn lead_minutes(&self) -> Vec<i64> {
        let mut leads = Vec::new();
        if self.notify_2_hours_before {
            leads.push(120);
        }
        if self.notify_30_min_before {
            leads.push(30);
        }
        leads
    }
}

/// Check-in state for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInProfile {
    #[serde(rename = "lastCheckedIn")]
    pub last_checked_in: DateTime<Utc>,
    #[serde(rename = "checkInInterval")]
    pub interval: CheckInInterval,
    #[serde(flatten)]
    pub reminders: ReminderPrefs,
}

impl CheckInProfile {
    pub fn new(last_checked_in: DateTime<Utc>, interval: CheckInInterval) -> Self {
        Self {
            last_checked_in,
            interval,
            reminders: ReminderPrefs::default(),
        }
    }

    /// Record a check-in at `now`, resetting the window.
    ///
    /// May be called while not yet overdue. `last_checked_in` only moves
    /// forward; an earlier `now` is rejected.
    pub fn check_in(&mut self, now: DateTime<Utc>) -> Result<(), ValidationError> {
        if now < self.last_checked_in {
            return Err(ValidationError::CheckInMovedBackward {
                recorded: self.last_checked_in,
                attempted: now,
            });
        }
        self.last_checked_in = now;
        Ok(())
    }

    /// Replace the interval. Does NOT reset `last_checked_in`; the
    /// expiration shifts implicitly.
    pub fn set_interval(&mut self, interval: CheckInInterval) {
        self.interval = interval;
    }

    pub fn expiration(&self) -> DateTime<Utc> {
        self.last_checked_in + self.interval.as_duration()
    }

    /// Time left until expiration, floored at zero.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Duration {
        let remaining = self.expiration() - now;
        if remaining < Duration::zero() {
            Duration::zero()
        } else {
            remaining
        }
    }

    /// Strictly after expiration. At the exact expiration instant the user
    /// is NOT yet overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.expiration()
    }

    /// Elapsed fraction of the window, clamped to `[0, 1]`.
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        let elapsed = (now - self.last_checked_in).num_seconds() as f64;
        let ratio = elapsed / self.interval.as_secs() as f64;
        ratio.clamp(0.0, 1.0)
    }

    /// Human-readable remaining time, e.g. "1d 3h", "2h 05m", "45m".
    pub fn remaining_label(&self, now: DateTime<Utc>) -> String {
        let remaining = self.time_remaining(now);
        let total_min = remaining.num_minutes();
        let days = total_min / (24 * 60);
        let hours = (total_min % (24 * 60)) / 60;
        let minutes = total_min % 60;
        if days > 0 {
            format!("{days}d {hours}h")
        } else if hours > 0 {
            format!("{hours}h {minutes:02}m")
        } else {
            format!("{minutes}m")
        }
    }

    /// Fire times for every enabled advisory reminder, as
    /// `(lead_minutes, fire_at)` pairs against the current expiration.
    pub fn reminder_times(&self) -> Vec<(i64, DateTime<Utc>)> {
        self.reminders
            .lead_minutes()
            .into_iter()
            .map(|lead| (lead, self.expiration() - Duration::minutes(lead)))
            .collect()
    }
}

/// Snapshot of one user's check-in state with the derived values filled
/// in, ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct CheckInStatus {
    pub profile: CheckInProfile,
    pub expiration: DateTime<Utc>,
    pub overdue: bool,
    pub remaining_secs: i64,
    pub remaining_label: String,
    pub progress: f64,
}

/// Check-in operations against the document store.
///
/// A check-in or interval change also re-derives the advisory reminders:
/// everything scheduled against the old expiration is cancelled and the
/// enabled lead times are scheduled against the new one.
pub struct CheckInService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CheckInService<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    pub fn check_in(
        &self,
        user_id: &str,
        scheduler: &mut dyn ReminderScheduler,
        now: DateTime<Utc>,
    ) -> Result<Event, CoreError> {
        let mut user = self.store.get_user_record(user_id)?;
        user.check_in.check_in(now)?;
        self.store.update_user_record(&user)?;
        reschedule(scheduler, &user.check_in)?;

        Ok(Event::CheckedIn {
            user_id: user_id.to_string(),
            expiration: user.check_in.expiration(),
            at: now,
        })
    }

    pub fn set_interval(
        &self,
        user_id: &str,
        scheduler: &mut dyn ReminderScheduler,
        interval: CheckInInterval,
        now: DateTime<Utc>,
    ) -> Result<Event, CoreError> {
        let mut user = self.store.get_user_record(user_id)?;
        user.check_in.set_interval(interval);
        self.store.update_user_record(&user)?;
        reschedule(scheduler, &user.check_in)?;

        Ok(Event::IntervalChanged {
            user_id: user_id.to_string(),
            interval_secs: interval.as_secs(),
            expiration: user.check_in.expiration(),
            at: now,
        })
    }

    pub fn status(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<CheckInStatus, CoreError> {
        let user = self.store.get_user_record(user_id)?;
        let profile = user.check_in;
        Ok(CheckInStatus {
            expiration: profile.expiration(),
            overdue: profile.is_overdue(now),
            remaining_secs: profile.time_remaining(now).num_seconds(),
            remaining_label: profile.remaining_label(now),
            progress: profile.progress(now),
            profile,
        })
    }
}

fn reschedule(
    scheduler: &mut dyn ReminderScheduler,
    profile: &CheckInProfile,
) -> Result<(), CoreError> {
    let old: Vec<ReminderId> = scheduler
        .pending()?
        .into_iter()
        .map(|r| r.id)
        .collect();
    scheduler.cancel(&old)?;
    for (lead, _fire_at) in profile.reminder_times() {
        scheduler.schedule(profile.expiration(), lead)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn day_profile() -> CheckInProfile {
        CheckInProfile::new(t0(), CheckInInterval::from_hours(24).unwrap())
    }

    #[test]
    fn rejects_non_positive_interval() {
        assert!(CheckInInterval::from_secs(0).is_err());
        assert!(CheckInInterval::from_secs(-5).is_err());
        assert!(CheckInInterval::from_secs(1).is_ok());
    }

    #[test]
    fn not_overdue_at_exact_expiration() {
        let profile = day_profile();
        let expiration = profile.expiration();
        assert!(!profile.is_overdue(expiration));
        assert!(profile.is_overdue(expiration + Duration::seconds(1)));
    }

    #[test]
    fn time_remaining_floors_at_zero() {
        let profile = day_profile();
        let expiration = profile.expiration();
        assert_eq!(profile.time_remaining(expiration), Duration::zero());
        assert_eq!(
            profile.time_remaining(expiration + Duration::hours(5)),
            Duration::zero()
        );
        assert_eq!(
            profile.time_remaining(t0() + Duration::hours(23)),
            Duration::hours(1)
        );
    }

    #[test]
    fn progress_clamps_both_ends() {
        let profile = day_profile();
        assert_eq!(profile.progress(t0()), 0.0);
        assert_eq!(profile.progress(t0() - Duration::hours(1)), 0.0);
        assert_eq!(profile.progress(t0() + Duration::hours(48)), 1.0);
        let halfway = profile.progress(t0() + Duration::hours(12));
        assert!((halfway - 0.5).abs() < 1e-9);
    }

    #[test]
    fn day_before_expiry_scenario() {
        // interval=24h, lastCheckedIn=T: at T+23h59m not overdue and
        // progress just under 1; at T+24h00m01s overdue with zero left.
        let profile = day_profile();
        let near = t0() + Duration::hours(23) + Duration::minutes(59);
        assert!(!profile.is_overdue(near));
        assert!(profile.progress(near) > 0.999);

        let past = t0() + Duration::hours(24) + Duration::seconds(1);
        assert!(profile.is_overdue(past));
        assert_eq!(profile.time_remaining(past), Duration::zero());
    }

    #[test]
    fn check_in_resets_window_early() {
        let mut profile = day_profile();
        let later = t0() + Duration::hours(6);
        profile.check_in(later).unwrap();
        assert_eq!(profile.last_checked_in, later);
        assert_eq!(profile.expiration(), later + Duration::hours(24));
    }

    #[test]
    fn check_in_never_moves_backward() {
        let mut profile = day_profile();
        let earlier = t0() - Duration::minutes(1);
        assert!(profile.check_in(earlier).is_err());
        assert_eq!(profile.last_checked_in, t0());
        // Same instant is allowed.
        profile.check_in(t0()).unwrap();
    }

    #[test]
    fn set_interval_keeps_last_checked_in() {
        let mut profile = day_profile();
        profile.set_interval(CheckInInterval::from_hours(8).unwrap());
        assert_eq!(profile.last_checked_in, t0());
        assert_eq!(profile.expiration(), t0() + Duration::hours(8));
    }

    #[test]
    fn reminder_times_follow_expiration() {
        let mut profile = day_profile();
        profile.reminders.notify_30_min_before = true;
        profile.reminders.notify_2_hours_before = true;
        let times = profile.reminder_times();
        assert_eq!(times.len(), 2);
        assert_eq!(times[0], (120, profile.expiration() - Duration::hours(2)));
        assert_eq!(times[1], (30, profile.expiration() - Duration::minutes(30)));
    }

    #[test]
    fn presets_are_positive_and_bounded() {
        let days = CheckInInterval::day_presets();
        assert_eq!(days.first().unwrap().as_secs(), 86_400);
        assert_eq!(days.last().unwrap().as_secs(), 7 * 86_400);

        let hours = CheckInInterval::hour_presets();
        assert_eq!(hours.first().unwrap().as_secs(), 8 * 3600);
        assert_eq!(hours.last().unwrap().as_secs(), 56 * 3600);
    }

    #[test]
    fn remaining_label_formats() {
        let profile = day_profile();
        assert_eq!(profile.remaining_label(t0()), "1d 0h");
        assert_eq!(
            profile.remaining_label(t0() + Duration::hours(22)),
            "2h 00m"
        );
        assert_eq!(
            profile.remaining_label(t0() + Duration::hours(23) + Duration::minutes(15)),
            "45m"
        );
        assert_eq!(
            profile.remaining_label(t0() + Duration::hours(30)),
            "0m"
        );
    }

    #[test]
    fn interval_serializes_as_seconds() {
        let profile = day_profile();
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["checkInInterval"], 86_400);
        assert_eq!(json["notify30MinBefore"], false);
    }
}
