//! Property tests for the check-in clock arithmetic.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use vigil_core::checkin::{CheckInInterval, CheckInProfile};

const WEEK_SECS: i64 = 7 * 86_400;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

fn profile(interval_secs: i64) -> CheckInProfile {
    CheckInProfile::new(base(), CheckInInterval::from_secs(interval_secs).unwrap())
}

proptest! {
    #[test]
    fn time_remaining_never_negative(
        interval_secs in 1i64..=WEEK_SECS,
        offset_secs in -86_400i64..=2 * WEEK_SECS,
    ) {
        let profile = profile(interval_secs);
        let now = base() + Duration::seconds(offset_secs);
        let remaining = profile.time_remaining(now);

        prop_assert!(remaining >= Duration::zero());
        if offset_secs >= interval_secs {
            prop_assert_eq!(remaining, Duration::zero());
        }
    }

    #[test]
    fn progress_stays_clamped(
        interval_secs in 1i64..=WEEK_SECS,
        offset_secs in -86_400i64..=2 * WEEK_SECS,
    ) {
        let profile = profile(interval_secs);
        let now = base() + Duration::seconds(offset_secs);
        let progress = profile.progress(now);

        prop_assert!((0.0..=1.0).contains(&progress));
        if offset_secs <= 0 {
            prop_assert_eq!(progress, 0.0);
        }
        if offset_secs >= interval_secs {
            prop_assert_eq!(progress, 1.0);
        }
    }

    #[test]
    fn overdue_strictly_after_expiration(
        interval_secs in 1i64..=WEEK_SECS,
        eps_secs in 1i64..=3600,
    ) {
        let profile = profile(interval_secs);
        let expiration = profile.expiration();

        prop_assert!(!profile.is_overdue(expiration));
        prop_assert!(profile.is_overdue(expiration + Duration::seconds(eps_secs)));
    }

    #[test]
    fn check_in_only_moves_forward(
        interval_secs in 1i64..=WEEK_SECS,
        back_secs in 1i64..=86_400,
    ) {
        let mut profile = profile(interval_secs);
        let earlier = base() - Duration::seconds(back_secs);

        prop_assert!(profile.check_in(earlier).is_err());
        prop_assert_eq!(profile.last_checked_in, base());
    }
}
