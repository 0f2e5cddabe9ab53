//! Tests for status classification from session age
//!
//! Bands are half-open and inclusive on the lower bound.

use office_status::data::{AgentStatus, NO_SESSION_AGE, UNKNOWN_AGE};
use office_status::integrations::openclaw::status::{age_minutes, classify_age};

mod busy_status {
    use super::*;

    #[test]
    fn returns_busy_when_updated_just_now() {
        assert_eq!(classify_age(0), AgentStatus::Busy);
    }

    #[test]
    fn returns_busy_at_one_minute() {
        assert_eq!(classify_age(1), AgentStatus::Busy);
    }
}

mod online_status {
    use super::*;

    #[test]
    fn returns_online_at_exactly_2_minutes() {
        assert_eq!(classify_age(2), AgentStatus::Online);
    }

    #[test]
    fn returns_online_at_9_minutes() {
        assert_eq!(classify_age(9), AgentStatus::Online);
    }
}

mod idle_status {
    use super::*;

    #[test]
    fn returns_idle_at_exactly_10_minutes() {
        assert_eq!(classify_age(10), AgentStatus::Idle);
    }

    #[test]
    fn returns_idle_at_59_minutes() {
        assert_eq!(classify_age(59), AgentStatus::Idle);
    }
}

mod offline_status {
    use super::*;

    #[test]
    fn returns_offline_at_exactly_60_minutes() {
        assert_eq!(classify_age(60), AgentStatus::Offline);
    }

    #[test]
    fn returns_offline_for_large_ages() {
        assert_eq!(classify_age(1000), AgentStatus::Offline);
        assert_eq!(classify_age(UNKNOWN_AGE), AgentStatus::Offline);
    }
}

mod edge_cases {
    use super::*;

    #[test]
    fn negative_age_follows_same_rule() {
        assert_eq!(classify_age(-3), AgentStatus::Busy);
    }

    #[test]
    fn future_timestamp_is_age_zero_not_no_session() {
        let now = 1_700_000_000_000;
        let age = age_minutes(Some(now + 5_000), now);
        assert_eq!(age, 0);
        assert_ne!(age, NO_SESSION_AGE);
        assert_eq!(classify_age(age), AgentStatus::Busy);
    }

    #[test]
    fn most_negative_timestamp_is_offline_without_panicking() {
        let age = age_minutes(Some(i64::MIN), 1_700_000_000_000);
        assert!(age > 0);
        assert_eq!(classify_age(age), AgentStatus::Offline);
    }

    #[test]
    fn ninety_seconds_is_one_minute_and_busy() {
        let now = 1_700_000_000_000;
        let age = age_minutes(Some(now - 90_000), now);
        assert_eq!(age, 1);
        assert_eq!(classify_age(age), AgentStatus::Busy);
    }
}
