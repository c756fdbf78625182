// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, ReferenceZone, duration_until};
use chrono::{DateTime, TimeZone, Utc};

fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap()
}

fn new_york() -> ReferenceZone {
    ReferenceZone::named("America/New_York").unwrap()
}

#[test]
fn test_midweek_anchor_is_next_monday_midnight_local() {
    // Wednesday, EDT (UTC-4)
    let now: DateTime<Utc> = utc(2026, 10, 21, 12, 0);
    let anchor: DateTime<Utc> = new_york().next_weekly_anchor(now).unwrap();
    assert_eq!(anchor, utc(2026, 10, 26, 4, 0));
}

#[test]
fn test_anchor_after_dst_ends_uses_standard_offset() {
    // Wednesday before the November transition; Monday is EST (UTC-5)
    let now: DateTime<Utc> = utc(2026, 10, 28, 12, 0);
    let anchor: DateTime<Utc> = new_york().next_weekly_anchor(now).unwrap();
    assert_eq!(anchor, utc(2026, 11, 2, 5, 0));
}

#[test]
fn test_now_exactly_on_boundary_advances_a_full_week() {
    let boundary: DateTime<Utc> = utc(2026, 10, 26, 4, 0);
    let anchor: DateTime<Utc> = new_york().next_weekly_anchor(boundary).unwrap();
    assert_eq!(anchor, utc(2026, 11, 2, 5, 0));
}

#[test]
fn test_monday_morning_waits_for_following_monday() {
    // Monday 06:00 EDT
    let now: DateTime<Utc> = utc(2026, 10, 19, 10, 0);
    let anchor: DateTime<Utc> = new_york().next_weekly_anchor(now).unwrap();
    assert_eq!(anchor, utc(2026, 10, 26, 4, 0));
}

#[test]
fn test_local_sunday_evening_uses_local_calendar() {
    // Already Monday in UTC but still Sunday 22:00 in New York
    let now: DateTime<Utc> = utc(2026, 10, 26, 2, 0);
    let anchor: DateTime<Utc> = new_york().next_weekly_anchor(now).unwrap();
    assert_eq!(anchor, utc(2026, 10, 26, 4, 0));
    assert_eq!(
        duration_until(anchor, now),
        std::time::Duration::from_secs(2 * 3600)
    );
}

#[test]
fn test_fixed_offset_anchor() {
    let zone: ReferenceZone = ReferenceZone::fixed(0).unwrap();
    let now: DateTime<Utc> = utc(2026, 10, 21, 12, 0);
    assert_eq!(
        zone.next_weekly_anchor(now).unwrap(),
        utc(2026, 10, 26, 0, 0)
    );
}

#[test]
fn test_fallback_offset_anchor_is_midnight_utc_minus_five() {
    let zone: ReferenceZone = ReferenceZone::fixed(-5 * 3600).unwrap();
    assert!(matches!(zone, ReferenceZone::Fixed(_)));

    let now: DateTime<Utc> = utc(2026, 10, 21, 12, 0);
    assert_eq!(
        zone.next_weekly_anchor(now).unwrap(),
        utc(2026, 10, 26, 5, 0)
    );
}

#[test]
fn test_invalid_zone_and_offset_is_an_error() {
    assert_eq!(
        ReferenceZone::named("Nowhere/Atlantis"),
        Err(DomainError::InvalidTimezone(String::from("Nowhere/Atlantis")))
    );
    assert_eq!(
        ReferenceZone::fixed(100_000),
        Err(DomainError::InvalidUtcOffset(100_000))
    );
}

#[test]
fn test_duration_until_past_target_is_zero() {
    let now: DateTime<Utc> = utc(2026, 10, 21, 12, 0);
    let past: DateTime<Utc> = utc(2026, 10, 20, 12, 0);
    assert_eq!(duration_until(past, now), std::time::Duration::ZERO);
}

#[test]
fn test_anchor_is_always_in_the_future() {
    let zone: ReferenceZone = new_york();
    let mut now: DateTime<Utc> = utc(2026, 3, 1, 0, 0);
    for _ in 0..(24 * 21) {
        let anchor: DateTime<Utc> = zone.next_weekly_anchor(now).unwrap();
        assert!(anchor > now);
        assert!(anchor - now <= chrono::TimeDelta::days(7));
        now += chrono::TimeDelta::hours(1);
    }
}
