//! Golden-time tests for the cron evaluator.

use bareclaw::cron::expr::{
    format_cron_expr, next_run_after, parse_cron_expr, timestamp_to_broken,
};

/// 2024-01-15T08:30:00Z (a Monday).
const MON_0830: i64 = 1_705_307_400;

#[test]
fn test_daily_nine_am_golden() {
    let expr = parse_cron_expr("0 9 * * *").unwrap();
    // 2024-01-15T09:00:00Z.
    assert_eq!(next_run_after(&expr, MON_0830), 1_705_309_200);
}

#[test]
fn test_year_boundary() {
    // 2023-12-31T23:30:00Z → @daily fires at 2024-01-01T00:00:00Z.
    let expr = parse_cron_expr("@daily").unwrap();
    let from = 1_704_065_400;
    let next = next_run_after(&expr, from);
    assert_eq!(next, 1_704_067_200);
    let bt = timestamp_to_broken(next);
    assert_eq!((bt.year, bt.month, bt.day), (2024, 1, 1));
}

#[test]
fn test_weekly_lands_on_sunday() {
    let expr = parse_cron_expr("@weekly").unwrap();
    let next = next_run_after(&expr, MON_0830);
    let bt = timestamp_to_broken(next);
    assert_eq!(bt.dow, 0, "weekly fires on Sunday");
    assert_eq!((bt.hour, bt.minute), (0, 0));
    // The Sunday after Monday 2024-01-15 is 2024-01-21.
    assert_eq!((bt.month, bt.day), (1, 21));
}

#[test]
fn test_every_minute_window() {
    let expr = parse_cron_expr("* * * * *").unwrap();
    for t in [MON_0830 - 1, MON_0830, MON_0830 + 30] {
        let next = next_run_after(&expr, t);
        assert!(next > t && next <= t + 120);
    }
}

#[test]
fn test_hourly_alias_golden() {
    let expr = parse_cron_expr("@hourly").unwrap();
    // 08:30 → 09:00.
    assert_eq!(next_run_after(&expr, MON_0830), 1_705_309_200);
}

#[test]
fn test_format_round_trip_through_scheduler() {
    // A schedule survives format → parse → next_run unchanged.
    let original = parse_cron_expr("*/15 8 * * 1").unwrap();
    let reparsed = parse_cron_expr(&format_cron_expr(&original)).unwrap();
    assert_eq!(
        next_run_after(&original, MON_0830),
        next_run_after(&reparsed, MON_0830)
    );
}

#[test]
fn test_leap_february() {
    // 2024 is a leap year: "0 12 29 2 *" fires on 2024-02-29.
    let expr = parse_cron_expr("0 12 29 2 *").unwrap();
    let next = next_run_after(&expr, MON_0830);
    let bt = timestamp_to_broken(next);
    assert_eq!((bt.year, bt.month, bt.day), (2024, 2, 29));
    assert_eq!((bt.hour, bt.minute), (12, 0));
}
