use crate::log::{date_key, daily_totals, days};
use crate::models::{CHALLENGE_LENGTH, DailyPoint, LogRow, StatsResponse};
use chrono::{Duration, Local, NaiveDate};
use std::collections::BTreeSet;

pub fn build_stats(rows: &[LogRow]) -> StatsResponse {
    build_stats_at(Local::now().date_naive(), rows)
}

pub fn build_stats_at(today: NaiveDate, rows: &[LogRow]) -> StatsResponse {
    let logged = days(rows);
    let completed: BTreeSet<NaiveDate> = logged
        .iter()
        .copied()
        .filter(|date| daily_totals(rows, *date).is_complete())
        .collect();

    let mut last_7_days = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let date = today - Duration::days(offset);
        let totals = daily_totals(rows, date);
        last_7_days.push(DailyPoint {
            date: date_key(date),
            pushup: totals.pushup,
            squat: totals.squat,
            complete: totals.is_complete(),
        });
    }

    let challenge_day = logged.last().map(|first| {
        let elapsed = (today - *first).num_days().max(0) + 1;
        u32::try_from(elapsed).unwrap_or(u32::MAX)
    });

    StatsResponse {
        challenge_length: CHALLENGE_LENGTH,
        challenge_day,
        days_logged: u32::try_from(logged.len()).unwrap_or(u32::MAX),
        days_completed: u32::try_from(completed.len()).unwrap_or(u32::MAX),
        current_streak: current_streak(today, &completed),
        last_7_days,
    }
}

/// Consecutive completed days ending today. An unfinished today does not
/// break the streak; it simply counts from yesterday.
fn current_streak(today: NaiveDate, completed: &BTreeSet<NaiveDate>) -> u32 {
    let mut cursor = if completed.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };
    let mut streak = 0;
    while completed.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}
