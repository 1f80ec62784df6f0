//! The workout log: set numbering, duration recording and per-day views
//! over the rows of a [`SheetStore`].

use crate::errors::LogError;
use crate::models::{DailyTotals, DayReport, DurationOutcome, Exercise, LogRow, SetEntry, DAILY_TARGET};
use crate::storage::{
    RawRow, SheetStore, DATE_COLUMN, DURATION_COLUMN, EXERCISE_COLUMN, REPS_COLUMN,
    SET_INDEX_COLUMN,
};
use chrono::NaiveDate;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// What `record_duration` does when the date has no rows yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationPolicy {
    /// Append a marker row holding only the date and the minutes.
    #[default]
    Upsert,
    /// Only ever write into the first row of the day; with no row the
    /// call fails with [`LogError::LostWrite`].
    AttachToFirstRow,
}

impl FromStr for DurationPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "upsert" => Ok(Self::Upsert),
            "attach" | "attach-to-first-row" => Ok(Self::AttachToFirstRow),
            other => Err(format!("unknown duration policy '{other}' (expected 'upsert' or 'attach')")),
        }
    }
}

pub struct WorkoutLog {
    store: Arc<dyn SheetStore>,
    policy: DurationPolicy,
    // Serializes read-then-write sequences so set indices stay unique.
    write_lock: Mutex<()>,
}

impl WorkoutLog {
    pub fn new(store: Arc<dyn SheetStore>, policy: DurationPolicy) -> Self {
        Self {
            store,
            policy,
            write_lock: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> DurationPolicy {
        self.policy
    }

    /// All parseable rows in insertion order.
    pub async fn load(&self) -> Result<Vec<LogRow>, LogError> {
        let raw = self.store.read_all_rows().await?;
        Ok(parse_rows(&raw))
    }

    /// Appends one set and returns its 1-based index within the day.
    pub async fn append_set(
        &self,
        date: NaiveDate,
        exercise: Exercise,
        reps: u32,
    ) -> Result<u32, LogError> {
        if reps == 0 {
            return Err(LogError::validation("reps must be at least 1"));
        }

        let _guard = self.write_lock.lock().await;
        let rows = self.load().await?;
        let existing = rows
            .iter()
            .filter(|row| row.date == date && row.exercise == Some(exercise))
            .count();
        let set_index = u32::try_from(existing).unwrap_or(u32::MAX).saturating_add(1);

        self.store
            .append_row(vec![
                date_key(date),
                exercise.to_string(),
                set_index.to_string(),
                reps.to_string(),
                String::new(),
            ])
            .await?;

        info!(%date, %exercise, set_index, reps, "set logged");
        Ok(set_index)
    }

    /// Stores the workout duration for `date`; the first write wins.
    pub async fn record_duration(
        &self,
        date: NaiveDate,
        minutes: f64,
    ) -> Result<DurationOutcome, LogError> {
        if !minutes.is_finite() || minutes < 0.0 {
            return Err(LogError::validation("minutes must be a non-negative number"));
        }

        let _guard = self.write_lock.lock().await;
        let raw = self.store.read_all_rows().await?;
        let rows = parse_rows(&raw);
        if duration_for(&rows, date).is_some() {
            info!(%date, minutes, "duration already recorded, keeping the first value");
            return Ok(DurationOutcome::AlreadyRecorded);
        }

        let key = date_key(date);
        let value = minutes.to_string();
        let target = if rows.iter().any(|row| row.date == date) {
            // The first raw row with this date may be one `load` skips;
            // minutes written there would never be read back.
            self.store
                .find_row_matching(&key)
                .await?
                .filter(|handle| {
                    raw.get(handle.0)
                        .map(parse_row)
                        .is_some_and(|row| row.is_ok_and(|row| row.date == date))
                })
        } else {
            None
        };

        match (target, self.policy) {
            (Some(handle), _) => {
                self.store.update_cell(handle, DURATION_COLUMN, value).await?;
            }
            (None, DurationPolicy::Upsert) => {
                self.store
                    .append_row(vec![key, String::new(), String::new(), String::new(), value])
                    .await?;
            }
            (None, DurationPolicy::AttachToFirstRow) => {
                warn!(%date, minutes, "no readable row to attach the duration to");
                return Err(LogError::LostWrite(date));
            }
        }

        info!(%date, minutes, "duration recorded");
        Ok(DurationOutcome::Recorded)
    }
}

/// Summed reps per exercise for `date`.
pub fn daily_totals(rows: &[LogRow], date: NaiveDate) -> DailyTotals {
    rows.iter()
        .filter(|row| row.date == date)
        .fold(DailyTotals::default(), |mut totals, row| {
            if let (Some(exercise), Some(reps)) = (row.exercise, row.reps) {
                totals.add(exercise, reps);
            }
            totals
        })
}

pub fn completion(rows: &[LogRow], date: NaiveDate) -> bool {
    daily_totals(rows, date).is_complete()
}

/// The recorded duration for `date`, if any row of that day holds one.
pub fn duration_for(rows: &[LogRow], date: NaiveDate) -> Option<f64> {
    rows.iter()
        .filter(|row| row.date == date)
        .find_map(|row| row.total_minutes)
}

/// Distinct dates with at least one row, newest first.
pub fn days(rows: &[LogRow]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = rows.iter().map(|row| row.date).collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.dedup();
    dates
}

pub fn day_report(rows: &[LogRow], date: NaiveDate) -> DayReport {
    let totals = daily_totals(rows, date);
    let sets = |exercise: Exercise| -> Vec<SetEntry> {
        let mut sets: Vec<SetEntry> = rows
            .iter()
            .filter(|row| row.date == date && row.exercise == Some(exercise))
            .filter_map(|row| {
                Some(SetEntry {
                    set_index: row.set_index?,
                    reps: row.reps?,
                })
            })
            .collect();
        sets.sort_by_key(|set| set.set_index);
        sets
    };

    DayReport {
        date: date_key(date),
        target: DAILY_TARGET,
        pushup_total: totals.pushup,
        squat_total: totals.squat,
        complete: totals.is_complete(),
        pushup_sets: sets(Exercise::Pushup),
        squat_sets: sets(Exercise::Squat),
        total_minutes: duration_for(rows, date),
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_rows(raw: &[RawRow]) -> Vec<LogRow> {
    raw.iter()
        .enumerate()
        .filter_map(|(position, row)| match parse_row(row) {
            Ok(parsed) => Some(parsed),
            Err(reason) => {
                warn!(row = position + 2, %reason, "skipping unreadable row");
                None
            }
        })
        .collect()
}

fn cell(row: &RawRow, column: usize) -> &str {
    row.get(column - 1).map(|value| value.trim()).unwrap_or("")
}

fn optional<T: FromStr>(row: &RawRow, column: usize, name: &str) -> Result<Option<T>, String> {
    let value = cell(row, column);
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| format!("{name} '{value}' is not a number"))
}

/// Parses a stored row. Dates may carry a time part, which is ignored.
pub fn parse_row(row: &RawRow) -> Result<LogRow, String> {
    let date_text = cell(row, DATE_COLUMN);
    let day_part = date_text.split([' ', 'T']).next().unwrap_or("");
    let date = NaiveDate::parse_from_str(day_part, DATE_FORMAT)
        .map_err(|_| format!("date '{date_text}' is not YYYY-MM-DD"))?;

    let exercise = match cell(row, EXERCISE_COLUMN) {
        "" => None,
        name => Some(name.parse::<Exercise>()?),
    };

    Ok(LogRow {
        date,
        exercise,
        set_index: optional(row, SET_INDEX_COLUMN, "set index")?,
        reps: optional(row, REPS_COLUMN, "reps")?,
        total_minutes: optional(row, DURATION_COLUMN, "total minutes")?,
    })
}
