use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reps per exercise needed for a challenge day to count as complete.
pub const DAILY_TARGET: u32 = 100;

/// Length of the challenge in days.
pub const CHALLENGE_LENGTH: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Exercise {
    #[serde(alias = "pushup")]
    Pushup,
    #[serde(alias = "squat")]
    Squat,
}

impl Exercise {
    pub const ALL: [Exercise; 2] = [Exercise::Pushup, Exercise::Squat];

    pub fn as_str(self) -> &'static str {
        match self {
            Exercise::Pushup => "Pushup",
            Exercise::Squat => "Squat",
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exercise {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pushup" => Ok(Exercise::Pushup),
            "squat" => Ok(Exercise::Squat),
            other => Err(format!("unknown exercise '{other}'")),
        }
    }
}

/// One parsed record of the workout table.
///
/// A row without an exercise is a duration marker: only `date` and
/// `total_minutes` are meaningful.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRow {
    pub date: NaiveDate,
    pub exercise: Option<Exercise>,
    pub set_index: Option<u32>,
    pub reps: Option<u32>,
    pub total_minutes: Option<f64>,
}

impl LogRow {
    pub fn is_duration_marker(&self) -> bool {
        self.exercise.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DailyTotals {
    pub pushup: u32,
    pub squat: u32,
}

impl DailyTotals {
    pub fn total(&self, exercise: Exercise) -> u32 {
        match exercise {
            Exercise::Pushup => self.pushup,
            Exercise::Squat => self.squat,
        }
    }

    pub(crate) fn add(&mut self, exercise: Exercise, reps: u32) {
        let slot = match exercise {
            Exercise::Pushup => &mut self.pushup,
            Exercise::Squat => &mut self.squat,
        };
        *slot = slot.saturating_add(reps);
    }

    pub fn is_complete(&self) -> bool {
        self.pushup >= DAILY_TARGET && self.squat >= DAILY_TARGET
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationOutcome {
    Recorded,
    AlreadyRecorded,
}

#[derive(Debug, Deserialize)]
pub struct AddSetRequest {
    pub exercise: Exercise,
    pub reps: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddSetResponse {
    pub exercise: Exercise,
    pub set_index: u32,
    pub reps: u32,
    pub today: DayReport,
}

#[derive(Debug, Deserialize)]
pub struct DurationRequest {
    pub minutes: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DurationResponse {
    pub date: String,
    pub minutes: f64,
    pub outcome: DurationOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetEntry {
    pub set_index: u32,
    pub reps: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayReport {
    pub date: String,
    pub target: u32,
    pub pushup_total: u32,
    pub squat_total: u32,
    pub complete: bool,
    pub pushup_sets: Vec<SetEntry>,
    pub squat_sets: Vec<SetEntry>,
    pub total_minutes: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: String,
    pub pushup: u32,
    pub squat: u32,
    pub complete: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub challenge_length: u32,
    pub challenge_day: Option<u32>,
    pub days_logged: u32,
    pub days_completed: u32,
    pub current_streak: u32,
    pub last_7_days: Vec<DailyPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TimerStopResponse {
    pub minutes: u32,
    pub outcome: DurationOutcome,
}
