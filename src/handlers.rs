use crate::errors::{AppError, LogError};
use crate::log::{date_key, day_report, DATE_FORMAT};
use crate::models::{
    AddSetRequest, AddSetResponse, DayReport, DurationOutcome, DurationRequest, DurationResponse,
    Exercise, LogRow, StatsResponse, TimerStopResponse,
};
use crate::session::TimerSession;
use crate::state::AppState;
use crate::stats::build_stats;
use crate::ui::{render_index, Notice, PageView, Tab};
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::{Local, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{error, warn};

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    tab: Option<String>,
    day: Option<String>,
    started_at: Option<i64>,
    notice: Option<String>,
    exercise: Option<Exercise>,
    set: Option<u32>,
    reps: Option<u32>,
    minutes: Option<u32>,
}

impl IndexQuery {
    fn notice(&self) -> Option<Notice> {
        let minutes = self.minutes.unwrap_or_default();
        match self.notice.as_deref()? {
            "set_added" => Some(Notice::SetAdded {
                exercise: self.exercise?,
                set_index: self.set?,
                reps: self.reps?,
            }),
            "timer_started" => Some(Notice::TimerStarted),
            "timer_idle" => Some(Notice::TimerIdle),
            "duration_recorded" => Some(Notice::DurationRecorded(minutes)),
            "duration_kept" => Some(Notice::DurationKept(minutes)),
            "duration_lost" => Some(Notice::DurationLost(minutes)),
            "invalid_input" => Some(Notice::InvalidInput),
            "store_error" => Some(Notice::StoreUnavailable),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddSetForm {
    exercise: String,
    reps: String,
}

pub async fn index(State(state): State<AppState>, Query(query): Query<IndexQuery>) -> Html<String> {
    let loaded = state.log.load().await;
    if let Err(err) = &loaded {
        error!("failed to load workout log: {err}");
    }

    let view = PageView {
        today: today(),
        tab: Tab::parse(query.tab.as_deref()),
        selected_day: query.day.as_deref().and_then(|day| parse_date(day).ok()),
        timer: TimerSession {
            started_at: query.started_at,
        },
        notice: query.notice(),
        rows: loaded.as_deref().map_err(|err| err.to_string()),
    };
    Html(render_index(&view))
}

pub async fn get_rows(State(state): State<AppState>) -> Result<Json<Vec<LogRow>>, AppError> {
    Ok(Json(state.log.load().await?))
}

pub async fn get_today(State(state): State<AppState>) -> Result<Json<DayReport>, AppError> {
    let rows = state.log.load().await?;
    Ok(Json(day_report(&rows, today())))
}

pub async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DayReport>, AppError> {
    let date = parse_date(&date)?;
    let rows = state.log.load().await?;
    Ok(Json(day_report(&rows, date)))
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let rows = state.log.load().await?;
    Ok(Json(build_stats(&rows)))
}

pub async fn add_set(
    State(state): State<AppState>,
    Json(payload): Json<AddSetRequest>,
) -> Result<Json<AddSetResponse>, AppError> {
    let reps = reps_from(payload.reps)?;
    let (set_index, today) = apply_set(&state, payload.exercise, reps).await?;
    let rows = state.log.load().await?;

    Ok(Json(AddSetResponse {
        exercise: payload.exercise,
        set_index,
        reps,
        today: day_report(&rows, today),
    }))
}

pub async fn add_set_form(
    State(state): State<AppState>,
    Form(form): Form<AddSetForm>,
) -> Redirect {
    match submit_set(&state, &form).await {
        Ok((exercise, set_index, reps)) => Redirect::to(&format!(
            "/?tab=today&notice=set_added&exercise={exercise}&set={set_index}&reps={reps}"
        )),
        Err(err) => failure_redirect(Tab::Today, &err, None),
    }
}

pub async fn record_duration(
    State(state): State<AppState>,
    Json(payload): Json<DurationRequest>,
) -> Result<Json<DurationResponse>, AppError> {
    let date = today();
    let outcome = state.log.record_duration(date, payload.minutes).await?;
    Ok(Json(DurationResponse {
        date: date_key(date),
        minutes: payload.minutes,
        outcome,
    }))
}

pub async fn timer_start() -> Json<TimerSession> {
    Json(TimerSession::start(now()))
}

pub async fn timer_stop(
    State(state): State<AppState>,
    Json(session): Json<TimerSession>,
) -> Result<Json<TimerStopResponse>, AppError> {
    let (minutes, _) = session.stop(now())?;
    let outcome = state.log.record_duration(today(), f64::from(minutes)).await?;
    Ok(Json(TimerStopResponse { minutes, outcome }))
}

pub async fn timer_start_form() -> Redirect {
    Redirect::to(&format!(
        "/?tab=timer&notice=timer_started&started_at={}",
        now()
    ))
}

pub async fn timer_stop_form(
    State(state): State<AppState>,
    Form(session): Form<TimerSession>,
) -> Redirect {
    let minutes = match session.stop(now()) {
        Ok((minutes, _)) => minutes,
        Err(err) => {
            warn!("timer stop rejected: {err}");
            return Redirect::to("/?tab=timer&notice=timer_idle");
        }
    };

    let notice = match state.log.record_duration(today(), f64::from(minutes)).await {
        Ok(DurationOutcome::Recorded) => "duration_recorded",
        Ok(DurationOutcome::AlreadyRecorded) => "duration_kept",
        Err(LogError::LostWrite(_)) => "duration_lost",
        Err(err) => return failure_redirect(Tab::Timer, &err, session.started_at),
    };
    Redirect::to(&format!(
        "/?tab=timer&notice={notice}&minutes={minutes}"
    ))
}

async fn apply_set(
    state: &AppState,
    exercise: Exercise,
    reps: u32,
) -> Result<(u32, NaiveDate), AppError> {
    let date = today();
    let set_index = state.log.append_set(date, exercise, reps).await?;
    Ok((set_index, date))
}

async fn submit_set(state: &AppState, form: &AddSetForm) -> Result<(Exercise, u32, u32), LogError> {
    let exercise: Exercise = form.exercise.parse().map_err(LogError::Validation)?;
    let reps = form
        .reps
        .trim()
        .parse::<i64>()
        .map_err(|_| LogError::validation(format!("reps '{}' is not a whole number", form.reps)))?;
    let reps = reps_from(reps)?;
    let set_index = state.log.append_set(today(), exercise, reps).await?;
    Ok((exercise, set_index, reps))
}

/// Sends a failed form post back to the dashboard with a notice. A running
/// timer is handed back so the user can retry.
fn failure_redirect(tab: Tab, err: &LogError, started_at: Option<i64>) -> Redirect {
    let notice = match err {
        LogError::Connection(_) => {
            error!("form submission failed: {err}");
            "store_error"
        }
        LogError::Validation(_) | LogError::LostWrite(_) => {
            warn!("form submission rejected: {err}");
            "invalid_input"
        }
    };
    let mut url = format!("/?tab={}&notice={notice}", tab.key());
    if let Some(started_at) = started_at {
        url.push_str(&format!("&started_at={started_at}"));
    }
    Redirect::to(&url)
}

fn reps_from(reps: i64) -> Result<u32, LogError> {
    u32::try_from(reps).map_err(|_| LogError::validation("reps must be a positive whole number"))
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| AppError::bad_request(format!("date '{value}' is not YYYY-MM-DD")))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn now() -> i64 {
    Utc::now().timestamp()
}
