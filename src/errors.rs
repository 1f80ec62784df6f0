use axum::http::StatusCode;
use chrono::NaiveDate;
use thiserror::Error;

/// Failures of the backing table itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("row {0} does not exist")]
    UnknownRow(usize),

    #[error("column {0} is not part of the sheet")]
    UnknownColumn(usize),
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("connection error: {0}")]
    Connection(#[from] StoreError),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("no row for {0} to attach the workout duration to; duration not saved")]
    LostWrite(NaiveDate),
}

impl LogError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<LogError> for AppError {
    fn from(err: LogError) -> Self {
        let status = match &err {
            LogError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            LogError::Validation(_) => StatusCode::BAD_REQUEST,
            LogError::LostWrite(_) => StatusCode::CONFLICT,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
