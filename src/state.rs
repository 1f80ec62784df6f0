use crate::log::WorkoutLog;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub log: Arc<WorkoutLog>,
}

impl AppState {
    pub fn new(log: WorkoutLog) -> Self {
        Self { log: Arc::new(log) }
    }
}
