pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod log;
pub mod models;
pub mod session;
pub mod stats;
pub mod storage;
pub mod ui;
pub mod state;

pub use app::router;
pub use config::Config;
pub use log::{DurationPolicy, WorkoutLog};
pub use state::AppState;
