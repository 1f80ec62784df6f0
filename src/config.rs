use crate::log::DurationPolicy;
use std::{env, path::PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Json,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub sheet_name: String,
    pub store: StoreKind,
    pub duration_policy: DurationPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| format!("PORT '{value}' is not a valid port"))?,
            None => 8080,
        };

        let store = match lookup("APP_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("json") => StoreKind::Json,
            Some("memory") => StoreKind::Memory,
            Some(other) => return Err(format!("APP_STORE '{other}' must be 'json' or 'memory'")),
        };

        let duration_policy = match lookup("APP_DURATION_POLICY") {
            Some(value) => value.parse()?,
            None => DurationPolicy::default(),
        };

        Ok(Self {
            port,
            data_path: lookup("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/workout.json")),
            sheet_name: lookup("APP_SHEET_NAME").unwrap_or_else(|| "DB".to_string()),
            store,
            duration_policy,
        })
    }
}
