//! Configuration module for the scheduling library.
//!
//! All configuration is loaded from environment variables with sensible defaults
//! and handed explicitly to the record store constructor.

use std::env;

use chrono::Weekday;
use chrono_tz::Tz;

use crate::errors::AppError;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the record store API
    pub store_url: String,
    /// Record store project identifier
    pub project_id: String,
    /// Record store public key
    pub public_key: String,
    /// Shared table holding appointments and other activity records
    pub activity_table: String,
    /// Table holding patients
    pub patient_table: String,
    /// Zone that defines where a calendar day starts and ends
    pub timezone: Tz,
    /// First weekday of every calendar row
    pub week_start: Weekday,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let store_url = env::var("HOSPITAL_STORE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8787".to_string())
            .trim_end_matches('/')
            .to_string();

        let project_id = required("HOSPITAL_PROJECT_ID")?;
        let public_key = required("HOSPITAL_PUBLIC_KEY")?;

        let activity_table =
            env::var("HOSPITAL_ACTIVITY_TABLE").unwrap_or_else(|_| "app_Activity".to_string());
        let patient_table =
            env::var("HOSPITAL_PATIENT_TABLE").unwrap_or_else(|_| "app_Patient".to_string());

        let timezone = env::var("HOSPITAL_TIMEZONE")
            .unwrap_or_else(|_| "UTC".to_string())
            .parse::<Tz>()
            .map_err(|e| AppError::Config(format!("Invalid HOSPITAL_TIMEZONE: {}", e)))?;

        let week_start = env::var("HOSPITAL_WEEK_START")
            .unwrap_or_else(|_| "sun".to_string())
            .parse::<Weekday>()
            .map_err(|_| AppError::Config("Invalid HOSPITAL_WEEK_START".to_string()))?;

        let log_level = env::var("HOSPITAL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = env::var("HOSPITAL_LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(Self {
            store_url,
            project_id,
            public_key,
            activity_table,
            patient_table,
            timezone,
            week_start,
            log_level,
            log_json,
        })
    }
}

fn required(key: &str) -> Result<String, AppError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Config(format!("{} is not set", key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 9] = [
        "HOSPITAL_STORE_URL",
        "HOSPITAL_PROJECT_ID",
        "HOSPITAL_PUBLIC_KEY",
        "HOSPITAL_ACTIVITY_TABLE",
        "HOSPITAL_PATIENT_TABLE",
        "HOSPITAL_TIMEZONE",
        "HOSPITAL_WEEK_START",
        "HOSPITAL_LOG_LEVEL",
        "HOSPITAL_LOG_FORMAT",
    ];

    // Both scenarios share process-wide env vars, so they run in one test.
    #[test]
    fn test_config_from_env() {
        for key in KEYS {
            env::remove_var(key);
        }

        let missing = Config::from_env().unwrap_err();
        assert!(matches!(missing, AppError::Config(_)));

        env::set_var("HOSPITAL_PROJECT_ID", "proj-1");
        env::set_var("HOSPITAL_PUBLIC_KEY", "key-1");

        let config = Config::from_env().unwrap();
        assert_eq!(config.store_url, "http://127.0.0.1:8787");
        assert_eq!(config.activity_table, "app_Activity");
        assert_eq!(config.patient_table, "app_Patient");
        assert_eq!(config.timezone, Tz::UTC);
        assert_eq!(config.week_start, Weekday::Sun);
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);

        env::set_var("HOSPITAL_TIMEZONE", "Europe/Berlin");
        env::set_var("HOSPITAL_WEEK_START", "mon");
        env::set_var("HOSPITAL_STORE_URL", "https://records.example.org/");
        env::set_var("HOSPITAL_LOG_FORMAT", "JSON");

        let config = Config::from_env().unwrap();
        assert_eq!(config.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(config.week_start, Weekday::Mon);
        assert_eq!(config.store_url, "https://records.example.org");
        assert!(config.log_json);

        env::set_var("HOSPITAL_TIMEZONE", "Mars/Olympus");
        assert!(Config::from_env().is_err());

        for key in KEYS {
            env::remove_var(key);
        }
    }
}
