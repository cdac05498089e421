use std::env;

use chrono::{FixedOffset, Offset, Utc};
use dotenvy::dotenv;

const DEFAULT_FETCH_LIMIT: usize = 1000;
const DEFAULT_JWT_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub jwt_ttl_secs: u64,
    pub database_root_path: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// Maximum number of records read from one collection per request.
    pub fetch_limit: usize,
    /// Offset used for dashboard calendar math (day and week boundaries).
    pub utc_offset_minutes: i32,
    pub seed_file: Option<String>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if it exists
        dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "default_jwt_secret_change_in_production".to_string());

        let jwt_ttl_secs = match env::var("JWT_TTL_SECS") {
            Ok(raw) => raw.parse::<u64>()?,
            Err(_) => DEFAULT_JWT_TTL_SECS,
        };

        let database_root_path =
            env::var("DATABASE_ROOT_PATH").unwrap_or_else(|_| "./data".to_string());

        let admin_email = non_empty_var("ADMIN_EMAIL");
        let admin_password = non_empty_var("ADMIN_PASSWORD");

        let fetch_limit = match env::var("COLLECTION_FETCH_LIMIT") {
            Ok(raw) => raw.parse::<usize>()?,
            Err(_) => DEFAULT_FETCH_LIMIT,
        };

        let utc_offset_minutes = match env::var("UTC_OFFSET_MINUTES") {
            Ok(raw) => raw.parse::<i32>()?,
            Err(_) => 0,
        };
        if FixedOffset::east_opt(utc_offset_minutes * 60).is_none() {
            return Err(format!("UTC_OFFSET_MINUTES out of range: {utc_offset_minutes}").into());
        }

        let seed_file = non_empty_var("SEED_FILE");

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3069".to_string())
            .parse::<u16>()?;

        Ok(Self {
            jwt_secret,
            jwt_ttl_secs,
            database_root_path,
            admin_email,
            admin_password,
            fetch_limit,
            utc_offset_minutes,
            seed_file,
            host,
            port,
        })
    }

    /// Configuration rooted at `database_root_path` with defaults for everything else.
    pub fn with_database_path(database_root_path: impl Into<String>) -> Self {
        Self {
            jwt_secret: "default_jwt_secret_change_in_production".to_string(),
            jwt_ttl_secs: DEFAULT_JWT_TTL_SECS,
            database_root_path: database_root_path.into(),
            admin_email: None,
            admin_password: None,
            fetch_limit: DEFAULT_FETCH_LIMIT,
            utc_offset_minutes: 0,
            seed_file: None,
            host: "127.0.0.1".to_string(),
            port: 3069,
        }
    }

    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
