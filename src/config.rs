use std::env;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::engine::grid::DEFAULT_INTERVAL_MINUTES;
use crate::errors::ConfigError;

/// Runtime configuration for the one-shot query binary.
///
/// The query itself is environment-driven: `ROOM_IDS` (comma-separated),
/// `FIRST_VALUE_DATE` (RFC 3339) and `SMOOTH_INTERVAL_MINUTES` are all
/// optional. Malformed dates are rejected here, before any engine code
/// runs; out-of-range intervals pass through and get clamped later.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub database_url: String,
    pub room_ids: Option<Vec<i32>>,
    pub first_value_date: Option<OffsetDateTime>,
    pub smooth_interval_minutes: i64,
}

impl EngineConfig {
    pub fn new() -> Result<Self, ConfigError> {
        // Load environment variables
        dotenv::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        let room_ids = match env::var("ROOM_IDS") {
            Ok(raw) => {
                let mut ids = Vec::new();
                for part in raw.split(',') {
                    let part = part.trim();
                    if part.is_empty() {
                        continue;
                    }
                    let id = part.parse::<i32>().map_err(|e| ConfigError::InvalidVariable {
                        name: "ROOM_IDS",
                        reason: e.to_string(),
                    })?;
                    ids.push(id);
                }
                if ids.is_empty() {
                    None
                } else {
                    Some(ids)
                }
            }
            Err(_) => None,
        };

        let first_value_date = match env::var("FIRST_VALUE_DATE") {
            Ok(raw) => Some(OffsetDateTime::parse(raw.trim(), &Rfc3339).map_err(|e| {
                ConfigError::InvalidVariable {
                    name: "FIRST_VALUE_DATE",
                    reason: e.to_string(),
                }
            })?),
            Err(_) => None,
        };

        let smooth_interval_minutes = match env::var("SMOOTH_INTERVAL_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|e| ConfigError::InvalidVariable {
                    name: "SMOOTH_INTERVAL_MINUTES",
                    reason: e.to_string(),
                })?,
            Err(_) => DEFAULT_INTERVAL_MINUTES,
        };

        Ok(EngineConfig {
            database_url,
            room_ids,
            first_value_date,
            smooth_interval_minutes,
        })
    }
}
