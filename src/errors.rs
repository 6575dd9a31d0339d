use thiserror::Error;

/// Failures surfaced by the resampling engine.
///
/// Absent data is never an error: a room or metric without readings yields
/// an empty or omitted result instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A specifically requested single room does not exist. Unknown ids
    /// inside a batch are dropped with a warning instead.
    #[error("room {0} not found")]
    RoomNotFound(i32),

    /// The room/attachment store or the raw reading store failed. Aborts
    /// the whole batch; no per-room fallback.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A non-clamped interval reached the grid builder.
    #[error(transparent)]
    InvalidInterval(#[from] InvalidIntervalError),
}

/// Failures in the data-access layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("invalid database url: {0}")]
    InvalidUrl(String),

    #[error("tls setup failed: {0}")]
    Tls(String),
}

/// `build_grid` was handed a non-positive interval.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid smoothing interval: {0} minutes")]
pub struct InvalidIntervalError(pub i64);

/// Failures while loading the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,

    #[error("invalid {name}: {reason}")]
    InvalidVariable { name: &'static str, reason: String },
}
