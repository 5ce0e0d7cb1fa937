pub mod app_config;
pub mod config;
pub mod duration;
pub mod orders;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use duration::{
    aggregate_timestamps, chunk_count, chunk_hints, chunk_message, ChunkHint, Duration,
    Timestamp, TimestampError,
};
pub use orders::{AggregateResult, OrderRecord, RestaurantAggregate};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("chunk size must be a positive number of minutes, got {0}")]
    InvalidChunkSize(i64),

    #[error("duration is too large to measure in seconds")]
    DurationOverflow,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
