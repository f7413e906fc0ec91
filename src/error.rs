//! Error types for the rendez scheduling engine.

use thiserror::Error;

/// Main error type for rendez operations.
#[derive(Error, Debug)]
pub enum RendezError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Booking error: {0}")]
    Booking(#[from] BookingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Unknown locale: {0}")]
    UnknownLocale(String),

    #[error("Category {category} has no {operation} semantics")]
    UnsupportedCategory { category: String, operation: String },
}

/// Storage-related errors (commitment store persistence).
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Corrupted snapshot: {0}")]
    CorruptedSnapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Booking-related errors. `SlotTaken` is the recoverable race signal:
/// callers re-render the grid instead of failing the session.
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Unknown staff member: {0}")]
    UnknownStaff(String),

    #[error("Staff member {0} is not offered by this appointment type")]
    NotConfigured(String),

    #[error("Booking interval is empty or inverted: {start}..{stop}")]
    InvalidInterval {
        start: chrono::DateTime<chrono::Utc>,
        stop: chrono::DateTime<chrono::Utc>,
    },

    #[error("Slot already taken for {calendar_id} between {start} and {stop}")]
    SlotTaken {
        calendar_id: String,
        start: chrono::DateTime<chrono::Utc>,
        stop: chrono::DateTime<chrono::Utc>,
    },
}

/// Result type alias for rendez operations.
pub type Result<T> = std::result::Result<T, RendezError>;
