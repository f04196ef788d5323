//! # Error Types
//!
//! Custom error types for RC Car Lights using `thiserror`.
//!
//! Only setup can fail (configuration, input devices, telemetry files).
//! The per-cycle light path never returns an error.

use thiserror::Error;

/// Main error type for RC Car Lights
#[derive(Debug, Error)]
pub enum LightsError {
    /// Configuration errors (parsing and validation)
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Gamepad input errors
    #[error("Gamepad error: {0}")]
    Gamepad(String),

    /// No usable gamepad found
    #[error("No gamepad with analog sticks found")]
    GamepadNotFound,

    /// Pulse script errors
    #[error("Pulse script error: {0}")]
    Script(String),

    /// Telemetry serialization errors
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] serde_json::Error),
}

/// Result type alias for RC Car Lights
pub type Result<T> = std::result::Result<T, LightsError>;
