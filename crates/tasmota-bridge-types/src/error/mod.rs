//! Typed error definitions for Tasmota Bridge.
//!
//! Errors in this crate are serializable so they can cross the REST API
//! boundary unchanged. Runtime errors that wrap transport types
//! (`reqwest::Error`) live in `tasmota-bridge-core`.

mod config;

pub use config::ConfigError;

/// Standard Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = ConfigError::ValidationError {
            field: "tasmota_mapping[0].output_id".to_string(),
            message: "must be an integer".to_string(),
        };

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("ValidationError"));
        assert!(json.contains("output_id"));

        let deserialized: ConfigError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, deserialized);
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::ValidationError {
            field: "refresh_interval".to_string(),
            message: "must be at least 1".to_string(),
        };

        let msg = format!("{}", err);
        assert!(msg.contains("refresh_interval"));
        assert!(msg.contains("at least 1"));
    }
}
