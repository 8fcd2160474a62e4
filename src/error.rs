//! Error types for pendulum-sim.
//!
//! All fallible operations return `Result<T, SimError>` instead of panicking.
//! A stale tick (delta too large or negative) is not an error: the engine
//! skips it silently.

use thiserror::Error;

/// Result type alias for pendulum-sim operations.
pub type SimResult<T> = Result<T, SimError>;

/// Unified error type for all pendulum-sim operations.
///
/// # Design
///
/// Errors fall into three groups:
/// 1. Parameter errors, raised at create / parameter-change time
/// 2. Jidoka violations, raised when a tick would corrupt the state
/// 3. Configuration and I/O errors from the YAML loader and CLI
#[derive(Debug, Error)]
pub enum SimError {
    // ===== Parameter Errors =====
    /// A physical or control parameter is outside its domain.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name (e.g. "length").
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Declarative range validation failed.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== Jidoka Violations =====
    /// Numerical degeneracy detected (NaN or Inf).
    #[error("Jidoka: non-finite value detected at {location}")]
    NonFiniteValue {
        /// Location where the non-finite value was detected.
        location: String,
    },

    /// Applied torque escaped the actuator bound.
    #[error("Jidoka: torque {torque:.6e} exceeds limit {limit:.6e}")]
    TorqueSaturation {
        /// Offending torque.
        torque: f64,
        /// Configured symmetric bound.
        limit: f64,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SimError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid-parameter error.
    #[must_use]
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Check if this error is a Jidoka violation (tick rejected).
    #[must_use]
    pub const fn is_jidoka_violation(&self) -> bool {
        matches!(
            self,
            Self::NonFiniteValue { .. } | Self::TorqueSaturation { .. }
        )
    }

    /// Check if this error rejected a parameter set.
    #[must_use]
    pub const fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. } | Self::Validation(_))
    }

    /// Recoverable faults leave the engine on its last known-good state;
    /// the caller may keep ticking or call `reset`.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        self.is_jidoka_violation() || self.is_invalid_parameter()
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jidoka_violation_detection() {
        let non_finite = SimError::NonFiniteValue {
            location: "state.omega".to_string(),
        };
        assert!(non_finite.is_jidoka_violation());
        assert!(non_finite.is_recoverable());

        let saturation = SimError::TorqueSaturation {
            torque: 2.0,
            limit: 1.0,
        };
        assert!(saturation.is_jidoka_violation());

        let config = SimError::config("invalid");
        assert!(!config.is_jidoka_violation());
        assert!(!config.is_recoverable());
    }

    #[test]
    fn test_invalid_parameter() {
        let err = SimError::invalid_parameter("length", "must be > 0, got -1");
        assert!(err.is_invalid_parameter());
        assert!(!err.is_jidoka_violation());
        let msg = err.to_string();
        assert!(msg.contains("length"));
        assert!(msg.contains("must be > 0"));
    }

    #[test]
    fn test_error_config() {
        let err = SimError::config("missing pendulum section");
        let msg = err.to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("missing pendulum section"));
    }

    #[test]
    fn test_error_non_finite_display() {
        let err = SimError::NonFiniteValue {
            location: "state.alpha".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("non-finite value"));
        assert!(msg.contains("state.alpha"));
    }

    #[test]
    fn test_error_torque_display() {
        let err = SimError::TorqueSaturation {
            torque: 1.5,
            limit: 1.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("torque"));
        assert!(msg.contains("1.500000e0"));
    }

    #[test]
    fn test_error_serialization() {
        let err = SimError::serialization("failed to serialize");
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_error_from_io() {
        let err: SimError = std::io::Error::other("file not found").into();
        let msg = err.to_string();
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_error_from_yaml() {
        let yaml_err = serde_yaml::from_str::<f64>("[not, a, number]").unwrap_err();
        let err: SimError = yaml_err.into();
        assert!(err.to_string().contains("YAML parsing error"));
    }
}
