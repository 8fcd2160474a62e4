//! Jidoka (自働化) - Autonomous anomaly detection.
//!
//! Implements Toyota's Jidoka principle: stop the line as soon as a tick
//! produces a defective state, instead of letting it propagate into the
//! next frame.
//!
//! # Anomaly Types
//!
//! 1. **Non-finite values**: NaN or Inf in `theta`, `omega`, `alpha`, `torque`
//! 2. **Torque saturation**: `|torque|` above the actuator bound
//!
//! # Design
//!
//! The guard runs after every sub-step on a candidate state. The engine
//! only commits a candidate once every check passed, so a violation leaves
//! the last known-good state in place.

use serde::{Deserialize, Serialize};

use crate::engine::state::PhysicalState;
use crate::error::{SimError, SimResult};

/// Jidoka violation types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JidokaViolation {
    /// Non-finite value (NaN or Inf) detected.
    NonFiniteValue {
        /// Location of the non-finite value (e.g., "state.omega").
        location: String,
        /// The non-finite value itself.
        value: f64,
    },
    /// Torque outside the symmetric bound.
    TorqueSaturation {
        /// Offending torque.
        torque: f64,
        /// Configured bound.
        limit: f64,
    },
}

impl From<JidokaViolation> for SimError {
    fn from(v: JidokaViolation) -> Self {
        match v {
            JidokaViolation::NonFiniteValue { location, .. } => Self::NonFiniteValue { location },
            JidokaViolation::TorqueSaturation { torque, limit } => {
                Self::TorqueSaturation { torque, limit }
            }
        }
    }
}

/// Jidoka guard for autonomous anomaly detection.
///
/// # Example
///
/// ```rust
/// use pendulum_sim::engine::jidoka::JidokaGuard;
/// use pendulum_sim::engine::state::PhysicalState;
///
/// let guard = JidokaGuard::new(Some(1.0));
/// let state = PhysicalState::at_rest(0.3);
///
/// // Check will pass for valid state
/// assert!(guard.check(&state).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JidokaGuard {
    /// Actuator bound. The free pendulum uses zero.
    torque_limit: Option<f64>,
}

impl JidokaGuard {
    /// Create a guard; `None` skips the torque check entirely.
    #[must_use]
    pub const fn new(torque_limit: Option<f64>) -> Self {
        Self { torque_limit }
    }

    /// Check state for anomalies (Jidoka inspection).
    ///
    /// # Errors
    ///
    /// Returns `SimError` if any anomaly is detected:
    /// - `NonFiniteValue`: NaN or Inf found
    /// - `TorqueSaturation`: torque above the bound
    pub fn check(&self, state: &PhysicalState) -> SimResult<()> {
        self.inspect(state).map_err(SimError::from)
    }

    /// Like [`check`](Self::check) but returns the raw violation.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn inspect(&self, state: &PhysicalState) -> Result<(), JidokaViolation> {
        if let Some((field, value)) = state.non_finite_field() {
            return Err(JidokaViolation::NonFiniteValue {
                location: format!("state.{field}"),
                value,
            });
        }

        if let Some(limit) = self.torque_limit {
            if state.torque.abs() > limit {
                return Err(JidokaViolation::TorqueSaturation {
                    torque: state.torque,
                    limit,
                });
            }
        }

        Ok(())
    }

    /// Configured torque bound.
    #[must_use]
    pub const fn torque_limit(&self) -> Option<f64> {
        self.torque_limit
    }
}
