//! Simulation state management.
//!
//! [`PhysicalState`] is the only mutable physics record. One engine owns one
//! state and replaces it wholesale on every accepted tick; a rejected tick
//! leaves the previous value in place.

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

use crate::domains::control::ControlMode;

/// Angular state of the pendulum.
///
/// Angles are measured from the downward vertical; the bob sits at
/// `(L·sin θ, L·cos θ)` relative to the pivot with y pointing down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicalState {
    /// Angular position (rad).
    pub theta: f64,
    /// Angular velocity (rad/s).
    pub omega: f64,
    /// Most recently computed angular acceleration (rad/s²). Diagnostic only.
    pub alpha: f64,
    /// Most recently applied control torque (N·m).
    pub torque: f64,
}

impl PhysicalState {
    /// State at rest at the given angle.
    #[must_use]
    pub const fn at_rest(theta: f64) -> Self {
        Self {
            theta,
            omega: 0.0,
            alpha: 0.0,
            torque: 0.0,
        }
    }

    /// Name and value of the first non-finite field, if any.
    #[must_use]
    pub fn non_finite_field(&self) -> Option<(&'static str, f64)> {
        [
            ("theta", self.theta),
            ("omega", self.omega),
            ("alpha", self.alpha),
            ("torque", self.torque),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
    }

    /// Check all fields are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.non_finite_field().is_none()
    }

    /// Bob position relative to the pivot for a rod of `length`.
    #[must_use]
    pub fn bob_offset(&self, length: f64) -> (f64, f64) {
        (length * self.theta.sin(), length * self.theta.cos())
    }

    /// Angle readout in degrees.
    #[must_use]
    pub fn angle_degrees(&self) -> f64 {
        self.theta.to_degrees()
    }

    /// Bitwise equality, distinguishing `0.0` from `-0.0`.
    #[must_use]
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.theta.to_bits() == other.theta.to_bits()
            && self.omega.to_bits() == other.omega.to_bits()
            && self.alpha.to_bits() == other.alpha.to_bits()
            && self.torque.to_bits() == other.torque.to_bits()
    }
}

/// Normalize an angle into `(-π, π]`.
///
/// Non-finite input stays non-finite so the Jidoka guard can see it.
#[must_use]
pub fn wrap_angle(theta: f64) -> f64 {
    let wrapped = (theta + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Read-only view handed to renderers and telemetry after every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Physical state after the tick.
    pub state: PhysicalState,
    /// Mode the controller selects at `state`, i.e. the mode the next
    /// sub-step starts in (controlled engine only).
    pub mode: Option<ControlMode>,
    /// Whether physics advancement is suspended.
    pub paused: bool,
    /// Total mechanical energy `½·m·L²·ω² − m·g·L·cos θ` (J).
    pub energy: f64,
    /// Energy minus the upright energy `m·g·L` (controlled engine only).
    pub energy_error: Option<f64>,
    /// Simulated time since the last reset (s).
    pub elapsed: f64,
    /// Accepted ticks since the last reset.
    pub ticks: u64,
}
