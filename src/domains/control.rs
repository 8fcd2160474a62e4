//! Hybrid swing-up / stabilization control.
//!
//! # Governing Equations
//!
//! ```text
//! E        = ½·m·L²·ω² − m·g·L·cos θ
//! E_tilde  = E − m·g·L
//! swing-up : τ = −k_E · ω · E_tilde            when |θ − θ*| > threshold
//! PD       : τ = −k_p·(θ − θ*) − k_d·ω         otherwise
//! τ        = clamp(τ, −τ_max, τ_max)
//! ```
//!
//! The mode is re-evaluated from scratch on every call: there is no
//! hysteresis, so the controller may chatter near the threshold.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

use crate::config::{ControlParams, PendulumParams};

/// Active branch of the hybrid controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlMode {
    /// Energy pumping toward the upright energy level.
    SwingUp,
    /// PD regulation around the target angle.
    Stabilize,
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SwingUp => write!(f, "swing-up"),
            Self::Stabilize => write!(f, "stabilize"),
        }
    }
}

/// Result of one control evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlOutput {
    /// Branch that produced the command.
    pub mode: ControlMode,
    /// Energy error `E − m·g·L` at the evaluated state.
    pub energy_error: f64,
    /// Torque before saturation.
    pub unsaturated: f64,
    /// Torque after saturation; what the integrator receives.
    pub torque: f64,
}

impl ControlOutput {
    /// Whether the actuator bound clipped the command.
    #[must_use]
    pub fn is_saturated(&self) -> bool {
        self.unsaturated.to_bits() != self.torque.to_bits()
    }
}

/// A feedback law producing a torque from the angular state.
pub trait ControlLaw: Debug {
    /// Evaluate the law at `(theta, omega)`.
    fn compute(&self, theta: f64, omega: f64) -> ControlOutput;

    /// Symmetric bound every returned `torque` respects.
    fn torque_limit(&self) -> f64;

    /// Human-readable name.
    fn name(&self) -> &'static str;
}

/// Energy-shaping swing-up with PD capture near the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergySwingUpController {
    plant: PendulumParams,
    gains: ControlParams,
}

impl EnergySwingUpController {
    /// Create a controller for `plant` with `gains`.
    #[must_use]
    pub const fn new(plant: PendulumParams, gains: ControlParams) -> Self {
        Self { plant, gains }
    }

    /// Controller gains.
    #[must_use]
    pub const fn gains(&self) -> &ControlParams {
        &self.gains
    }

    /// Pick the branch for angle `theta`.
    ///
    /// The distance to the target is not wrapped, so an angle that has just
    /// crossed ±π counts as far from a target at π.
    #[must_use]
    pub fn select_mode(&self, theta: f64) -> ControlMode {
        if (theta - self.gains.target_angle).abs() > self.gains.mode_threshold {
            ControlMode::SwingUp
        } else {
            ControlMode::Stabilize
        }
    }

    /// Energy minus the upright energy.
    #[must_use]
    pub fn energy_error(&self, theta: f64, omega: f64) -> f64 {
        self.plant.energy(theta, omega) - self.plant.upright_energy()
    }

    /// Swing-up branch before saturation.
    #[must_use]
    pub fn swing_up_torque(&self, theta: f64, omega: f64) -> f64 {
        -self.gains.energy_gain * omega * self.energy_error(theta, omega)
    }

    /// PD branch before saturation.
    #[must_use]
    pub fn stabilize_torque(&self, theta: f64, omega: f64) -> f64 {
        let pd = -self.gains.kp * (theta - self.gains.target_angle) - self.gains.kd * omega;
        if self.gains.gravity_compensation {
            self.plant.upright_energy() * theta.sin() + pd
        } else {
            pd
        }
    }

    /// Clamp to `[-torque_limit, torque_limit]`.
    ///
    /// NaN passes through untouched so the caller can detect it.
    #[must_use]
    pub fn saturate(&self, torque: f64) -> f64 {
        let limit = self.gains.torque_limit;
        if torque > limit {
            limit
        } else if torque < -limit {
            -limit
        } else {
            torque
        }
    }
}

impl ControlLaw for EnergySwingUpController {
    fn compute(&self, theta: f64, omega: f64) -> ControlOutput {
        let mode = self.select_mode(theta);
        let unsaturated = match mode {
            ControlMode::SwingUp => self.swing_up_torque(theta, omega),
            ControlMode::Stabilize => self.stabilize_torque(theta, omega),
        };

        ControlOutput {
            mode,
            energy_error: self.energy_error(theta, omega),
            unsaturated,
            torque: self.saturate(unsaturated),
        }
    }

    fn torque_limit(&self) -> f64 {
        self.gains.torque_limit
    }

    fn name(&self) -> &'static str {
        "energy-swing-up-pd"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn plant() -> PendulumParams {
        PendulumParams {
            length: 1.0,
            mass: 1.0,
            gravity: 9.8,
            damping: 0.1,
            initial_angle: 0.1,
        }
    }

    fn gains() -> ControlParams {
        ControlParams {
            kp: 5.0,
            kd: 10.0,
            energy_gain: 10.0,
            target_angle: PI,
            torque_limit: 1.0,
            mode_threshold: 0.2,
            gravity_compensation: false,
        }
    }

    #[test]
    fn test_mode_far_from_target_is_swing_up() {
        let controller = EnergySwingUpController::new(plant(), gains());
        let output = controller.compute(0.1, 0.0);
        assert_eq!(output.mode, ControlMode::SwingUp);
        // At rest the swing-up law has nothing to pump with.
        assert!(output.torque.abs() < f64::EPSILON);
    }

    #[test]
    fn test_mode_near_target_is_pd() {
        let controller = EnergySwingUpController::new(plant(), gains());
        let theta = PI - 0.1;
        let omega = 0.02;
        let output = controller.compute(theta, omega);

        assert_eq!(output.mode, ControlMode::Stabilize);
        let expected = -5.0 * (theta - PI) - 10.0 * omega;
        assert!((output.unsaturated - expected).abs() < 1e-12);
        assert!((output.torque - expected).abs() < 1e-12);
        assert!(!output.is_saturated());
    }

    #[test]
    fn test_mode_threshold_boundary() {
        let controller = EnergySwingUpController::new(plant(), gains());
        assert_eq!(controller.select_mode(PI - 0.19), ControlMode::Stabilize);
        assert_eq!(controller.select_mode(PI + 0.19), ControlMode::Stabilize);
        assert_eq!(controller.select_mode(PI - 0.21), ControlMode::SwingUp);
        // Just past the wrap point the raw difference is about 2π.
        assert_eq!(controller.select_mode(-PI + 0.01), ControlMode::SwingUp);
    }

    #[test]
    fn test_swing_up_sign_pumps_energy() {
        let controller = EnergySwingUpController::new(plant(), gains());
        // Below the upright energy with positive velocity: push along ω.
        let torque = controller.swing_up_torque(0.5, 1.0);
        assert!(controller.energy_error(0.5, 1.0) < 0.0);
        assert!(torque > 0.0);

        // Above the upright energy: brake.
        let torque = controller.swing_up_torque(0.0, 10.0);
        assert!(controller.energy_error(0.0, 10.0) > 0.0);
        assert!(torque < 0.0);
    }

    #[test]
    fn test_energy_error_at_upright_rest_is_zero() {
        let controller = EnergySwingUpController::new(plant(), gains());
        assert!(controller.energy_error(PI, 0.0).abs() < 1e-9);
        assert!((controller.energy_error(0.0, 0.0) + 2.0 * 9.8).abs() < 1e-9);
    }

    #[test]
    fn test_saturation_clamps_both_sides() {
        let controller = EnergySwingUpController::new(plant(), gains());
        let output = controller.compute(0.5, 3.0);
        assert_eq!(output.mode, ControlMode::SwingUp);
        assert!(output.unsaturated.abs() > 1.0);
        assert!(output.torque.abs() <= 1.0);
        assert!(output.is_saturated());

        assert!((controller.saturate(7.0) - 1.0).abs() < f64::EPSILON);
        assert!((controller.saturate(-7.0) + 1.0).abs() < f64::EPSILON);
        assert!((controller.saturate(0.3) - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_saturation_passes_nan_through() {
        let controller = EnergySwingUpController::new(plant(), gains());
        assert!(controller.saturate(f64::NAN).is_nan());
    }

    #[test]
    fn test_gravity_compensation_adds_feedforward() {
        let with = ControlParams {
            gravity_compensation: true,
            ..gains()
        };
        let plain = EnergySwingUpController::new(plant(), gains());
        let compensated = EnergySwingUpController::new(plant(), with);
        let theta = PI - 0.1;

        let diff = compensated.stabilize_torque(theta, 0.0) - plain.stabilize_torque(theta, 0.0);
        assert!((diff - 9.8 * theta.sin()).abs() < 1e-12);
    }

    #[test]
    fn test_control_law_metadata() {
        let controller = EnergySwingUpController::new(plant(), gains());
        assert!((controller.torque_limit() - 1.0).abs() < f64::EPSILON);
        assert_eq!(controller.name(), "energy-swing-up-pd");
        assert!((controller.gains().kp - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_control_mode_display() {
        assert_eq!(ControlMode::SwingUp.to_string(), "swing-up");
        assert_eq!(ControlMode::Stabilize.to_string(), "stabilize");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    proptest! {
        /// Falsification: the saturated torque never exceeds the bound.
        #[test]
        fn prop_torque_within_limit(
            theta in -10.0f64..10.0,
            omega in -50.0f64..50.0,
            kp in 0.0f64..50.0,
            kd in 0.0f64..20.0,
            energy_gain in 0.0f64..30.0,
            torque_limit in 0.1f64..10.0,
        ) {
            let plant = PendulumParams::default();
            let gains = ControlParams {
                kp,
                kd,
                energy_gain,
                torque_limit,
                ..ControlParams::default()
            };
            let output = EnergySwingUpController::new(plant, gains).compute(theta, omega);
            prop_assert!(output.torque.abs() <= torque_limit);
        }

        /// Falsification: the mode depends only on the angle distance.
        #[test]
        fn prop_mode_matches_threshold(offset in -3.0f64..3.0, omega in -5.0f64..5.0) {
            let controller = EnergySwingUpController::new(
                PendulumParams::default(),
                ControlParams::default(),
            );
            let output = controller.compute(PI + offset, omega);
            let expected = if ((PI + offset) - PI).abs() > 0.2 {
                ControlMode::SwingUp
            } else {
                ControlMode::Stabilize
            };
            prop_assert_eq!(output.mode, expected);
        }
    }
}
