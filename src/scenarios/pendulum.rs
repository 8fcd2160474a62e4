//! Pendulum scenarios for canonical physics examples.
//!
//! Implements the named parameter sets the runner ships with:
//! - Simple pendulum at the interactive defaults
//! - Small-angle and large-angle free swings
//! - Undamped pendulum (energy drift check)
//! - Swing-up and balance runs of the controlled pendulum
//!
//! Also carries the slider ranges of the interactive parameter panels.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};
use std::fmt;
use std::str::FromStr;

use crate::config::{ControlParams, ParameterSet, PendulumParams};
use crate::engine::state::PhysicalState;
use crate::error::{SimError, SimResult};

/// Named parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Interactive defaults: 1 m, 1 kg, 45°, light damping.
    Simple,
    /// Linearized regime, about 6°.
    SmallAngle,
    /// Released horizontally with heavy damping.
    LargeAngle,
    /// No damping.
    Undamped,
    /// Controller pumping energy from near the bottom.
    SwingUp,
    /// Stiff controller catching the pendulum close to upright.
    Balance,
}

impl Preset {
    /// Every preset, in listing order.
    pub const ALL: [Self; 6] = [
        Self::Simple,
        Self::SmallAngle,
        Self::LargeAngle,
        Self::Undamped,
        Self::SwingUp,
        Self::Balance,
    ];

    /// Name used on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::SmallAngle => "small-angle",
            Self::LargeAngle => "large-angle",
            Self::Undamped => "undamped",
            Self::SwingUp => "swing-up",
            Self::Balance => "balance",
        }
    }

    /// One-line description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Simple => "free pendulum at the interactive defaults (45 deg, b = 0.1)",
            Self::SmallAngle => "free pendulum in the linear regime (0.1 rad)",
            Self::LargeAngle => "free pendulum released horizontally, b = 0.5",
            Self::Undamped => "free pendulum without damping",
            Self::SwingUp => "controlled pendulum swinging up from 0.1 rad",
            Self::Balance => "controlled pendulum caught near upright with stiff PD gains",
        }
    }

    /// Parameter set for this preset.
    #[must_use]
    pub fn params(self) -> ParameterSet {
        let base = PendulumParams::default();
        match self {
            Self::Simple => ParameterSet::uncontrolled(base),
            Self::SmallAngle => ParameterSet::uncontrolled(PendulumParams {
                initial_angle: 0.1,
                ..base
            }),
            Self::LargeAngle => ParameterSet::uncontrolled(PendulumParams {
                initial_angle: FRAC_PI_2,
                damping: 0.5,
                ..base
            }),
            Self::Undamped => ParameterSet::uncontrolled(PendulumParams {
                initial_angle: FRAC_PI_4,
                damping: 0.0,
                ..base
            }),
            Self::SwingUp => ParameterSet::controlled(
                PendulumParams {
                    initial_angle: 0.1,
                    ..base
                },
                ControlParams::default(),
            ),
            Self::Balance => ParameterSet::controlled(
                PendulumParams {
                    initial_angle: 3.0,
                    ..base
                },
                ControlParams {
                    kp: 20.0,
                    kd: 10.0,
                    torque_limit: 5.0,
                    ..ControlParams::default()
                },
            ),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|p| p.name()).collect();
                SimError::config(format!(
                    "unknown preset '{s}', expected one of: {}",
                    known.join(", ")
                ))
            })
    }
}

/// Simple pendulum scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendulumScenario {
    params: ParameterSet,
}

impl PendulumScenario {
    /// Create a new pendulum scenario.
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error if `params` violates its domain.
    pub fn new(params: ParameterSet) -> SimResult<Self> {
        params.check()?;
        Ok(Self { params })
    }

    /// Scenario for a named preset.
    #[must_use]
    pub fn preset(preset: Preset) -> Self {
        Self {
            params: preset.params(),
        }
    }

    /// Initial state: at rest at the configured angle.
    #[must_use]
    pub const fn init_state(&self) -> PhysicalState {
        PhysicalState::at_rest(self.params.pendulum.initial_angle)
    }

    /// Period of small oscillations, `2π·√(L/g)`.
    ///
    /// `None` without gravity, where the pendulum does not oscillate.
    #[must_use]
    pub fn small_angle_period(&self) -> Option<f64> {
        let p = &self.params.pendulum;
        (p.gravity > 0.0).then(|| TAU * (p.length / p.gravity).sqrt())
    }

    /// Get parameters.
    #[must_use]
    pub const fn params(&self) -> &ParameterSet {
        &self.params
    }
}

/// Inclusive bounds of one slider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl SliderRange {
    /// Create a range; `min` must not exceed `max`.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp `value` into the range. NaN is returned unchanged.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Whether `value` lies inside the range.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Ranges of the interactive parameter panels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderRanges {
    /// Rod length (m).
    pub length: SliderRange,
    /// Bob mass (kg).
    pub mass: SliderRange,
    /// Gravity (m/s²).
    pub gravity: SliderRange,
    /// Damping coefficient.
    pub damping: SliderRange,
    /// Initial angle (rad).
    pub initial_angle: SliderRange,
    /// Proportional gain.
    pub kp: SliderRange,
    /// Derivative gain.
    pub kd: SliderRange,
    /// Swing-up energy gain.
    pub energy_gain: SliderRange,
    /// Torque bound (N·m).
    pub torque_limit: SliderRange,
}

impl SliderRanges {
    /// Ranges of the interactive control panels.
    pub const PANEL: Self = Self {
        length: SliderRange::new(0.1, 5.0),
        mass: SliderRange::new(0.1, 10.0),
        gravity: SliderRange::new(0.0, 20.0),
        damping: SliderRange::new(0.0, 2.0),
        initial_angle: SliderRange::new(-PI, PI),
        kp: SliderRange::new(0.0, 50.0),
        kd: SliderRange::new(0.0, 20.0),
        energy_gain: SliderRange::new(0.0, 30.0),
        torque_limit: SliderRange::new(0.1, 10.0),
    };

    /// Clamp every slider-backed field of `params`.
    ///
    /// Fields without a slider (`target_angle`, `mode_threshold`,
    /// `gravity_compensation`) pass through.
    #[must_use]
    pub fn clamp(&self, params: &ParameterSet) -> ParameterSet {
        let p = &params.pendulum;
        let pendulum = PendulumParams {
            length: self.length.clamp(p.length),
            mass: self.mass.clamp(p.mass),
            gravity: self.gravity.clamp(p.gravity),
            damping: self.damping.clamp(p.damping),
            initial_angle: self.initial_angle.clamp(p.initial_angle),
        };
        let control = params.control.map(|c| ControlParams {
            kp: self.kp.clamp(c.kp),
            kd: self.kd.clamp(c.kd),
            energy_gain: self.energy_gain.clamp(c.energy_gain),
            torque_limit: self.torque_limit.clamp(c.torque_limit),
            ..c
        });
        ParameterSet { pendulum, control }
    }
}

impl Default for SliderRanges {
    fn default() -> Self {
        Self::PANEL
    }
}
