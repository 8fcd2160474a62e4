//! Configuration system with YAML schema and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Type-safe parameter structs
//! - Declarative range checks via `validator`
//! - A semantic pass that rejects non-finite values
//!
//! The engine only enforces the physical domain (`length > 0`, `mass > 0`,
//! `torque_limit > 0`, everything finite). Slider-style range clamping is the
//! job of whoever collects the parameters, see
//! [`crate::scenarios::pendulum::SliderRanges`].

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{SimError, SimResult};
use crate::scenarios::pendulum::SliderRanges;

/// Physical parameters of the pendulum.
///
/// Immutable for the lifetime of one simulation run; replacing them resets
/// the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PendulumParams {
    /// Rod length (m).
    #[validate(range(exclusive_min = 0.0))]
    pub length: f64,
    /// Bob mass (kg).
    #[validate(range(exclusive_min = 0.0))]
    pub mass: f64,
    /// Gravitational acceleration (m/s²).
    pub gravity: f64,
    /// Viscous damping coefficient.
    pub damping: f64,
    /// Initial angle from the downward vertical (radians). Only seeds state.
    #[serde(deserialize_with = "deserialize_angle")]
    pub initial_angle: f64,
}

impl Default for PendulumParams {
    fn default() -> Self {
        Self {
            length: 1.0,
            mass: 1.0,
            gravity: 9.8,
            damping: 0.1,
            initial_angle: std::f64::consts::FRAC_PI_4,
        }
    }
}

impl PendulumParams {
    /// Validate domain constraints.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for non-finite values and `Validation`
    /// for `length <= 0` or `mass <= 0`.
    pub fn check(&self) -> SimResult<()> {
        ensure_finite("length", self.length)?;
        ensure_finite("mass", self.mass)?;
        ensure_finite("gravity", self.gravity)?;
        ensure_finite("damping", self.damping)?;
        ensure_finite("initial_angle", self.initial_angle)?;
        self.validate()?;
        Ok(())
    }

    /// Moment of inertia of a point mass on a massless rod, `m·L²`.
    #[must_use]
    pub fn inertia(&self) -> f64 {
        self.mass * self.length * self.length
    }

    /// Energy of the upright equilibrium relative to the pivot, `m·g·L`.
    #[must_use]
    pub fn upright_energy(&self) -> f64 {
        self.mass * self.gravity * self.length
    }

    /// Total mechanical energy `½·m·L²·ω² − m·g·L·cos θ`.
    #[must_use]
    pub fn energy(&self, theta: f64, omega: f64) -> f64 {
        0.5 * self.inertia() * omega * omega - self.upright_energy() * theta.cos()
    }
}

/// Gains and limits of the hybrid swing-up / PD controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ControlParams {
    /// Proportional gain.
    pub kp: f64,
    /// Derivative gain.
    pub kd: f64,
    /// Swing-up energy gain.
    pub energy_gain: f64,
    /// Equilibrium the controller drives toward (radians).
    #[serde(deserialize_with = "deserialize_angle")]
    pub target_angle: f64,
    /// Symmetric actuator bound (N·m).
    #[validate(range(exclusive_min = 0.0))]
    pub torque_limit: f64,
    /// Angular distance from the target beyond which swing-up is used.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_mode_threshold")]
    pub mode_threshold: f64,
    /// Add `m·g·L·sin θ` to the PD branch before saturation.
    #[serde(default)]
    pub gravity_compensation: bool,
}

const fn default_mode_threshold() -> f64 {
    0.2
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            kp: 5.0,
            kd: 10.0,
            energy_gain: 10.0,
            target_angle: std::f64::consts::PI,
            torque_limit: 1.0,
            mode_threshold: default_mode_threshold(),
            gravity_compensation: false,
        }
    }
}

impl ControlParams {
    /// Validate domain constraints.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for non-finite values and `Validation`
    /// for `torque_limit <= 0` or a negative `mode_threshold`.
    pub fn check(&self) -> SimResult<()> {
        ensure_finite("kp", self.kp)?;
        ensure_finite("kd", self.kd)?;
        ensure_finite("energy_gain", self.energy_gain)?;
        ensure_finite("target_angle", self.target_angle)?;
        ensure_finite("torque_limit", self.torque_limit)?;
        ensure_finite("mode_threshold", self.mode_threshold)?;
        self.validate()?;
        Ok(())
    }
}

/// Complete parameter record handed to an engine.
///
/// The presence of `control` selects the controlled engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Plant parameters.
    pub pendulum: PendulumParams,
    /// Controller parameters (controlled engine only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<ControlParams>,
}

impl ParameterSet {
    /// Parameters for the free (uncontrolled) pendulum.
    #[must_use]
    pub const fn uncontrolled(pendulum: PendulumParams) -> Self {
        Self {
            pendulum,
            control: None,
        }
    }

    /// Parameters for the actively controlled pendulum.
    #[must_use]
    pub const fn controlled(pendulum: PendulumParams, control: ControlParams) -> Self {
        Self {
            pendulum,
            control: Some(control),
        }
    }

    /// Whether a control law is attached.
    #[must_use]
    pub const fn is_controlled(&self) -> bool {
        self.control.is_some()
    }

    /// Validate every parameter.
    ///
    /// # Errors
    ///
    /// Returns the first parameter error found.
    pub fn check(&self) -> SimResult<()> {
        self.pendulum.check()?;
        if let Some(control) = &self.control {
            control.check()?;
        }
        Ok(())
    }

    /// Clamp slider-backed fields into the interactive panel ranges.
    #[must_use]
    pub fn clamp_to_slider_ranges(&self) -> Self {
        SliderRanges::PANEL.clamp(self)
    }
}

/// Integrator type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegratorType {
    /// Semi-implicit (symplectic) Euler, 1st order.
    #[default]
    SymplecticEuler,
    /// Classical Runge-Kutta, 4th order, torque held over the step.
    Rk4,
}

/// Engine tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Largest tick delta (s) that is integrated; larger ones are skipped.
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    #[serde(default = "default_max_tick_delta")]
    pub max_tick_delta: f64,
    /// Sub-steps per tick for the controlled engine.
    #[validate(range(min = 1, max = 1000))]
    #[serde(default = "default_substeps")]
    pub substeps: u32,
    /// Integration scheme.
    #[serde(default)]
    pub integrator: IntegratorType,
}

const fn default_max_tick_delta() -> f64 {
    0.1
}

const fn default_substeps() -> u32 {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_tick_delta: default_max_tick_delta(),
            substeps: default_substeps(),
            integrator: IntegratorType::default(),
        }
    }
}

impl EngineConfig {
    /// Validate engine settings.
    ///
    /// # Errors
    ///
    /// Returns error if any field is out of range or non-finite.
    pub fn check(&self) -> SimResult<()> {
        ensure_finite("max_tick_delta", self.max_tick_delta)?;
        self.validate()?;
        Ok(())
    }
}

/// Headless run settings used by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Simulated wall-clock duration (s).
    #[validate(range(exclusive_min = 0.0, max = 86_400.0))]
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// Display refresh rate the tick driver emulates (Hz).
    #[validate(range(exclusive_min = 0.0, max = 10_000.0))]
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    /// Emit telemetry every N frames.
    #[validate(range(min = 1))]
    #[serde(default = "default_sample_every")]
    pub sample_every: u32,
}

const fn default_duration() -> f64 {
    10.0
}

const fn default_frame_rate() -> f64 {
    60.0
}

const fn default_sample_every() -> u32 {
    6
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            frame_rate: default_frame_rate(),
            sample_every: default_sample_every(),
        }
    }
}

impl RunConfig {
    /// Number of frames covering `duration` at `frame_rate`.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        (self.duration * self.frame_rate).ceil() as u64
    }

    /// Validate run settings.
    ///
    /// # Errors
    ///
    /// Returns error if any field is out of range or non-finite.
    pub fn check(&self) -> SimResult<()> {
        ensure_finite("duration", self.duration)?;
        ensure_finite("frame_rate", self.frame_rate)?;
        self.validate()?;
        Ok(())
    }
}

/// Top-level simulation configuration.
///
/// Loaded from YAML files with full schema validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Schema version for forward compatibility.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Simulation metadata.
    #[serde(default)]
    pub simulation: SimulationMeta,

    /// Plant parameters.
    pub pendulum: PendulumParams,

    /// Controller parameters; omit for the free pendulum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<ControlParams>,

    /// Engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Headless run settings.
    #[serde(default)]
    pub run: RunConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            simulation: SimulationMeta::default(),
            pendulum: PendulumParams::default(),
            control: None,
            engine: EngineConfig::default(),
            run: RunConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> SimResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> SimResult<String> {
        serde_yaml::to_string(self).map_err(|e| SimError::serialization(e.to_string()))
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> SimConfigBuilder {
        SimConfigBuilder::default()
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first error found.
    pub fn check(&self) -> SimResult<()> {
        if self.schema_version != "1.0" {
            return Err(SimError::config(format!(
                "unsupported schema_version '{}', expected '1.0'",
                self.schema_version
            )));
        }
        self.parameter_set().check()?;
        self.engine.check()?;
        self.run.check()?;
        Ok(())
    }

    /// The parameter record for the engine.
    #[must_use]
    pub const fn parameter_set(&self) -> ParameterSet {
        ParameterSet {
            pendulum: self.pendulum,
            control: self.control,
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct SimConfigBuilder {
    name: Option<String>,
    params: Option<ParameterSet>,
    engine: Option<EngineConfig>,
    integrator: Option<IntegratorType>,
    run: Option<RunConfig>,
}

impl SimConfigBuilder {
    /// Set the simulation name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the parameter record.
    #[must_use]
    pub const fn params(mut self, params: ParameterSet) -> Self {
        self.params = Some(params);
        self
    }

    /// Set engine settings.
    #[must_use]
    pub const fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Override only the integrator.
    #[must_use]
    pub const fn integrator(mut self, integrator: IntegratorType) -> Self {
        self.integrator = Some(integrator);
        self
    }

    /// Set run settings.
    #[must_use]
    pub const fn run(mut self, run: RunConfig) -> Self {
        self.run = Some(run);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> SimConfig {
        let mut config = SimConfig::default();

        if let Some(name) = self.name {
            config.simulation.name = name;
        }

        if let Some(params) = self.params {
            config.pendulum = params.pendulum;
            config.control = params.control;
        }

        if let Some(engine) = self.engine {
            config.engine = engine;
        }

        if let Some(integrator) = self.integrator {
            config.engine.integrator = integrator;
        }

        if let Some(run) = self.run {
            config.run = run;
        }

        config
    }
}

/// Simulation metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationMeta {
    /// Simulation name.
    #[serde(default)]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

fn ensure_finite(name: &str, value: f64) -> SimResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::invalid_parameter(
            name,
            format!("must be finite, got {value}"),
        ))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AngleRepr {
    Radians(f64),
    Text(String),
}

/// Accept either a bare number (radians) or `"<number> <unit>"`.
fn deserialize_angle<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match AngleRepr::deserialize(deserializer)? {
        AngleRepr::Radians(radians) => Ok(radians),
        AngleRepr::Text(s) => parse_angle(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "Invalid angle '{s}'. Expected a number in radians or '<number> <unit>' \
                 where unit is 'rad', 'deg' or 'pi'"
            ))
        }),
    }
}

/// Parse angle string with explicit units.
fn parse_angle(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() != 2 {
        return None;
    }

    let value: f64 = parts[0].parse().ok()?;
    let unit = parts[1].to_lowercase();

    match unit.as_str() {
        "rad" | "radians" => Some(value),
        "deg" | "degrees" | "°" => Some(value.to_radians()),
        "pi" | "π" => Some(value * std::f64::consts::PI),
        _ => None,
    }
}
