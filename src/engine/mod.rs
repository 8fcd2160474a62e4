//! Core simulation engine.
//!
//! Implements the per-instance tick loop with:
//! - Optional control law (free pendulum vs. swing-up controller)
//! - Fixed sub-stepping and angle wrapping for the controlled pendulum
//! - Stale-tick rejection for large, negative or NaN deltas
//! - Jidoka guards that reject a tick instead of committing a bad state

pub mod clock;
pub mod jidoka;
pub mod state;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use clock::FrameClock;
pub use jidoka::{JidokaGuard, JidokaViolation};
pub use state::{wrap_angle, PhysicalState, Snapshot};

use crate::config::{EngineConfig, ParameterSet, SimConfig};
use crate::domains::control::{ControlLaw, ControlMode, ControlOutput, EnergySwingUpController};
use crate::domains::physics::{integrator_for, DampingModel, Integrator, PendulumDynamics};
use crate::error::SimResult;

/// Whether ticks advance the physics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Ticks integrate the state.
    #[default]
    Running,
    /// Ticks only produce snapshots.
    Paused,
}

impl RunState {
    /// The other state.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Running => Self::Paused,
            Self::Paused => Self::Running,
        }
    }
}

/// Main simulation engine.
///
/// One engine owns one [`PhysicalState`] and replaces it wholesale on every
/// accepted tick. The presence of [`ParameterSet::control`] decides whether
/// this is the free or the controlled pendulum.
#[derive(Debug)]
pub struct Engine {
    /// Active parameter record.
    params: ParameterSet,
    /// Engine tuning.
    config: EngineConfig,
    /// Last known-good state.
    state: PhysicalState,
    /// Running or paused.
    run_state: RunState,
    /// Controller mode at the current state.
    mode: Option<ControlMode>,
    /// Control law, absent for the free pendulum.
    controller: Option<Box<dyn ControlLaw + Send + Sync>>,
    /// Numerical scheme.
    integrator: Box<dyn Integrator + Send + Sync>,
    /// Equation of motion.
    dynamics: PendulumDynamics,
    /// Post-step anomaly detection.
    jidoka: JidokaGuard,
    /// Simulated seconds since the last reset.
    elapsed: f64,
    /// Accepted ticks since the last reset.
    ticks: u64,
}

impl Engine {
    /// Create an engine with default engine settings.
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error if `params` violates its domain.
    pub fn new(params: ParameterSet, run_state: RunState) -> SimResult<Self> {
        Self::with_config(params, EngineConfig::default(), run_state)
    }

    /// Create an engine with explicit engine settings.
    ///
    /// # Errors
    ///
    /// Returns error if `params` or `config` fail validation.
    pub fn with_config(
        params: ParameterSet,
        config: EngineConfig,
        run_state: RunState,
    ) -> SimResult<Self> {
        params.check()?;
        config.check()?;

        let (dynamics, controller, jidoka) = build_parts(&params);
        let mut engine = Self {
            params,
            config,
            state: PhysicalState::at_rest(params.pendulum.initial_angle),
            run_state,
            mode: None,
            controller,
            integrator: integrator_for(config.integrator),
            dynamics,
            jidoka,
            elapsed: 0.0,
            ticks: 0,
        };
        engine.refresh_mode();
        Ok(engine)
    }

    /// Create a running engine from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration fails validation.
    pub fn from_config(config: &SimConfig) -> SimResult<Self> {
        Self::with_config(config.parameter_set(), config.engine, RunState::Running)
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Paused engines and stale deltas (negative, NaN, or above
    /// `max_tick_delta`) leave the state untouched and still return a
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns a Jidoka violation if the tick would produce a non-finite or
    /// unsaturated state. The tick is discarded and the engine keeps its
    /// last known-good state.
    pub fn tick(&mut self, dt: f64) -> SimResult<Snapshot> {
        if self.run_state == RunState::Paused {
            return Ok(self.snapshot());
        }

        if !(0.0..=self.config.max_tick_delta).contains(&dt) {
            debug!(dt, max = self.config.max_tick_delta, "stale tick skipped");
            return Ok(self.snapshot());
        }

        match self.advance(dt) {
            Ok(state) => {
                self.state = state;
                self.refresh_mode();
                self.elapsed += dt;
                self.ticks += 1;
                Ok(self.snapshot())
            }
            Err(err) => {
                warn!(dt, ticks = self.ticks, error = %err, "tick rejected, state kept");
                Err(err)
            }
        }
    }

    /// Integrate one tick into a candidate state without committing it.
    fn advance(&self, dt: f64) -> SimResult<PhysicalState> {
        let mut state = self.state;

        let Some(controller) = &self.controller else {
            state = self.integrator.step(&state, &self.dynamics, 0.0, dt);
            self.jidoka.check(&state)?;
            return Ok(state);
        };

        let h = dt / f64::from(self.config.substeps);
        for _ in 0..self.config.substeps {
            let output = controller.compute(state.theta, state.omega);
            state = self.integrator.step(&state, &self.dynamics, output.torque, h);
            state.theta = wrap_angle(state.theta);
            self.jidoka.check(&state)?;
        }
        Ok(state)
    }

    /// Read-only view of the current state plus derived telemetry.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let pendulum = &self.params.pendulum;
        let energy = pendulum.energy(self.state.theta, self.state.omega);
        Snapshot {
            state: self.state,
            mode: self.mode,
            paused: self.is_paused(),
            energy,
            energy_error: self
                .controller
                .as_ref()
                .map(|_| energy - pendulum.upright_energy()),
            elapsed: self.elapsed,
            ticks: self.ticks,
        }
    }

    /// Replace the parameter set and reset.
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error and keeps the previous
    /// configuration and state untouched.
    pub fn set_parameters(&mut self, params: ParameterSet) -> SimResult<()> {
        params.check()?;

        let (dynamics, controller, jidoka) = build_parts(&params);
        self.params = params;
        self.dynamics = dynamics;
        self.controller = controller;
        self.jidoka = jidoka;
        debug!(controlled = params.is_controlled(), "parameters replaced");
        self.reset();
        Ok(())
    }

    /// Reinitialize the state from the current parameters and resume.
    pub fn reset(&mut self) {
        self.state = PhysicalState::at_rest(self.params.pendulum.initial_angle);
        self.run_state = RunState::Running;
        self.elapsed = 0.0;
        self.ticks = 0;
        self.refresh_mode();
        debug!(theta = self.state.theta, "engine reset");
    }

    /// Flip between running and paused, returning the new state.
    pub fn toggle_pause(&mut self) -> RunState {
        self.run_state = self.run_state.toggled();
        self.run_state
    }

    /// Check whether ticks are suspended.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.run_state == RunState::Paused
    }

    /// Current run state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Current physical state.
    #[must_use]
    pub const fn state(&self) -> &PhysicalState {
        &self.state
    }

    /// Active parameter set.
    #[must_use]
    pub const fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Engine settings.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Name of the integrator in use.
    #[must_use]
    pub fn integrator_name(&self) -> &'static str {
        self.integrator.name()
    }

    /// Install an arbitrary state, keeping counters and run state.
    ///
    /// The controlled pendulum wraps `theta` into `(-π, π]` first.
    ///
    /// # Errors
    ///
    /// Returns a Jidoka violation for non-finite fields or a torque outside
    /// the bound (any nonzero torque on the free pendulum); the engine is
    /// left untouched.
    pub fn restore_state(&mut self, mut state: PhysicalState) -> SimResult<()> {
        if self.controller.is_some() {
            state.theta = wrap_angle(state.theta);
        }
        self.jidoka.check(&state)?;
        self.state = state;
        self.refresh_mode();
        Ok(())
    }

    /// The control command the next sub-step would start from.
    ///
    /// `None` for the free pendulum.
    #[must_use]
    pub fn control_output(&self) -> Option<ControlOutput> {
        self.controller
            .as_ref()
            .map(|c| c.compute(self.state.theta, self.state.omega))
    }

    fn refresh_mode(&mut self) {
        self.mode = self.control_output().map(|output| output.mode);
    }
}

/// Dynamics, control law and guard for a parameter set.
///
/// The controlled pendulum applies damping as a raw torque, the free one
/// scales it by the mass. The free pendulum admits no torque at all.
fn build_parts(
    params: &ParameterSet,
) -> (
    PendulumDynamics,
    Option<Box<dyn ControlLaw + Send + Sync>>,
    JidokaGuard,
) {
    match params.control {
        Some(gains) => {
            let controller: Box<dyn ControlLaw + Send + Sync> =
                Box::new(EnergySwingUpController::new(params.pendulum, gains));
            (
                PendulumDynamics::new(params.pendulum, DampingModel::Viscous),
                Some(controller),
                JidokaGuard::new(Some(gains.torque_limit)),
            )
        }
        None => (
            PendulumDynamics::new(params.pendulum, DampingModel::MassNormalized),
            None,
            JidokaGuard::new(Some(0.0)),
        ),
    }
}
