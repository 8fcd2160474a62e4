//! Module selector and tick-driver glue.
//!
//! A [`Session`] holds exactly one active [`Engine`] together with the
//! [`FrameClock`] that turns display timestamps into tick deltas. Switching
//! modules tears down both and starts the new engine from its reset state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::config::{ControlParams, ParameterSet, PendulumParams, SimConfig};
use crate::engine::{Engine, FrameClock, RunState, Snapshot};
use crate::error::{SimError, SimResult};

/// Selectable simulation modules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimulationModule {
    /// Free damped pendulum.
    #[default]
    Pendulum,
    /// Pendulum driven by the swing-up controller.
    PendulumControl,
}

impl SimulationModule {
    /// Every module, in selector order.
    pub const ALL: [Self; 2] = [Self::Pendulum, Self::PendulumControl];

    /// Identifier used in configuration and on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pendulum => "pendulum",
            Self::PendulumControl => "pendulum-control",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pendulum => "Simple Pendulum",
            Self::PendulumControl => "Controlled Pendulum",
        }
    }

    /// Parameters a freshly selected module starts with.
    #[must_use]
    pub fn default_params(self) -> ParameterSet {
        match self {
            Self::Pendulum => ParameterSet::uncontrolled(PendulumParams::default()),
            Self::PendulumControl => {
                ParameterSet::controlled(PendulumParams::default(), ControlParams::default())
            }
        }
    }

    /// Module that runs `params`.
    #[must_use]
    pub const fn for_params(params: &ParameterSet) -> Self {
        if params.is_controlled() {
            Self::PendulumControl
        } else {
            Self::Pendulum
        }
    }
}

impl fmt::Display for SimulationModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SimulationModule {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|module| module.name() == s)
            .ok_or_else(|| {
                SimError::config(format!(
                    "unknown module '{s}', expected 'pendulum' or 'pendulum-control'"
                ))
            })
    }
}

/// The active engine plus its timestamp baseline.
#[derive(Debug)]
pub struct Session {
    module: SimulationModule,
    engine: Engine,
    clock: FrameClock,
}

impl Session {
    /// Start `module` with its default parameters.
    ///
    /// # Errors
    ///
    /// Returns error if the default parameters fail validation.
    pub fn new(module: SimulationModule) -> SimResult<Self> {
        Self::with_params(module.default_params())
    }

    /// Start the module matching `params`.
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error if `params` violates its domain.
    pub fn with_params(params: ParameterSet) -> SimResult<Self> {
        Ok(Self {
            module: SimulationModule::for_params(&params),
            engine: Engine::new(params, RunState::Running)?,
            clock: FrameClock::new(),
        })
    }

    /// Start from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration fails validation.
    pub fn from_config(config: &SimConfig) -> SimResult<Self> {
        let engine = Engine::from_config(config)?;
        Ok(Self {
            module: SimulationModule::for_params(engine.params()),
            engine,
            clock: FrameClock::new(),
        })
    }

    /// Drive one display frame at timestamp `now`.
    ///
    /// The first frame after creation, reset or a parameter change ticks
    /// with a zero delta.
    ///
    /// # Errors
    ///
    /// Propagates a rejected tick from the engine.
    pub fn frame(&mut self, now: Duration) -> SimResult<Snapshot> {
        let dt = self.clock.delta(now);
        self.engine.tick(dt)
    }

    /// Replace the parameters, switching module if the controller presence
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error and keeps the session unchanged.
    pub fn set_parameters(&mut self, params: ParameterSet) -> SimResult<()> {
        let module = SimulationModule::for_params(&params);
        self.engine.set_parameters(params)?;
        if module != self.module {
            info!(from = self.module.name(), to = module.name(), "module switched");
            self.module = module;
        }
        self.clock.reset();
        Ok(())
    }

    /// Tear down the active engine and start `module` from its defaults.
    ///
    /// The pause flag carries over to the new engine.
    ///
    /// # Errors
    ///
    /// Returns error if the module defaults fail validation.
    pub fn switch_module(&mut self, module: SimulationModule) -> SimResult<()> {
        let run_state = self.engine.run_state();
        let engine = Engine::with_config(module.default_params(), *self.engine.config(), run_state)?;
        info!(from = self.module.name(), to = module.name(), "module switched");
        self.engine = engine;
        self.module = module;
        self.clock = FrameClock::new();
        Ok(())
    }

    /// Reset the active engine and the timestamp baseline.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.clock.reset();
    }

    /// Flip the pause flag of the active engine.
    pub fn toggle_pause(&mut self) -> RunState {
        self.engine.toggle_pause()
    }

    /// Check whether the active engine is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.engine.is_paused()
    }

    /// Active module.
    #[must_use]
    pub const fn module(&self) -> SimulationModule {
        self.module
    }

    /// Active engine.
    #[must_use]
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Snapshot of the active engine.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_module_names() {
        assert_eq!(SimulationModule::Pendulum.name(), "pendulum");
        assert_eq!(SimulationModule::PendulumControl.label(), "Controlled Pendulum");
        assert_eq!(
            "pendulum-control".parse::<SimulationModule>().unwrap(),
            SimulationModule::PendulumControl
        );
        assert!("double".parse::<SimulationModule>().is_err());
    }

    #[test]
    fn test_module_for_params() {
        for module in SimulationModule::ALL {
            assert_eq!(SimulationModule::for_params(&module.default_params()), module);
        }
    }

    #[test]
    fn test_session_first_frame_is_zero_delta() {
        let mut session = Session::new(SimulationModule::Pendulum).unwrap();
        let initial = *session.engine().state();

        // Timestamps start far from zero; the first frame must not jump.
        let snapshot = session.frame(ms(90_000)).unwrap();
        assert!(snapshot.state.theta.to_bits() == initial.theta.to_bits());
        assert_eq!(snapshot.ticks, 1);

        let snapshot = session.frame(ms(90_016)).unwrap();
        assert!(snapshot.state.theta < initial.theta);
    }

    #[test]
    fn test_session_long_gap_is_skipped() {
        let mut session = Session::new(SimulationModule::Pendulum).unwrap();
        session.frame(ms(0)).unwrap();
        session.frame(ms(16)).unwrap();
        let before = *session.engine().state();

        let snapshot = session.frame(ms(5_000)).unwrap();
        assert!(snapshot.state.bit_eq(&before));

        // The gap re-baselines the clock; the next frame advances normally.
        let snapshot = session.frame(ms(5_016)).unwrap();
        assert!(!snapshot.state.bit_eq(&before));
    }

    #[test]
    fn test_session_set_parameters_switches_module() {
        let mut session = Session::new(SimulationModule::Pendulum).unwrap();
        session.frame(ms(0)).unwrap();
        session.frame(ms(16)).unwrap();

        session
            .set_parameters(SimulationModule::PendulumControl.default_params())
            .unwrap();
        assert_eq!(session.module(), SimulationModule::PendulumControl);
        assert!(session.snapshot().mode.is_some());

        // Baseline cleared: the next frame is a zero-delta tick.
        let start = *session.engine().state();
        let snapshot = session.frame(ms(60_000)).unwrap();
        assert!((snapshot.state.theta - start.theta).abs() < 1e-12);
        assert_eq!(snapshot.state.omega, 0.0);
    }

    #[test]
    fn test_session_set_parameters_rejects_invalid() {
        let mut session = Session::new(SimulationModule::Pendulum).unwrap();
        let bad = ParameterSet::controlled(
            PendulumParams::default(),
            ControlParams {
                torque_limit: 0.0,
                ..ControlParams::default()
            },
        );
        assert!(session.set_parameters(bad).is_err());
        assert_eq!(session.module(), SimulationModule::Pendulum);
        assert!(!session.engine().params().is_controlled());
    }

    #[test]
    fn test_session_switch_module_keeps_pause() {
        let mut session = Session::new(SimulationModule::Pendulum).unwrap();
        session.toggle_pause();
        session.switch_module(SimulationModule::PendulumControl).unwrap();

        assert_eq!(session.module(), SimulationModule::PendulumControl);
        assert!(session.is_paused());
        assert!(session.engine().params().is_controlled());
    }

    #[test]
    fn test_session_reset_resumes() {
        let mut session = Session::new(SimulationModule::PendulumControl).unwrap();
        session.frame(ms(0)).unwrap();
        session.frame(ms(16)).unwrap();
        session.toggle_pause();

        session.reset();
        assert!(!session.is_paused());
        assert_eq!(session.snapshot().ticks, 0);
    }

    #[test]
    fn test_session_from_config() {
        let config = SimConfig::builder()
            .params(SimulationModule::PendulumControl.default_params())
            .build();
        let session = Session::from_config(&config).unwrap();
        assert_eq!(session.module(), SimulationModule::PendulumControl);
    }
}
