//! # pendulum-sim
//!
//! Gravity pendulum and inverted-pendulum control simulation engine.
//!
//! A small, deterministic simulation core implementing:
//! - Semi-implicit (symplectic) Euler and RK4 integration of a damped pendulum
//! - Hybrid energy swing-up / PD stabilization with torque saturation
//! - Jidoka: a tick that would corrupt the state is rejected, not committed
//! - Poka-Yoke: validated parameter sets and YAML configuration
//!
//! ## Example
//!
//! ```rust
//! use pendulum_sim::prelude::*;
//!
//! let params = ParameterSet::controlled(PendulumParams::default(), ControlParams::default());
//! let mut engine = Engine::new(params, RunState::Running).unwrap();
//!
//! let snapshot = engine.tick(1.0 / 60.0).unwrap();
//! assert!(snapshot.state.torque.abs() <= 1.0);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,  // Written to mirror the equations of motion
    clippy::imprecise_flops,
    clippy::missing_const_for_fn,
)]

pub mod cli;
pub mod config;
pub mod domains;
pub mod engine;
pub mod error;
pub mod scenarios;
pub mod session;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{
        ControlParams, EngineConfig, IntegratorType, ParameterSet, PendulumParams, SimConfig,
        SimConfigBuilder,
    };
    pub use crate::domains::control::{ControlLaw, ControlMode, ControlOutput};
    pub use crate::engine::jidoka::{JidokaGuard, JidokaViolation};
    pub use crate::engine::{Engine, PhysicalState, RunState, Snapshot};
    pub use crate::error::{SimError, SimResult};
    pub use crate::scenarios::Preset;
    pub use crate::session::{Session, SimulationModule};
}

/// Re-export for public API
pub use error::{SimError, SimResult};
