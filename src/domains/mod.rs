//! Domain-specific simulation components.
//!
//! - Physics: pendulum equation of motion and integrators
//! - Control: hybrid energy swing-up / PD stabilization law

pub mod control;
pub mod physics;

pub use control::{ControlLaw, ControlMode, ControlOutput, EnergySwingUpController};
pub use physics::{
    integrator_for, DampingModel, Integrator, PendulumDynamics, Rk4Integrator, SymplecticEuler,
};
