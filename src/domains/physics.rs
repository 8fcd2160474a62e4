//! Physics domain engine.
//!
//! Implements the pendulum equation of motion and the numerical schemes that
//! advance it:
//! - Semi-implicit (symplectic) Euler, 1st order
//! - RK4, 4th order
//!
//! # Energy Behaviour
//!
//! Symplectic Euler does not conserve energy exactly, but its error stays
//! bounded over long undamped runs instead of drifting.

use std::fmt::Debug;

use crate::config::{IntegratorType, PendulumParams};
use crate::engine::state::PhysicalState;

/// How the viscous damping term is scaled.
///
/// The free pendulum divides the damping coefficient by the mass while the
/// controlled pendulum applies it as a raw torque. Both scalings are kept so
/// existing parameter sets behave as they always have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DampingModel {
    /// `α = τ/(m·L²) − (g/L)·sin θ − (b/m)·ω`
    MassNormalized,
    /// `α = (τ − b·ω − m·g·L·sin θ) / (m·L²)`
    Viscous,
}

/// Equation of motion of a damped point-mass pendulum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendulumDynamics {
    params: PendulumParams,
    damping: DampingModel,
}

impl PendulumDynamics {
    /// Create dynamics for the given plant.
    #[must_use]
    pub const fn new(params: PendulumParams, damping: DampingModel) -> Self {
        Self { params, damping }
    }

    /// Plant parameters.
    #[must_use]
    pub const fn params(&self) -> &PendulumParams {
        &self.params
    }

    /// Damping scaling in use.
    #[must_use]
    pub const fn damping_model(&self) -> DampingModel {
        self.damping
    }

    /// Angular acceleration under an applied torque.
    #[must_use]
    pub fn angular_acceleration(&self, theta: f64, omega: f64, torque: f64) -> f64 {
        let p = &self.params;
        match self.damping {
            DampingModel::MassNormalized => {
                torque / p.inertia() - p.gravity / p.length * theta.sin()
                    - p.damping / p.mass * omega
            }
            DampingModel::Viscous => {
                (torque - p.damping * omega - p.upright_energy() * theta.sin()) / p.inertia()
            }
        }
    }
}

/// Numerical integrator trait.
pub trait Integrator: Debug {
    /// Advance `state` by `dt` with `torque` applied over the whole step.
    ///
    /// Pure: the returned state carries the new `theta`/`omega`, the
    /// acceleration used, and `torque`.
    fn step(
        &self,
        state: &PhysicalState,
        dynamics: &PendulumDynamics,
        torque: f64,
        dt: f64,
    ) -> PhysicalState;

    /// Get the error order of this integrator.
    fn error_order(&self) -> u32;

    /// Check if integrator is symplectic (preserves phase space volume).
    fn is_symplectic(&self) -> bool;

    /// Human-readable name.
    fn name(&self) -> &'static str;
}

/// Build the integrator selected in configuration.
#[must_use]
pub fn integrator_for(kind: IntegratorType) -> Box<dyn Integrator + Send + Sync> {
    match kind {
        IntegratorType::SymplecticEuler => Box::new(SymplecticEuler::new()),
        IntegratorType::Rk4 => Box::new(Rk4Integrator::new()),
    }
}

/// Semi-implicit (symplectic) Euler integrator.
///
/// Updates velocity first, then moves position with the new velocity:
/// ```text
/// ω_{n+1} = ω_n + h · α(θ_n, ω_n)
/// θ_{n+1} = θ_n + h · ω_{n+1}
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SymplecticEuler;

impl SymplecticEuler {
    /// Create a new symplectic Euler integrator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Integrator for SymplecticEuler {
    fn step(
        &self,
        state: &PhysicalState,
        dynamics: &PendulumDynamics,
        torque: f64,
        dt: f64,
    ) -> PhysicalState {
        let alpha = dynamics.angular_acceleration(state.theta, state.omega, torque);
        let omega = state.omega + alpha * dt;
        let theta = state.theta + omega * dt;

        PhysicalState {
            theta,
            omega,
            alpha,
            torque,
        }
    }

    fn error_order(&self) -> u32 {
        1
    }

    fn is_symplectic(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "symplectic-euler"
    }
}

/// Runge-Kutta 4th order integrator.
///
/// Fourth-order accurate, non-symplectic. The torque is held constant across
/// the four stages and `alpha` reports the stage-1 acceleration.
///
/// Algorithm (classical RK4):
/// ```text
/// k1 = f(θ_n,            ω_n)
/// k2 = f(θ_n + h/2·k1_θ, ω_n + h/2·k1_ω)
/// k3 = f(θ_n + h/2·k2_θ, ω_n + h/2·k2_ω)
/// k4 = f(θ_n + h·k3_θ,   ω_n + h·k3_ω)
/// y_{n+1} = y_n + h/6·(k1 + 2·k2 + 2·k3 + k4)
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Rk4Integrator;

impl Rk4Integrator {
    /// Create a new RK4 integrator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Integrator for Rk4Integrator {
    fn step(
        &self,
        state: &PhysicalState,
        dynamics: &PendulumDynamics,
        torque: f64,
        dt: f64,
    ) -> PhysicalState {
        let accel = |theta: f64, omega: f64| dynamics.angular_acceleration(theta, omega, torque);
        let half_dt = dt / 2.0;
        let (theta0, omega0) = (state.theta, state.omega);

        let k1_theta = omega0;
        let k1_omega = accel(theta0, omega0);

        let k2_theta = omega0 + half_dt * k1_omega;
        let k2_omega = accel(theta0 + half_dt * k1_theta, omega0 + half_dt * k1_omega);

        let k3_theta = omega0 + half_dt * k2_omega;
        let k3_omega = accel(theta0 + half_dt * k2_theta, omega0 + half_dt * k2_omega);

        let k4_theta = omega0 + dt * k3_omega;
        let k4_omega = accel(theta0 + dt * k3_theta, omega0 + dt * k3_omega);

        PhysicalState {
            theta: theta0 + (dt / 6.0) * (k1_theta + 2.0 * k2_theta + 2.0 * k3_theta + k4_theta),
            omega: omega0 + (dt / 6.0) * (k1_omega + 2.0 * k2_omega + 2.0 * k3_omega + k4_omega),
            alpha: k1_omega,
            torque,
        }
    }

    fn error_order(&self) -> u32 {
        4
    }

    fn is_symplectic(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "rk4"
    }
}
