//! Pre-built simulation scenarios.
//!
//! Provides ready-to-use parameter sets for the pendulum runner and the
//! slider ranges used to clamp user input.

pub mod pendulum;

pub use pendulum::{PendulumScenario, Preset, SliderRange, SliderRanges};
