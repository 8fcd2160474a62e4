//! pendulum-sim CLI - headless pendulum simulation runner
//!
//! Command-line interface for running simulations.

use pendulum_sim::cli::{run_cli, Args};
use std::process::ExitCode;

fn main() -> ExitCode {
    run_cli(Args::parse())
}
