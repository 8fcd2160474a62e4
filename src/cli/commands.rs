//! CLI command handlers.
//!
//! This module contains the execution logic for each CLI command.
//! Extracted to enable testing of command behavior.

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use super::args::{OutputFormat, RunOptions};
use super::output::{
    print_help, print_presets, print_version, write_header, write_sample, write_summary,
};
use super::{init_tracing, Args, Command};
use crate::config::SimConfig;
use crate::domains::control::ControlMode;
use crate::engine::Snapshot;
use crate::error::{SimError, SimResult};
use crate::scenarios::{PendulumScenario, Preset};
use crate::session::{Session, SimulationModule};

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run {
            config_path,
            options,
        } => {
            init_tracing(options.verbose);
            run_config_file(&config_path, &options)
        }
        Command::Preset { name, options } => {
            init_tracing(options.verbose);
            run_preset(&name, &options)
        }
        Command::Presets => {
            print_presets();
            ExitCode::SUCCESS
        }
        Command::Validate { config_path } => validate_config(&config_path),
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

/// Aggregate statistics of one headless run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Module that ran.
    pub module: SimulationModule,
    /// Integrator name.
    pub integrator: &'static str,
    /// Frames driven.
    pub frames: u64,
    /// Frames written to the output.
    pub samples: u64,
    /// Energy of the initial state (J).
    pub initial_energy: f64,
    /// Lowest energy seen (J).
    pub min_energy: f64,
    /// Highest energy seen (J).
    pub max_energy: f64,
    /// Largest applied `|torque|` (N·m).
    pub peak_torque: f64,
    /// Frames that ended in PD mode.
    pub stabilizing_frames: u64,
    /// State after the last frame.
    pub final_snapshot: Snapshot,
}

impl RunSummary {
    fn new(module: SimulationModule, integrator: &'static str, initial: Snapshot) -> Self {
        Self {
            module,
            integrator,
            frames: 0,
            samples: 0,
            initial_energy: initial.energy,
            min_energy: initial.energy,
            max_energy: initial.energy,
            peak_torque: 0.0,
            stabilizing_frames: 0,
            final_snapshot: initial,
        }
    }

    fn record(&mut self, snapshot: Snapshot) {
        self.frames += 1;
        self.min_energy = self.min_energy.min(snapshot.energy);
        self.max_energy = self.max_energy.max(snapshot.energy);
        self.peak_torque = self.peak_torque.max(snapshot.state.torque.abs());
        if snapshot.mode == Some(ControlMode::Stabilize) {
            self.stabilizing_frames += 1;
        }
        self.final_snapshot = snapshot;
    }
}

/// Drive a session for `config.run` and stream telemetry into `out`.
///
/// Timestamps advance by `1 / frame_rate` per frame; the first frame ticks
/// with a zero delta.
///
/// # Errors
///
/// Returns error if the configuration is invalid, a tick is rejected, or
/// writing fails.
pub fn run_simulation<W: Write>(
    config: &SimConfig,
    format: OutputFormat,
    out: &mut W,
) -> SimResult<RunSummary> {
    config.check()?;
    let mut session = Session::from_config(config)?;
    let run = config.run;
    let frames = run.frame_count();
    let every = u64::from(run.sample_every);

    let mut summary = RunSummary::new(
        session.module(),
        session.engine().integrator_name(),
        session.snapshot(),
    );

    write_header(out, format)?;
    for frame in 0..frames {
        let now = Duration::try_from_secs_f64(frame as f64 / run.frame_rate)
            .map_err(|e| SimError::config(format!("frame timestamp out of range: {e}")))?;
        let snapshot = session.frame(now)?;
        summary.record(snapshot);

        if frame % every == 0 || frame + 1 == frames {
            write_sample(out, format, frame, &snapshot)?;
            summary.samples += 1;
        }
    }
    write_summary(out, format, &summary)?;

    Ok(summary)
}

/// Run a simulation from a YAML file.
#[must_use]
pub fn run_config_file(path: &Path, options: &RunOptions) -> ExitCode {
    let result = SimConfig::load(path).and_then(|mut config| {
        options.apply(&mut config)?;
        Ok(config)
    });
    match result {
        Ok(config) => run_to_stdout(&config, options.format),
        Err(e) => {
            eprintln!("Error: {}: {e}", path.display());
            ExitCode::from(1)
        }
    }
}

/// Run a named preset.
#[must_use]
pub fn run_preset(name: &str, options: &RunOptions) -> ExitCode {
    let result = name.parse::<Preset>().and_then(|preset| {
        let mut config = SimConfig::builder()
            .name(preset.name())
            .params(preset.params())
            .build();
        config.simulation.description = preset.description().to_string();
        options.apply(&mut config)?;
        Ok(config)
    });
    match result {
        Ok(config) => run_to_stdout(&config, options.format),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run_to_stdout(config: &SimConfig, format: OutputFormat) -> ExitCode {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match run_simulation(config, format, &mut out) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if e.is_recoverable() {
                eprintln!("The engine kept its last valid state; check the parameters.");
            }
            ExitCode::from(1)
        }
    }
}

/// Load and validate a configuration file.
#[must_use]
pub fn validate_config(path: &Path) -> ExitCode {
    println!("Validating: {}\n", path.display());

    match SimConfig::load(path) {
        Ok(config) => {
            let params = config.parameter_set();
            println!("✓ Configuration valid");
            println!("  Module:     {}", SimulationModule::for_params(&params));
            println!("  Integrator: {:?}", config.engine.integrator);
            println!("  Substeps:   {}", config.engine.substeps);
            println!(
                "  Run:        {} s at {} Hz ({} frames)",
                config.run.duration,
                config.run.frame_rate,
                config.run.frame_count()
            );
            if let Some(period) = PendulumScenario::new(params)
                .ok()
                .and_then(|scenario| scenario.small_angle_period())
            {
                println!("  Period:     {period:.3} s (small-angle)");
            }
            if params.clamp_to_slider_ranges() != params {
                println!("  Note: some parameters lie outside the slider ranges");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("✗ Validation failed: {e}");
            ExitCode::from(1)
        }
    }
}
