//! CLI output formatting.
//!
//! This module contains all output formatting functions for the CLI.
//! Writers are generic so tests can capture output in a `Vec<u8>`.

use serde::Serialize;
use std::io::Write;

use super::args::OutputFormat;
use super::commands::RunSummary;
use crate::engine::Snapshot;
use crate::error::SimResult;
use crate::scenarios::Preset;

/// Print version information.
pub fn print_version() {
    println!("pendulum-sim {}", env!("CARGO_PKG_VERSION"));
}

/// Print help message.
pub fn print_help() {
    println!(
        r"pendulum-sim - Gravity pendulum and swing-up controller simulation

USAGE:
    pendulum-sim <COMMAND> [OPTIONS]

COMMANDS:
    run <config.yaml>           Run a simulation from a configuration file
    preset <name>               Run a named preset
        --duration <S>          Override the simulated duration (seconds)
        --fps <N>               Override the frame rate driving the ticks
        --every <N>             Emit telemetry every N frames
        --format <F>            text (default), json or csv
        --clamp                 Clamp parameters into the slider ranges
        -v, --verbose           Enable debug logging (RUST_LOG overrides)

    presets                     List available presets
    validate <config.yaml>      Load and validate a configuration file

    help                        Show this help message
    version                     Show version information

EXAMPLES:
    pendulum-sim preset swing-up --duration 20
    pendulum-sim run pendulum.yaml --format csv --every 1
    pendulum-sim validate pendulum.yaml

NOTES:
    Frame deltas above engine.max_tick_delta (default 0.1 s) are skipped,
    so frame rates below 10 Hz leave the pendulum frozen.
"
    );
}

/// Print the preset table.
pub fn print_presets() {
    println!("Available presets:\n");
    for preset in Preset::ALL {
        println!("  {:<12} {}", preset.name(), preset.description());
    }
    println!("\nUsage: pendulum-sim preset <name>");
}

/// One telemetry sample as emitted in JSON mode.
#[derive(Debug, Serialize)]
struct SampleRecord<'a> {
    frame: u64,
    #[serde(flatten)]
    snapshot: &'a Snapshot,
}

/// End-of-run record as emitted in JSON mode.
#[derive(Debug, Serialize)]
struct SummaryRecord<'a> {
    summary: &'a RunSummary,
}

/// Write the stream header, if the format has one.
///
/// # Errors
///
/// Returns error if writing fails.
pub fn write_header<W: Write>(out: &mut W, format: OutputFormat) -> SimResult<()> {
    match format {
        OutputFormat::Text => writeln!(
            out,
            "{:>7} {:>9} {:>10} {:>9} {:>10} {:>9} {:>10}  mode",
            "frame", "time[s]", "theta[rad]", "deg", "omega", "torque", "energy"
        )?,
        OutputFormat::Json => {}
        OutputFormat::Csv => writeln!(
            out,
            "frame,time,theta,omega,alpha,torque,energy,energy_error,mode,paused"
        )?,
    }
    Ok(())
}

/// Write one sampled frame.
///
/// # Errors
///
/// Returns error if writing or serialization fails.
pub fn write_sample<W: Write>(
    out: &mut W,
    format: OutputFormat,
    frame: u64,
    snapshot: &Snapshot,
) -> SimResult<()> {
    let s = &snapshot.state;
    let mode = snapshot.mode.map(|m| m.to_string()).unwrap_or_default();
    match format {
        OutputFormat::Text => writeln!(
            out,
            "{frame:>7} {:>9.3} {:>10.4} {:>9.2} {:>10.4} {:>9.4} {:>10.4}  {}",
            snapshot.elapsed,
            s.theta,
            s.angle_degrees(),
            s.omega,
            s.torque,
            snapshot.energy,
            if mode.is_empty() { "-" } else { mode.as_str() },
        )?,
        OutputFormat::Json => {
            let line = serde_json::to_string(&SampleRecord { frame, snapshot })?;
            writeln!(out, "{line}")?;
        }
        OutputFormat::Csv => writeln!(
            out,
            "{frame},{},{},{},{},{},{},{},{mode},{}",
            snapshot.elapsed,
            s.theta,
            s.omega,
            s.alpha,
            s.torque,
            snapshot.energy,
            snapshot
                .energy_error
                .map(|e| e.to_string())
                .unwrap_or_default(),
            snapshot.paused,
        )?,
    }
    Ok(())
}

/// Write the end-of-run summary.
///
/// CSV output carries no summary so the stream stays a single table.
///
/// # Errors
///
/// Returns error if writing or serialization fails.
pub fn write_summary<W: Write>(
    out: &mut W,
    format: OutputFormat,
    summary: &RunSummary,
) -> SimResult<()> {
    match format {
        OutputFormat::Text => {
            let last = &summary.final_snapshot;
            writeln!(out)?;
            writeln!(out, "Module:        {}", summary.module)?;
            writeln!(out, "Integrator:    {}", summary.integrator)?;
            writeln!(out, "Frames:        {} ({} sampled)", summary.frames, summary.samples)?;
            writeln!(out, "Ticks:         {}", last.ticks)?;
            writeln!(out, "Simulated:     {:.3} s", last.elapsed)?;
            writeln!(
                out,
                "Energy:        {:.4} J -> {:.4} J (min {:.4}, max {:.4})",
                summary.initial_energy, last.energy, summary.min_energy, summary.max_energy
            )?;
            writeln!(
                out,
                "Final angle:   {:.4} rad ({:.2} deg)",
                last.state.theta,
                last.state.angle_degrees()
            )?;
            if let Some(error) = last.energy_error {
                writeln!(out, "Energy error:  {error:.4} J")?;
                writeln!(out, "Peak torque:   {:.4} N·m", summary.peak_torque)?;
                writeln!(out, "Stabilizing:   {} frames", summary.stabilizing_frames)?;
            }
        }
        OutputFormat::Json => {
            let line = serde_json::to_string(&SummaryRecord { summary })?;
            writeln!(out, "{line}")?;
        }
        OutputFormat::Csv => {}
    }
    Ok(())
}
