//! CLI argument parsing.
//!
//! This module provides the argument parser for the pendulum-sim CLI.
//! Extracted to enable testing of argument parsing logic.

use std::path::PathBuf;
use std::str::FromStr;

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Run a simulation from a YAML configuration.
    Run {
        /// Path to the configuration file.
        config_path: PathBuf,
        /// Run overrides and output settings.
        options: RunOptions,
    },
    /// Run a named preset.
    Preset {
        /// Preset name (e.g. "swing-up").
        name: String,
        /// Run overrides and output settings.
        options: RunOptions,
    },
    /// List the available presets.
    Presets,
    /// Load and validate a configuration file.
    Validate {
        /// Path to the configuration file.
        config_path: PathBuf,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

/// Telemetry output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned human-readable lines plus a summary block.
    #[default]
    Text,
    /// One JSON object per sample, then one summary object.
    Json,
    /// Header row plus one row per sample.
    Csv,
}

impl FromStr for OutputFormat {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(SimError::config(format!(
                "unknown format '{other}', expected text, json or csv"
            ))),
        }
    }
}

/// Options shared by `run` and `preset`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    /// Override `run.duration` (s).
    pub duration: Option<f64>,
    /// Override `run.frame_rate` (Hz).
    pub fps: Option<f64>,
    /// Override `run.sample_every`.
    pub every: Option<u32>,
    /// Output format.
    pub format: OutputFormat,
    /// Clamp parameters into the slider ranges before running.
    pub clamp: bool,
    /// Enable debug logging.
    pub verbose: bool,
}

impl RunOptions {
    /// Apply the overrides to `config` and re-validate it.
    ///
    /// # Errors
    ///
    /// Returns error if an override leaves the configuration invalid.
    pub fn apply(&self, config: &mut SimConfig) -> SimResult<()> {
        if let Some(duration) = self.duration {
            config.run.duration = duration;
        }
        if let Some(fps) = self.fps {
            config.run.frame_rate = fps;
        }
        if let Some(every) = self.every {
            config.run.sample_every = every;
        }
        if self.clamp {
            let params = config.parameter_set().clamp_to_slider_ranges();
            config.pendulum = params.pendulum;
            config.control = params.control;
        }
        config.check()
    }
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// This method is testable as it accepts any iterator of strings,
    /// not just `std::env::args()`.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    /// Internal parsing from a vector of strings.
    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "run" => Self::parse_run_command(args),
            "preset" => Self::parse_preset_command(args),
            "presets" => Command::Presets,
            "validate" => Self::parse_validate_command(args),
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    /// Parse the 'run' command arguments.
    fn parse_run_command(args: &[String]) -> Command {
        if args.len() < 3 {
            eprintln!("Error: 'run' command requires a configuration path");
            return Command::Help;
        }

        match Self::parse_run_options(&args[3..]) {
            Some(options) => Command::Run {
                config_path: PathBuf::from(&args[2]),
                options,
            },
            None => Command::Help,
        }
    }

    /// Parse the 'preset' command arguments.
    fn parse_preset_command(args: &[String]) -> Command {
        if args.len() < 3 {
            eprintln!("Error: 'preset' command requires a preset name");
            return Command::Help;
        }

        match Self::parse_run_options(&args[3..]) {
            Some(options) => Command::Preset {
                name: args[2].clone(),
                options,
            },
            None => Command::Help,
        }
    }

    /// Parse the 'validate' command arguments.
    fn parse_validate_command(args: &[String]) -> Command {
        if args.len() < 3 {
            eprintln!("Error: 'validate' command requires a configuration path");
            return Command::Help;
        }

        Command::Validate {
            config_path: PathBuf::from(&args[2]),
        }
    }

    /// Parse the options following `run <path>` or `preset <name>`.
    ///
    /// Returns `None` (after reporting) on a malformed value.
    fn parse_run_options(rest: &[String]) -> Option<RunOptions> {
        let mut options = RunOptions::default();

        let mut i = 0;
        while i < rest.len() {
            let value = rest.get(i + 1).map(String::as_str);
            match rest[i].as_str() {
                "--duration" => {
                    options.duration = Some(Self::parse_value("--duration", value)?);
                    i += 2;
                }
                "--fps" => {
                    options.fps = Some(Self::parse_value("--fps", value)?);
                    i += 2;
                }
                "--every" => {
                    options.every = Some(Self::parse_value("--every", value)?);
                    i += 2;
                }
                "--format" => {
                    options.format = Self::parse_value("--format", value)?;
                    i += 2;
                }
                "--clamp" => {
                    options.clamp = true;
                    i += 1;
                }
                "-v" | "--verbose" => {
                    options.verbose = true;
                    i += 1;
                }
                unknown => {
                    eprintln!("Warning: ignoring unknown option '{unknown}'");
                    i += 1;
                }
            }
        }

        Some(options)
    }

    fn parse_value<T: FromStr>(flag: &str, value: Option<&str>) -> Option<T> {
        let Some(raw) = value else {
            eprintln!("Error: '{flag}' requires a value");
            return None;
        };
        let parsed = raw.parse().ok();
        if parsed.is_none() {
            eprintln!("Error: invalid value '{raw}' for '{flag}'");
        }
        parsed
    }
}
