//! Command line and config file handling for `tsid`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tsi_driver::DriverConfig;

/// Where log records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    /// Human-readable lines on stderr.
    Console,
    /// The systemd journal.
    Journal,
}

/// Feed touch frames from the TSI lines into a virtual pointer.
///
/// Settings come from the built-in defaults, then the JSON file given with
/// `--config`, then the flags and `TSI_*` environment variables.
#[derive(Debug, Parser)]
#[command(name = "tsid")]
#[command(about = "Touch screen interface daemon - GPIO clock/data frames to pointer events")]
#[command(version)]
pub struct Cli {
    /// Wait before each clock edge, in microseconds [default: 5000]
    #[arg(long, env = "TSI_PERIOD", value_name = "US")]
    pub period: Option<u64>,

    /// Settling time before each data sample, in microseconds [default: 100]
    #[arg(long, env = "TSI_PROPAGATION", value_name = "US")]
    pub propagation: Option<u64>,

    /// Backoff after a rejected frame, in microseconds [default: 3000000]
    #[arg(long, env = "TSI_TIMEOUT", value_name = "US")]
    pub timeout: Option<u64>,

    /// Treat the data line as active-low [default: true]
    #[arg(long, env = "TSI_INVERT", action = ArgAction::Set, value_name = "BOOL")]
    pub invert: Option<bool>,

    /// GPIO pin of the clock line [default: 26]
    #[arg(long, env = "TSI_CLOCK_PIN", value_name = "PIN")]
    pub clock_pin: Option<u32>,

    /// GPIO pin of the data line [default: 27]
    #[arg(long, env = "TSI_DATA_PIN", value_name = "PIN")]
    pub data_pin: Option<u32>,

    /// Offset added to both pins to get the kernel GPIO number [default: 0]
    #[arg(long, env = "TSI_GPIO_BASE", value_name = "N")]
    pub gpio_base: Option<u32>,

    /// JSON file with driver settings
    #[arg(long, env = "TSI_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log every frame to the console instead of the journal
    #[arg(long, env = "TSI_DEBUG")]
    pub debug: bool,
}

impl Cli {
    /// Resolve the driver configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if
    /// the merged settings are invalid.
    pub fn driver_config(&self) -> Result<DriverConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => DriverConfig::default(),
        };

        if let Some(period) = self.period {
            config.period_us = period;
        }
        if let Some(propagation) = self.propagation {
            config.propagation_us = propagation;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_us = timeout;
        }
        if let Some(invert) = self.invert {
            config.invert = invert;
        }
        if let Some(pin) = self.clock_pin {
            config.clock_pin = pin;
        }
        if let Some(pin) = self.data_pin {
            config.data_pin = pin;
        }
        if let Some(base) = self.gpio_base {
            config.gpio_base = base;
        }

        config.validate()?;
        Ok(config)
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }

    /// Debug runs log to the console, everything else to the journal.
    pub fn log_sink(&self) -> LogSink {
        if self.debug {
            LogSink::Console
        } else {
            LogSink::Journal
        }
    }
}

fn load_config(path: &Path) -> Result<DriverConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}
