//! tsid - touch screen interface daemon
//!
//! Clocks 22-bit frames out of a touch controller over two GPIO lines and
//! replays them as moves, presses and releases of a virtual pointer.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod cli;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
#[cfg(any(target_os = "linux", test))]
use tsi_driver::embedded_hal::digital::ErrorType;
use tsi_driver::prelude::*;

use crate::cli::{Cli, LogSink};

/// Exit status after SIGINT or SIGTERM.
const SIGNAL_EXIT_CODE: i32 = 130;

/// Exit status once the receive loop hits a fatal fault.
#[cfg(any(target_os = "linux", test))]
const FAULT_EXIT_CODE: u8 = 1;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            error!("driver is killed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_filter().into());

    let (journal, journal_error) = match cli.log_sink() {
        LogSink::Journal => match journal_layer() {
            Ok(layer) => (Some(layer), None),
            Err(err) => (None, Some(err)),
        },
        LogSink::Console => (None, None),
    };
    let console = journal
        .is_none()
        .then(|| tracing_subscriber::fmt::layer().with_target(false));

    tracing_subscriber::registry()
        .with(filter)
        .with(journal)
        .with(console)
        .init();

    if let Some(err) = journal_error {
        warn!(error = %err, "journald unavailable, logging to console");
    }
}

#[cfg(target_os = "linux")]
fn journal_layer() -> io::Result<tracing_journald::Layer> {
    tracing_journald::layer()
}

#[cfg(not(target_os = "linux"))]
fn journal_layer() -> io::Result<tracing_subscriber::layer::Identity> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "journald is only available on Linux",
    ))
}

/// Set up the driver and run it. `Ok` carries the exit status once the
/// receive loop stops; `Err` is a setup failure that has not been logged.
fn run(cli: &Cli) -> Result<u8> {
    let config = cli.driver_config()?;

    ctrlc::set_handler(|| {
        info!("driver is killed: terminated by signal");
        terminate();
    })
    .context("failed to install signal handler")?;

    run_driver(config)
}

#[expect(
    clippy::exit,
    reason = "the receive loop blocks on the data line and has no cancellation point"
)]
fn terminate() -> ! {
    std::process::exit(SIGNAL_EXIT_CODE)
}

/// Run `driver` until it stops and return the exit status.
///
/// [`Driver::run`] logs the fault itself, so nothing more is logged here.
#[cfg(any(target_os = "linux", test))]
fn run_until_fault<O, I, D, P>(driver: &mut Driver<O, I, D, P>) -> u8
where
    O: OutputPin,
    I: InputPin + EdgeWait,
    D: DelayNs + Clone,
    P: PointerDevice,
    LineError: From<O::Error> + From<<I as ErrorType>::Error>,
{
    match driver.run() {
        Ok(never) => match never {},
        Err(_) => FAULT_EXIT_CODE,
    }
}

#[cfg(target_os = "linux")]
fn run_driver(config: DriverConfig) -> Result<u8> {
    let clock_line = config
        .clock_line()
        .context("clock pin out of range for gpio base")?;
    let data_line = config
        .data_line()
        .context("data pin out of range for gpio base")?;

    let clock = SysfsOutput::open(clock_line).context("failed to open clock line")?;
    let data = SysfsInput::open(data_line).context("failed to open data line")?;
    let pointer = UinputPointer::open().context("failed to create virtual pointer")?;

    let mut driver = Driver::new(config, clock, data, StdDelay, pointer)?;
    Ok(run_until_fault(&mut driver))
}

#[cfg(not(target_os = "linux"))]
fn run_driver(_config: DriverConfig) -> Result<u8> {
    anyhow::bail!("GPIO and uinput access is only available on Linux")
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    #[test]
    #[traced_test]
    fn test_fatal_fault_ends_with_one_error_line() -> Result<()> {
        let trace = Trace::new();
        let mut driver = Driver::new(
            DriverConfig::default(),
            MockOutput::new(trace.clone()).failing_after(0),
            MockInput::new(trace.clone()),
            RecordingDelay::new(trace.clone()),
            RecordingPointer::new(trace),
        )?;

        assert_eq!(run_until_fault(&mut driver), FAULT_EXIT_CODE);
        logs_assert(|lines: &[&str]| {
            let fatal = lines
                .iter()
                .filter(|line| line.contains("driver stopped") || line.contains("driver is killed"))
                .count();
            match fatal {
                1 => Ok(()),
                n => Err(format!("expected one fatal line, found {n}")),
            }
        });
        Ok(())
    }
}
