//! Receive loop state machine and metrics.
//!
//! ```text
//!  Idle ──► WaitFrame ──► Decoding ──┬──► Dispatch ───────┐
//!   ▲                                └──► ErrorBackoff ───┤
//!   └─────────────────────────────────────────────────────┘
//! ```
//!
//! Any line or pointer fault leaves the machine with a
//! [`DriverError`](crate::error::DriverError); there is no terminal state
//! otherwise.

use core::convert::Infallible;
use core::fmt;

use tracing::{debug, error, info};
use tsi_protocol::{FrameError, Packet};

use crate::config::DriverConfig;
use crate::decoder::PacketDecoder;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::error::{DriverResult, LineError};
use crate::line::{self, ClockLine, DataLine, EdgeWait};
use crate::pointer::{PointerDevice, PointerSink, PointerUpdate};

/// Position in the receive cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Clock about to be driven high.
    Idle,
    /// Waiting for the peripheral to assert the data line.
    WaitFrame,
    /// Clocking a frame in.
    Decoding,
    /// A valid packet is ready for the pointer sink.
    Dispatch(Packet),
    /// A frame was rejected; the driver sleeps before listening again.
    ErrorBackoff(FrameError),
}

impl DriverState {
    /// Get the state as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::WaitFrame => "WaitFrame",
            Self::Decoding => "Decoding",
            Self::Dispatch(_) => "Dispatch",
            Self::ErrorBackoff(_) => "ErrorBackoff",
        }
    }
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one full cycle from `Idle` back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The frame was valid and produced this pointer update.
    Dispatched(PointerUpdate),
    /// The frame was rejected and the backoff has elapsed.
    Rejected(FrameError),
}

/// Counters kept by the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverMetrics {
    /// Completed cycles.
    pub cycles: u64,
    /// Frames that passed validation.
    pub frames_accepted: u64,
    /// Frames rejected for a bad checksum.
    pub bad_checksums: u64,
    /// Frames rejected because the terminator bit was set.
    pub incomplete_frames: u64,
    /// Backoff sleeps taken.
    pub backoffs: u64,
}

impl DriverMetrics {
    /// Frames rejected for any reason.
    #[must_use]
    pub fn frames_rejected(&self) -> u64 {
        self.bad_checksums.saturating_add(self.incomplete_frames)
    }

    fn record_rejection(&mut self, error: FrameError) {
        match error {
            FrameError::BadChecksum { .. } => self.bad_checksums += 1,
            FrameError::IncompleteFrame => self.incomplete_frames += 1,
            FrameError::Overrun | FrameError::Truncated { .. } => {}
        }
    }
}

/// The TSI receive loop.
///
/// Owns both lines, the pointer sink and a delay used for the error backoff.
/// Everything runs on the caller's thread.
#[derive(Debug)]
pub struct Driver<O, I, D, P> {
    config: DriverConfig,
    clock: ClockLine<O, D>,
    data: DataLine<I>,
    decoder: PacketDecoder,
    sink: PointerSink<P>,
    backoff: D,
    metrics: DriverMetrics,
}

impl<O, I, D, P> Driver<O, I, D, P>
where
    O: OutputPin,
    I: InputPin + EdgeWait,
    D: DelayNs + Clone,
    P: PointerDevice,
    LineError: From<O::Error> + From<<I as ErrorType>::Error>,
{
    /// Assemble a driver from its hardware parts.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`DriverError::InvalidConfiguration`](crate::error::DriverError::InvalidConfiguration)
    /// if `config` does not validate.
    pub fn new(
        config: DriverConfig,
        clock_pin: O,
        data_pin: I,
        delay: D,
        device: P,
    ) -> DriverResult<Self> {
        config.validate()?;
        let clock = ClockLine::new(
            clock_pin,
            delay.clone(),
            config.period(),
            config.propagation(),
        );
        let data = DataLine::new(data_pin, config.invert);
        info!(
            period_us = config.period_us,
            propagation_us = config.propagation_us,
            timeout_us = config.timeout_us,
            invert = config.invert,
            "driver initialized"
        );
        Ok(Self {
            config,
            clock,
            data,
            decoder: PacketDecoder::new(),
            sink: PointerSink::new(device),
            backoff: delay,
            metrics: DriverMetrics::default(),
        })
    }

    /// Perform the work of `state` and return the state that follows it.
    ///
    /// # Errors
    ///
    /// Returns an error on any line or pointer fault.
    pub fn advance(&mut self, state: DriverState) -> DriverResult<DriverState> {
        self.transition(state).map(|(next, _)| next)
    }

    /// Run one cycle from `Idle` until the machine is about to re-enter
    /// `Idle`.
    ///
    /// # Errors
    ///
    /// Returns an error on any line or pointer fault.
    pub fn step(&mut self) -> DriverResult<CycleOutcome> {
        let mut state = DriverState::Idle;
        loop {
            let (next, outcome) = self.transition(state)?;
            if let Some(outcome) = outcome {
                self.metrics.cycles += 1;
                return Ok(outcome);
            }
            state = next;
        }
    }

    /// Run cycles until a fatal fault occurs.
    ///
    /// Never returns `Ok`. The fault is logged before it is returned.
    ///
    /// # Errors
    ///
    /// Returns the first line or pointer fault.
    pub fn run(&mut self) -> DriverResult<Infallible> {
        loop {
            if let Err(err) = self.step() {
                error!(fatal = true, kind = err.kind(), error = %err, "driver stopped");
                return Err(err);
            }
        }
    }

    /// Counters since construction.
    #[must_use]
    pub fn metrics(&self) -> DriverMetrics {
        self.metrics
    }

    /// Configuration the driver was built with.
    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// The clock line.
    #[must_use]
    pub fn clock(&self) -> &ClockLine<O, D> {
        &self.clock
    }

    /// The data line.
    #[must_use]
    pub fn data(&self) -> &DataLine<I> {
        &self.data
    }

    fn transition(
        &mut self,
        state: DriverState,
    ) -> DriverResult<(DriverState, Option<CycleOutcome>)> {
        match state {
            DriverState::Idle => {
                self.clock.assert_idle()?;
                Ok((DriverState::WaitFrame, None))
            }
            DriverState::WaitFrame => {
                self.data.await_assertion()?;
                Ok((DriverState::Decoding, None))
            }
            DriverState::Decoding => {
                let next = match self.decoder.receive_frame(&mut self.clock, &mut self.data)? {
                    Ok(packet) => DriverState::Dispatch(packet),
                    Err(err) => DriverState::ErrorBackoff(err),
                };
                Ok((next, None))
            }
            DriverState::Dispatch(packet) => {
                self.metrics.frames_accepted += 1;
                let update = self.sink.update(packet.x(), packet.y())?;
                debug!(frame = %packet, update = update.as_str(), "packet dispatched");
                Ok((DriverState::Idle, Some(CycleOutcome::Dispatched(update))))
            }
            DriverState::ErrorBackoff(err) => {
                self.metrics.record_rejection(err);
                error!(kind = err.kind(), "failed to get touch position, timing out: {err}");
                line::pause(&mut self.backoff, self.config.timeout());
                self.metrics.backoffs += 1;
                Ok((DriverState::Idle, Some(CycleOutcome::Rejected(err))))
            }
        }
    }
}
