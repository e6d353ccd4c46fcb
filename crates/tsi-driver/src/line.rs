//! Clock and data line handling.
//!
//! Pins and delays are the `embedded-hal` 1.0 traits: an
//! [`OutputPin`] for the host-driven clock, an [`InputPin`] for the
//! peripheral-driven data line and a [`DelayNs`] for the fixed waits between
//! edges. The blocking `embedded-hal` traits have no edge wait, so the data
//! line additionally needs [`EdgeWait`]. [`ClockLine`] and [`DataLine`] add
//! the protocol's timing and polarity rules on top.

use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};
use tracing::trace;

use crate::error::{LineError, LineResult};

/// Direction of a level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Low to high.
    Rising,
    /// High to low.
    Falling,
}

impl Edge {
    /// The edge that ends at `state`.
    #[must_use]
    pub const fn towards(state: PinState) -> Self {
        match state {
            PinState::High => Self::Rising,
            PinState::Low => Self::Falling,
        }
    }

    /// Level the line has after this edge.
    #[must_use]
    pub const fn target(self) -> PinState {
        match self {
            Self::Rising => PinState::High,
            Self::Falling => PinState::Low,
        }
    }
}

/// Blocking edge wait for an input pin.
///
/// Mirrors the edge half of `embedded_hal_async::digital::Wait`.
/// Implementations must sleep rather than poll in a loop, and must return
/// immediately if the line already sits at the edge's target level.
pub trait EdgeWait: ErrorType {
    /// Block until the line goes from low to high.
    ///
    /// # Errors
    ///
    /// Returns an error if the wait cannot be set up or fails.
    fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error>;

    /// Block until the line goes from high to low.
    ///
    /// # Errors
    ///
    /// Returns an error if the wait cannot be set up or fails.
    fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error>;

    /// Block until `edge` occurs.
    ///
    /// # Errors
    ///
    /// Returns an error if the wait cannot be set up or fails.
    fn wait_for_edge(&mut self, edge: Edge) -> Result<(), Self::Error> {
        match edge {
            Edge::Rising => self.wait_for_rising_edge(),
            Edge::Falling => self.wait_for_falling_edge(),
        }
    }
}

/// [`DelayNs`] backed by [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        thread::sleep(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// Block on `delay` for `duration`, rounded down to whole microseconds.
///
/// Durations beyond `u32::MAX` microseconds are split into several waits.
pub fn pause<D: DelayNs>(delay: &mut D, duration: Duration) {
    let mut remaining = duration.as_micros();
    while remaining > 0 {
        let chunk = u32::try_from(remaining).unwrap_or(u32::MAX);
        delay.delay_us(chunk);
        remaining -= u128::from(chunk);
    }
}

/// Host-driven clock line.
///
/// The clock's level is tracked locally so that [`ClockLine::tick`] never
/// reads the pin back. Until the first write the line is assumed low.
#[derive(Debug)]
pub struct ClockLine<O, D> {
    pin: O,
    delay: D,
    period: Duration,
    propagation: Duration,
    level: PinState,
    ticks: u64,
}

impl<O, D> ClockLine<O, D>
where
    O: OutputPin,
    D: DelayNs,
    LineError: From<O::Error>,
{
    /// Wrap `pin` with the given period and propagation delay.
    pub fn new(pin: O, delay: D, period: Duration, propagation: Duration) -> Self {
        Self {
            pin,
            delay,
            period,
            propagation,
            level: PinState::Low,
            ticks: 0,
        }
    }

    /// Drive the clock high, telling the peripheral to prepare a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin cannot be written.
    pub fn assert_idle(&mut self) -> LineResult<()> {
        self.pin.set_high()?;
        self.level = PinState::High;
        Ok(())
    }

    /// Produce one clock edge.
    ///
    /// Sleeps the period, toggles the line, then sleeps the propagation delay
    /// so the peripheral's next bit has settled before it is sampled.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin cannot be written.
    pub fn tick(&mut self) -> LineResult<()> {
        pause(&mut self.delay, self.period);
        let next = !self.level;
        self.pin.set_state(next)?;
        self.level = next;
        self.ticks = self.ticks.saturating_add(1);
        trace!(level = ?next, tick = self.ticks, "clock edge");
        pause(&mut self.delay, self.propagation);
        Ok(())
    }

    /// Last level driven onto the line.
    #[must_use]
    pub fn level(&self) -> PinState {
        self.level
    }

    /// Number of edges produced since construction.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The wrapped pin.
    #[must_use]
    pub fn pin(&self) -> &O {
        &self.pin
    }
}

/// Peripheral-driven data line with optional polarity inversion.
#[derive(Debug)]
pub struct DataLine<I> {
    pin: I,
    inverted: bool,
}

impl<I> DataLine<I>
where
    I: InputPin + EdgeWait,
    LineError: From<<I as ErrorType>::Error>,
{
    /// Wrap `pin`. With `inverted` set, a low raw level reads as logical 1.
    pub fn new(pin: I, inverted: bool) -> Self {
        Self { pin, inverted }
    }

    /// Current logical bit.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin cannot be read.
    pub fn sample(&mut self) -> LineResult<bool> {
        let high = self.pin.is_high()?;
        Ok(high ^ self.inverted)
    }

    /// Block until the peripheral asserts the line (logical 1).
    ///
    /// Returns at once if the line is already asserted. Otherwise waits for
    /// the raw edge that produces a logical 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin cannot be read or waited on.
    pub fn await_assertion(&mut self) -> LineResult<()> {
        if self.sample()? {
            return Ok(());
        }
        self.pin.wait_for_edge(self.assertion_edge())?;
        Ok(())
    }

    /// Raw edge that moves the line to its asserted level.
    #[must_use]
    pub fn assertion_edge(&self) -> Edge {
        Edge::towards(PinState::from(!self.inverted))
    }

    /// True if the line is active-low.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// The wrapped pin.
    #[must_use]
    pub fn pin(&self) -> &I {
        &self.pin
    }
}
