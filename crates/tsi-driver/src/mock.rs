//! In-memory lines, delay and pointer for hardware-free testing.
//!
//! All fakes append to one shared [`Trace`], so a test can assert on the exact
//! interleaving of clock edges, samples, waits, sleeps and pointer events.
//!
//! ```rust
//! use tsi_driver::prelude::*;
//! use tsi_protocol::Frame;
//!
//! let trace = Trace::new();
//! let config = DriverConfig::default();
//! let input = MockInput::new(trace.clone())
//!     .frame(Frame::encode(5, 5, false), config.invert);
//! let mut driver = Driver::new(
//!     config,
//!     MockOutput::new(trace.clone()),
//!     input,
//!     RecordingDelay::new(trace.clone()),
//!     RecordingPointer::new(trace.clone()),
//! )?;
//!
//! assert_eq!(driver.step()?, CycleOutcome::Dispatched(PointerUpdate::Pressed));
//! assert_eq!(trace.presses(), 1);
//! # Ok::<(), DriverError>(())
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};

use crate::error::{LineError, LineResult, PointerError, PointerResult};
use crate::line::{Edge, EdgeWait};
use crate::pointer::PointerDevice;

/// One recorded interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// An output was driven.
    Set(PinState),
    /// An input was read.
    Read(PinState),
    /// An input was waited on.
    WaitEdge(Edge),
    /// A delay was requested.
    Sleep(Duration),
    /// The pointer moved.
    Move {
        /// Horizontal position.
        x: u16,
        /// Vertical position.
        y: u16,
    },
    /// The left button was pressed.
    Press,
    /// The left button was released.
    Release,
}

/// Shared, ordered log of [`TraceEvent`]s.
///
/// Cloning yields another handle to the same log.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    events: Rc<RefCell<Vec<TraceEvent>>>,
}

impl Trace {
    /// Create an empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn record(&self, event: TraceEvent) {
        self.events.borrow_mut().push(event);
    }

    /// Snapshot of all events so far.
    #[must_use]
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.borrow().clone()
    }

    /// Number of events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&TraceEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|event| predicate(event)).count()
    }

    /// Number of pointer moves.
    #[must_use]
    pub fn moves(&self) -> usize {
        self.count(|event| matches!(event, TraceEvent::Move { .. }))
    }

    /// Number of button presses.
    #[must_use]
    pub fn presses(&self) -> usize {
        self.count(|event| matches!(event, TraceEvent::Press))
    }

    /// Number of button releases.
    #[must_use]
    pub fn releases(&self) -> usize {
        self.count(|event| matches!(event, TraceEvent::Release))
    }

    /// Drop all recorded events.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

/// Output line that records every level it is driven to.
#[derive(Debug)]
pub struct MockOutput {
    trace: Trace,
    fail_after: Option<usize>,
    writes: usize,
}

impl MockOutput {
    /// Create an output that always succeeds.
    #[must_use]
    pub fn new(trace: Trace) -> Self {
        Self {
            trace,
            fail_after: None,
            writes: 0,
        }
    }

    /// Make every write after the first `writes` fail.
    #[must_use]
    pub fn failing_after(mut self, writes: usize) -> Self {
        self.fail_after = Some(writes);
        self
    }
}

impl MockOutput {
    fn drive(&mut self, state: PinState) -> LineResult<()> {
        if self.fail_after.is_some_and(|limit| self.writes >= limit) {
            return Err(LineError::io(
                "mock-clock",
                io::Error::new(io::ErrorKind::BrokenPipe, "output failure injected"),
            ));
        }
        self.writes += 1;
        self.trace.record(TraceEvent::Set(state));
        Ok(())
    }
}

impl ErrorType for MockOutput {
    type Error = LineError;
}

impl OutputPin for MockOutput {
    fn set_low(&mut self) -> LineResult<()> {
        self.drive(PinState::Low)
    }

    fn set_high(&mut self) -> LineResult<()> {
        self.drive(PinState::High)
    }
}

/// Input line that replays a script of raw levels.
///
/// Each [`InputPin::is_high`] or [`InputPin::is_low`] consumes one level.
/// Once the script is empty reads fail with an I/O error, which ends a
/// running driver. Edge waits consume nothing and return at once.
#[derive(Debug)]
pub struct MockInput {
    trace: Trace,
    script: VecDeque<PinState>,
}

impl MockInput {
    /// Create an input with an empty script.
    #[must_use]
    pub fn new(trace: Trace) -> Self {
        Self {
            trace,
            script: VecDeque::new(),
        }
    }

    /// Append raw levels.
    #[must_use]
    pub fn levels(mut self, levels: impl IntoIterator<Item = PinState>) -> Self {
        self.script.extend(levels);
        self
    }

    /// Append logical bits, converted to raw levels for the given polarity.
    #[must_use]
    pub fn logical_bits(self, bits: impl IntoIterator<Item = bool>, inverted: bool) -> Self {
        self.levels(bits.into_iter().map(|bit| PinState::from(bit ^ inverted)))
    }

    /// Append one deasserted level followed by a frame's bits.
    ///
    /// This is what a driver cycle consumes: the idle check in
    /// `await_assertion`, an edge wait, then one sample per tick.
    #[must_use]
    pub fn frame(self, bits: impl IntoIterator<Item = bool>, inverted: bool) -> Self {
        self.logical_bits([false], inverted)
            .logical_bits(bits, inverted)
    }

    /// Number of levels not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl MockInput {
    fn read(&mut self) -> LineResult<PinState> {
        let state = self.script.pop_front().ok_or_else(|| {
            LineError::io(
                "mock-data",
                io::Error::new(io::ErrorKind::UnexpectedEof, "input script exhausted"),
            )
        })?;
        self.trace.record(TraceEvent::Read(state));
        Ok(state)
    }
}

impl ErrorType for MockInput {
    type Error = LineError;
}

impl InputPin for MockInput {
    fn is_high(&mut self) -> LineResult<bool> {
        Ok(self.read()? == PinState::High)
    }

    fn is_low(&mut self) -> LineResult<bool> {
        Ok(self.read()? == PinState::Low)
    }
}

impl EdgeWait for MockInput {
    fn wait_for_rising_edge(&mut self) -> LineResult<()> {
        self.trace.record(TraceEvent::WaitEdge(Edge::Rising));
        Ok(())
    }

    fn wait_for_falling_edge(&mut self) -> LineResult<()> {
        self.trace.record(TraceEvent::WaitEdge(Edge::Falling));
        Ok(())
    }
}

/// Delay that records the requested duration instead of sleeping.
///
/// Each call to a [`DelayNs`] method records one [`TraceEvent::Sleep`].
#[derive(Debug, Clone)]
pub struct RecordingDelay {
    trace: Trace,
}

impl RecordingDelay {
    /// Create a delay recording into `trace`.
    #[must_use]
    pub fn new(trace: Trace) -> Self {
        Self { trace }
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.trace
            .record(TraceEvent::Sleep(Duration::from_nanos(u64::from(ns))));
    }

    fn delay_us(&mut self, us: u32) {
        self.trace
            .record(TraceEvent::Sleep(Duration::from_micros(u64::from(us))));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.trace
            .record(TraceEvent::Sleep(Duration::from_millis(u64::from(ms))));
    }
}

/// Pointer device that records events.
#[derive(Debug)]
pub struct RecordingPointer {
    trace: Trace,
    fail: bool,
}

impl RecordingPointer {
    /// Create a pointer recording into `trace`.
    #[must_use]
    pub fn new(trace: Trace) -> Self {
        Self { trace, fail: false }
    }

    /// Make every event fail.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn emit(&mut self, event: TraceEvent) -> PointerResult<()> {
        if self.fail {
            return Err(PointerError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "pointer failure injected",
            )));
        }
        self.trace.record(event);
        Ok(())
    }
}

impl PointerDevice for RecordingPointer {
    fn move_to(&mut self, x: u16, y: u16) -> PointerResult<()> {
        self.emit(TraceEvent::Move { x, y })
    }

    fn press(&mut self) -> PointerResult<()> {
        self.emit(TraceEvent::Press)
    }

    fn release(&mut self) -> PointerResult<()> {
        self.emit(TraceEvent::Release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_is_shared_between_clones() {
        let trace = Trace::new();
        let other = trace.clone();
        other.record(TraceEvent::Press);
        assert_eq!(trace.events(), vec![TraceEvent::Press]);
        trace.clear();
        assert!(other.events().is_empty());
    }

    #[test]
    fn test_input_script_runs_out() -> LineResult<()> {
        let trace = Trace::new();
        let mut input = MockInput::new(trace.clone()).logical_bits([true, false], true);
        assert!(input.is_low()?);
        assert!(input.is_high()?);
        assert_eq!(input.remaining(), 0);
        assert!(matches!(input.is_high(), Err(LineError::Io { .. })));
        assert_eq!(
            trace.events(),
            vec![
                TraceEvent::Read(PinState::Low),
                TraceEvent::Read(PinState::High)
            ]
        );
        Ok(())
    }

    #[test]
    fn test_output_failure_injection() {
        let mut output = MockOutput::new(Trace::new()).failing_after(1);
        assert!(output.set_high().is_ok());
        assert!(output.set_low().is_err());
    }

    #[test]
    fn test_delay_records_requested_duration() {
        let trace = Trace::new();
        let mut delay = RecordingDelay::new(trace.clone());
        delay.delay_us(100);
        delay.delay_ms(3);
        assert_eq!(
            trace.events(),
            vec![
                TraceEvent::Sleep(Duration::from_micros(100)),
                TraceEvent::Sleep(Duration::from_millis(3))
            ]
        );
    }

    #[test]
    fn test_edge_waits_are_recorded() -> LineResult<()> {
        let trace = Trace::new();
        let mut input = MockInput::new(trace.clone());
        input.wait_for_edge(Edge::Falling)?;
        input.wait_for_rising_edge()?;
        assert_eq!(
            trace.events(),
            vec![
                TraceEvent::WaitEdge(Edge::Falling),
                TraceEvent::WaitEdge(Edge::Rising)
            ]
        );
        assert_eq!(input.remaining(), 0);
        Ok(())
    }

    #[test]
    fn test_failing_pointer_records_nothing() {
        let trace = Trace::new();
        let mut pointer = RecordingPointer::new(trace.clone()).failing();
        assert!(pointer.press().is_err());
        assert_eq!(trace.presses(), 0);
    }
}
