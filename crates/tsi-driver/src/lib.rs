//! # tsi-driver
//!
//! Host side of the two-wire touch screen interface (TSI).
//!
//! The host drives a clock line, the touch peripheral answers with one bit
//! per clock edge on a data line, and every valid 22-bit frame becomes a
//! pointer move, press or release.
//!
//! This crate provides:
//! - [`ClockLine`] and [`DataLine`] on top of `embedded-hal` 1.0 pins and
//!   delays, plus the blocking [`EdgeWait`] extension for frame-start
//!   detection
//! - [`PacketDecoder`], which clocks one frame in and validates it
//! - [`PointerSink`], which turns coordinates into pointer events through a
//!   [`PointerDevice`]
//! - [`Driver`], the receive loop as an explicit state machine
//! - in-memory fakes in [`mock`] (feature `mock`, on by default)
//! - sysfs GPIO and uinput backends in `platform::linux`
//!
//! ## Concurrency
//!
//! Everything is synchronous and runs on the caller's thread. The only
//! unbounded block is the wait for the peripheral to assert the data line,
//! which sleeps on an edge rather than polling.
//!
//! ## Errors
//!
//! Frames failing the checksum or terminator check are logged, followed by a
//! fixed backoff, and dropped. Line and pointer faults are fatal and end
//! [`Driver::run`].

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use embedded_hal;

pub mod config;
pub mod decoder;
pub mod driver;
pub mod error;
pub mod line;
#[cfg(feature = "mock")]
pub mod mock;
pub mod platform;
pub mod pointer;
pub mod prelude;

pub use config::{DriverConfig, DriverConfigBuilder};
pub use decoder::PacketDecoder;
pub use driver::{CycleOutcome, Driver, DriverMetrics, DriverState};
pub use error::{DriverError, DriverResult, LineError, LineResult, PointerError, PointerResult};
pub use line::{ClockLine, DataLine, Edge, EdgeWait, StdDelay, pause};
pub use pointer::{PointerDevice, PointerSink, PointerUpdate};
