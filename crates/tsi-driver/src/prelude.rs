//! Prelude for tsi-driver.
//!
//! Re-exports the types needed to build and run a driver.
//!
//! ```rust
//! use tsi_driver::prelude::*;
//!
//! let config = DriverConfig::builder().timeout_us(1_000_000).build()?;
//! assert_eq!(config.timeout().as_secs(), 1);
//! # Ok::<(), DriverError>(())
//! ```

pub use embedded_hal::delay::DelayNs;
pub use embedded_hal::digital::{InputPin, OutputPin, PinState};

pub use crate::config::{DriverConfig, DriverConfigBuilder};
pub use crate::decoder::PacketDecoder;
pub use crate::driver::{CycleOutcome, Driver, DriverMetrics, DriverState};
pub use crate::error::{
    DriverError, DriverResult, LineError, LineResult, PointerError, PointerResult,
};
pub use crate::line::{ClockLine, DataLine, Edge, EdgeWait, StdDelay};
#[cfg(feature = "mock")]
pub use crate::mock::{
    MockInput, MockOutput, RecordingDelay, RecordingPointer, Trace, TraceEvent,
};
#[cfg(target_os = "linux")]
pub use crate::platform::linux::{SysfsInput, SysfsOutput, UinputPointer};
pub use crate::pointer::{PointerDevice, PointerSink, PointerUpdate};
