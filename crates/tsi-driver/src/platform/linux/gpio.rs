//! GPIO lines through the sysfs class interface.
//!
//! Edge waits use `poll(2)` on the `value` attribute, which the kernel wakes
//! with `POLLPRI | POLLERR` once the configured edge has occurred.

#![expect(
    unsafe_code,
    reason = "poll(2) on the sysfs value attribute has no std wrapper"
)]

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::os::unix::fs::FileExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};
use tracing::{debug, trace};

use crate::error::{LineError, LineResult};
use crate::line::{Edge, EdgeWait};

/// Mount point of the sysfs GPIO class.
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

// udev adjusts attribute permissions asynchronously after an export
const SETTLE_ATTEMPTS: u32 = 20;
const SETTLE_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug)]
struct SysfsLine {
    number: u32,
    name: String,
    dir: PathBuf,
}

impl SysfsLine {
    fn export(root: &Path, number: u32, direction: &str) -> LineResult<Self> {
        let name = format!("gpio{number}");
        let dir = root.join(&name);
        if !dir.exists() {
            match fs::write(root.join("export"), number.to_string()) {
                Ok(()) => debug!(line = %name, "exported"),
                // already exported by someone else
                Err(err) if err.raw_os_error() == Some(libc::EBUSY) => {}
                Err(err) => return Err(LineError::unavailable(name, err)),
            }
        }

        let line = Self { number, name, dir };
        line.write_settled("direction", direction)?;
        debug!(line = %line.name, direction, "line configured");
        Ok(line)
    }

    fn attr(&self, attr: &str) -> PathBuf {
        self.dir.join(attr)
    }

    fn write_settled(&self, attr: &str, value: &str) -> LineResult<()> {
        let mut attempt = 0;
        loop {
            match fs::write(self.attr(attr), value) {
                Ok(()) => return Ok(()),
                Err(err) if is_settling(&err) && attempt < SETTLE_ATTEMPTS => {
                    attempt += 1;
                    thread::sleep(SETTLE_INTERVAL);
                }
                Err(err) => return Err(LineError::unavailable(self.name.clone(), err)),
            }
        }
    }

    fn write(&self, attr: &str, value: &str) -> LineResult<()> {
        fs::write(self.attr(attr), value).map_err(|err| LineError::io(self.name.clone(), err))
    }

    fn open_value(&self, options: &OpenOptions) -> LineResult<File> {
        options
            .open(self.attr("value"))
            .map_err(|err| LineError::unavailable(self.name.clone(), err))
    }
}

fn is_settling(err: &io::Error) -> bool {
    matches!(err.kind(), ErrorKind::PermissionDenied | ErrorKind::NotFound)
}

fn parse_level(line: &str, raw: &[u8]) -> LineResult<PinState> {
    match raw.first() {
        Some(b'0') => Ok(PinState::Low),
        Some(b'1') => Ok(PinState::High),
        _ => Err(LineError::invalid_value(
            line,
            String::from_utf8_lossy(raw).trim(),
        )),
    }
}

fn edge_name(edge: Edge) -> &'static str {
    match edge {
        Edge::Rising => "rising",
        Edge::Falling => "falling",
    }
}

/// Output line driven through `/sys/class/gpio/gpioN/value`.
#[derive(Debug)]
pub struct SysfsOutput {
    line: SysfsLine,
    value: File,
}

impl SysfsOutput {
    /// Export GPIO `number` and configure it as an output.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::Unavailable`] if the line cannot be exported or
    /// configured.
    pub fn open(number: u32) -> LineResult<Self> {
        Self::open_in(Path::new(SYSFS_GPIO_ROOT), number)
    }

    /// Like [`SysfsOutput::open`], under a different sysfs root.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::Unavailable`] if the line cannot be exported or
    /// configured.
    pub fn open_in(root: &Path, number: u32) -> LineResult<Self> {
        let line = SysfsLine::export(root, number, "out")?;
        let value = line.open_value(OpenOptions::new().write(true))?;
        Ok(Self { line, value })
    }

    /// Kernel GPIO number.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.line.number
    }
}

impl SysfsOutput {
    fn drive(&mut self, raw: &[u8]) -> LineResult<()> {
        self.value
            .write_all_at(raw, 0)
            .map_err(|err| LineError::io(self.line.name.clone(), err))
    }
}

impl ErrorType for SysfsOutput {
    type Error = LineError;
}

impl OutputPin for SysfsOutput {
    fn set_low(&mut self) -> LineResult<()> {
        self.drive(b"0")
    }

    fn set_high(&mut self) -> LineResult<()> {
        self.drive(b"1")
    }
}

/// Input line read through `/sys/class/gpio/gpioN/value`.
#[derive(Debug)]
pub struct SysfsInput {
    line: SysfsLine,
    value: File,
    edge: Option<Edge>,
}

impl SysfsInput {
    /// Export GPIO `number` and configure it as an input.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::Unavailable`] if the line cannot be exported or
    /// configured.
    pub fn open(number: u32) -> LineResult<Self> {
        Self::open_in(Path::new(SYSFS_GPIO_ROOT), number)
    }

    /// Like [`SysfsInput::open`], under a different sysfs root.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::Unavailable`] if the line cannot be exported or
    /// configured.
    pub fn open_in(root: &Path, number: u32) -> LineResult<Self> {
        let line = SysfsLine::export(root, number, "in")?;
        let value = line.open_value(OpenOptions::new().read(true))?;
        Ok(Self {
            line,
            value,
            edge: None,
        })
    }

    /// Kernel GPIO number.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.line.number
    }

    fn configure_edge(&mut self, edge: Edge) -> LineResult<()> {
        if self.edge != Some(edge) {
            self.line.write("edge", edge_name(edge))?;
            self.edge = Some(edge);
        }
        Ok(())
    }

    fn poll_priority(&self) -> LineResult<()> {
        let mut pollfd = libc::pollfd {
            fd: self.value.as_raw_fd(),
            events: libc::POLLPRI | libc::POLLERR,
            revents: 0,
        };
        loop {
            // SAFETY: `pollfd` is a live, exclusively borrowed pollfd and the
            // count passed is 1.
            let rc = unsafe { libc::poll(&mut pollfd, 1, -1) };
            if rc > 0 {
                return Ok(());
            }
            let err = io::Error::last_os_error();
            if rc < 0 && err.kind() != ErrorKind::Interrupted {
                return Err(LineError::io(self.line.name.clone(), err));
            }
        }
    }
}

impl SysfsInput {
    fn read(&mut self) -> LineResult<PinState> {
        let mut buf = [0u8; 4];
        let len = self
            .value
            .read_at(&mut buf, 0)
            .map_err(|err| LineError::io(self.line.name.clone(), err))?;
        parse_level(&self.line.name, buf.get(..len).unwrap_or_default())
    }

    fn await_edge(&mut self, edge: Edge) -> LineResult<()> {
        self.configure_edge(edge)?;
        // the read also acknowledges any notification left from earlier edges
        if self.read()? == edge.target() {
            return Ok(());
        }
        self.poll_priority()?;
        let level = self.read()?;
        trace!(line = %self.line.name, ?edge, ?level, "edge detected");
        Ok(())
    }
}

impl ErrorType for SysfsInput {
    type Error = LineError;
}

impl InputPin for SysfsInput {
    fn is_high(&mut self) -> LineResult<bool> {
        Ok(self.read()? == PinState::High)
    }

    fn is_low(&mut self) -> LineResult<bool> {
        Ok(self.read()? == PinState::Low)
    }
}

impl EdgeWait for SysfsInput {
    fn wait_for_rising_edge(&mut self) -> LineResult<()> {
        self.await_edge(Edge::Rising)
    }

    fn wait_for_falling_edge(&mut self) -> LineResult<()> {
        self.await_edge(Edge::Falling)
    }
}
