//! Virtual absolute pointer through `/dev/uinput`.

use std::fmt;

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AbsInfo, AbsoluteAxisType, AttributeSet, EventType, InputEvent, Key, UinputAbsSetup};
use tracing::info;
use tsi_protocol::COORD_BITS;

use crate::error::{PointerError, PointerResult};
use crate::pointer::PointerDevice;

/// Default uinput character device.
pub const UINPUT_PATH: &str = "/dev/uinput";

const DEVICE_NAME: &str = "tsi-touchscreen";

/// Largest coordinate the panel reports on either axis.
const ABS_MAXIMUM: i32 = (1 << COORD_BITS) - 1;

fn axis(code: AbsoluteAxisType) -> UinputAbsSetup {
    UinputAbsSetup::new(code, AbsInfo::new(0, 0, ABS_MAXIMUM, 0, 0, 0))
}

fn move_events(x: u16, y: u16) -> [InputEvent; 2] {
    [
        InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_X.0, i32::from(x)),
        InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_Y.0, i32::from(y)),
    ]
}

fn button_event(pressed: bool) -> InputEvent {
    InputEvent::new(EventType::KEY, Key::BTN_LEFT.code(), i32::from(pressed))
}

/// Absolute pointer with a left button, created through uinput.
///
/// Coordinates are reported on both axes in `0..=1023`. The kernel device is
/// destroyed when this value is dropped.
pub struct UinputPointer {
    device: VirtualDevice,
}

impl UinputPointer {
    /// Create the virtual pointer through [`UINPUT_PATH`].
    ///
    /// # Errors
    ///
    /// Returns [`PointerError::Unavailable`] if the device cannot be opened or
    /// configured.
    pub fn open() -> PointerResult<Self> {
        let mut keys = AttributeSet::<Key>::new();
        keys.insert(Key::BTN_LEFT);

        let device = VirtualDeviceBuilder::new()
            .and_then(|builder| builder.name(DEVICE_NAME).with_keys(&keys))
            .and_then(|builder| builder.with_absolute_axis(&axis(AbsoluteAxisType::ABS_X)))
            .and_then(|builder| builder.with_absolute_axis(&axis(AbsoluteAxisType::ABS_Y)))
            .and_then(VirtualDeviceBuilder::build)
            .map_err(PointerError::Unavailable)?;
        info!(device = UINPUT_PATH, name = DEVICE_NAME, "virtual pointer created");
        Ok(Self { device })
    }

    fn emit(&mut self, events: &[InputEvent]) -> PointerResult<()> {
        // evdev terminates every batch with SYN_REPORT
        self.device.emit(events).map_err(PointerError::Io)
    }
}

impl fmt::Debug for UinputPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UinputPointer")
            .field("name", &DEVICE_NAME)
            .finish_non_exhaustive()
    }
}

impl PointerDevice for UinputPointer {
    fn move_to(&mut self, x: u16, y: u16) -> PointerResult<()> {
        self.emit(&move_events(x, y))
    }

    fn press(&mut self) -> PointerResult<()> {
        self.emit(&[button_event(true)])
    }

    fn release(&mut self) -> PointerResult<()> {
        self.emit(&[button_event(false)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_range_covers_ten_bit_coordinates() {
        assert_eq!(ABS_MAXIMUM, 1023);
    }

    #[test]
    fn test_move_reports_both_axes() {
        let [x, y] = move_events(682, 1024);
        assert_eq!(x.event_type(), EventType::ABSOLUTE);
        assert_eq!(x.code(), AbsoluteAxisType::ABS_X.0);
        assert_eq!(x.value(), 682);
        assert_eq!(y.code(), AbsoluteAxisType::ABS_Y.0);
        assert_eq!(y.value(), 1024);
    }

    #[test]
    fn test_button_event_values() {
        let press = button_event(true);
        assert_eq!(press.event_type(), EventType::KEY);
        assert_eq!(press.code(), Key::BTN_LEFT.code());
        assert_eq!(press.value(), 1);
        assert_eq!(button_event(false).value(), 0);
    }
}
