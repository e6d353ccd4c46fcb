//! Coordinate to pointer-event translation.

use tracing::debug;
use tsi_protocol::SENTINEL;

use crate::error::PointerResult;

/// Host pointer-injection facility.
pub trait PointerDevice {
    /// Move the pointer to an absolute position.
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be delivered.
    fn move_to(&mut self, x: u16, y: u16) -> PointerResult<()>;

    /// Press the left button.
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be delivered.
    fn press(&mut self) -> PointerResult<()>;

    /// Release the left button.
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be delivered.
    fn release(&mut self) -> PointerResult<()>;
}

/// What a call to [`PointerSink::update`] emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerUpdate {
    /// Sentinel while released: nothing.
    Idle,
    /// Sentinel while pressed: one release.
    Released,
    /// Contact while pressed: one move.
    Moved,
    /// Contact while released: one move, then one press.
    Pressed,
}

impl PointerUpdate {
    /// Short name, used as a structured log field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Released => "released",
            Self::Moved => "moved",
            Self::Pressed => "pressed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PointerState {
    last: Option<(u16, u16)>,
    pressed: bool,
}

/// Turns decoded coordinates into move, press and release events.
///
/// The sentinel `(0, 0)` means "no contact". A real touch at the panel's
/// origin is indistinguishable from it and releases the button.
#[derive(Debug)]
pub struct PointerSink<P> {
    device: P,
    state: PointerState,
}

impl<P: PointerDevice> PointerSink<P> {
    /// Wrap `device`, starting released.
    pub fn new(device: P) -> Self {
        Self {
            device,
            state: PointerState::default(),
        }
    }

    /// Apply one decoded coordinate.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects an event. The pressed flag only
    /// changes after the device accepted the corresponding event.
    pub fn update(&mut self, x: u16, y: u16) -> PointerResult<PointerUpdate> {
        if (x, y) == SENTINEL {
            if !self.state.pressed {
                return Ok(PointerUpdate::Idle);
            }
            self.device.release()?;
            self.state.pressed = false;
            let (x, y) = self.state.last.unwrap_or(SENTINEL);
            debug!(x, y, "mouse released");
            return Ok(PointerUpdate::Released);
        }

        self.device.move_to(x, y)?;
        self.state.last = Some((x, y));
        debug!(x, y, "mouse moved");
        if self.state.pressed {
            return Ok(PointerUpdate::Moved);
        }

        self.device.press()?;
        self.state.pressed = true;
        debug!("mouse pressed");
        Ok(PointerUpdate::Pressed)
    }

    /// The wrapped device.
    #[must_use]
    pub fn device(&self) -> &P {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counts {
        moves: usize,
        presses: usize,
        releases: usize,
    }

    impl PointerDevice for Counts {
        fn move_to(&mut self, _x: u16, _y: u16) -> PointerResult<()> {
            self.moves += 1;
            Ok(())
        }

        fn press(&mut self) -> PointerResult<()> {
            self.presses += 1;
            Ok(())
        }

        fn release(&mut self) -> PointerResult<()> {
            self.releases += 1;
            Ok(())
        }
    }

    #[test]
    fn test_sentinel_while_released_is_idle() -> PointerResult<()> {
        let mut sink = PointerSink::new(Counts::default());
        assert_eq!(sink.update(0, 0)?, PointerUpdate::Idle);
        assert_eq!(sink.device().releases, 0);
        assert_eq!(sink.state.last, None);
        Ok(())
    }

    #[test]
    fn test_press_then_release() -> PointerResult<()> {
        let mut sink = PointerSink::new(Counts::default());
        assert_eq!(sink.update(5, 5)?, PointerUpdate::Pressed);
        assert!(sink.state.pressed);
        assert_eq!(sink.update(0, 0)?, PointerUpdate::Released);
        assert!(!sink.state.pressed);
        assert_eq!(sink.device().presses, 1);
        assert_eq!(sink.device().releases, 1);
        Ok(())
    }

    #[test]
    fn test_repeat_contact_moves_only() -> PointerResult<()> {
        let mut sink = PointerSink::new(Counts::default());
        sink.update(5, 5)?;
        assert_eq!(sink.update(5, 5)?, PointerUpdate::Moved);
        assert_eq!(sink.device().moves, 2);
        assert_eq!(sink.device().presses, 1);
        assert_eq!(sink.state.last, Some((5, 5)));
        Ok(())
    }

    #[test]
    fn test_update_names() {
        assert_eq!(PointerUpdate::Idle.as_str(), "idle");
        assert_eq!(PointerUpdate::Pressed.as_str(), "pressed");
    }
}
