//! Linux backends: GPIO through sysfs and a virtual pointer through uinput.
//!
//! Both need write access to their kernel interfaces. On a Raspberry Pi that
//! usually means membership of the `gpio` and `input` groups, or a udev rule
//! granting access to `/dev/uinput`.

mod gpio;
mod uinput;

pub use gpio::{SysfsInput, SysfsOutput, SYSFS_GPIO_ROOT};
pub use uinput::{UINPUT_PATH, UinputPointer};
