//! Decoded frame fields.

use core::fmt;

use crate::{
    CHECKSUM_BIT_INDEX, COORD_MASK, FRAME_BITS, FRAME_MASK, SENTINEL, TERMINATOR_BIT_INDEX,
    X_SHIFT, Y_FIELD_MASK, Y_SHIFT,
};

/// Fields of a 22-bit frame.
///
/// Only [`Frame::decode`](crate::Frame::decode) hands out packets that passed
/// validation; [`Packet::from_register`] slices any register without checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Packet {
    raw: u32,
    x: u16,
    y: u16,
    checksum_bit: bool,
    terminator_bit: bool,
}

impl Packet {
    /// Slice a register into its fields. Bits above the frame are ignored.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "both fields are masked to at most 11 bits"
    )]
    pub const fn from_register(register: u32) -> Self {
        let raw = register & FRAME_MASK;
        Self {
            raw,
            x: ((raw >> X_SHIFT) & COORD_MASK) as u16,
            y: ((raw >> Y_SHIFT) & Y_FIELD_MASK) as u16,
            checksum_bit: (raw >> CHECKSUM_BIT_INDEX) & 1 == 1,
            terminator_bit: (raw >> TERMINATOR_BIT_INDEX) & 1 == 1,
        }
    }

    /// Horizontal coordinate, 0..=1023.
    #[must_use]
    pub const fn x(&self) -> u16 {
        self.x
    }

    /// Vertical value as extracted with [`Y_FIELD_MASK`].
    #[must_use]
    pub const fn y(&self) -> u16 {
        self.y
    }

    /// `(x, y)` pair handed to the pointer sink.
    #[must_use]
    pub const fn coordinates(&self) -> (u16, u16) {
        (self.x, self.y)
    }

    /// Second-to-last received bit.
    #[must_use]
    pub const fn checksum_bit(&self) -> bool {
        self.checksum_bit
    }

    /// Last received bit; 0 on a finished frame.
    #[must_use]
    pub const fn terminator_bit(&self) -> bool {
        self.terminator_bit
    }

    /// The 22-bit register the fields were sliced from.
    #[must_use]
    pub const fn raw(&self) -> u32 {
        self.raw
    }

    /// True for the "no contact" coordinate.
    ///
    /// A real touch at (0, 0) looks exactly the same.
    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        self.x == SENTINEL.0 && self.y == SENTINEL.1
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.raw, width = FRAME_BITS)
    }
}
