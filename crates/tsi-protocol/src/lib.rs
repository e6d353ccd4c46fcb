//! Wire protocol for the two-wire touch screen interface (TSI).
//!
//! The touch peripheral answers a host-driven clock with one data bit per
//! clock edge. A complete transmission is a 22-bit frame, most significant
//! bit first:
//!
//! ```text
//!  21                  12 11                   2   1   0
//! ┌──────────────────────┬──────────────────────┬───┬───┐
//! │ X (10 bits)          │ Y field (10 bits)    │ C │ T │
//! └──────────────────────┴──────────────────────┴───┴───┘
//! ```
//!
//! `C` is the checksum bit and `T` the terminator bit (always 0 on a finished
//! frame). The XOR of all 22 bits of a good frame is [`CHECKSUM_VALID`].
//!
//! ## Design
//! This crate is I/O-free and allocation-free. Bits come in through
//! [`FrameAssembler`]; [`Frame::decode`] validates the checksum before it looks
//! at any field, then the terminator, and only then yields a [`Packet`].
//!
//! ```
//! use tsi_protocol::{Frame, FrameError};
//!
//! let bits = Frame::encode(682, 0b01_0101_0101, false);
//! let packet = Frame::from_bits(bits)?.decode()?;
//! assert_eq!(packet.x(), 682);
//! # Ok::<(), FrameError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod frame;
pub mod packet;

pub use error::{FrameError, FrameResult};
pub use frame::{Frame, FrameAssembler};
pub use packet::Packet;

/// Number of clock ticks, and therefore bits, in one frame.
pub const FRAME_BITS: usize = 22;

/// Mask covering the 22-bit frame register.
pub const FRAME_MASK: u32 = (1 << FRAME_BITS) - 1;

/// Width of a coordinate field in bits.
pub const COORD_BITS: u32 = 10;

/// Mask for a full 10-bit coordinate.
pub const COORD_MASK: u32 = (1 << COORD_BITS) - 1;

/// X occupies the top 10 bits of the register.
pub const X_SHIFT: u32 = 12;

/// The Y field starts right above the checksum and terminator bits.
pub const Y_SHIFT: u32 = 2;

/// Mask applied to the shifted Y field.
///
/// This selects a single bit (bit 10 of the shifted value) rather than the ten
/// bits the layout suggests. Deployed peripherals are decoded with exactly
/// this mask, so it stays until the protocol owner confirms the intended
/// `0x3FF`.
pub const Y_FIELD_MASK: u32 = 0x400;

/// Bit index of the checksum bit within the register.
pub const CHECKSUM_BIT_INDEX: u32 = 1;

/// Bit index of the terminator bit within the register.
pub const TERMINATOR_BIT_INDEX: u32 = 0;

/// Value the running XOR over all 22 bits must have for a frame to be accepted.
pub const CHECKSUM_VALID: u8 = 0;

/// Coordinate reported by the peripheral when nothing touches the panel.
pub const SENTINEL: (u16, u16) = (0, 0);
