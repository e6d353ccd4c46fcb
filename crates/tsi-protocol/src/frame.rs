//! Bit-level frame assembly and validation.

use crate::error::{FrameError, FrameResult};
use crate::packet::Packet;
use crate::{CHECKSUM_VALID, COORD_MASK, FRAME_BITS, X_SHIFT, Y_SHIFT};

/// Shift register plus running checksum for one incoming frame.
///
/// Each pushed bit becomes the least significant bit of the register and is
/// XORed into the checksum accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameAssembler {
    register: u32,
    checksum: u8,
    received: usize,
}

impl FrameAssembler {
    /// Create an empty assembler.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            register: 0,
            checksum: 0,
            received: 0,
        }
    }

    /// Shift one sampled bit into the register.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Overrun`] if the frame is already complete.
    pub fn push(&mut self, bit: bool) -> FrameResult<()> {
        if self.is_complete() {
            return Err(FrameError::Overrun);
        }
        let value = u8::from(bit);
        self.register = (self.register << 1) | u32::from(value);
        self.checksum ^= value;
        self.received += 1;
        Ok(())
    }

    /// Number of bits received so far.
    #[must_use]
    pub const fn received(&self) -> usize {
        self.received
    }

    /// True once all [`FRAME_BITS`] bits are in.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.received >= FRAME_BITS
    }

    /// Current register contents.
    #[must_use]
    pub const fn register(&self) -> u32 {
        self.register
    }

    /// Current checksum accumulator.
    #[must_use]
    pub const fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Seal the assembler into a [`Frame`].
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Truncated`] if fewer than [`FRAME_BITS`] bits were
    /// pushed.
    pub fn finish(self) -> FrameResult<Frame> {
        if !self.is_complete() {
            return Err(FrameError::Truncated {
                received: self.received,
            });
        }
        Ok(Frame {
            register: self.register,
            checksum: self.checksum,
        })
    }
}

/// A complete 22-bit frame with its checksum accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    register: u32,
    checksum: u8,
}

impl Frame {
    /// Assemble a frame from bits in wire order (most significant first).
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Overrun`] for more than [`FRAME_BITS`] bits and
    /// [`FrameError::Truncated`] for fewer.
    pub fn from_bits<I>(bits: I) -> FrameResult<Self>
    where
        I: IntoIterator<Item = bool>,
    {
        let mut assembler = FrameAssembler::new();
        for bit in bits {
            assembler.push(bit)?;
        }
        assembler.finish()
    }

    /// Build the bit sequence a peripheral would send for the given fields.
    ///
    /// `x` and `y_field` are truncated to 10 bits. The checksum bit is chosen
    /// so that the XOR over all 22 bits equals [`CHECKSUM_VALID`], which makes
    /// `terminator = true` produce a frame that fails only the terminator check.
    #[must_use]
    pub fn encode(x: u16, y_field: u16, terminator: bool) -> [bool; FRAME_BITS] {
        let data = ((u32::from(x) & COORD_MASK) << X_SHIFT)
            | ((u32::from(y_field) & COORD_MASK) << Y_SHIFT);
        let parity = (data.count_ones() % 2 == 1) ^ terminator ^ (CHECKSUM_VALID != 0);
        let register = data | (u32::from(parity) << 1) | u32::from(terminator);

        let mut bits = [false; FRAME_BITS];
        for (index, bit) in bits.iter_mut().enumerate() {
            let shift = FRAME_BITS - 1 - index;
            *bit = (register >> shift) & 1 == 1;
        }
        bits
    }

    /// Raw 22-bit register.
    #[must_use]
    pub const fn register(&self) -> u32 {
        self.register
    }

    /// XOR over all received bits.
    #[must_use]
    pub const fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Validate the frame and extract its fields.
    ///
    /// The checksum is checked first, then the terminator bit.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::BadChecksum`] or [`FrameError::IncompleteFrame`].
    pub fn decode(&self) -> FrameResult<Packet> {
        if self.checksum != CHECKSUM_VALID {
            return Err(FrameError::BadChecksum {
                accumulator: self.checksum,
            });
        }
        let packet = Packet::from_register(self.register);
        if packet.terminator_bit() {
            return Err(FrameError::IncompleteFrame);
        }
        Ok(packet)
    }
}
