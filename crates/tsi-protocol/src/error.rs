//! Frame verdicts.

use crate::{CHECKSUM_VALID, FRAME_BITS};

/// Reasons a frame is not turned into a [`Packet`](crate::Packet).
///
/// `BadChecksum` and `IncompleteFrame` describe what came over the wire and are
/// recoverable: the frame is dropped and the receiver backs off. `Overrun` and
/// `Truncated` guard misuse of [`FrameAssembler`](crate::FrameAssembler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The XOR over all 22 bits did not equal [`CHECKSUM_VALID`].
    #[error("bad checksum: accumulator {accumulator}, expected {}", CHECKSUM_VALID)]
    BadChecksum {
        /// Running XOR over every received bit.
        accumulator: u8,
    },

    /// The terminator bit was 1, so the peripheral had not finished the frame.
    #[error("packet was not finished: terminator bit set")]
    IncompleteFrame,

    /// A bit was pushed into an assembler that already held a full frame.
    #[error("frame overrun: more than {} bits pushed", FRAME_BITS)]
    Overrun,

    /// A frame was finished before all bits were received.
    #[error("truncated frame: {received} of {} bits received", FRAME_BITS)]
    Truncated {
        /// Number of bits received before finishing.
        received: usize,
    },
}

impl FrameError {
    /// True for the verdicts the receive loop answers with a backoff.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::BadChecksum { .. } | Self::IncompleteFrame)
    }

    /// Short machine-readable name, used as a structured log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadChecksum { .. } => "bad_checksum",
            Self::IncompleteFrame => "incomplete_frame",
            Self::Overrun => "overrun",
            Self::Truncated { .. } => "truncated",
        }
    }
}

/// A specialized `Result` type for frame decoding.
pub type FrameResult<T> = core::result::Result<T, FrameError>;
