//! Frame reception.

use tracing::debug;
use tsi_protocol::{FRAME_BITS, FrameAssembler, FrameResult, Packet};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::error::{LineError, LineResult};
use crate::line::{ClockLine, DataLine, EdgeWait};

/// Clocks one frame in from the peripheral and validates it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PacketDecoder;

impl PacketDecoder {
    /// Create a decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Receive exactly [`FRAME_BITS`] bits, ticking the clock before each
    /// sample.
    ///
    /// The outer result carries line faults, which are fatal. The inner one is
    /// the frame verdict: a [`Packet`] or the first of
    /// [`FrameError::BadChecksum`](tsi_protocol::FrameError::BadChecksum) and
    /// [`FrameError::IncompleteFrame`](tsi_protocol::FrameError::IncompleteFrame)
    /// that applies. All 22 ticks happen whatever bits arrive.
    ///
    /// # Errors
    ///
    /// Returns an error if either line fails.
    pub fn receive_frame<O, D, I>(
        &self,
        clock: &mut ClockLine<O, D>,
        data: &mut DataLine<I>,
    ) -> LineResult<FrameResult<Packet>>
    where
        O: OutputPin,
        D: DelayNs,
        I: InputPin + EdgeWait,
        LineError: From<O::Error> + From<<I as ErrorType>::Error>,
    {
        debug!("receiving packet");
        let mut assembler = FrameAssembler::new();
        for _ in 0..FRAME_BITS {
            clock.tick()?;
            let bit = data.sample()?;
            if let Err(error) = assembler.push(bit) {
                return Ok(Err(error));
            }
        }

        let frame = match assembler.finish() {
            Ok(frame) => frame,
            Err(error) => return Ok(Err(error)),
        };
        debug!(
            frame = %format_args!("{:0width$b}", frame.register(), width = FRAME_BITS),
            checksum = frame.checksum(),
            "received packet"
        );
        Ok(frame.decode())
    }
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use crate::mock::{MockInput, MockOutput, RecordingDelay, Trace};
    use std::time::Duration;
    use tsi_protocol::{Frame, FrameError};

    fn lines(
        bits: &[bool],
        inverted: bool,
    ) -> (
        ClockLine<MockOutput, RecordingDelay>,
        DataLine<MockInput>,
    ) {
        let trace = Trace::new();
        let clock = ClockLine::new(
            MockOutput::new(trace.clone()),
            RecordingDelay::new(trace.clone()),
            Duration::from_micros(5000),
            Duration::from_micros(100),
        );
        let input = MockInput::new(trace).logical_bits(bits.iter().copied(), inverted);
        (clock, DataLine::new(input, inverted))
    }

    #[test]
    fn test_receives_reference_frame() -> Result<(), Box<dyn std::error::Error>> {
        let bits = Frame::encode(682, 0b01_0101_0101, false);
        let (mut clock, mut data) = lines(&bits, true);
        let packet = PacketDecoder::new().receive_frame(&mut clock, &mut data)??;
        assert_eq!(packet.x(), 682);
        assert_eq!(clock.ticks(), 22);
        Ok(())
    }

    #[test]
    fn test_bad_checksum_still_consumes_all_ticks() -> Result<(), Box<dyn std::error::Error>> {
        let mut bits = Frame::encode(5, 5, false);
        if let Some(bit) = bits.first_mut() {
            *bit = !*bit;
        }
        let (mut clock, mut data) = lines(&bits, false);
        let verdict = PacketDecoder::new().receive_frame(&mut clock, &mut data)?;
        assert!(matches!(verdict, Err(FrameError::BadChecksum { .. })));
        assert_eq!(clock.ticks(), 22);
        Ok(())
    }

    #[test]
    fn test_line_fault_is_fatal() {
        let bits = [false; 10];
        let (mut clock, mut data) = lines(&bits, false);
        let result = PacketDecoder::new().receive_frame(&mut clock, &mut data);
        assert!(result.is_err());
        assert_eq!(clock.ticks(), 11);
    }
}
