//! Property-based tests for the TSI wire protocol.
//!
//! Uses proptest with 500 cases to verify the checksum-first validation order,
//! the terminator check and field extraction over arbitrary 22-bit streams.

use proptest::prelude::*;
use tsi_protocol::{
    CHECKSUM_VALID, FRAME_BITS, FRAME_MASK, Frame, FrameAssembler, FrameError, Packet,
};

fn bits_of(register: u32) -> Vec<bool> {
    (0..FRAME_BITS)
        .rev()
        .map(|shift| (register >> shift) & 1 == 1)
        .collect()
}

fn parity(register: u32) -> u8 {
    u8::from(register.count_ones() % 2 == 1)
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(500))]

    /// Any stream whose XOR is not the valid value must be a bad checksum,
    /// whatever the terminator bit says.
    #[test]
    fn prop_wrong_parity_is_bad_checksum(seed in 0u32..=FRAME_MASK) {
        // flip the terminator bit when needed so the parity is always wrong
        let register = if parity(seed) == CHECKSUM_VALID { seed ^ 1 } else { seed };
        let frame = Frame::from_bits(bits_of(register));
        prop_assert!(frame.is_ok());
        if let Ok(frame) = frame {
            prop_assert_eq!(
                frame.decode(),
                Err(FrameError::BadChecksum { accumulator: parity(register) })
            );
        }
    }

    /// Valid checksum plus terminator 1 must be reported as an incomplete frame.
    #[test]
    fn prop_valid_checksum_with_terminator_is_incomplete(x in 0u16..1024, y in 0u16..1024) {
        let frame = Frame::from_bits(Frame::encode(x, y, true));
        prop_assert!(frame.is_ok());
        if let Ok(frame) = frame {
            prop_assert_eq!(frame.checksum(), CHECKSUM_VALID);
            prop_assert_eq!(frame.decode(), Err(FrameError::IncompleteFrame));
        }
    }

    /// Every valid frame decodes X to the top ten bits of the register.
    #[test]
    fn prop_valid_frame_yields_x(x in 0u16..1024, y in 0u16..1024) {
        let frame = Frame::from_bits(Frame::encode(x, y, false));
        prop_assert!(frame.is_ok());
        if let Ok(frame) = frame {
            let packet = frame.decode();
            prop_assert!(packet.is_ok(), "encoded frame must decode: {:?}", packet);
            if let Ok(packet) = packet {
                prop_assert_eq!(packet.x(), x);
                prop_assert!(!packet.terminator_bit());
            }
        }
    }

    /// The assembler's checksum is the XOR of every pushed bit.
    #[test]
    fn prop_assembler_checksum_is_parity(register in 0u32..=FRAME_MASK) {
        let mut assembler = FrameAssembler::new();
        for bit in bits_of(register) {
            prop_assert!(assembler.push(bit).is_ok());
        }
        prop_assert!(assembler.is_complete());
        prop_assert_eq!(assembler.register(), register);
        prop_assert_eq!(assembler.checksum(), parity(register));
    }

    /// Y only ever takes the two values the literal mask allows.
    #[test]
    fn prop_y_is_single_bit(register in 0u32..=FRAME_MASK) {
        let packet = Packet::from_register(register);
        prop_assert!(packet.y() == 0 || packet.y() == 0x400);
        prop_assert_eq!(packet.y() == 0x400, packet.x() & 1 == 1);
    }

    /// Fewer than 22 bits never produce a frame.
    #[test]
    fn prop_short_streams_are_truncated(len in 0usize..FRAME_BITS) {
        let result = Frame::from_bits(vec![false; len]);
        prop_assert_eq!(result, Err(FrameError::Truncated { received: len }));
    }

    /// More than 22 bits never produce a frame.
    #[test]
    fn prop_long_streams_overrun(extra in 1usize..16) {
        let result = Frame::from_bits(vec![false; FRAME_BITS + extra]);
        prop_assert_eq!(result, Err(FrameError::Overrun));
    }
}
