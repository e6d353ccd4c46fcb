//! Property-based tests for frame reception and pointer translation.
//!
//! Uses proptest with 200 cases per property.

use std::time::Duration;

use proptest::prelude::*;
use tsi_driver::prelude::*;
use tsi_protocol::{FRAME_BITS, Frame};

fn lines(
    bits: [bool; FRAME_BITS],
    inverted: bool,
    trace: &Trace,
) -> (ClockLine<MockOutput, RecordingDelay>, DataLine<MockInput>) {
    let clock = ClockLine::new(
        MockOutput::new(trace.clone()),
        RecordingDelay::new(trace.clone()),
        Duration::from_micros(5000),
        Duration::from_micros(100),
    );
    let input = MockInput::new(trace.clone()).logical_bits(bits, inverted);
    (clock, DataLine::new(input, inverted))
}

fn coordinate() -> impl Strategy<Value = (u16, u16)> {
    prop_oneof![
        1 => Just((0u16, 0u16)),
        3 => (0u16..1024, 0u16..1024),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every reception drives exactly 22 clock edges, whatever is sampled.
    #[test]
    fn prop_receive_consumes_exactly_22_ticks(
        bits in proptest::array::uniform22(any::<bool>()),
        inverted in any::<bool>(),
    ) {
        let trace = Trace::new();
        let (mut clock, mut data) = lines(bits, inverted, &trace);
        let result = PacketDecoder::new().receive_frame(&mut clock, &mut data);
        prop_assert!(result.is_ok());
        prop_assert_eq!(clock.ticks(), 22);
        prop_assert_eq!(
            trace.count(|event| matches!(event, TraceEvent::Set(_))),
            FRAME_BITS
        );
        prop_assert_eq!(data.pin().remaining(), 0);
    }

    /// The line-level verdict equals the protocol-level verdict for the same bits.
    #[test]
    fn prop_receive_matches_protocol_decode(
        bits in proptest::array::uniform22(any::<bool>()),
        inverted in any::<bool>(),
    ) {
        let trace = Trace::new();
        let (mut clock, mut data) = lines(bits, inverted, &trace);
        let received = PacketDecoder::new().receive_frame(&mut clock, &mut data);
        let expected = Frame::from_bits(bits).and_then(|frame| frame.decode());
        prop_assert!(received.is_ok());
        if let Ok(received) = received {
            prop_assert_eq!(received, expected);
        }
    }

    /// Presses and releases alternate, starting with a press.
    #[test]
    fn prop_pointer_presses_and_releases_alternate(
        coords in proptest::collection::vec(coordinate(), 0..40),
    ) {
        let trace = Trace::new();
        let mut sink = PointerSink::new(RecordingPointer::new(trace.clone()));
        let mut pressed = false;
        for (x, y) in coords {
            let update = sink.update(x, y);
            prop_assert!(update.is_ok());
            let contact = (x, y) != (0, 0);
            let expected = match (contact, pressed) {
                (false, false) => PointerUpdate::Idle,
                (false, true) => PointerUpdate::Released,
                (true, true) => PointerUpdate::Moved,
                (true, false) => PointerUpdate::Pressed,
            };
            if let Ok(update) = update {
                prop_assert_eq!(update, expected);
            }
            pressed = contact;
            prop_assert_eq!(trace.presses() == trace.releases() + 1, pressed);
        }

        let presses = trace.presses();
        let releases = trace.releases();
        prop_assert!(presses == releases || presses == releases + 1);
        prop_assert_eq!(presses == releases + 1, pressed);
    }

    /// A contact is always preceded by its move, never by a bare press.
    #[test]
    fn prop_press_follows_move(x in 1u16..1024, y in 0u16..1024) {
        let trace = Trace::new();
        let mut sink = PointerSink::new(RecordingPointer::new(trace.clone()));
        prop_assert!(sink.update(x, y).is_ok());
        prop_assert_eq!(
            trace.events(),
            vec![TraceEvent::Move { x, y }, TraceEvent::Press]
        );
    }
}
