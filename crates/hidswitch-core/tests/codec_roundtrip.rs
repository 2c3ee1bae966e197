//! Integration tests for the hidswitch-core codecs.
//!
//! These exercise the public API end to end: physical report decode, output
//! report re-encode, and the downstream wire frames, the way the hub and the
//! replay agent actually chain them together.

use hidswitch_core::{
    decode_keys, decode_modifiers, decode_mouse, encode_keys, encode_mouse, parse_key_frame,
    wire::encode_key_frame, KeymapTable, MouseFrame, MouseReport, ReportError,
};

#[test]
fn test_mouse_codec_round_trips_across_the_signed_ranges() {
    let table_of_extremes = [
        (-2048i16, -2048i16),
        (-2048, 2047),
        (2047, -2048),
        (2047, 2047),
        (0, 0),
        (-1, 1),
        (100, -100),
    ];
    for (x, y) in table_of_extremes {
        for (y_scroll, x_scroll) in [(-128i8, 127i8), (0, 0), (1, -1)] {
            for button in [0u8, 1, 2, 4, 255] {
                let original = MouseReport { button, x, y, y_scroll, x_scroll };
                assert_eq!(decode_mouse(&encode_mouse(&original)), original);
            }
        }
    }
}

#[test]
fn test_physical_keyboard_report_to_downstream_frame() {
    // A physical report holding LEFT_SHIFT + Q, decoded the way the hub does
    // it, then framed for keyboard-role downstreams and parsed back the way
    // the agent does it.
    let table = KeymapTable::new();
    let report = [1u8, 0x02, 0x04, 0, 0, 0, 0, 0, 0]; // shift bit + Q slot

    let mut pressed = decode_keys(&report, &table).expect("no rollover");
    pressed.extend(decode_modifiers(report[1], &table.modifiers));
    assert_eq!(pressed, vec!["Q", "LEFT_SHIFT"]);

    let frame = encode_key_frame(&pressed);
    assert_eq!(frame, "Q LEFT_SHIFT\n");

    // The agent reverses wire order so the modifier is asserted first.
    let applied = parse_key_frame(frame.trim_end());
    assert_eq!(applied, vec!["LEFT_SHIFT", "Q"]);
}

#[test]
fn test_rollover_report_is_discarded_whole() {
    let table = KeymapTable::new();
    let report = [1u8, 0x02, 0x04, 0x01, 0x2c, 0, 0, 0, 0];
    assert_eq!(decode_keys(&report, &table), Err(ReportError::KeyRollover));
}

#[test]
fn test_remote_key_set_to_output_reports_and_back() {
    let table = KeymapTable::new();
    let reports = encode_keys(&["LEFT_CONTROL", "LEFT_ALT", "DELETE"], &table);

    assert_eq!(reports.keys[1], 0x01 | 0x04);
    assert_eq!(reports.keys[3], 0x4c);

    let decoded = decode_keys(&reports.keys, &table).expect("output report never has rollover");
    assert_eq!(decoded, vec!["DELETE"]);
    assert_eq!(
        decode_modifiers(reports.keys[1], &table.modifiers),
        vec!["LEFT_CONTROL", "LEFT_ALT"]
    );
}

#[test]
fn test_mouse_frames_reassemble_from_a_fragmented_stream() {
    // Concatenate three frames and feed them back byte by byte, as the agent's
    // read loop would when TCP fragments the stream arbitrarily.
    let frames = [
        MouseFrame::Move { dx: 5, dy: -3 },
        MouseFrame::Buttons { button: 1, y_scroll: 0, x_scroll: 0 },
        MouseFrame::Move { dx: -1, dy: 0 },
    ];
    let mut stream = Vec::new();
    for f in &frames {
        stream.extend(f.encode());
    }

    let mut buffer = Vec::new();
    let mut decoded = Vec::new();
    for &byte in &stream {
        buffer.push(byte);
        while let Some((frame, consumed)) = MouseFrame::decode(&buffer).unwrap() {
            decoded.push(frame);
            buffer.drain(..consumed);
        }
    }

    assert_eq!(decoded, frames);
    assert!(buffer.is_empty());
}
