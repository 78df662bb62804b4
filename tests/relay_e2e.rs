//! End-to-end tests for the relay message boundary.
//!
//! Every test drives a [`Relay`] the way a host would: hand it an input
//! message and collect whatever it posts back.

use ascii_worker::config::Config;
use ascii_worker::{InputMessage, OutputMessage, Relay, RenderOptions};
use std::sync::mpsc;
use std::thread;

fn white(width: u32, height: u32) -> Vec<u8> {
    vec![255u8; (width * height * 4) as usize]
}

/// Run one message through the relay and collect everything it posts.
fn run(relay: &Relay, message: &InputMessage) -> Vec<OutputMessage> {
    let (tx, rx) = mpsc::channel();
    relay.handle(message, |msg| {
        let _ = tx.send(msg);
    });
    drop(tx);
    rx.into_iter().collect()
}

fn assert_single_error(messages: &[OutputMessage], needle: &str) {
    assert_eq!(messages.len(), 1, "expected one message, got {:?}", messages);
    match &messages[0] {
        OutputMessage::Error { error } => {
            assert!(error.contains(needle), "'{}' not in '{}'", needle, error)
        }
        other => panic!("expected error, got {:?}", other),
    }
}

#[test]
fn test_stream_then_done() {
    let relay = Relay::default();
    let message = InputMessage::raw(white(8, 4), 8, 4, 8, false);
    let messages = run(&relay, &message);

    let (last, streamed) = messages.split_last().unwrap();
    let rows: Vec<String> = streamed
        .iter()
        .map(|m| match m {
            OutputMessage::Stream { data } => data.clone(),
            other => panic!("expected stream, got {:?}", other),
        })
        .collect();

    assert_eq!(rows, vec!["@@@@@@@@".to_string(); 4]);
    match last {
        OutputMessage::Done { result } => assert_eq!(result.rows(), rows.as_slice()),
        other => panic!("expected done, got {:?}", other),
    }
    assert!(last.is_terminal());
}

#[test]
fn test_length_mismatch_posts_single_error() {
    let relay = Relay::default();
    let mut data = white(4, 4);
    data.pop();
    let messages = run(&relay, &InputMessage::raw(data, 4, 4, 4, false));
    assert_single_error(&messages, "Invalid input");
}

#[test]
fn test_zero_and_negative_cols_rejected() {
    let relay = Relay::default();
    for cols in [0, -5] {
        let messages = run(&relay, &InputMessage::raw(white(2, 2), 2, 2, cols, false));
        assert_single_error(&messages, "cols must be greater than 0");
    }
}

#[test]
fn test_oversized_cols_posts_single_error() {
    let relay = Relay::default();
    let message = InputMessage::raw(vec![0, 0, 0, 255], 1, 1, u32::MAX as i64, false);
    assert_single_error(&run(&relay, &message), "cell limit");

    // Past u32 range entirely
    let message = InputMessage::raw(vec![0, 0, 0, 255], 1, 1, i64::MAX, false);
    assert_single_error(&run(&relay, &message), "out of range");
}

#[test]
fn test_width_without_height_rejected() {
    let relay = Relay::default();
    let message = InputMessage {
        data: white(2, 2),
        cols: 2,
        invert: None,
        width: Some(2),
        height: None,
    };
    assert_single_error(&run(&relay, &message), "width and height");
}

#[test]
fn test_missing_invert_uses_relay_default() {
    let relay = Relay::default().with_default_invert(true);
    let mut message = InputMessage::raw(white(2, 2), 2, 2, 2, false);
    message.invert = None;

    let messages = run(&relay, &message);
    assert_eq!(
        messages.first(),
        Some(&OutputMessage::Stream {
            data: "  ".to_string()
        })
    );

    // An explicit value wins over the default
    message.invert = Some(false);
    let messages = run(&relay, &message);
    assert_eq!(
        messages.first(),
        Some(&OutputMessage::Stream {
            data: "@@".to_string()
        })
    );
}

#[test]
fn test_handle_json_round_trip() {
    let relay = Relay::default();
    let input = serde_json::to_string(&InputMessage::raw(white(3, 3), 3, 3, 3, false)).unwrap();

    let mut lines = Vec::new();
    relay.handle_json(&input, |msg| lines.push(msg.to_json().unwrap()));

    assert_eq!(lines.len(), 4);
    for line in &lines[..3] {
        assert_eq!(line, r#"{"type":"stream","data":"@@@"}"#);
    }
    assert_eq!(lines[3], r#"{"type":"done","result":["@@@","@@@","@@@"]}"#);
}

#[test]
fn test_handle_json_accepts_minimal_message() {
    // invert may be omitted by the host
    let relay = Relay::default();
    let json = r#"{"data":[0,0,0,255],"cols":1,"width":1,"height":1}"#;

    let mut messages = Vec::new();
    relay.handle_json(json, |msg| messages.push(msg));
    assert_eq!(
        messages.last(),
        Some(&OutputMessage::Done {
            result: vec![" ".to_string()].into()
        })
    );
}

#[test]
fn test_malformed_json_posts_error() {
    let relay = Relay::default();
    let mut messages = Vec::new();
    relay.handle_json("{\"cols\": 3", |msg| messages.push(msg));
    assert_single_error(&messages, "malformed message");
}

#[test]
fn test_sink_panic_becomes_internal_failure() {
    let relay = Relay::default();
    let message = InputMessage::raw(white(4, 4), 4, 4, 4, false);

    let mut messages = Vec::new();
    relay.handle(&message, |msg| {
        if let OutputMessage::Stream { .. } = msg {
            panic!("host went away");
        }
        messages.push(msg);
    });

    // Nothing after the failure except the error itself
    assert_single_error(&messages, "Internal failure: host went away");
}

#[test]
fn test_relay_from_config() {
    let config =
        Config::from_toml_str("[render]\ncharset = \"minimal\"\ninvert = true\ngamma = true")
            .unwrap();
    let relay = Relay::from_config(&config).unwrap();
    assert!(relay.options().gamma);

    let mut message = InputMessage::raw(vec![0, 0, 0, 255], 1, 1, 1, false);
    message.invert = None;
    let messages = run(&relay, &message);
    // Black on an inverted minimal ramp is its densest glyph
    assert_eq!(
        messages.first(),
        Some(&OutputMessage::Stream {
            data: "#".to_string()
        })
    );
}

#[test]
fn test_relay_from_config_rejects_bad_dither() {
    let config = Config::from_toml_str("[render]\ndither = \"sparkle\"").unwrap();
    let err = Relay::from_config(&config).unwrap_err();
    assert!(err.to_string().contains("render.dither"));
}

#[test]
fn test_relay_shared_across_threads() {
    let relay = Relay::new(RenderOptions::default());
    let (tx, rx) = mpsc::channel();

    thread::scope(|scope| {
        for worker in 0..4u32 {
            let tx = tx.clone();
            scope.spawn(move || {
                let size = 4 + worker;
                let message = InputMessage::raw(white(size, size), size, size, size as i64, false);
                let mut rows = 0;
                relay.handle(&message, |msg| {
                    if let OutputMessage::Stream { .. } = msg {
                        rows += 1;
                    }
                    if let OutputMessage::Done { result } = msg {
                        let _ = tx.send((size, rows, result.len()));
                    }
                });
            });
        }
    });
    drop(tx);

    let mut outcomes: Vec<_> = rx.into_iter().collect();
    outcomes.sort();
    assert_eq!(outcomes, vec![(4, 4, 4), (5, 5, 5), (6, 6, 6), (7, 7, 7)]);
}

#[cfg(feature = "decode")]
mod encoded {
    use super::*;
    use std::io::Cursor;

    fn png(width: u32, height: u32, value: u8) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([value, value, value, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_png_message_renders() {
        let relay = Relay::default();
        let messages = run(&relay, &InputMessage::encoded(png(10, 5, 255), 10, false));

        assert_eq!(messages.len(), 6);
        assert_eq!(
            messages.last(),
            Some(&OutputMessage::Done {
                result: vec!["@@@@@@@@@@".to_string(); 5].into()
            })
        );
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let relay = Relay::default();
        let messages = run(&relay, &InputMessage::encoded(vec![1, 2, 3, 4, 5], 10, false));
        assert_single_error(&messages, "error decoding image");
    }

    #[test]
    fn test_empty_encoded_data_rejected() {
        let relay = Relay::default();
        let messages = run(&relay, &InputMessage::encoded(Vec::new(), 10, false));
        assert_single_error(&messages, "empty image data");
    }
}
