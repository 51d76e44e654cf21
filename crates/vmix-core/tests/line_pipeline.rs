//! Integration tests for the vmix-core line pipeline.
//!
//! These tests push raw device bytes through the public API exactly the way
//! the relay's device task does: frame → classify → apply to
//! [`DeviceState`].  They exercise framing, classification, snapshot
//! parsing, and the game-state machine together.

use vmix_core::protocol::line::snapshot_body;
use vmix_core::{classify, decode_frame, ActsEvent, Category, DeviceState, GameState};

const TITLE: &str = "Draft";
const FIELD: &str = "Countdown.Text";

/// Drains every complete frame from `buf` and applies it to `state`.
fn feed(state: &mut DeviceState, buf: &[u8]) -> Vec<Category> {
    let mut categories = Vec::new();
    let mut offset = 0;
    while let Ok((line, consumed)) = decode_frame(&buf[offset..]) {
        offset += consumed;
        let category = classify(&line);
        match category {
            Category::Snapshot => {
                let body = snapshot_body(&line).expect("snapshot line has a body");
                state.apply_snapshot(body, TITLE, FIELD).expect("classified as valid");
            }
            Category::Acts => {
                if let Some(acts) = ActsEvent::parse(&line) {
                    state.apply_acts(&acts);
                }
            }
            _ => {}
        }
        categories.push(category);
    }
    categories
}

fn framed_snapshot(xml: &str) -> Vec<u8> {
    let body = format!("{xml}\r\n");
    let mut frame = format!("XML {}\r\n", body.len()).into_bytes();
    frame.extend_from_slice(body.as_bytes());
    frame
}

#[test]
fn test_snapshot_then_acts_drives_draft() {
    // Arrange
    let mut state = DeviceState::default();
    let mut wire = b"SUBSCRIBE OK TALLY\r\nSUBSCRIBE OK ACTS\r\n".to_vec();
    wire.extend(framed_snapshot(
        r#"<vmix><inputs><input title="Black"/><input title="Draft"><text name="Countdown.Text">45</text></input></inputs></vmix>"#,
    ));
    wire.extend_from_slice(b"ACTS OK InputPlaying 2 1\r\n");

    // Act
    let categories = feed(&mut state, &wire);

    // Assert
    assert_eq!(
        categories,
        [
            Category::Generic,
            Category::Generic,
            Category::Snapshot,
            Category::Acts
        ]
    );
    assert_eq!(state.designated_input, Some(2));
    assert_eq!(state.countdown, Some(45));
    assert_eq!(state.game_state, GameState::Draft);
}

#[test]
fn test_malformed_framed_snapshot_is_generic_and_ignored() {
    // Arrange
    let mut state = DeviceState::default();
    let wire = framed_snapshot("<vmix><inputs><input title=\"Draft\"></inputs>");

    // Act
    let categories = feed(&mut state, &wire);

    // Assert
    assert_eq!(categories, [Category::Generic]);
    assert_eq!(state, DeviceState::default());
}

#[test]
fn test_foreign_acts_sequence_leaves_state_untouched() {
    // Arrange
    let mut state = DeviceState::default();
    feed(
        &mut state,
        &framed_snapshot(r#"<vmix><inputs><input title="Draft"/></inputs></vmix>"#),
    );
    feed(&mut state, b"ACTS OK InputPlaying 1 1\r\n");
    let before = state.clone();

    // Act
    feed(
        &mut state,
        b"ACTS OK InputPlaying 4 0\r\nACTS OK Input 9 1\r\nACTS OK InputPlaying 2 1\r\n",
    );

    // Assert
    assert_eq!(state, before);
    assert_eq!(state.game_state, GameState::Draft);
}

#[test]
fn test_most_recent_designated_acts_event_wins() {
    let mut state = DeviceState::default();
    feed(
        &mut state,
        &framed_snapshot(r#"<vmix><inputs><input title="Draft"/></inputs></vmix>"#),
    );

    feed(
        &mut state,
        b"ACTS OK InputPlaying 1 1\r\nACTS OK InputPlaying 1 0\r\nACTS OK InputPlaying 3 1\r\n",
    );
    assert_eq!(state.game_state, GameState::Idle);

    feed(&mut state, b"ACTS OK InputPlaying 1 1\r\nACTS OK Input 5 0\r\n");
    assert_eq!(state.game_state, GameState::Draft);
}
