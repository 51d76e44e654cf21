//! # vmix-core
//!
//! Shared library for the vMix relay containing the TCP API framing, the
//! line classifier, the outbound command model, and the device-state model
//! that the relay derives from the device's unsolicited status lines.
//!
//! This crate has zero dependencies on sockets, async runtimes, or web
//! frameworks.  Everything here is a pure function of its inputs, which is
//! what lets the relay test its state machine without a real vMix instance.
//!
//! # Architecture overview
//!
//! vMix exposes a line-oriented TCP API (port 8099).  After subscribing, it
//! streams status lines unprompted:
//!
//! ```text
//! XML 1234\r\n<vmix>...</vmix>\r\n     full status snapshot (length-prefixed)
//! TALLY OK 0120\r\n                     per-input tally lights
//! ACTS OK InputPlaying 3 1\r\n          input playback transitions
//! FUNCTION OK Completed\r\n             function invocation results
//! ```
//!
//! - **`protocol`** – How lines travel: [`protocol::framing`] cuts the byte
//!   stream into logical lines, [`protocol::line`] classifies them, and
//!   [`protocol::command`] renders outbound commands.
//!
//! - **`domain`** – What the lines mean: the parsed snapshot
//!   ([`domain::snapshot`]), the game-phase state machine
//!   ([`domain::game_state`]), and the aggregate [`DeviceState`].

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `vmix_core::DeviceState` instead of `vmix_core::domain::state::DeviceState`.
pub use domain::game_state::GameState;
pub use domain::snapshot::{designated_index, is_well_formed, parse_snapshot, Input, SnapshotError};
pub use domain::state::DeviceState;
pub use protocol::command::DeviceCommand;
pub use protocol::framing::{decode_frame, FrameError};
pub use protocol::line::{classify, ActsEvent, Category, TallyLight, TallyState};
