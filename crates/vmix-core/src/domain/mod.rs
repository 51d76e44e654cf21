//! Domain module: the device's state as the relay understands it.
//!
//! Nothing in here performs I/O.  The relay's device task feeds lines in and
//! reads immutable snapshots out.

pub mod game_state;
pub mod snapshot;
pub mod state;

pub use game_state::GameState;
pub use snapshot::{designated_index, is_well_formed, parse_snapshot, Input, SnapshotError, TextField};
pub use state::DeviceState;
