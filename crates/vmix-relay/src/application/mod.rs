//! Application layer: the relay's behaviour, independent of sockets.
//!
//! - [`device_session`] – per-line decisions for the device connection.
//! - [`hub`] – client registry, fan-out, roster mutations, and the tick.
//! - [`roster_store`] – the roster persistence port.

pub mod device_session;
pub mod hub;
pub mod roster_store;

pub use device_session::{DeviceEvent, LineOutcome, SessionCore};
pub use hub::{ClientId, DeviceError, DeviceLink, RelayHub};
pub use roster_store::{MemoryRosterStore, RosterError, RosterStore};
