//! Protocol module: byte framing, line classification, and outbound commands.

pub mod command;
pub mod framing;
pub mod line;

pub use command::DeviceCommand;
pub use framing::{decode_frame, FrameError};
pub use line::{classify, ActsEvent, Category, TallyLight, TallyState};
