//! Outbound commands for the vMix TCP API.

use std::fmt;

/// A command written to the device, one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Request a full XML snapshot.
    Xml,
    SubscribeTally,
    SubscribeActs,
    UnsubscribeTally,
    UnsubscribeActs,
    /// Query a single value by XPath, e.g.
    /// `vmix/inputs/input[@title='Draft']/text[@name='Countdown.Text']`.
    XmlText(String),
    /// Anything else, forwarded verbatim (client commands, `FUNCTION ...`).
    Raw(String),
}

impl DeviceCommand {
    /// Commands issued immediately after every successful connect, in order.
    pub fn bootstrap() -> [DeviceCommand; 3] {
        [
            DeviceCommand::Xml,
            DeviceCommand::SubscribeTally,
            DeviceCommand::SubscribeActs,
        ]
    }

    /// Commands issued best-effort when the connection is torn down.
    pub fn teardown() -> [DeviceCommand; 2] {
        [DeviceCommand::UnsubscribeTally, DeviceCommand::UnsubscribeActs]
    }

    /// XPath query for one text field of the input titled `title`.
    pub fn text_field(title: &str, field: &str) -> DeviceCommand {
        DeviceCommand::XmlText(format!(
            "vmix/inputs/input[@title='{title}']/text[@name='{field}']"
        ))
    }

    /// The command as written on the wire, including the CRLF terminator.
    ///
    /// Embedded line breaks in a raw command are stripped so one command can
    /// never be read by the device as two.
    pub fn to_wire(&self) -> Vec<u8> {
        let text: String = self
            .to_string()
            .chars()
            .filter(|c| *c != '\r' && *c != '\n')
            .collect();
        let mut wire = text.into_bytes();
        wire.extend_from_slice(b"\r\n");
        wire
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceCommand::Xml => f.write_str("XML"),
            DeviceCommand::SubscribeTally => f.write_str("SUBSCRIBE TALLY"),
            DeviceCommand::SubscribeActs => f.write_str("SUBSCRIBE ACTS"),
            DeviceCommand::UnsubscribeTally => f.write_str("UNSUBSCRIBE TALLY"),
            DeviceCommand::UnsubscribeActs => f.write_str("UNSUBSCRIBE ACTS"),
            DeviceCommand::XmlText(path) => write!(f, "XMLTEXT {path}"),
            DeviceCommand::Raw(command) => f.write_str(command),
        }
    }
}
