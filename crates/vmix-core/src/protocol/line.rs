//! Classification of device lines.
//!
//! Every logical line from vMix starts with a token that names its kind:
//!
//! | First token | Category   | Example                         |
//! |-------------|------------|---------------------------------|
//! | `XML`       | Snapshot   | `XML <vmix>...</vmix>`          |
//! | `TALLY`     | Tally      | `TALLY OK 0120`                 |
//! | `ACTS`      | Acts       | `ACTS OK InputPlaying 2 1`      |
//! | `FUNCTION`  | Function   | `FUNCTION OK Completed`         |
//! | `XMLTEXT`   | Text       | `XMLTEXT OK 27`                 |
//! | other       | Generic    | `SUBSCRIBE OK TALLY`            |
//!
//! A snapshot-shaped line whose body is not well-formed XML is Generic: it
//! is logged and dropped by the session and never touches device state.
//!
//! [`classify`] is pure and deterministic; calling it twice on the same
//! line always returns the same category.

use serde::{Deserialize, Serialize};

use crate::domain::snapshot::is_well_formed;

/// The kind of a device line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Snapshot,
    Tally,
    Acts,
    Function,
    /// Reply to an `XMLTEXT <path>` query.
    Text,
    Generic,
}

/// Classifies a single line received from the device.
///
/// # Examples
///
/// ```rust
/// use vmix_core::{classify, Category};
///
/// assert_eq!(classify("ACTS OK InputPlaying 1 1"), Category::Acts);
/// assert_eq!(classify("XML <vmix/>"), Category::Snapshot);
/// assert_eq!(classify("XML <vmix>"), Category::Generic);
/// ```
pub fn classify(line: &str) -> Category {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut tokens = line.split_whitespace();

    match tokens.next() {
        Some("XML") => classify_snapshot(line),
        Some("TALLY") => Category::Tally,
        Some("ACTS") => Category::Acts,
        Some("FUNCTION") => Category::Function,
        Some("XMLTEXT") if tokens.next() == Some("OK") => Category::Text,
        _ if line.starts_with('<') => classify_snapshot(line),
        _ => Category::Generic,
    }
}

fn classify_snapshot(line: &str) -> Category {
    match snapshot_body(line) {
        Some(body) if is_well_formed(body) => Category::Snapshot,
        _ => Category::Generic,
    }
}

/// Returns the XML document carried by a snapshot-shaped line.
///
/// Accepts both the framed form (`XML <vmix>...`) and a bare document line
/// (`<vmix>...`).  Returns `None` for anything else.
pub fn snapshot_body(line: &str) -> Option<&str> {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(rest) = line.strip_prefix("XML") {
        let body = rest.trim_start();
        return (body.len() < rest.len() || rest.is_empty()).then_some(body);
    }
    line.starts_with('<').then_some(line)
}

/// Returns the value carried by an `XMLTEXT OK <value>` reply.
///
/// The value may contain spaces; everything after `OK ` is returned.
pub fn text_value(line: &str) -> Option<&str> {
    line.trim_end_matches(['\r', '\n'])
        .strip_prefix("XMLTEXT OK")
        .map(str::trim)
}

// ── ACTS ──────────────────────────────────────────────────────────────────────

/// A parsed `ACTS OK <event> <input> <state>` line.
///
/// vMix sends one of these for every activator change once `SUBSCRIBE ACTS`
/// is active, e.g. `ACTS OK InputPlaying 3 1` when input 3 starts playing
/// and `ACTS OK InputPlaying 3 0` when it stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActsEvent {
    /// Activator name (`Input`, `InputPreview`, `InputPlaying`, ...).
    pub event: String,
    /// 1-based input number the event refers to.
    pub input: u32,
    /// The state flag: `true` for `1`, `false` for `0`.
    pub active: bool,
}

impl ActsEvent {
    /// Activator reported when an input starts or stops playback.
    pub const INPUT_PLAYING: &'static str = "InputPlaying";

    /// Parses an ACTS line.
    ///
    /// Returns `None` for `ACTS ER ...` replies and for lines with missing
    /// or non-numeric fields.  Trailing tokens after the state flag are
    /// ignored (some activators append extra values).
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        if tokens.next()? != "ACTS" || tokens.next()? != "OK" {
            return None;
        }
        let event = tokens.next()?.to_string();
        let input = tokens.next()?.parse().ok()?;
        let active = match tokens.next()? {
            "1" => true,
            "0" => false,
            _ => return None,
        };
        Some(Self {
            event,
            input,
            active,
        })
    }

    /// `true` when this event reports that its input started playing.
    pub fn started_playing(&self) -> bool {
        self.event == Self::INPUT_PLAYING && self.active
    }
}

// ── TALLY ─────────────────────────────────────────────────────────────────────

/// Tally light of a single input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TallyLight {
    #[default]
    Off,
    Program,
    Preview,
}

/// A parsed `TALLY OK <digits>` line: one digit per input, input 1 first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TallyState(pub Vec<TallyLight>);

impl TallyState {
    /// Parses a tally line.  `0` is off, `1` program, `2` preview.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        if tokens.next()? != "TALLY" || tokens.next()? != "OK" {
            return None;
        }
        let digits = tokens.next().unwrap_or("");
        digits
            .chars()
            .map(|c| match c {
                '0' => Some(TallyLight::Off),
                '1' => Some(TallyLight::Program),
                '2' => Some(TallyLight::Preview),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(TallyState)
    }

    /// Tally of the 1-based `input`; inputs beyond the reported list are off.
    pub fn light(&self, input: u32) -> TallyLight {
        input
            .checked_sub(1)
            .and_then(|i| self.0.get(i as usize))
            .copied()
            .unwrap_or_default()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
